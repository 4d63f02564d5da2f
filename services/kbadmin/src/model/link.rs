//! Junction link descriptors.
//!
//! # Purpose
//! Names the many-to-many associations between entities so the store can
//! check, insert, and delete `(parent, child)` pairs through one code path.
//!
//! # Key invariants
//! - A pair appears at most once per junction; the store checks with a count
//!   before inserting.
//! - `PlanogramProduct` is carried by the position table: linking inserts an
//!   unplaced position row and unlinking removes every position for the pair.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    ClusterStore,
    StoreFloorPlan,
    FloorPlanPlanogram,
    PlanogramProduct,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::ClusterStore => "cluster_store",
            LinkKind::StoreFloorPlan => "store_floorplan",
            LinkKind::FloorPlanPlanogram => "floorplan_planogram",
            LinkKind::PlanogramProduct => "planogram_product",
        }
    }

    /// Human-readable `(parent, child)` nouns for response messages.
    pub fn nouns(&self) -> (&'static str, &'static str) {
        match self {
            LinkKind::ClusterStore => ("cluster", "store"),
            LinkKind::StoreFloorPlan => ("store", "floor plan"),
            LinkKind::FloorPlanPlanogram => ("floor plan", "planogram"),
            LinkKind::PlanogramProduct => ("planogram", "product"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub kind: LinkKind,
    pub parent_id: i64,
    pub child_id: i64,
}

impl Link {
    pub fn new(kind: LinkKind, parent_id: i64, child_id: i64) -> Self {
        Self {
            kind,
            parent_id,
            child_id,
        }
    }
}
