//! Knowledge-base data model module.
//!
//! # Purpose
//! Re-exports the entity records, their writable field sets, and the junction
//! link descriptors shared by the API and store layers.
//!
//! # Notes
//! Every entity is keyed by the warehouse-generated surrogate `DBKEY`. Writable
//! field sets (`*Fields`) carry everything except the key so inserts and
//! full-row updates share one validated shape.
mod cluster;
mod floorplan;
mod link;
mod performance;
mod planogram;
mod position;
mod product;
mod store;

pub use cluster::{Cluster, ClusterFields};
pub use floorplan::{FloorPlan, FloorPlanFields};
pub use link::{Link, LinkKind};
pub use performance::{Performance, PerformanceFields};
pub use planogram::{Planogram, PlanogramFields, PlanogramListItem};
pub use position::{Position, PositionFields};
pub use product::{Product, ProductFields};
pub use store::{Store, StoreFields};

/// Default `DBSTATUS` applied when a create request omits it.
pub const DEFAULT_DB_STATUS: i64 = 1;
