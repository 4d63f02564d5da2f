//! Floor plan records.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    pub floor_plan_id: i64,
    pub floor_plan_name: String,
    pub db_status: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanFields {
    pub floor_plan_name: String,
    pub db_status: i64,
}

impl FloorPlan {
    pub fn from_fields(floor_plan_id: i64, fields: FloorPlanFields) -> Self {
        Self {
            floor_plan_id,
            floor_plan_name: fields.floor_plan_name,
            db_status: fields.db_status,
        }
    }
}
