//! Product placements within a planogram fixture.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_id: i64,
    pub db_product_parent_key: i64,
    pub db_planogram_parent_key: i64,
    pub db_fixture_parent_key: i64,
    pub h_facing: i64,
    pub v_facing: i64,
    pub d_facing: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionFields {
    pub db_product_parent_key: i64,
    pub db_planogram_parent_key: i64,
    pub db_fixture_parent_key: i64,
    pub h_facing: i64,
    pub v_facing: i64,
    pub d_facing: i64,
}

impl PositionFields {
    /// Placeholder placement used when a product is linked to a planogram
    /// without fixture or facing details.
    pub fn unplaced(planogram_id: i64, product_id: i64) -> Self {
        Self {
            db_product_parent_key: product_id,
            db_planogram_parent_key: planogram_id,
            db_fixture_parent_key: 0,
            h_facing: 0,
            v_facing: 0,
            d_facing: 0,
        }
    }
}

impl Position {
    pub fn from_fields(position_id: i64, fields: PositionFields) -> Self {
        Self {
            position_id,
            db_product_parent_key: fields.db_product_parent_key,
            db_planogram_parent_key: fields.db_planogram_parent_key,
            db_fixture_parent_key: fields.db_fixture_parent_key,
            h_facing: fields.h_facing,
            v_facing: fields.v_facing,
            d_facing: fields.d_facing,
        }
    }
}
