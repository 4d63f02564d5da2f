//! Sales and stock metrics recorded against a position.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub performance_id: i64,
    pub position_id: i64,
    pub sales_volume: i64,
    pub sales_revenue: f64,
    pub stock_level: i64,
    pub restock_frequency: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceFields {
    pub position_id: i64,
    pub sales_volume: i64,
    pub sales_revenue: f64,
    pub stock_level: i64,
    pub restock_frequency: i64,
    pub date: NaiveDate,
}

impl Performance {
    pub fn from_fields(performance_id: i64, fields: PerformanceFields) -> Self {
        Self {
            performance_id,
            position_id: fields.position_id,
            sales_volume: fields.sales_volume,
            sales_revenue: fields.sales_revenue,
            stock_level: fields.stock_level,
            restock_frequency: fields.restock_frequency,
            date: fields.date,
        }
    }
}
