//! Retail store records.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub store_id: i64,
    pub store_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub db_status: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreFields {
    pub store_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub db_status: i64,
}

impl Store {
    pub fn from_fields(store_id: i64, fields: StoreFields) -> Self {
        Self {
            store_id,
            store_name: fields.store_name,
            address: fields.address,
            city: fields.city,
            state: fields.state,
            db_status: fields.db_status,
        }
    }
}
