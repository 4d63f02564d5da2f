//! Product records. Products carry both the surrogate key (used by planogram
//! links) and a unique UPC (used by the product screens).
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub db_key: i64,
    pub upc: String,
    pub product_name: String,
    pub category: String,
    pub subcategory: String,
    pub dimensions: String,
    pub weight: f64,
    pub price: Option<f64>,
    pub db_status: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub upc: String,
    pub product_name: String,
    pub category: String,
    pub subcategory: String,
    pub dimensions: String,
    pub weight: f64,
    pub price: Option<f64>,
    pub db_status: i64,
}

impl Product {
    pub fn from_fields(db_key: i64, fields: ProductFields) -> Self {
        Self {
            db_key,
            upc: fields.upc,
            product_name: fields.product_name,
            category: fields.category,
            subcategory: fields.subcategory,
            dimensions: fields.dimensions,
            weight: fields.weight,
            price: fields.price,
            db_status: fields.db_status,
        }
    }
}
