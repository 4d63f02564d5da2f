//! Planogram records and the list projection that carries the bound PDF key.
//!
//! # Notes
//! PDF bytes live in a separate table keyed by planogram id; the bytes are
//! never part of these records and are streamed by dedicated routes.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Planogram {
    pub db_key: i64,
    pub planogram_name: String,
    pub db_status: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramFields {
    pub planogram_name: String,
    pub db_status: i64,
}

/// Row shown on the planogram listing: the planogram plus the key of its PDF,
/// if one was uploaded.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramListItem {
    pub db_key: i64,
    pub planogram_name: String,
    pub db_status: i64,
    pub pdf_id: Option<i64>,
}

impl Planogram {
    pub fn from_fields(db_key: i64, fields: PlanogramFields) -> Self {
        Self {
            db_key,
            planogram_name: fields.planogram_name,
            db_status: fields.db_status,
        }
    }

    pub fn with_pdf(self, pdf_id: Option<i64>) -> PlanogramListItem {
        PlanogramListItem {
            db_key: self.db_key,
            planogram_name: self.planogram_name,
            db_status: self.db_status,
            pdf_id,
        }
    }
}
