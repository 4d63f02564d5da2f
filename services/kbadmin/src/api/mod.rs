//! Admin HTTP API module.
//!
//! # Purpose
//! Exposes one handler module per entity screen plus the junction and system
//! routes, and the small parsing helpers they share.
pub mod clusters;
pub(crate) mod de;
pub mod error;
pub mod floorplans;
pub mod links;
pub mod openapi;
pub mod performance;
pub mod planograms;
pub mod positions;
pub mod products;
pub mod stores;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_validation_error};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use std::collections::HashMap;

pub(crate) const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// Unwrap a JSON body, turning any extractor rejection into a 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejecting malformed request body");
        api_validation_error("Invalid request body")
    })?;
    Ok(body)
}

/// Read a required integer id from the query string.
pub(crate) fn query_id(
    params: &HashMap<String, String>,
    name: &str,
    required_message: &str,
) -> Result<i64, ApiError> {
    let raw = params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| api_validation_error(required_message))?;
    raw.parse::<i64>()
        .map_err(|_| api_validation_error(&format!("{name} must be an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn query_id_requires_an_integer() {
        let mut params = HashMap::new();
        let err = query_id(&params, "storeId", "Store ID is required").expect_err("missing");
        assert_eq!(err.body.message, "Store ID is required");

        params.insert("storeId".to_string(), "abc".to_string());
        let err = query_id(&params, "storeId", "Store ID is required").expect_err("bad");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        params.insert("storeId".to_string(), " 12 ".to_string());
        assert_eq!(query_id(&params, "storeId", "Store ID is required").expect("id"), 12);
    }
}
