//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every route answers
//! failures with the same `{success: false, code, message}` envelope.
//!
//! # Key invariants and assumptions
//! - `success` is always `false` on error bodies.
//! - Status codes align with the error category: 400 validation, 401 missing
//!   session, 404 not found, 409 duplicate link, 413 oversize upload, 500
//!   internal.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages;
//!   raw warehouse error text never reaches the client.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use kbadmin::api::error::ApiError;
/// use kbadmin::api::types::ErrorResponse;
///
/// let err = ApiError {
///     status: StatusCode::NOT_FOUND,
///     body: ErrorResponse::new("not_found", "Store not found"),
/// };
/// assert!(!err.body.success);
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse::new(code, message),
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error with a caller-provided code.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, code, message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// Logs the store error and returns `message`, which must not carry any
/// detail from `err`.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "knowledge base storage error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build the 401 returned when the warehouse refuses login credentials.
pub fn api_login_failed() -> ApiError {
    api_error(
        StatusCode::UNAUTHORIZED,
        "login_failed",
        "Login failed. Please check your credentials.",
    )
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 413 Payload Too Large error for oversize uploads.
pub fn api_payload_too_large(message: &str) -> ApiError {
    api_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", message)
}

/// Map a store error for a single-entity operation.
///
/// `NotFound` becomes 404 with `not_found`, everything else is logged and
/// becomes a generic 500 carrying `internal`.
pub(crate) fn store_error(err: StoreError, not_found: &str, internal: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found(not_found),
        err => api_internal(internal, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let not_found = api_not_found("missing");
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.body.code, "not_found");
        assert!(!not_found.body.success);

        let conflict = api_conflict("already_linked", "conflict");
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.body.code, "already_linked");

        let unauthorized = api_unauthorized("Missing credentials");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.body.message, "Missing credentials");

        let login = api_login_failed();
        assert_eq!(login.status, StatusCode::UNAUTHORIZED);
        assert_eq!(login.body.code, "login_failed");

        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");

        let too_large = api_payload_too_large("big");
        assert_eq!(too_large.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn internal_errors_hide_store_detail() {
        let err = StoreError::Unexpected(anyhow::anyhow!("relation \"stores\" does not exist"));
        let api = api_internal("Failed to load stores", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.code, "internal");
        assert_eq!(api.body.message, "Failed to load stores");
    }

    #[test]
    fn store_error_maps_not_found_to_404() {
        let api = store_error(
            StoreError::NotFound("store".into()),
            "Store not found",
            "Failed to load store",
        );
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.body.message, "Store not found");

        let api = store_error(
            StoreError::Unavailable("pool timed out".into()),
            "Store not found",
            "Failed to load store",
        );
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
