//! Planogram API handlers and the PDF passthrough.
//!
//! # Purpose
//! Implements planogram CRUD and streams stored PDF documents back verbatim.
//!
//! # Key invariants
//! - A planogram created with a PDF gets that PDF bound to its own generated
//!   key; the store does both inserts in one transaction.
//! - Upload bodies are capped by the router's body limit; exceeding it is a
//!   413, never a truncated document.
use crate::api::error::{
    ApiError, api_internal, api_payload_too_large, api_validation_error, store_error,
};
use crate::api::types::{
    AckResponse, PlanogramCreatedResponse, PlanogramListResponse, PlanogramRequest,
    PlanogramResponse, PlanogramUploadForm,
};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::{DEFAULT_DB_STATUS, PlanogramFields};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

const ID_REQUIRED: &str = "Planogram ID is required";
const NOT_FOUND: &str = "Planogram record not found";
const PDF_NOT_FOUND: &str = "PDF not found";
const CREATE_REQUIRED: &str = "Planogram name and PDF file are required";

impl PlanogramRequest {
    fn into_fields(self) -> Result<PlanogramFields, ApiError> {
        let (Some(planogram_name), Some(db_status)) = (self.planogram_name, self.db_status) else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        Ok(PlanogramFields {
            planogram_name,
            db_status,
        })
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return api_payload_too_large("PDF file exceeds the upload limit");
    }
    tracing::debug!(error = %err, "rejecting malformed multipart body");
    api_validation_error("Invalid multipart body")
}

fn pdf_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"planogram.pdf\""),
        ],
        bytes,
    )
        .into_response()
}

fn path_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| api_validation_error(message))
}

#[utoipa::path(
    get,
    path = "/dsplanogram",
    tag = "planograms",
    responses(
        (status = 200, description = "List planograms with their PDF keys", body = PlanogramListResponse)
    )
)]
pub(crate) async fn list_planograms(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PlanogramListResponse>, ApiError> {
    let planograms = state
        .store
        .list_planograms()
        .await
        .map_err(|err| api_internal("Failed to load planograms", &err))?;
    Ok(Json(PlanogramListResponse {
        success: true,
        planograms,
    }))
}

#[utoipa::path(
    get,
    path = "/get_planogram",
    tag = "planograms",
    params(
        ("planogramId" = i64, Query, description = "Planogram key")
    ),
    responses(
        (status = 200, description = "Planogram record", body = PlanogramResponse),
        (status = 400, description = "Planogram ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Planogram not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PlanogramResponse>, ApiError> {
    let planogram_id = query_id(&params, "planogramId", ID_REQUIRED)?;
    let planogram = state
        .store
        .get_planogram(planogram_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load planogram"))?;
    Ok(Json(PlanogramResponse {
        success: true,
        planogram,
    }))
}

#[utoipa::path(
    post,
    path = "/dsplanogram/add",
    tag = "planograms",
    request_body(content = PlanogramUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Planogram and PDF stored", body = PlanogramCreatedResponse),
        (status = 400, description = "Name or PDF missing", body = crate::api::types::ErrorResponse),
        (status = 413, description = "PDF exceeds the upload limit", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<PlanogramCreatedResponse>), ApiError> {
    let mut multipart = multipart.map_err(|_| api_validation_error(CREATE_REQUIRED))?;
    let mut planogram_name = None;
    let mut db_status = None;
    let mut pdf = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("planogramName") => {
                planogram_name = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("dbStatus") => {
                db_status = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("pdfFile") => {
                pdf = Some(field.bytes().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let planogram_name = planogram_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let pdf = pdf.filter(|bytes| !bytes.is_empty());
    let (Some(planogram_name), Some(pdf)) = (planogram_name, pdf) else {
        return Err(api_validation_error(CREATE_REQUIRED));
    };
    let db_status = match db_status.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_DB_STATUS,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| api_validation_error("dbStatus must be an integer"))?,
    };

    let created = state
        .store
        .create_planogram(
            PlanogramFields {
                planogram_name,
                db_status,
            },
            Some(pdf.to_vec()),
        )
        .await
        .map_err(|err| api_internal("Failed to create planogram", &err))?;
    tracing::info!(
        planogram_id = created.planogram.db_key,
        pdf_bytes = pdf.len(),
        "planogram created"
    );
    Ok((
        StatusCode::CREATED,
        Json(PlanogramCreatedResponse {
            success: true,
            planogram: created.planogram,
            pdf_id: created.pdf_id,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dsplanogram/update_planogram",
    tag = "planograms",
    request_body = PlanogramRequest,
    responses(
        (status = 200, description = "Planogram updated", body = PlanogramResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Planogram not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PlanogramRequest>, JsonRejection>,
) -> Result<Json<PlanogramResponse>, ApiError> {
    let request = json_body(payload)?;
    let planogram_id = request
        .planogram_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let planogram = state
        .store
        .update_planogram(planogram_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update planogram"))?;
    Ok(Json(PlanogramResponse {
        success: true,
        planogram,
    }))
}

#[utoipa::path(
    post,
    path = "/dsplanogram/delete_planogram",
    tag = "planograms",
    request_body = PlanogramRequest,
    responses(
        (status = 200, description = "Planogram and its PDF deleted", body = AckResponse),
        (status = 400, description = "Planogram ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Planogram not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PlanogramRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let planogram_id = json_body(payload)?
        .planogram_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_planogram(planogram_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete planogram"))?;
    Ok(Json(AckResponse::with_message("Planogram deleted")))
}

#[utoipa::path(
    get,
    path = "/dsplanogram/view_pdf/{pdf_id}",
    tag = "planograms",
    params(
        ("pdf_id" = i64, Path, description = "PDF key")
    ),
    responses(
        (status = 200, description = "PDF bytes (`application/pdf`)"),
        (status = 404, description = "PDF not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn view_pdf(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Response, ApiError> {
    let pdf_id = path_id(&pdf_id, "PDF ID must be an integer")?;
    let bytes = state
        .store
        .get_planogram_pdf(pdf_id)
        .await
        .map_err(|err| store_error(err, PDF_NOT_FOUND, "Failed to load PDF"))?;
    Ok(pdf_response(bytes))
}

#[utoipa::path(
    get,
    path = "/dsplanogram/pdf_for/{planogram_id}",
    tag = "planograms",
    params(
        ("planogram_id" = i64, Path, description = "Planogram key")
    ),
    responses(
        (status = 200, description = "PDF bytes bound to the planogram (`application/pdf`)"),
        (status = 404, description = "No PDF for this planogram", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn pdf_for_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(planogram_id): Path<String>,
) -> Result<Response, ApiError> {
    let planogram_id = path_id(&planogram_id, "Planogram ID must be an integer")?;
    let bytes = state
        .store
        .get_pdf_for_planogram(planogram_id)
        .await
        .map_err(|err| store_error(err, PDF_NOT_FOUND, "Failed to load PDF"))?;
    Ok(pdf_response(bytes))
}
