//! Performance metric API handlers.
//!
//! Dates travel as `YYYY-MM-DD` strings and are validated before any write.
use crate::api::error::{ApiError, api_internal, api_validation_error, store_error};
use crate::api::types::{
    AckResponse, PerformanceListResponse, PerformanceRequest, PerformanceResponse,
};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::PerformanceFields;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use std::collections::HashMap;

const ID_REQUIRED: &str = "Performance ID is required";
const NOT_FOUND: &str = "Performance record not found";

impl PerformanceRequest {
    fn into_fields(self) -> Result<PerformanceFields, ApiError> {
        let (
            Some(position_id),
            Some(sales_volume),
            Some(sales_revenue),
            Some(stock_level),
            Some(restock_frequency),
            Some(date),
        ) = (
            self.position_id,
            self.sales_volume,
            self.sales_revenue,
            self.stock_level,
            self.restock_frequency,
            self.date,
        )
        else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| api_validation_error("date must be formatted YYYY-MM-DD"))?;
        Ok(PerformanceFields {
            position_id,
            sales_volume,
            sales_revenue,
            stock_level,
            restock_frequency,
            date,
        })
    }
}

#[utoipa::path(
    get,
    path = "/dsperformance",
    tag = "performance",
    responses(
        (status = 200, description = "List performance records", body = PerformanceListResponse)
    )
)]
pub(crate) async fn list_performance(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PerformanceListResponse>, ApiError> {
    let performance = state
        .store
        .list_performance()
        .await
        .map_err(|err| api_internal("Failed to load performance records", &err))?;
    Ok(Json(PerformanceListResponse {
        success: true,
        performance,
    }))
}

#[utoipa::path(
    get,
    path = "/get_performance",
    tag = "performance",
    params(
        ("performanceId" = i64, Query, description = "Performance record key")
    ),
    responses(
        (status = 200, description = "Performance record", body = PerformanceResponse),
        (status = 400, description = "Performance ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Performance record not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_performance(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let performance_id = query_id(&params, "performanceId", ID_REQUIRED)?;
    let performance = state
        .store
        .get_performance(performance_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load performance record"))?;
    Ok(Json(PerformanceResponse {
        success: true,
        performance,
    }))
}

#[utoipa::path(
    post,
    path = "/dsperformance/add",
    tag = "performance",
    request_body = PerformanceRequest,
    responses(
        (status = 201, description = "Performance record created", body = PerformanceResponse),
        (status = 400, description = "Missing fields or bad date", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_performance(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PerformanceResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let performance = state
        .store
        .create_performance(fields)
        .await
        .map_err(|err| api_internal("Failed to create performance record", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(PerformanceResponse {
            success: true,
            performance,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dsperformance/update_performance",
    tag = "performance",
    request_body = PerformanceRequest,
    responses(
        (status = 200, description = "Performance record updated", body = PerformanceResponse),
        (status = 400, description = "Missing fields or bad date", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Performance record not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_performance(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let request = json_body(payload)?;
    let performance_id = request
        .performance_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let performance = state
        .store
        .update_performance(performance_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update performance record"))?;
    Ok(Json(PerformanceResponse {
        success: true,
        performance,
    }))
}

#[utoipa::path(
    post,
    path = "/dsperformance/delete_performance",
    tag = "performance",
    request_body = PerformanceRequest,
    responses(
        (status = 200, description = "Performance record deleted", body = AckResponse),
        (status = 400, description = "Performance ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Performance record not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_performance(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let performance_id = json_body(payload)?
        .performance_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_performance(performance_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete performance record"))?;
    Ok(Json(AckResponse::with_message("Performance record deleted")))
}
