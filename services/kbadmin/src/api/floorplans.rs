//! Floor plan API handlers.
use crate::api::error::{ApiError, api_internal, api_validation_error, store_error};
use crate::api::types::{AckResponse, FloorPlanListResponse, FloorPlanRequest, FloorPlanResponse};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::FloorPlanFields;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const ID_REQUIRED: &str = "Floor plan ID is required";
const NOT_FOUND: &str = "Floor plan not found";

impl FloorPlanRequest {
    fn into_fields(self) -> Result<FloorPlanFields, ApiError> {
        let (Some(floor_plan_name), Some(db_status)) = (self.floor_plan_name, self.db_status)
        else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        Ok(FloorPlanFields {
            floor_plan_name,
            db_status,
        })
    }
}

#[utoipa::path(
    get,
    path = "/dsfloorplan",
    tag = "floorplans",
    responses(
        (status = 200, description = "List floor plans", body = FloorPlanListResponse)
    )
)]
pub(crate) async fn list_floor_plans(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<FloorPlanListResponse>, ApiError> {
    let floor_plans = state
        .store
        .list_floor_plans()
        .await
        .map_err(|err| api_internal("Failed to load floor plans", &err))?;
    Ok(Json(FloorPlanListResponse {
        success: true,
        floor_plans,
    }))
}

#[utoipa::path(
    get,
    path = "/get_floor_plan",
    tag = "floorplans",
    params(
        ("floorPlanId" = i64, Query, description = "Floor plan key")
    ),
    responses(
        (status = 200, description = "Floor plan record", body = FloorPlanResponse),
        (status = 400, description = "Floor plan ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Floor plan not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FloorPlanResponse>, ApiError> {
    let floor_plan_id = query_id(&params, "floorPlanId", ID_REQUIRED)?;
    let floor_plan = state
        .store
        .get_floor_plan(floor_plan_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load floor plan"))?;
    Ok(Json(FloorPlanResponse {
        success: true,
        floor_plan,
    }))
}

#[utoipa::path(
    post,
    path = "/dsfloorplan/add",
    tag = "floorplans",
    request_body = FloorPlanRequest,
    responses(
        (status = 201, description = "Floor plan created", body = FloorPlanResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FloorPlanResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let floor_plan = state
        .store
        .create_floor_plan(fields)
        .await
        .map_err(|err| api_internal("Failed to create floor plan", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(FloorPlanResponse {
            success: true,
            floor_plan,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dsfloorplan/update_floor_plan",
    tag = "floorplans",
    request_body = FloorPlanRequest,
    responses(
        (status = 200, description = "Floor plan updated", body = FloorPlanResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Floor plan not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanRequest>, JsonRejection>,
) -> Result<Json<FloorPlanResponse>, ApiError> {
    let request = json_body(payload)?;
    let floor_plan_id = request
        .floor_plan_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let floor_plan = state
        .store
        .update_floor_plan(floor_plan_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update floor plan"))?;
    Ok(Json(FloorPlanResponse {
        success: true,
        floor_plan,
    }))
}

#[utoipa::path(
    post,
    path = "/dsfloorplan/delete_floor_plan",
    tag = "floorplans",
    request_body = FloorPlanRequest,
    responses(
        (status = 200, description = "Floor plan deleted", body = AckResponse),
        (status = 400, description = "Floor plan ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Floor plan not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let floor_plan_id = json_body(payload)?
        .floor_plan_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_floor_plan(floor_plan_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete floor plan"))?;
    Ok(Json(AckResponse::with_message("Floor plan deleted")))
}
