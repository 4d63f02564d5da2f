//! Position API handlers.
//!
//! Positions place a product on a planogram fixture with horizontal,
//! vertical, and depth facings. Zero is a valid key or facing value; only an
//! absent field fails the presence check.
use crate::api::error::{ApiError, api_internal, api_validation_error, store_error};
use crate::api::types::{AckResponse, PositionListResponse, PositionRequest, PositionResponse};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::PositionFields;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const ID_REQUIRED: &str = "Position ID is required";
const NOT_FOUND: &str = "Position not found";

impl PositionRequest {
    fn into_fields(self) -> Result<PositionFields, ApiError> {
        let (
            Some(db_product_parent_key),
            Some(db_planogram_parent_key),
            Some(db_fixture_parent_key),
            Some(h_facing),
            Some(v_facing),
            Some(d_facing),
        ) = (
            self.db_product_parent_key,
            self.db_planogram_parent_key,
            self.db_fixture_parent_key,
            self.h_facing,
            self.v_facing,
            self.d_facing,
        )
        else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        Ok(PositionFields {
            db_product_parent_key,
            db_planogram_parent_key,
            db_fixture_parent_key,
            h_facing,
            v_facing,
            d_facing,
        })
    }
}

#[utoipa::path(
    get,
    path = "/dsposition",
    tag = "positions",
    responses(
        (status = 200, description = "List positions", body = PositionListResponse)
    )
)]
pub(crate) async fn list_positions(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PositionListResponse>, ApiError> {
    let positions = state
        .store
        .list_positions()
        .await
        .map_err(|err| api_internal("Failed to load positions", &err))?;
    Ok(Json(PositionListResponse {
        success: true,
        positions,
    }))
}

#[utoipa::path(
    get,
    path = "/get_position",
    tag = "positions",
    params(
        ("positionId" = i64, Query, description = "Position key")
    ),
    responses(
        (status = 200, description = "Position record", body = PositionResponse),
        (status = 400, description = "Position ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Position not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_position(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PositionResponse>, ApiError> {
    let position_id = query_id(&params, "positionId", ID_REQUIRED)?;
    let position = state
        .store
        .get_position(position_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load position"))?;
    Ok(Json(PositionResponse {
        success: true,
        position,
    }))
}

#[utoipa::path(
    post,
    path = "/dsposition/add",
    tag = "positions",
    request_body = PositionRequest,
    responses(
        (status = 201, description = "Position created", body = PositionResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_position(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PositionResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let position = state
        .store
        .create_position(fields)
        .await
        .map_err(|err| api_internal("Failed to create position", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(PositionResponse {
            success: true,
            position,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dsposition/update_position",
    tag = "positions",
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position updated", body = PositionResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Position not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_position(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> Result<Json<PositionResponse>, ApiError> {
    let request = json_body(payload)?;
    let position_id = request
        .position_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let position = state
        .store
        .update_position(position_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update position"))?;
    Ok(Json(PositionResponse {
        success: true,
        position,
    }))
}

#[utoipa::path(
    post,
    path = "/dsposition/delete_position",
    tag = "positions",
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position deleted", body = AckResponse),
        (status = 400, description = "Position ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Position not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_position(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let position_id = json_body(payload)?
        .position_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_position(position_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete position"))?;
    Ok(Json(AckResponse::with_message("Position deleted")))
}
