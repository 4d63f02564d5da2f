//! Store API handlers.
//!
//! # Purpose
//! Implements list/get/insert/update/delete for retail stores.
use crate::api::error::{ApiError, api_internal, api_validation_error, store_error};
use crate::api::types::{AckResponse, StoreListResponse, StoreRequest, StoreResponse};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::StoreFields;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const ID_REQUIRED: &str = "Store ID is required";
const NOT_FOUND: &str = "Store not found";

impl StoreRequest {
    fn into_fields(self) -> Result<StoreFields, ApiError> {
        let (Some(store_name), Some(address), Some(city), Some(state), Some(db_status)) = (
            self.store_name,
            self.address,
            self.city,
            self.state,
            self.db_status,
        ) else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        Ok(StoreFields {
            store_name,
            address,
            city,
            state,
            db_status,
        })
    }
}

#[utoipa::path(
    get,
    path = "/dsstore",
    tag = "stores",
    responses(
        (status = 200, description = "List stores", body = StoreListResponse),
        (status = 401, description = "No session", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_stores(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StoreListResponse>, ApiError> {
    let stores = state
        .store
        .list_stores()
        .await
        .map_err(|err| api_internal("Failed to load stores", &err))?;
    Ok(Json(StoreListResponse {
        success: true,
        stores,
    }))
}

#[utoipa::path(
    get,
    path = "/get_store",
    tag = "stores",
    params(
        ("storeId" = i64, Query, description = "Store key")
    ),
    responses(
        (status = 200, description = "Store record", body = StoreResponse),
        (status = 400, description = "Store ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<StoreResponse>, ApiError> {
    let store_id = query_id(&params, "storeId", ID_REQUIRED)?;
    let store = state
        .store
        .get_store(store_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load store"))?;
    Ok(Json(StoreResponse {
        success: true,
        store,
    }))
}

#[utoipa::path(
    post,
    path = "/dsstore/add",
    tag = "stores",
    request_body = StoreRequest,
    responses(
        (status = 201, description = "Store created", body = StoreResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let store = state
        .store
        .create_store(fields)
        .await
        .map_err(|err| api_internal("Failed to create store", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(StoreResponse {
            success: true,
            store,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dsstore/update_store",
    tag = "stores",
    request_body = StoreRequest,
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
    let request = json_body(payload)?;
    let store_id = request
        .store_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let store = state
        .store
        .update_store(store_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update store"))?;
    Ok(Json(StoreResponse {
        success: true,
        store,
    }))
}

#[utoipa::path(
    post,
    path = "/dsstore/delete_store",
    tag = "stores",
    request_body = StoreRequest,
    responses(
        (status = 200, description = "Store deleted", body = AckResponse),
        (status = 400, description = "Store ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let store_id = json_body(payload)?
        .store_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_store(store_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete store"))?;
    Ok(Json(AckResponse::with_message("Store deleted")))
}
