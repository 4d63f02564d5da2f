//! Cluster API handlers.
use crate::api::error::{ApiError, api_internal, api_validation_error, store_error};
use crate::api::types::{AckResponse, ClusterListResponse, ClusterRequest, ClusterResponse};
use crate::api::{ALL_FIELDS_REQUIRED, json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::ClusterFields;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const ID_REQUIRED: &str = "Cluster ID is required";
const NOT_FOUND: &str = "Cluster not found";

impl ClusterRequest {
    fn into_fields(self) -> Result<ClusterFields, ApiError> {
        let cluster_name = self
            .cluster_name
            .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
        Ok(ClusterFields { cluster_name })
    }
}

#[utoipa::path(
    get,
    path = "/dscluster",
    tag = "clusters",
    responses(
        (status = 200, description = "List clusters", body = ClusterListResponse)
    )
)]
pub(crate) async fn list_clusters(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ClusterListResponse>, ApiError> {
    let clusters = state
        .store
        .list_clusters()
        .await
        .map_err(|err| api_internal("Failed to load clusters", &err))?;
    Ok(Json(ClusterListResponse {
        success: true,
        clusters,
    }))
}

#[utoipa::path(
    get,
    path = "/get_cluster",
    tag = "clusters",
    params(
        ("clusterId" = i64, Query, description = "Cluster key")
    ),
    responses(
        (status = 200, description = "Cluster record", body = ClusterResponse),
        (status = 400, description = "Cluster ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Cluster not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_cluster(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ClusterResponse>, ApiError> {
    let cluster_id = query_id(&params, "clusterId", ID_REQUIRED)?;
    let cluster = state
        .store
        .get_cluster(cluster_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load cluster"))?;
    Ok(Json(ClusterResponse {
        success: true,
        cluster,
    }))
}

#[utoipa::path(
    post,
    path = "/dscluster/add",
    tag = "clusters",
    request_body = ClusterRequest,
    responses(
        (status = 201, description = "Cluster created", body = ClusterResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_cluster(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ClusterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClusterResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let cluster = state
        .store
        .create_cluster(fields)
        .await
        .map_err(|err| api_internal("Failed to create cluster", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(ClusterResponse {
            success: true,
            cluster,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/dscluster/update_cluster",
    tag = "clusters",
    request_body = ClusterRequest,
    responses(
        (status = 200, description = "Cluster updated", body = ClusterResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Cluster not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_cluster(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ClusterRequest>, JsonRejection>,
) -> Result<Json<ClusterResponse>, ApiError> {
    let request = json_body(payload)?;
    let cluster_id = request
        .cluster_id
        .ok_or_else(|| api_validation_error(ALL_FIELDS_REQUIRED))?;
    let fields = request.into_fields()?;
    let cluster = state
        .store
        .update_cluster(cluster_id, fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update cluster"))?;
    Ok(Json(ClusterResponse {
        success: true,
        cluster,
    }))
}

#[utoipa::path(
    post,
    path = "/dscluster/delete_cluster",
    tag = "clusters",
    request_body = ClusterRequest,
    responses(
        (status = 200, description = "Cluster deleted", body = AckResponse),
        (status = 400, description = "Cluster ID missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Cluster not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_cluster(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ClusterRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let cluster_id = json_body(payload)?
        .cluster_id
        .ok_or_else(|| api_validation_error(ID_REQUIRED))?;
    state
        .store
        .delete_cluster(cluster_id)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete cluster"))?;
    Ok(Json(AckResponse::with_message("Cluster deleted")))
}
