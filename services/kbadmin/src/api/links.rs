//! Junction API handlers.
//!
//! # Purpose
//! Links and unlinks entity pairs (cluster-store, store-floor plan, floor
//! plan-planogram, planogram-product) and lists a parent's linked children
//! alongside every candidate child for selection screens.
//!
//! # Key invariants
//! - Linking an existing pair is a 409 `already_linked`; exactly one row
//!   remains.
//! - Unlinking removes every row for the exact pair; removing nothing is a
//!   404.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_error,
};
use crate::api::types::{
    AckResponse, ClusterStoreRequest, ClusterStoresResponse, FloorPlanPlanogramRequest,
    FloorPlanPlanogramsResponse, PlanogramProductRequest, PlanogramProductsResponse,
    StoreFloorPlanRequest, StoreFloorPlansResponse,
};
use crate::api::{json_body, query_id};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::{Link, LinkKind};
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const CLUSTER_STORE_REQUIRED: &str = "Cluster ID and Store ID are required";
const STORE_FLOORPLAN_REQUIRED: &str = "Store ID and Floorplan ID are required";
const FLOORPLAN_PLANOGRAM_REQUIRED: &str = "Floorplan ID and Planogram ID are required";
const PLANOGRAM_PRODUCT_REQUIRED: &str = "Planogram ID and Product ID are required";

async fn link_pair(
    state: &AppState,
    kind: LinkKind,
    ids: (Option<i64>, Option<i64>),
    required: &str,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let (Some(parent_id), Some(child_id)) = ids else {
        return Err(api_validation_error(required));
    };
    let (parent, child) = kind.nouns();
    match state.store.link(Link::new(kind, parent_id, child_id)).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(AckResponse::ok()))),
        Err(StoreError::Conflict(_)) => Err(api_conflict(
            "already_linked",
            &format!("The {child} is already linked to this {parent}"),
        )),
        Err(err) => Err(api_internal(&format!("Failed to link {child}"), &err)),
    }
}

async fn unlink_pair(
    state: &AppState,
    kind: LinkKind,
    ids: (Option<i64>, Option<i64>),
    required: &str,
) -> Result<Json<AckResponse>, ApiError> {
    let (Some(parent_id), Some(child_id)) = ids else {
        return Err(api_validation_error(required));
    };
    let (parent, child) = kind.nouns();
    match state.store.unlink(Link::new(kind, parent_id, child_id)).await {
        Ok(()) => Ok(Json(AckResponse::ok())),
        Err(StoreError::NotFound(_)) => Err(api_not_found(&format!(
            "The {child} is not linked to this {parent}"
        ))),
        Err(err) => Err(api_internal(&format!("Failed to unlink {child}"), &err)),
    }
}

// -----------------------------
// Cluster <-> store
// -----------------------------

#[utoipa::path(
    get,
    path = "/clstore",
    tag = "links",
    params(
        ("clusterId" = i64, Query, description = "Cluster key")
    ),
    responses(
        (status = 200, description = "Stores in the cluster and all stores", body = ClusterStoresResponse),
        (status = 400, description = "Cluster ID missing", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn cluster_stores(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ClusterStoresResponse>, ApiError> {
    let cluster_id = query_id(&params, "clusterId", "Cluster ID is required")?;
    let (stores, all_stores) = tokio::try_join!(
        state.store.list_cluster_stores(cluster_id),
        state.store.list_stores()
    )
    .map_err(|err| api_internal("Failed to load cluster stores", &err))?;
    Ok(Json(ClusterStoresResponse {
        success: true,
        cluster_id,
        stores,
        all_stores,
    }))
}

#[utoipa::path(
    post,
    path = "/clstore/add_store",
    tag = "links",
    request_body = ClusterStoreRequest,
    responses(
        (status = 201, description = "Store linked to cluster", body = AckResponse),
        (status = 409, description = "Already linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_cluster_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ClusterStoreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let request = json_body(payload)?;
    link_pair(
        &state,
        LinkKind::ClusterStore,
        (request.cluster_id, request.store_id),
        CLUSTER_STORE_REQUIRED,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/clstore/remove_store",
    tag = "links",
    request_body = ClusterStoreRequest,
    responses(
        (status = 200, description = "Store unlinked from cluster", body = AckResponse),
        (status = 404, description = "Pair not linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_cluster_store(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ClusterStoreRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let request = json_body(payload)?;
    unlink_pair(
        &state,
        LinkKind::ClusterStore,
        (request.cluster_id, request.store_id),
        CLUSTER_STORE_REQUIRED,
    )
    .await
}

// -----------------------------
// Store <-> floor plan
// -----------------------------

#[utoipa::path(
    get,
    path = "/stfloorplan",
    tag = "links",
    params(
        ("storeId" = i64, Query, description = "Store key")
    ),
    responses(
        (status = 200, description = "Floor plans of the store and all floor plans", body = StoreFloorPlansResponse),
        (status = 400, description = "Store ID missing", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn store_floor_plans(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<StoreFloorPlansResponse>, ApiError> {
    let store_id = query_id(&params, "storeId", "Store ID is required")?;
    let (floor_plans, all_floor_plans) = tokio::try_join!(
        state.store.list_store_floor_plans(store_id),
        state.store.list_floor_plans()
    )
    .map_err(|err| api_internal("Failed to load store floor plans", &err))?;
    Ok(Json(StoreFloorPlansResponse {
        success: true,
        store_id,
        floor_plans,
        all_floor_plans,
    }))
}

#[utoipa::path(
    post,
    path = "/stfloorplan/add_floorplan",
    tag = "links",
    request_body = StoreFloorPlanRequest,
    responses(
        (status = 201, description = "Floor plan linked to store", body = AckResponse),
        (status = 409, description = "Already linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_store_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<StoreFloorPlanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let request = json_body(payload)?;
    link_pair(
        &state,
        LinkKind::StoreFloorPlan,
        (request.store_id, request.floorplan_id),
        STORE_FLOORPLAN_REQUIRED,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/stfloorplan/remove_floorplan",
    tag = "links",
    request_body = StoreFloorPlanRequest,
    responses(
        (status = 200, description = "Floor plan unlinked from store", body = AckResponse),
        (status = 404, description = "Pair not linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_store_floor_plan(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<StoreFloorPlanRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let request = json_body(payload)?;
    unlink_pair(
        &state,
        LinkKind::StoreFloorPlan,
        (request.store_id, request.floorplan_id),
        STORE_FLOORPLAN_REQUIRED,
    )
    .await
}

// -----------------------------
// Floor plan <-> planogram
// -----------------------------

#[utoipa::path(
    get,
    path = "/flplanogram",
    tag = "links",
    params(
        ("floorplanId" = i64, Query, description = "Floor plan key")
    ),
    responses(
        (status = 200, description = "Planograms of the floor plan and all planograms", body = FloorPlanPlanogramsResponse),
        (status = 400, description = "Floorplan ID missing", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn floor_plan_planograms(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FloorPlanPlanogramsResponse>, ApiError> {
    let floorplan_id = query_id(&params, "floorplanId", "Floorplan ID is required")?;
    let (planograms, all_planograms) = tokio::try_join!(
        state.store.list_floor_plan_planograms(floorplan_id),
        state.store.list_planograms()
    )
    .map_err(|err| api_internal("Failed to load floor plan planograms", &err))?;
    Ok(Json(FloorPlanPlanogramsResponse {
        success: true,
        floorplan_id,
        planograms,
        all_planograms,
    }))
}

#[utoipa::path(
    post,
    path = "/flplanogram/add_planogram",
    tag = "links",
    request_body = FloorPlanPlanogramRequest,
    responses(
        (status = 201, description = "Planogram linked to floor plan", body = AckResponse),
        (status = 409, description = "Already linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_floor_plan_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanPlanogramRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let request = json_body(payload)?;
    link_pair(
        &state,
        LinkKind::FloorPlanPlanogram,
        (request.floorplan_id, request.planogram_id),
        FLOORPLAN_PLANOGRAM_REQUIRED,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/flplanogram/remove_planogram",
    tag = "links",
    request_body = FloorPlanPlanogramRequest,
    responses(
        (status = 200, description = "Planogram unlinked from floor plan", body = AckResponse),
        (status = 404, description = "Pair not linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_floor_plan_planogram(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<FloorPlanPlanogramRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let request = json_body(payload)?;
    unlink_pair(
        &state,
        LinkKind::FloorPlanPlanogram,
        (request.floorplan_id, request.planogram_id),
        FLOORPLAN_PLANOGRAM_REQUIRED,
    )
    .await
}

// -----------------------------
// Planogram <-> product
// -----------------------------

#[utoipa::path(
    get,
    path = "/plproduct",
    tag = "links",
    params(
        ("planogramId" = i64, Query, description = "Planogram key")
    ),
    responses(
        (status = 200, description = "Products on the planogram and all products", body = PlanogramProductsResponse),
        (status = 400, description = "Planogram ID missing", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn planogram_products(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PlanogramProductsResponse>, ApiError> {
    let planogram_id = query_id(&params, "planogramId", "Planogram ID is required")?;
    let (products, all_products) = tokio::try_join!(
        state.store.list_planogram_products(planogram_id),
        state.store.list_products()
    )
    .map_err(|err| api_internal("Failed to load planogram products", &err))?;
    Ok(Json(PlanogramProductsResponse {
        success: true,
        planogram_id,
        products,
        all_products,
    }))
}

#[utoipa::path(
    post,
    path = "/plproduct/add_product",
    tag = "links",
    request_body = PlanogramProductRequest,
    responses(
        (status = 201, description = "Product placed on planogram", body = AckResponse),
        (status = 409, description = "Already linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_planogram_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PlanogramProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let request = json_body(payload)?;
    link_pair(
        &state,
        LinkKind::PlanogramProduct,
        (request.planogram_id, request.product_id),
        PLANOGRAM_PRODUCT_REQUIRED,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/plproduct/remove_product",
    tag = "links",
    request_body = PlanogramProductRequest,
    responses(
        (status = 200, description = "Product removed from planogram", body = AckResponse),
        (status = 404, description = "Pair not linked", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_planogram_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<PlanogramProductRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let request = json_body(payload)?;
    unlink_pair(
        &state,
        LinkKind::PlanogramProduct,
        (request.planogram_id, request.product_id),
        PLANOGRAM_PRODUCT_REQUIRED,
    )
    .await
}
