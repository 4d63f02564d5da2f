//! HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Session enforcement lives in the `CurrentUser` extractor, so a route is
//! protected by taking it as an argument. `/login`, `/logout`,
//! `/system/health` and `/openapi.json` do not.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::session::SessionStore;
use crate::observability;
use crate::store::KnowledgeBaseStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KnowledgeBaseStore + Send + Sync>,
    pub sessions: SessionStore,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                user = tracing::field::Empty
            );
            span.set_parent(parent);
            span
        });

    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/system/health", get(api::system::system_health))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/login", post(auth::login::login))
        .route("/logout", get(auth::login::logout))
        // stores
        .route("/dsstore", get(api::stores::list_stores))
        .route("/get_store", get(api::stores::get_store))
        .route("/dsstore/add", post(api::stores::add_store))
        .route("/dsstore/update_store", post(api::stores::update_store))
        .route("/dsstore/delete_store", post(api::stores::delete_store))
        // products
        .route("/dsproduct", get(api::products::list_products))
        .route("/get_product", get(api::products::get_product))
        .route("/dsproduct/add", post(api::products::add_product))
        .route(
            "/dsproduct/update_product",
            post(api::products::update_product),
        )
        .route(
            "/dsproduct/delete_product",
            post(api::products::delete_product).delete(api::products::delete_product),
        )
        // planograms
        .route("/dsplanogram", get(api::planograms::list_planograms))
        .route("/get_planogram", get(api::planograms::get_planogram))
        .route(
            "/dsplanogram/add",
            post(api::planograms::add_planogram).layer(upload_limit),
        )
        .route(
            "/dsplanogram/update_planogram",
            post(api::planograms::update_planogram),
        )
        .route(
            "/dsplanogram/delete_planogram",
            post(api::planograms::delete_planogram),
        )
        .route(
            "/dsplanogram/view_pdf/:pdf_id",
            get(api::planograms::view_pdf),
        )
        .route(
            "/dsplanogram/pdf_for/:planogram_id",
            get(api::planograms::pdf_for_planogram),
        )
        // floor plans
        .route("/dsfloorplan", get(api::floorplans::list_floor_plans))
        .route("/get_floor_plan", get(api::floorplans::get_floor_plan))
        .route("/dsfloorplan/add", post(api::floorplans::add_floor_plan))
        .route(
            "/dsfloorplan/update_floor_plan",
            post(api::floorplans::update_floor_plan),
        )
        .route(
            "/dsfloorplan/delete_floor_plan",
            post(api::floorplans::delete_floor_plan),
        )
        // positions
        .route("/dsposition", get(api::positions::list_positions))
        .route("/get_position", get(api::positions::get_position))
        .route("/dsposition/add", post(api::positions::add_position))
        .route(
            "/dsposition/update_position",
            post(api::positions::update_position),
        )
        .route(
            "/dsposition/delete_position",
            post(api::positions::delete_position),
        )
        // clusters
        .route("/dscluster", get(api::clusters::list_clusters))
        .route("/get_cluster", get(api::clusters::get_cluster))
        .route("/dscluster/add", post(api::clusters::add_cluster))
        .route(
            "/dscluster/update_cluster",
            post(api::clusters::update_cluster),
        )
        .route(
            "/dscluster/delete_cluster",
            post(api::clusters::delete_cluster),
        )
        // performance
        .route("/dsperformance", get(api::performance::list_performance))
        .route("/get_performance", get(api::performance::get_performance))
        .route(
            "/dsperformance/add",
            post(api::performance::add_performance),
        )
        .route(
            "/dsperformance/update_performance",
            post(api::performance::update_performance),
        )
        .route(
            "/dsperformance/delete_performance",
            post(api::performance::delete_performance),
        )
        // associations
        .route("/clstore", get(api::links::cluster_stores))
        .route("/clstore/add_store", post(api::links::add_cluster_store))
        .route(
            "/clstore/remove_store",
            post(api::links::remove_cluster_store),
        )
        .route("/stfloorplan", get(api::links::store_floor_plans))
        .route(
            "/stfloorplan/add_floorplan",
            post(api::links::add_store_floor_plan),
        )
        .route(
            "/stfloorplan/remove_floorplan",
            post(api::links::remove_store_floor_plan),
        )
        .route("/flplanogram", get(api::links::floor_plan_planograms))
        .route(
            "/flplanogram/add_planogram",
            post(api::links::add_floor_plan_planogram),
        )
        .route(
            "/flplanogram/remove_planogram",
            post(api::links::remove_floor_plan_planogram),
        )
        .route("/plproduct", get(api::links::planogram_products))
        .route(
            "/plproduct/add_product",
            post(api::links::add_planogram_product),
        )
        .route(
            "/plproduct/remove_product",
            post(api::links::remove_planogram_product)
                .delete(api::links::remove_planogram_product),
        )
        .layer(trace_layer)
        .with_state(state)
}
