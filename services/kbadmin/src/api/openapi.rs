//! OpenAPI document for the admin API.
//!
//! Served at `/openapi.json`; collects every route and body schema.
use crate::api::{
    clusters, floorplans, links, performance, planograms, positions, products, stores, system,
    types::{
        AckResponse, ClusterListResponse, ClusterRequest, ClusterResponse, ClusterStoreRequest,
        ClusterStoresResponse, ErrorResponse, FloorPlanListResponse, FloorPlanPlanogramRequest,
        FloorPlanPlanogramsResponse, FloorPlanRequest, FloorPlanResponse, HealthStatus,
        PerformanceListResponse, PerformanceRequest, PerformanceResponse,
        PlanogramCreatedResponse, PlanogramListResponse, PlanogramProductRequest,
        PlanogramProductsResponse, PlanogramRequest, PlanogramResponse, PlanogramUploadForm,
        PositionListResponse, PositionRequest, PositionResponse, ProductListResponse,
        ProductRequest, ProductResponse, StoreFloorPlanRequest, StoreFloorPlansResponse,
        StoreListResponse, StoreRequest, StoreResponse,
    },
};
use crate::auth::login::{self, LoginForm};
use crate::model::{
    Cluster, FloorPlan, Performance, Planogram, PlanogramListItem, Position, Product, Store,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "kbadmin",
        version = "v1",
        description = "Category knowledge base admin API"
    ),
    paths(
        system::system_health,
        login::login,
        login::logout,
        stores::list_stores,
        stores::get_store,
        stores::add_store,
        stores::update_store,
        stores::delete_store,
        products::list_products,
        products::get_product,
        products::add_product,
        products::update_product,
        products::delete_product,
        planograms::list_planograms,
        planograms::get_planogram,
        planograms::add_planogram,
        planograms::update_planogram,
        planograms::delete_planogram,
        planograms::view_pdf,
        planograms::pdf_for_planogram,
        floorplans::list_floor_plans,
        floorplans::get_floor_plan,
        floorplans::add_floor_plan,
        floorplans::update_floor_plan,
        floorplans::delete_floor_plan,
        positions::list_positions,
        positions::get_position,
        positions::add_position,
        positions::update_position,
        positions::delete_position,
        clusters::list_clusters,
        clusters::get_cluster,
        clusters::add_cluster,
        clusters::update_cluster,
        clusters::delete_cluster,
        performance::list_performance,
        performance::get_performance,
        performance::add_performance,
        performance::update_performance,
        performance::delete_performance,
        links::cluster_stores,
        links::add_cluster_store,
        links::remove_cluster_store,
        links::store_floor_plans,
        links::add_store_floor_plan,
        links::remove_store_floor_plan,
        links::floor_plan_planograms,
        links::add_floor_plan_planogram,
        links::remove_floor_plan_planogram,
        links::planogram_products,
        links::add_planogram_product,
        links::remove_planogram_product
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        AckResponse,
        LoginForm,
        Store,
        StoreRequest,
        StoreResponse,
        StoreListResponse,
        Product,
        ProductRequest,
        ProductResponse,
        ProductListResponse,
        Planogram,
        PlanogramListItem,
        PlanogramRequest,
        PlanogramUploadForm,
        PlanogramResponse,
        PlanogramCreatedResponse,
        PlanogramListResponse,
        FloorPlan,
        FloorPlanRequest,
        FloorPlanResponse,
        FloorPlanListResponse,
        Position,
        PositionRequest,
        PositionResponse,
        PositionListResponse,
        Cluster,
        ClusterRequest,
        ClusterResponse,
        ClusterListResponse,
        Performance,
        PerformanceRequest,
        PerformanceResponse,
        PerformanceListResponse,
        ClusterStoreRequest,
        ClusterStoresResponse,
        StoreFloorPlanRequest,
        StoreFloorPlansResponse,
        FloorPlanPlanogramRequest,
        FloorPlanPlanogramsResponse,
        PlanogramProductRequest,
        PlanogramProductsResponse
    )),
    tags(
        (name = "system", description = "Health check"),
        (name = "auth", description = "Login and logout"),
        (name = "stores", description = "Store records"),
        (name = "products", description = "Product catalogue"),
        (name = "planograms", description = "Planograms and their PDFs"),
        (name = "floorplans", description = "Floor plans"),
        (name = "positions", description = "Product placements on planograms"),
        (name = "clusters", description = "Store clusters"),
        (name = "performance", description = "Sales performance records"),
        (name = "links", description = "Entity associations")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_pdf_and_link_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/dsplanogram/view_pdf/{pdf_id}"));
        assert!(paths.contains_key("/plproduct/remove_product"));
        assert!(paths.contains_key("/system/health"));
        assert!(paths.contains_key("/login"));
    }
}
