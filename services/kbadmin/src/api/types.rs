//! Request and response bodies for the admin API.
//!
//! # Notes
//! - Every response carries `success`; entity payloads sit under the entity's
//!   name (`store`, `stores`, ...).
//! - Request fields are all optional at the serde layer. Handlers run an
//!   all-or-nothing presence check so a missing field yields the endpoint's
//!   400 message instead of a serde error.
use crate::api::de;
use crate::model::{
    Cluster, FloorPlan, Performance, Planogram, PlanogramListItem, Position, Product, Store,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Bare acknowledgement for writes that have no record to return.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
}

// -----------------------------
// Entity envelopes
// -----------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StoreListResponse {
    pub success: bool,
    pub stores: Vec<Store>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StoreResponse {
    pub success: bool,
    pub store: Store,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PlanogramListResponse {
    pub success: bool,
    pub planograms: Vec<PlanogramListItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PlanogramResponse {
    pub success: bool,
    pub planogram: Planogram,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramCreatedResponse {
    pub success: bool,
    pub planogram: Planogram,
    pub pdf_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanListResponse {
    pub success: bool,
    pub floor_plans: Vec<FloorPlan>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanResponse {
    pub success: bool,
    pub floor_plan: FloorPlan,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PositionListResponse {
    pub success: bool,
    pub positions: Vec<Position>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PositionResponse {
    pub success: bool,
    pub position: Position,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ClusterListResponse {
    pub success: bool,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ClusterResponse {
    pub success: bool,
    pub cluster: Cluster,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PerformanceListResponse {
    pub success: bool,
    pub performance: Vec<Performance>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PerformanceResponse {
    pub success: bool,
    pub performance: Performance,
}

// -----------------------------
// Junction listings
// -----------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStoresResponse {
    pub success: bool,
    pub cluster_id: i64,
    pub stores: Vec<Store>,
    pub all_stores: Vec<Store>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoreFloorPlansResponse {
    pub success: bool,
    pub store_id: i64,
    pub floor_plans: Vec<FloorPlan>,
    pub all_floor_plans: Vec<FloorPlan>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanPlanogramsResponse {
    pub success: bool,
    pub floorplan_id: i64,
    pub planograms: Vec<Planogram>,
    pub all_planograms: Vec<PlanogramListItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramProductsResponse {
    pub success: bool,
    pub planogram_id: i64,
    pub products: Vec<Product>,
    pub all_products: Vec<Product>,
}

// -----------------------------
// Entity requests
// -----------------------------

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub store_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub store_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_status: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub upc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub dimensions: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub price: Option<f64>,
    // Older screens post `dbstatus`.
    #[serde(default, alias = "dbstatus", deserialize_with = "de::opt_i64")]
    pub db_status: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramRequest {
    // The edit screen posts `dbKey`, the delete button `planogramId`.
    #[serde(default, alias = "dbKey", deserialize_with = "de::opt_i64")]
    pub planogram_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub planogram_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_status: Option<i64>,
}

/// Multipart form accepted by the planogram upload route (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramUploadForm {
    pub planogram_name: String,
    /// Defaults to 1.
    pub db_status: Option<i64>,
    #[schema(value_type = String, format = Binary)]
    pub pdf_file: Vec<u8>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub floor_plan_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub floor_plan_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_status: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub position_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_product_parent_key: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_planogram_parent_key: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub db_fixture_parent_key: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub h_facing: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub v_facing: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub d_facing: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub cluster_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cluster_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub performance_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub position_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub sales_volume: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub sales_revenue: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub stock_level: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub restock_frequency: Option<i64>,
    /// `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub date: Option<String>,
}

// -----------------------------
// Junction requests
// -----------------------------

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStoreRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub cluster_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub store_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoreFloorPlanRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub store_id: Option<i64>,
    #[serde(default, alias = "floorPlanId", deserialize_with = "de::opt_i64")]
    pub floorplan_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanPlanogramRequest {
    #[serde(default, alias = "floorPlanId", deserialize_with = "de::opt_i64")]
    pub floorplan_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub planogram_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanogramProductRequest {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub planogram_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub product_id: Option<i64>,
}
