#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use kbadmin::app::{AppState, build_router};
use kbadmin::auth::session::SessionStore;
use kbadmin::model::{
    Cluster, ClusterFields, FloorPlan, FloorPlanFields, Link, Performance, PerformanceFields,
    Planogram, PlanogramFields, PlanogramListItem, Position, PositionFields, Product,
    ProductFields, Store, StoreFields,
};
use kbadmin::store::memory::InMemoryStore;
use kbadmin::store::{CreatedPlanogram, KnowledgeBaseStore, StoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

pub type TestApp = axum::Router;

pub const USERNAME: &str = "analyst";
pub const PASSWORD: &str = "secret";
pub const UPLOAD_LIMIT: usize = 64 * 1024;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub fn state_with_store(store: Arc<dyn KnowledgeBaseStore + Send + Sync>) -> AppState {
    AppState {
        store,
        sessions: SessionStore::new(Duration::from_secs(300)),
        cookie_secure: false,
        max_upload_bytes: UPLOAD_LIMIT,
    }
}

pub fn memory_store() -> InMemoryStore {
    InMemoryStore::new().with_users([(USERNAME, PASSWORD)])
}

pub fn app() -> TestApp {
    build_router(state_with_store(Arc::new(memory_store())))
}

/// Log in through the HTTP route and return the `name=value` cookie pair.
pub async fn login(app: &TestApp) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={USERNAME}&password={PASSWORD}")))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("session cookie")
}

pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("ckb_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Memory store wrapper that counts every call reaching the storage layer.
pub struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KnowledgeBaseStore for CountingStore {
    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        self.hit();
        self.inner.list_stores().await
    }
    async fn get_store(&self, store_id: i64) -> StoreResult<Store> {
        self.hit();
        self.inner.get_store(store_id).await
    }
    async fn create_store(&self, fields: StoreFields) -> StoreResult<Store> {
        self.hit();
        self.inner.create_store(fields).await
    }
    async fn update_store(&self, store_id: i64, fields: StoreFields) -> StoreResult<Store> {
        self.hit();
        self.inner.update_store(store_id, fields).await
    }
    async fn delete_store(&self, store_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_store(store_id).await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.list_products().await
    }
    async fn get_product_by_upc(&self, upc: &str) -> StoreResult<Product> {
        self.hit();
        self.inner.get_product_by_upc(upc).await
    }
    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product> {
        self.hit();
        self.inner.create_product(fields).await
    }
    async fn update_product(&self, fields: ProductFields) -> StoreResult<Product> {
        self.hit();
        self.inner.update_product(fields).await
    }
    async fn delete_product(&self, upc: &str) -> StoreResult<()> {
        self.hit();
        self.inner.delete_product(upc).await
    }

    async fn list_planograms(&self) -> StoreResult<Vec<PlanogramListItem>> {
        self.hit();
        self.inner.list_planograms().await
    }
    async fn get_planogram(&self, planogram_id: i64) -> StoreResult<Planogram> {
        self.hit();
        self.inner.get_planogram(planogram_id).await
    }
    async fn create_planogram(
        &self,
        fields: PlanogramFields,
        pdf: Option<Vec<u8>>,
    ) -> StoreResult<CreatedPlanogram> {
        self.hit();
        self.inner.create_planogram(fields, pdf).await
    }
    async fn update_planogram(
        &self,
        planogram_id: i64,
        fields: PlanogramFields,
    ) -> StoreResult<Planogram> {
        self.hit();
        self.inner.update_planogram(planogram_id, fields).await
    }
    async fn delete_planogram(&self, planogram_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_planogram(planogram_id).await
    }
    async fn get_planogram_pdf(&self, pdf_id: i64) -> StoreResult<Vec<u8>> {
        self.hit();
        self.inner.get_planogram_pdf(pdf_id).await
    }
    async fn get_pdf_for_planogram(&self, planogram_id: i64) -> StoreResult<Vec<u8>> {
        self.hit();
        self.inner.get_pdf_for_planogram(planogram_id).await
    }

    async fn list_floor_plans(&self) -> StoreResult<Vec<FloorPlan>> {
        self.hit();
        self.inner.list_floor_plans().await
    }
    async fn get_floor_plan(&self, floor_plan_id: i64) -> StoreResult<FloorPlan> {
        self.hit();
        self.inner.get_floor_plan(floor_plan_id).await
    }
    async fn create_floor_plan(&self, fields: FloorPlanFields) -> StoreResult<FloorPlan> {
        self.hit();
        self.inner.create_floor_plan(fields).await
    }
    async fn update_floor_plan(
        &self,
        floor_plan_id: i64,
        fields: FloorPlanFields,
    ) -> StoreResult<FloorPlan> {
        self.hit();
        self.inner.update_floor_plan(floor_plan_id, fields).await
    }
    async fn delete_floor_plan(&self, floor_plan_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_floor_plan(floor_plan_id).await
    }

    async fn list_positions(&self) -> StoreResult<Vec<Position>> {
        self.hit();
        self.inner.list_positions().await
    }
    async fn get_position(&self, position_id: i64) -> StoreResult<Position> {
        self.hit();
        self.inner.get_position(position_id).await
    }
    async fn create_position(&self, fields: PositionFields) -> StoreResult<Position> {
        self.hit();
        self.inner.create_position(fields).await
    }
    async fn update_position(
        &self,
        position_id: i64,
        fields: PositionFields,
    ) -> StoreResult<Position> {
        self.hit();
        self.inner.update_position(position_id, fields).await
    }
    async fn delete_position(&self, position_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_position(position_id).await
    }

    async fn list_clusters(&self) -> StoreResult<Vec<Cluster>> {
        self.hit();
        self.inner.list_clusters().await
    }
    async fn get_cluster(&self, cluster_id: i64) -> StoreResult<Cluster> {
        self.hit();
        self.inner.get_cluster(cluster_id).await
    }
    async fn create_cluster(&self, fields: ClusterFields) -> StoreResult<Cluster> {
        self.hit();
        self.inner.create_cluster(fields).await
    }
    async fn update_cluster(
        &self,
        cluster_id: i64,
        fields: ClusterFields,
    ) -> StoreResult<Cluster> {
        self.hit();
        self.inner.update_cluster(cluster_id, fields).await
    }
    async fn delete_cluster(&self, cluster_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_cluster(cluster_id).await
    }

    async fn list_performance(&self) -> StoreResult<Vec<Performance>> {
        self.hit();
        self.inner.list_performance().await
    }
    async fn get_performance(&self, performance_id: i64) -> StoreResult<Performance> {
        self.hit();
        self.inner.get_performance(performance_id).await
    }
    async fn create_performance(&self, fields: PerformanceFields) -> StoreResult<Performance> {
        self.hit();
        self.inner.create_performance(fields).await
    }
    async fn update_performance(
        &self,
        performance_id: i64,
        fields: PerformanceFields,
    ) -> StoreResult<Performance> {
        self.hit();
        self.inner.update_performance(performance_id, fields).await
    }
    async fn delete_performance(&self, performance_id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete_performance(performance_id).await
    }

    async fn link(&self, link: Link) -> StoreResult<()> {
        self.hit();
        self.inner.link(link).await
    }
    async fn unlink(&self, link: Link) -> StoreResult<()> {
        self.hit();
        self.inner.unlink(link).await
    }
    async fn list_cluster_stores(&self, cluster_id: i64) -> StoreResult<Vec<Store>> {
        self.hit();
        self.inner.list_cluster_stores(cluster_id).await
    }
    async fn list_store_floor_plans(&self, store_id: i64) -> StoreResult<Vec<FloorPlan>> {
        self.hit();
        self.inner.list_store_floor_plans(store_id).await
    }
    async fn list_floor_plan_planograms(&self, floor_plan_id: i64) -> StoreResult<Vec<Planogram>> {
        self.hit();
        self.inner.list_floor_plan_planograms(floor_plan_id).await
    }
    async fn list_planogram_products(&self, planogram_id: i64) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.list_planogram_products(planogram_id).await
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<bool> {
        self.hit();
        self.inner.verify_credentials(username, password).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
    fn is_durable(&self) -> bool {
        self.inner.is_durable()
    }
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
