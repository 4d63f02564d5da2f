//! Storage abstraction for the knowledge-base warehouse.
//!
//! # Purpose
//! Defines the repository operations every backend implements: per-entity
//! list/get/insert/update/delete, junction link management, planogram PDF
//! passthrough, and the login credential check.
//!
//! # Key invariants
//! - Each operation is one statement or one short transaction; there is no
//!   composition across calls.
//! - Inserts return the record with its generated key.
//! - Updates and deletes of a missing key return [`StoreError::NotFound`].
//! - Linking an existing pair returns [`StoreError::Conflict`]; unlinking an
//!   absent pair returns [`StoreError::NotFound`].
use crate::model::{
    Cluster, ClusterFields, FloorPlan, FloorPlanFields, Link, Performance, PerformanceFields,
    Planogram, PlanogramFields, PlanogramListItem, Position, PositionFields, Product,
    ProductFields, Store, StoreFields,
};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("warehouse unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::RowNotFound => StoreError::NotFound("row".into()),
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            other => StoreError::Unexpected(other.into()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A planogram created together with its PDF document.
#[derive(Debug, Clone)]
pub struct CreatedPlanogram {
    pub planogram: Planogram,
    pub pdf_id: Option<i64>,
}

#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync {
    async fn list_stores(&self) -> StoreResult<Vec<Store>>;
    async fn get_store(&self, store_id: i64) -> StoreResult<Store>;
    async fn create_store(&self, fields: StoreFields) -> StoreResult<Store>;
    async fn update_store(&self, store_id: i64, fields: StoreFields) -> StoreResult<Store>;
    async fn delete_store(&self, store_id: i64) -> StoreResult<()>;

    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product_by_upc(&self, upc: &str) -> StoreResult<Product>;
    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product>;
    async fn update_product(&self, fields: ProductFields) -> StoreResult<Product>;
    async fn delete_product(&self, upc: &str) -> StoreResult<()>;

    async fn list_planograms(&self) -> StoreResult<Vec<PlanogramListItem>>;
    async fn get_planogram(&self, planogram_id: i64) -> StoreResult<Planogram>;
    /// Insert a planogram and, when given, its PDF in one transaction keyed by
    /// the generated planogram id.
    async fn create_planogram(
        &self,
        fields: PlanogramFields,
        pdf: Option<Vec<u8>>,
    ) -> StoreResult<CreatedPlanogram>;
    async fn update_planogram(
        &self,
        planogram_id: i64,
        fields: PlanogramFields,
    ) -> StoreResult<Planogram>;
    async fn delete_planogram(&self, planogram_id: i64) -> StoreResult<()>;
    async fn get_planogram_pdf(&self, pdf_id: i64) -> StoreResult<Vec<u8>>;
    async fn get_pdf_for_planogram(&self, planogram_id: i64) -> StoreResult<Vec<u8>>;

    async fn list_floor_plans(&self) -> StoreResult<Vec<FloorPlan>>;
    async fn get_floor_plan(&self, floor_plan_id: i64) -> StoreResult<FloorPlan>;
    async fn create_floor_plan(&self, fields: FloorPlanFields) -> StoreResult<FloorPlan>;
    async fn update_floor_plan(
        &self,
        floor_plan_id: i64,
        fields: FloorPlanFields,
    ) -> StoreResult<FloorPlan>;
    async fn delete_floor_plan(&self, floor_plan_id: i64) -> StoreResult<()>;

    async fn list_positions(&self) -> StoreResult<Vec<Position>>;
    async fn get_position(&self, position_id: i64) -> StoreResult<Position>;
    async fn create_position(&self, fields: PositionFields) -> StoreResult<Position>;
    async fn update_position(
        &self,
        position_id: i64,
        fields: PositionFields,
    ) -> StoreResult<Position>;
    async fn delete_position(&self, position_id: i64) -> StoreResult<()>;

    async fn list_clusters(&self) -> StoreResult<Vec<Cluster>>;
    async fn get_cluster(&self, cluster_id: i64) -> StoreResult<Cluster>;
    async fn create_cluster(&self, fields: ClusterFields) -> StoreResult<Cluster>;
    async fn update_cluster(&self, cluster_id: i64, fields: ClusterFields)
    -> StoreResult<Cluster>;
    async fn delete_cluster(&self, cluster_id: i64) -> StoreResult<()>;

    async fn list_performance(&self) -> StoreResult<Vec<Performance>>;
    async fn get_performance(&self, performance_id: i64) -> StoreResult<Performance>;
    async fn create_performance(&self, fields: PerformanceFields) -> StoreResult<Performance>;
    async fn update_performance(
        &self,
        performance_id: i64,
        fields: PerformanceFields,
    ) -> StoreResult<Performance>;
    async fn delete_performance(&self, performance_id: i64) -> StoreResult<()>;

    /// Count-check then insert a junction pair.
    async fn link(&self, link: Link) -> StoreResult<()>;
    /// Remove every row for the exact junction pair.
    async fn unlink(&self, link: Link) -> StoreResult<()>;
    async fn list_cluster_stores(&self, cluster_id: i64) -> StoreResult<Vec<Store>>;
    async fn list_store_floor_plans(&self, store_id: i64) -> StoreResult<Vec<FloorPlan>>;
    async fn list_floor_plan_planograms(&self, floor_plan_id: i64) -> StoreResult<Vec<Planogram>>;
    async fn list_planogram_products(&self, planogram_id: i64) -> StoreResult<Vec<Product>>;

    /// Check user-supplied credentials against the warehouse. `Ok(false)` means
    /// the warehouse rejected them.
    async fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

pub(crate) use crate::observability::record_store_write as record_write;
