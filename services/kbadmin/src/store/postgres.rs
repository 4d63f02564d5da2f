//! Postgres-backed implementation of the knowledge-base store.
//!
//! # What this module is
//! Implements [`KnowledgeBaseStore`] over a pooled `sqlx` connection to the
//! warehouse. Every operation is one parameterized statement or one short
//! transaction; handlers never compose calls.
//!
//! # Key invariants
//! - Generated keys come back through `RETURNING`, never a follow-up
//!   `MAX(key)` query.
//! - Rows are decoded by column name via `FromRow` structs kept separate from
//!   the API model.
//! - A planogram and its PDF are inserted in the same transaction, with the
//!   PDF bound to the key the planogram insert returned.
//! - Junction inserts count-check the pair inside the transaction that inserts
//!   it. The unique indexes on the junction tables back this up; a racing
//!   duplicate surfaces as `23505` and maps to [`StoreError::Conflict`].
//!
//! # Security notes
//! - The warehouse URL may contain the service identity's credentials; it is
//!   never logged.
//! - Junction table and column names come from a fixed allowlist keyed by
//!   [`LinkKind`]; no request input reaches `format!`.
//!
//! # Operational notes
//! Migrations run at startup via `sqlx::migrate!("./migrations")` so handlers
//! can assume the schema exists.
use super::{CreatedPlanogram, KnowledgeBaseStore, StoreError, StoreResult, record_write};
use crate::config::WarehouseConfig;
use crate::model::{
    Cluster, ClusterFields, FloorPlan, FloorPlanFields, Link, LinkKind, Performance,
    PerformanceFields, Planogram, PlanogramFields, PlanogramListItem, Position, PositionFields,
    Product, ProductFields, Store, StoreFields,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, FromRow, PgConnection, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Durable knowledge-base store backed by the Postgres warehouse.
///
/// # Errors
/// Connection and query failures surface as [`StoreError`]; pool exhaustion
/// and IO failures are classified as [`StoreError::Unavailable`].
///
/// # Example
/// ```rust,no_run
/// use kbadmin::config::WarehouseConfig;
/// use kbadmin::store::postgres::PostgresStore;
///
/// async fn open(warehouse: WarehouseConfig) {
///     let _ = PostgresStore::connect(&warehouse).await;
/// }
/// ```
pub struct PostgresStore {
    pool: PgPool,
    // Base options reused, with the caller's credentials swapped in, by the
    // credential check.
    connect_options: PgConnectOptions,
    connect_timeout: Duration,
}

#[derive(Debug, Clone, FromRow)]
struct DbStore {
    db_key: i64,
    store_name: String,
    address: String,
    city: String,
    state: String,
    db_status: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbProduct {
    db_key: i64,
    upc: String,
    product_name: String,
    category: String,
    subcategory: String,
    dimensions: String,
    weight: f64,
    price: Option<f64>,
    db_status: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbPlanogram {
    db_key: i64,
    planogram_name: String,
    db_status: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbPlanogramListRow {
    db_key: i64,
    planogram_name: String,
    db_status: i64,
    pdf_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
struct DbFloorPlan {
    db_key: i64,
    floorplan_name: String,
    db_status: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbPosition {
    db_key: i64,
    db_product_parent_key: i64,
    db_planogram_parent_key: i64,
    db_fixture_parent_key: i64,
    h_facing: i64,
    v_facing: i64,
    d_facing: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbCluster {
    db_key: i64,
    cluster_name: String,
}

#[derive(Debug, Clone, FromRow)]
struct DbPerformance {
    db_key: i64,
    position_id: i64,
    sales_volume: i64,
    sales_revenue: f64,
    stock_level: i64,
    restock_frequency: i64,
    perf_date: NaiveDate,
}

impl From<DbStore> for Store {
    fn from(row: DbStore) -> Self {
        Store {
            store_id: row.db_key,
            store_name: row.store_name,
            address: row.address,
            city: row.city,
            state: row.state,
            db_status: row.db_status,
        }
    }
}

impl From<DbProduct> for Product {
    fn from(row: DbProduct) -> Self {
        Product {
            db_key: row.db_key,
            upc: row.upc,
            product_name: row.product_name,
            category: row.category,
            subcategory: row.subcategory,
            dimensions: row.dimensions,
            weight: row.weight,
            price: row.price,
            db_status: row.db_status,
        }
    }
}

impl From<DbPlanogram> for Planogram {
    fn from(row: DbPlanogram) -> Self {
        Planogram {
            db_key: row.db_key,
            planogram_name: row.planogram_name,
            db_status: row.db_status,
        }
    }
}

impl From<DbPlanogramListRow> for PlanogramListItem {
    fn from(row: DbPlanogramListRow) -> Self {
        PlanogramListItem {
            db_key: row.db_key,
            planogram_name: row.planogram_name,
            db_status: row.db_status,
            pdf_id: row.pdf_id,
        }
    }
}

impl From<DbFloorPlan> for FloorPlan {
    fn from(row: DbFloorPlan) -> Self {
        FloorPlan {
            floor_plan_id: row.db_key,
            floor_plan_name: row.floorplan_name,
            db_status: row.db_status,
        }
    }
}

impl From<DbPosition> for Position {
    fn from(row: DbPosition) -> Self {
        Position {
            position_id: row.db_key,
            db_product_parent_key: row.db_product_parent_key,
            db_planogram_parent_key: row.db_planogram_parent_key,
            db_fixture_parent_key: row.db_fixture_parent_key,
            h_facing: row.h_facing,
            v_facing: row.v_facing,
            d_facing: row.d_facing,
        }
    }
}

impl From<DbCluster> for Cluster {
    fn from(row: DbCluster) -> Self {
        Cluster {
            cluster_id: row.db_key,
            cluster_name: row.cluster_name,
        }
    }
}

impl From<DbPerformance> for Performance {
    fn from(row: DbPerformance) -> Self {
        Performance {
            performance_id: row.db_key,
            position_id: row.position_id,
            sales_volume: row.sales_volume,
            sales_revenue: row.sales_revenue,
            stock_level: row.stock_level,
            restock_frequency: row.restock_frequency,
            date: row.perf_date,
        }
    }
}

const STORE_COLUMNS: &str = "db_key, store_name, address, city, state, db_status";
const PRODUCT_COLUMNS: &str =
    "db_key, upc, product_name, category, subcategory, dimensions, weight, price, db_status";
const PLANOGRAM_COLUMNS: &str = "db_key, planogram_name, db_status";
const FLOOR_PLAN_COLUMNS: &str = "db_key, floorplan_name, db_status";
const POSITION_COLUMNS: &str = "db_key, db_product_parent_key, db_planogram_parent_key, db_fixture_parent_key, h_facing, v_facing, d_facing";
const CLUSTER_COLUMNS: &str = "db_key, cluster_name";
const PERFORMANCE_COLUMNS: &str = "db_key, position_id, sales_volume, sales_revenue, stock_level, restock_frequency, perf_date";

/// `(table, parent column, child column)` for each link kind.
///
/// Planogram-product links live in `positions`; the schema defaults fill the
/// fixture and facing columns with zero.
fn junction(kind: LinkKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        LinkKind::ClusterStore => ("cluster_stores", "cluster_id", "store_id"),
        LinkKind::StoreFloorPlan => ("store_floorplans", "store_id", "floorplan_id"),
        LinkKind::FloorPlanPlanogram => ("floorplan_planograms", "floorplan_id", "planogram_id"),
        LinkKind::PlanogramProduct => (
            "positions",
            "db_planogram_parent_key",
            "db_product_parent_key",
        ),
    }
}

fn link_lock_key(link: Link) -> String {
    format!("{}:{}:{}", link.kind.as_str(), link.parent_id, link.child_id)
}

/// SQLSTATE class 28 is "invalid authorization specification".
fn is_credential_rejection(code: Option<&str>) -> bool {
    code.is_some_and(|code| code.starts_with("28"))
}

fn missing(entity: &str) -> StoreError {
    StoreError::NotFound(entity.to_string())
}

impl PostgresStore {
    /// Connect to the warehouse and apply embedded migrations.
    ///
    /// # Errors
    /// - URL parse, connection, or migration failures.
    /// - [`StoreError::Unavailable`] when the first connection does not
    ///   complete within `connect_timeout_ms`.
    pub async fn connect(warehouse: &WarehouseConfig) -> StoreResult<Self> {
        // Fail fast on an unreachable warehouse instead of hanging startup.
        let connect_options = PgConnectOptions::from_str(&warehouse.url)?;
        let connect_timeout = Duration::from_millis(warehouse.connect_timeout_ms);
        let pool = tokio::time::timeout(
            connect_timeout,
            PgPoolOptions::new()
                .max_connections(warehouse.max_connections)
                .acquire_timeout(Duration::from_millis(warehouse.acquire_timeout_ms))
                .connect_with(connect_options.clone()),
        )
        .await
        .map_err(|_| StoreError::Unavailable("warehouse connect timed out".into()))??;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            connect_options,
            connect_timeout,
        })
    }
}

#[async_trait]
impl KnowledgeBaseStore for PostgresStore {
    // -----------------------------
    // Stores
    // -----------------------------

    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        let rows = sqlx::query_as::<_, DbStore>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn get_store(&self, store_id: i64) -> StoreResult<Store> {
        let row = sqlx::query_as::<_, DbStore>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE db_key = $1"
        ))
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Store::from).ok_or_else(|| missing("store"))
    }

    async fn create_store(&self, fields: StoreFields) -> StoreResult<Store> {
        let row = sqlx::query_as::<_, DbStore>(&format!(
            "INSERT INTO stores (store_name, address, city, state, db_status) VALUES ($1, $2, $3, $4, $5) RETURNING {STORE_COLUMNS}"
        ))
        .bind(&fields.store_name)
        .bind(&fields.address)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(fields.db_status)
        .fetch_one(&self.pool)
        .await?;
        record_write("store", "created");
        Ok(row.into())
    }

    async fn update_store(&self, store_id: i64, fields: StoreFields) -> StoreResult<Store> {
        let row = sqlx::query_as::<_, DbStore>(&format!(
            "UPDATE stores SET store_name = $1, address = $2, city = $3, state = $4, db_status = $5 WHERE db_key = $6 RETURNING {STORE_COLUMNS}"
        ))
        .bind(&fields.store_name)
        .bind(&fields.address)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(fields.db_status)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("store"))?;
        record_write("store", "updated");
        Ok(row.into())
    }

    async fn delete_store(&self, store_id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM stores WHERE db_key = $1")
            .bind(store_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("store"));
        }
        record_write("store", "deleted");
        Ok(())
    }

    // -----------------------------
    // Products
    // -----------------------------

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, DbProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product_by_upc(&self, upc: &str) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, DbProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE upc = $1"
        ))
        .bind(upc)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Product::from).ok_or_else(|| missing("product"))
    }

    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, DbProduct>(&format!(
            "INSERT INTO products (upc, product_name, category, subcategory, dimensions, weight, price, db_status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&fields.upc)
        .bind(&fields.product_name)
        .bind(&fields.category)
        .bind(&fields.subcategory)
        .bind(&fields.dimensions)
        .bind(fields.weight)
        .bind(fields.price)
        .bind(fields.db_status)
        .fetch_one(&self.pool)
        .await?;
        record_write("product", "created");
        Ok(row.into())
    }

    async fn update_product(&self, fields: ProductFields) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, DbProduct>(&format!(
            "UPDATE products SET product_name = $1, category = $2, subcategory = $3, dimensions = $4, weight = $5, price = $6, db_status = $7 WHERE upc = $8 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&fields.product_name)
        .bind(&fields.category)
        .bind(&fields.subcategory)
        .bind(&fields.dimensions)
        .bind(fields.weight)
        .bind(fields.price)
        .bind(fields.db_status)
        .bind(&fields.upc)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("product"))?;
        record_write("product", "updated");
        Ok(row.into())
    }

    async fn delete_product(&self, upc: &str) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM products WHERE upc = $1")
            .bind(upc)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("product"));
        }
        record_write("product", "deleted");
        Ok(())
    }

    // -----------------------------
    // Planograms and PDFs
    // -----------------------------

    async fn list_planograms(&self) -> StoreResult<Vec<PlanogramListItem>> {
        let rows = sqlx::query_as::<_, DbPlanogramListRow>(
            r#"SELECT p.db_key, p.planogram_name, p.db_status,
                      (SELECT MIN(f.db_key) FROM planogram_pdfs f WHERE f.planogram_id = p.db_key) AS pdf_id
               FROM planograms p ORDER BY p.db_key"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PlanogramListItem::from).collect())
    }

    async fn get_planogram(&self, planogram_id: i64) -> StoreResult<Planogram> {
        let row = sqlx::query_as::<_, DbPlanogram>(&format!(
            "SELECT {PLANOGRAM_COLUMNS} FROM planograms WHERE db_key = $1"
        ))
        .bind(planogram_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Planogram::from).ok_or_else(|| missing("planogram"))
    }

    async fn create_planogram(
        &self,
        fields: PlanogramFields,
        pdf: Option<Vec<u8>>,
    ) -> StoreResult<CreatedPlanogram> {
        let mut tx = self.pool.begin().await?;
        let planogram: Planogram = sqlx::query_as::<_, DbPlanogram>(&format!(
            "INSERT INTO planograms (planogram_name, db_status) VALUES ($1, $2) RETURNING {PLANOGRAM_COLUMNS}"
        ))
        .bind(&fields.planogram_name)
        .bind(fields.db_status)
        .fetch_one(&mut *tx)
        .await?
        .into();

        let pdf_id = match pdf {
            Some(bytes) => Some(
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO planogram_pdfs (planogram_id, pdf_file) VALUES ($1, $2) RETURNING db_key",
                )
                .bind(planogram.db_key)
                .bind(bytes)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;
        record_write("planogram", "created");
        Ok(CreatedPlanogram { planogram, pdf_id })
    }

    async fn update_planogram(
        &self,
        planogram_id: i64,
        fields: PlanogramFields,
    ) -> StoreResult<Planogram> {
        let row = sqlx::query_as::<_, DbPlanogram>(&format!(
            "UPDATE planograms SET planogram_name = $1, db_status = $2 WHERE db_key = $3 RETURNING {PLANOGRAM_COLUMNS}"
        ))
        .bind(&fields.planogram_name)
        .bind(fields.db_status)
        .bind(planogram_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("planogram"))?;
        record_write("planogram", "updated");
        Ok(row.into())
    }

    async fn delete_planogram(&self, planogram_id: i64) -> StoreResult<()> {
        // PDFs go with the planogram through ON DELETE CASCADE.
        let removed = sqlx::query("DELETE FROM planograms WHERE db_key = $1")
            .bind(planogram_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("planogram"));
        }
        record_write("planogram", "deleted");
        Ok(())
    }

    async fn get_planogram_pdf(&self, pdf_id: i64) -> StoreResult<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT pdf_file FROM planogram_pdfs WHERE db_key = $1")
            .bind(pdf_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing("pdf"))
    }

    async fn get_pdf_for_planogram(&self, planogram_id: i64) -> StoreResult<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT pdf_file FROM planogram_pdfs WHERE planogram_id = $1 ORDER BY db_key LIMIT 1",
        )
        .bind(planogram_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("pdf"))
    }

    // -----------------------------
    // Floor plans
    // -----------------------------

    async fn list_floor_plans(&self) -> StoreResult<Vec<FloorPlan>> {
        let rows = sqlx::query_as::<_, DbFloorPlan>(&format!(
            "SELECT {FLOOR_PLAN_COLUMNS} FROM floorplans ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FloorPlan::from).collect())
    }

    async fn get_floor_plan(&self, floor_plan_id: i64) -> StoreResult<FloorPlan> {
        let row = sqlx::query_as::<_, DbFloorPlan>(&format!(
            "SELECT {FLOOR_PLAN_COLUMNS} FROM floorplans WHERE db_key = $1"
        ))
        .bind(floor_plan_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FloorPlan::from)
            .ok_or_else(|| missing("floor plan"))
    }

    async fn create_floor_plan(&self, fields: FloorPlanFields) -> StoreResult<FloorPlan> {
        let row = sqlx::query_as::<_, DbFloorPlan>(&format!(
            "INSERT INTO floorplans (floorplan_name, db_status) VALUES ($1, $2) RETURNING {FLOOR_PLAN_COLUMNS}"
        ))
        .bind(&fields.floor_plan_name)
        .bind(fields.db_status)
        .fetch_one(&self.pool)
        .await?;
        record_write("floor_plan", "created");
        Ok(row.into())
    }

    async fn update_floor_plan(
        &self,
        floor_plan_id: i64,
        fields: FloorPlanFields,
    ) -> StoreResult<FloorPlan> {
        let row = sqlx::query_as::<_, DbFloorPlan>(&format!(
            "UPDATE floorplans SET floorplan_name = $1, db_status = $2 WHERE db_key = $3 RETURNING {FLOOR_PLAN_COLUMNS}"
        ))
        .bind(&fields.floor_plan_name)
        .bind(fields.db_status)
        .bind(floor_plan_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("floor plan"))?;
        record_write("floor_plan", "updated");
        Ok(row.into())
    }

    async fn delete_floor_plan(&self, floor_plan_id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM floorplans WHERE db_key = $1")
            .bind(floor_plan_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("floor plan"));
        }
        record_write("floor_plan", "deleted");
        Ok(())
    }

    // -----------------------------
    // Positions
    // -----------------------------

    async fn list_positions(&self) -> StoreResult<Vec<Position>> {
        let rows = sqlx::query_as::<_, DbPosition>(&format!(
            "SELECT {POSITION_COLUMNS} FROM positions ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Position::from).collect())
    }

    async fn get_position(&self, position_id: i64) -> StoreResult<Position> {
        let row = sqlx::query_as::<_, DbPosition>(&format!(
            "SELECT {POSITION_COLUMNS} FROM positions WHERE db_key = $1"
        ))
        .bind(position_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Position::from).ok_or_else(|| missing("position"))
    }

    async fn create_position(&self, fields: PositionFields) -> StoreResult<Position> {
        let row = sqlx::query_as::<_, DbPosition>(&format!(
            "INSERT INTO positions (db_product_parent_key, db_planogram_parent_key, db_fixture_parent_key, h_facing, v_facing, d_facing) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {POSITION_COLUMNS}"
        ))
        .bind(fields.db_product_parent_key)
        .bind(fields.db_planogram_parent_key)
        .bind(fields.db_fixture_parent_key)
        .bind(fields.h_facing)
        .bind(fields.v_facing)
        .bind(fields.d_facing)
        .fetch_one(&self.pool)
        .await?;
        record_write("position", "created");
        Ok(row.into())
    }

    async fn update_position(
        &self,
        position_id: i64,
        fields: PositionFields,
    ) -> StoreResult<Position> {
        let row = sqlx::query_as::<_, DbPosition>(&format!(
            "UPDATE positions SET db_product_parent_key = $1, db_planogram_parent_key = $2, db_fixture_parent_key = $3, h_facing = $4, v_facing = $5, d_facing = $6 WHERE db_key = $7 RETURNING {POSITION_COLUMNS}"
        ))
        .bind(fields.db_product_parent_key)
        .bind(fields.db_planogram_parent_key)
        .bind(fields.db_fixture_parent_key)
        .bind(fields.h_facing)
        .bind(fields.v_facing)
        .bind(fields.d_facing)
        .bind(position_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("position"))?;
        record_write("position", "updated");
        Ok(row.into())
    }

    async fn delete_position(&self, position_id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM positions WHERE db_key = $1")
            .bind(position_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("position"));
        }
        record_write("position", "deleted");
        Ok(())
    }

    // -----------------------------
    // Clusters
    // -----------------------------

    async fn list_clusters(&self) -> StoreResult<Vec<Cluster>> {
        let rows = sqlx::query_as::<_, DbCluster>(&format!(
            "SELECT {CLUSTER_COLUMNS} FROM clusters ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Cluster::from).collect())
    }

    async fn get_cluster(&self, cluster_id: i64) -> StoreResult<Cluster> {
        let row = sqlx::query_as::<_, DbCluster>(&format!(
            "SELECT {CLUSTER_COLUMNS} FROM clusters WHERE db_key = $1"
        ))
        .bind(cluster_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Cluster::from).ok_or_else(|| missing("cluster"))
    }

    async fn create_cluster(&self, fields: ClusterFields) -> StoreResult<Cluster> {
        let row = sqlx::query_as::<_, DbCluster>(&format!(
            "INSERT INTO clusters (cluster_name) VALUES ($1) RETURNING {CLUSTER_COLUMNS}"
        ))
        .bind(&fields.cluster_name)
        .fetch_one(&self.pool)
        .await?;
        record_write("cluster", "created");
        Ok(row.into())
    }

    async fn update_cluster(
        &self,
        cluster_id: i64,
        fields: ClusterFields,
    ) -> StoreResult<Cluster> {
        let row = sqlx::query_as::<_, DbCluster>(&format!(
            "UPDATE clusters SET cluster_name = $1 WHERE db_key = $2 RETURNING {CLUSTER_COLUMNS}"
        ))
        .bind(&fields.cluster_name)
        .bind(cluster_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("cluster"))?;
        record_write("cluster", "updated");
        Ok(row.into())
    }

    async fn delete_cluster(&self, cluster_id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM clusters WHERE db_key = $1")
            .bind(cluster_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("cluster"));
        }
        record_write("cluster", "deleted");
        Ok(())
    }

    // -----------------------------
    // Performance
    // -----------------------------

    async fn list_performance(&self) -> StoreResult<Vec<Performance>> {
        let rows = sqlx::query_as::<_, DbPerformance>(&format!(
            "SELECT {PERFORMANCE_COLUMNS} FROM performance ORDER BY db_key"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Performance::from).collect())
    }

    async fn get_performance(&self, performance_id: i64) -> StoreResult<Performance> {
        let row = sqlx::query_as::<_, DbPerformance>(&format!(
            "SELECT {PERFORMANCE_COLUMNS} FROM performance WHERE db_key = $1"
        ))
        .bind(performance_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Performance::from)
            .ok_or_else(|| missing("performance"))
    }

    async fn create_performance(&self, fields: PerformanceFields) -> StoreResult<Performance> {
        let row = sqlx::query_as::<_, DbPerformance>(&format!(
            "INSERT INTO performance (position_id, sales_volume, sales_revenue, stock_level, restock_frequency, perf_date) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PERFORMANCE_COLUMNS}"
        ))
        .bind(fields.position_id)
        .bind(fields.sales_volume)
        .bind(fields.sales_revenue)
        .bind(fields.stock_level)
        .bind(fields.restock_frequency)
        .bind(fields.date)
        .fetch_one(&self.pool)
        .await?;
        record_write("performance", "created");
        Ok(row.into())
    }

    async fn update_performance(
        &self,
        performance_id: i64,
        fields: PerformanceFields,
    ) -> StoreResult<Performance> {
        let row = sqlx::query_as::<_, DbPerformance>(&format!(
            "UPDATE performance SET position_id = $1, sales_volume = $2, sales_revenue = $3, stock_level = $4, restock_frequency = $5, perf_date = $6 WHERE db_key = $7 RETURNING {PERFORMANCE_COLUMNS}"
        ))
        .bind(fields.position_id)
        .bind(fields.sales_volume)
        .bind(fields.sales_revenue)
        .bind(fields.stock_level)
        .bind(fields.restock_frequency)
        .bind(fields.date)
        .bind(performance_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing("performance"))?;
        record_write("performance", "updated");
        Ok(row.into())
    }

    async fn delete_performance(&self, performance_id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM performance WHERE db_key = $1")
            .bind(performance_id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("performance"));
        }
        record_write("performance", "deleted");
        Ok(())
    }

    // -----------------------------
    // Junctions
    // -----------------------------

    async fn link(&self, link: Link) -> StoreResult<()> {
        // `table`, `parent` and `child` come from the `junction` allowlist.
        let (table, parent, child) = junction(link.kind);
        let mut tx = self.pool.begin().await?;
        // Held until commit, so racing links of one pair queue behind it.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(link_lock_key(link))
            .execute(&mut *tx)
            .await?;
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE {parent} = $1 AND {child} = $2"
        ))
        .bind(link.parent_id)
        .bind(link.child_id)
        .fetch_one(&mut *tx)
        .await?;
        if count > 0 {
            return Err(StoreError::Conflict("already linked".into()));
        }
        sqlx::query(&format!(
            "INSERT INTO {table} ({parent}, {child}) VALUES ($1, $2)"
        ))
        .bind(link.parent_id)
        .bind(link.child_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        record_write(link.kind.as_str(), "linked");
        Ok(())
    }

    async fn unlink(&self, link: Link) -> StoreResult<()> {
        let (table, parent, child) = junction(link.kind);
        let removed = sqlx::query(&format!(
            "DELETE FROM {table} WHERE {parent} = $1 AND {child} = $2"
        ))
        .bind(link.parent_id)
        .bind(link.child_id)
        .execute(&self.pool)
        .await?;
        if removed.rows_affected() == 0 {
            return Err(missing("link"));
        }
        record_write(link.kind.as_str(), "unlinked");
        Ok(())
    }

    async fn list_cluster_stores(&self, cluster_id: i64) -> StoreResult<Vec<Store>> {
        let rows = sqlx::query_as::<_, DbStore>(
            r#"SELECT s.db_key, s.store_name, s.address, s.city, s.state, s.db_status
               FROM stores s JOIN cluster_stores cs ON cs.store_id = s.db_key
               WHERE cs.cluster_id = $1 ORDER BY s.db_key"#,
        )
        .bind(cluster_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn list_store_floor_plans(&self, store_id: i64) -> StoreResult<Vec<FloorPlan>> {
        let rows = sqlx::query_as::<_, DbFloorPlan>(
            r#"SELECT f.db_key, f.floorplan_name, f.db_status
               FROM floorplans f JOIN store_floorplans sf ON sf.floorplan_id = f.db_key
               WHERE sf.store_id = $1 ORDER BY f.db_key"#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FloorPlan::from).collect())
    }

    async fn list_floor_plan_planograms(&self, floor_plan_id: i64) -> StoreResult<Vec<Planogram>> {
        let rows = sqlx::query_as::<_, DbPlanogram>(
            r#"SELECT p.db_key, p.planogram_name, p.db_status
               FROM planograms p JOIN floorplan_planograms fp ON fp.planogram_id = p.db_key
               WHERE fp.floorplan_id = $1 ORDER BY p.db_key"#,
        )
        .bind(floor_plan_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Planogram::from).collect())
    }

    async fn list_planogram_products(&self, planogram_id: i64) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, DbProduct>(
            r#"SELECT pr.db_key, pr.upc, pr.product_name, pr.category, pr.subcategory,
                      pr.dimensions, pr.weight, pr.price, pr.db_status
               FROM products pr JOIN positions po ON po.db_product_parent_key = pr.db_key
               WHERE po.db_planogram_parent_key = $1 ORDER BY po.db_key"#,
        )
        .bind(planogram_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    // -----------------------------
    // Credentials / health
    // -----------------------------

    async fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<bool> {
        let options = self
            .connect_options
            .clone()
            .username(username)
            .password(password);
        let attempt = tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| StoreError::Unavailable("credential check timed out".into()))?;
        match attempt {
            Ok(conn) => {
                let _ = conn.close().await;
                Ok(true)
            }
            Err(sqlx::Error::Database(db)) if is_credential_rejection(db.code().as_deref()) => {
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
