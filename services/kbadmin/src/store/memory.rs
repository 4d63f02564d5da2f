//! In-memory implementation of the knowledge-base store.
//!
//! # Purpose
//! Implements [`KnowledgeBaseStore`] with `BTreeMap` tables guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no warehouse required)
//! - exercising the HTTP surface end to end without network access
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: every mutation runs under the write lock
//!   of the table it touches, so count-then-insert and insert-then-attach
//!   sequences are atomic within one process.
//!
//! # Keys
//! Each table assigns its own monotonically increasing key starting at 1,
//! mirroring the warehouse identity columns.
//!
//! # Lock ordering
//! Operations that touch two tables always take `planograms` before
//! `planogram_pdfs`.
use super::{CreatedPlanogram, KnowledgeBaseStore, StoreError, StoreResult, record_write};
use crate::model::{
    Cluster, ClusterFields, FloorPlan, FloorPlanFields, Link, LinkKind, Performance,
    PerformanceFields, Planogram, PlanogramFields, PlanogramListItem, Position, PositionFields,
    Product, ProductFields, Store, StoreFields,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keyed rows for one entity type with warehouse-style key generation.
#[derive(Debug)]
struct Table<T> {
    next_key: i64,
    rows: BTreeMap<i64, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            next_key: 1,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, row: impl FnOnce(i64) -> T) -> T {
        self.insert_keyed(row).1
    }

    fn insert_keyed(&mut self, row: impl FnOnce(i64) -> T) -> (i64, T) {
        let key = self.next_key;
        self.next_key += 1;
        let row = row(key);
        self.rows.insert(key, row.clone());
        (key, row)
    }

    fn get(&self, key: i64) -> Option<T> {
        self.rows.get(&key).cloned()
    }

    fn replace(&mut self, key: i64, row: T) -> Option<T> {
        let slot = self.rows.get_mut(&key)?;
        *slot = row.clone();
        Some(row)
    }

    fn remove(&mut self, key: i64) -> Option<T> {
        self.rows.remove(&key)
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug, Clone)]
struct PdfRow {
    planogram_id: i64,
    bytes: Vec<u8>,
}

/// In-memory knowledge-base store.
///
/// All tables are wrapped in `Arc<RwLock<...>>` so reads proceed concurrently
/// and writes are serialized per table.
pub struct InMemoryStore {
    stores: Arc<RwLock<Table<Store>>>,
    products: Arc<RwLock<Table<Product>>>,
    planograms: Arc<RwLock<Table<Planogram>>>,
    planogram_pdfs: Arc<RwLock<Table<PdfRow>>>,
    floor_plans: Arc<RwLock<Table<FloorPlan>>>,
    positions: Arc<RwLock<Table<Position>>>,
    clusters: Arc<RwLock<Table<Cluster>>>,
    performance: Arc<RwLock<Table<Performance>>>,
    /// Junction rows for every link kind except `PlanogramProduct`, which is
    /// carried by `positions`.
    junctions: Arc<RwLock<HashMap<LinkKind, Vec<(i64, i64)>>>>,
    /// Accepted login credentials (development only).
    users: HashMap<String, String>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            stores: Arc::new(RwLock::new(Table::new())),
            products: Arc::new(RwLock::new(Table::new())),
            planograms: Arc::new(RwLock::new(Table::new())),
            planogram_pdfs: Arc::new(RwLock::new(Table::new())),
            floor_plans: Arc::new(RwLock::new(Table::new())),
            positions: Arc::new(RwLock::new(Table::new())),
            clusters: Arc::new(RwLock::new(Table::new())),
            performance: Arc::new(RwLock::new(Table::new())),
            junctions: Arc::new(RwLock::new(HashMap::new())),
            users: HashMap::new(),
        }
    }

    /// Accept the given `(username, password)` pairs at login.
    pub fn with_users<I, U, P>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        self.users = users
            .into_iter()
            .map(|(user, password)| (user.into(), password.into()))
            .collect();
        self
    }
}

fn not_found(entity: &str) -> StoreError {
    StoreError::NotFound(entity.to_string())
}

#[async_trait]
impl KnowledgeBaseStore for InMemoryStore {
    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        Ok(self.stores.read().await.all())
    }

    async fn get_store(&self, store_id: i64) -> StoreResult<Store> {
        self.stores
            .read()
            .await
            .get(store_id)
            .ok_or_else(|| not_found("store"))
    }

    async fn create_store(&self, fields: StoreFields) -> StoreResult<Store> {
        let store = self
            .stores
            .write()
            .await
            .insert_with(|key| Store::from_fields(key, fields));
        record_write("store", "created");
        Ok(store)
    }

    async fn update_store(&self, store_id: i64, fields: StoreFields) -> StoreResult<Store> {
        let store = self
            .stores
            .write()
            .await
            .replace(store_id, Store::from_fields(store_id, fields))
            .ok_or_else(|| not_found("store"))?;
        record_write("store", "updated");
        Ok(store)
    }

    async fn delete_store(&self, store_id: i64) -> StoreResult<()> {
        self.stores
            .write()
            .await
            .remove(store_id)
            .ok_or_else(|| not_found("store"))?;
        record_write("store", "deleted");
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.all())
    }

    async fn get_product_by_upc(&self, upc: &str) -> StoreResult<Product> {
        self.products
            .read()
            .await
            .rows
            .values()
            .find(|product| product.upc == upc)
            .cloned()
            .ok_or_else(|| not_found("product"))
    }

    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product> {
        let mut products = self.products.write().await;
        if products.rows.values().any(|product| product.upc == fields.upc) {
            return Err(StoreError::Conflict("product upc exists".into()));
        }
        let product = products.insert_with(|key| Product::from_fields(key, fields));
        record_write("product", "created");
        Ok(product)
    }

    async fn update_product(&self, fields: ProductFields) -> StoreResult<Product> {
        let mut products = self.products.write().await;
        let key = products
            .rows
            .values()
            .find(|product| product.upc == fields.upc)
            .map(|product| product.db_key)
            .ok_or_else(|| not_found("product"))?;
        let product = products
            .replace(key, Product::from_fields(key, fields))
            .ok_or_else(|| not_found("product"))?;
        record_write("product", "updated");
        Ok(product)
    }

    async fn delete_product(&self, upc: &str) -> StoreResult<()> {
        let mut products = self.products.write().await;
        let key = products
            .rows
            .values()
            .find(|product| product.upc == upc)
            .map(|product| product.db_key)
            .ok_or_else(|| not_found("product"))?;
        products.remove(key);
        record_write("product", "deleted");
        Ok(())
    }

    async fn list_planograms(&self) -> StoreResult<Vec<PlanogramListItem>> {
        let planograms = self.planograms.read().await;
        let pdfs = self.planogram_pdfs.read().await;
        Ok(planograms
            .all()
            .into_iter()
            .map(|planogram| {
                let pdf_id = pdfs
                    .rows
                    .iter()
                    .find(|(_, pdf)| pdf.planogram_id == planogram.db_key)
                    .map(|(key, _)| *key);
                planogram.with_pdf(pdf_id)
            })
            .collect())
    }

    async fn get_planogram(&self, planogram_id: i64) -> StoreResult<Planogram> {
        self.planograms
            .read()
            .await
            .get(planogram_id)
            .ok_or_else(|| not_found("planogram"))
    }

    async fn create_planogram(
        &self,
        fields: PlanogramFields,
        pdf: Option<Vec<u8>>,
    ) -> StoreResult<CreatedPlanogram> {
        // Hold both locks so the PDF is attached to the key this call generated.
        let mut planograms = self.planograms.write().await;
        let mut pdfs = self.planogram_pdfs.write().await;
        let planogram = planograms.insert_with(|key| Planogram::from_fields(key, fields));
        let planogram_id = planogram.db_key;
        let pdf_id = pdf.map(|bytes| {
            pdfs.insert_keyed(|_| PdfRow {
                planogram_id,
                bytes,
            })
            .0
        });
        record_write("planogram", "created");
        Ok(CreatedPlanogram { planogram, pdf_id })
    }

    async fn update_planogram(
        &self,
        planogram_id: i64,
        fields: PlanogramFields,
    ) -> StoreResult<Planogram> {
        let planogram = self
            .planograms
            .write()
            .await
            .replace(planogram_id, Planogram::from_fields(planogram_id, fields))
            .ok_or_else(|| not_found("planogram"))?;
        record_write("planogram", "updated");
        Ok(planogram)
    }

    async fn delete_planogram(&self, planogram_id: i64) -> StoreResult<()> {
        let mut planograms = self.planograms.write().await;
        let mut pdfs = self.planogram_pdfs.write().await;
        planograms
            .remove(planogram_id)
            .ok_or_else(|| not_found("planogram"))?;
        pdfs.rows.retain(|_, pdf| pdf.planogram_id != planogram_id);
        record_write("planogram", "deleted");
        Ok(())
    }

    async fn get_planogram_pdf(&self, pdf_id: i64) -> StoreResult<Vec<u8>> {
        self.planogram_pdfs
            .read()
            .await
            .get(pdf_id)
            .map(|pdf| pdf.bytes)
            .ok_or_else(|| not_found("pdf"))
    }

    async fn get_pdf_for_planogram(&self, planogram_id: i64) -> StoreResult<Vec<u8>> {
        self.planogram_pdfs
            .read()
            .await
            .rows
            .values()
            .find(|pdf| pdf.planogram_id == planogram_id)
            .map(|pdf| pdf.bytes.clone())
            .ok_or_else(|| not_found("pdf"))
    }

    async fn list_floor_plans(&self) -> StoreResult<Vec<FloorPlan>> {
        Ok(self.floor_plans.read().await.all())
    }

    async fn get_floor_plan(&self, floor_plan_id: i64) -> StoreResult<FloorPlan> {
        self.floor_plans
            .read()
            .await
            .get(floor_plan_id)
            .ok_or_else(|| not_found("floor plan"))
    }

    async fn create_floor_plan(&self, fields: FloorPlanFields) -> StoreResult<FloorPlan> {
        let floor_plan = self
            .floor_plans
            .write()
            .await
            .insert_with(|key| FloorPlan::from_fields(key, fields));
        record_write("floor_plan", "created");
        Ok(floor_plan)
    }

    async fn update_floor_plan(
        &self,
        floor_plan_id: i64,
        fields: FloorPlanFields,
    ) -> StoreResult<FloorPlan> {
        let floor_plan = self
            .floor_plans
            .write()
            .await
            .replace(floor_plan_id, FloorPlan::from_fields(floor_plan_id, fields))
            .ok_or_else(|| not_found("floor plan"))?;
        record_write("floor_plan", "updated");
        Ok(floor_plan)
    }

    async fn delete_floor_plan(&self, floor_plan_id: i64) -> StoreResult<()> {
        self.floor_plans
            .write()
            .await
            .remove(floor_plan_id)
            .ok_or_else(|| not_found("floor plan"))?;
        record_write("floor_plan", "deleted");
        Ok(())
    }

    async fn list_positions(&self) -> StoreResult<Vec<Position>> {
        Ok(self.positions.read().await.all())
    }

    async fn get_position(&self, position_id: i64) -> StoreResult<Position> {
        self.positions
            .read()
            .await
            .get(position_id)
            .ok_or_else(|| not_found("position"))
    }

    async fn create_position(&self, fields: PositionFields) -> StoreResult<Position> {
        let position = self
            .positions
            .write()
            .await
            .insert_with(|key| Position::from_fields(key, fields));
        record_write("position", "created");
        Ok(position)
    }

    async fn update_position(
        &self,
        position_id: i64,
        fields: PositionFields,
    ) -> StoreResult<Position> {
        let position = self
            .positions
            .write()
            .await
            .replace(position_id, Position::from_fields(position_id, fields))
            .ok_or_else(|| not_found("position"))?;
        record_write("position", "updated");
        Ok(position)
    }

    async fn delete_position(&self, position_id: i64) -> StoreResult<()> {
        self.positions
            .write()
            .await
            .remove(position_id)
            .ok_or_else(|| not_found("position"))?;
        record_write("position", "deleted");
        Ok(())
    }

    async fn list_clusters(&self) -> StoreResult<Vec<Cluster>> {
        Ok(self.clusters.read().await.all())
    }

    async fn get_cluster(&self, cluster_id: i64) -> StoreResult<Cluster> {
        self.clusters
            .read()
            .await
            .get(cluster_id)
            .ok_or_else(|| not_found("cluster"))
    }

    async fn create_cluster(&self, fields: ClusterFields) -> StoreResult<Cluster> {
        let cluster = self
            .clusters
            .write()
            .await
            .insert_with(|key| Cluster::from_fields(key, fields));
        record_write("cluster", "created");
        Ok(cluster)
    }

    async fn update_cluster(
        &self,
        cluster_id: i64,
        fields: ClusterFields,
    ) -> StoreResult<Cluster> {
        let cluster = self
            .clusters
            .write()
            .await
            .replace(cluster_id, Cluster::from_fields(cluster_id, fields))
            .ok_or_else(|| not_found("cluster"))?;
        record_write("cluster", "updated");
        Ok(cluster)
    }

    async fn delete_cluster(&self, cluster_id: i64) -> StoreResult<()> {
        self.clusters
            .write()
            .await
            .remove(cluster_id)
            .ok_or_else(|| not_found("cluster"))?;
        record_write("cluster", "deleted");
        Ok(())
    }

    async fn list_performance(&self) -> StoreResult<Vec<Performance>> {
        Ok(self.performance.read().await.all())
    }

    async fn get_performance(&self, performance_id: i64) -> StoreResult<Performance> {
        self.performance
            .read()
            .await
            .get(performance_id)
            .ok_or_else(|| not_found("performance"))
    }

    async fn create_performance(&self, fields: PerformanceFields) -> StoreResult<Performance> {
        let performance = self
            .performance
            .write()
            .await
            .insert_with(|key| Performance::from_fields(key, fields));
        record_write("performance", "created");
        Ok(performance)
    }

    async fn update_performance(
        &self,
        performance_id: i64,
        fields: PerformanceFields,
    ) -> StoreResult<Performance> {
        let performance = self
            .performance
            .write()
            .await
            .replace(
                performance_id,
                Performance::from_fields(performance_id, fields),
            )
            .ok_or_else(|| not_found("performance"))?;
        record_write("performance", "updated");
        Ok(performance)
    }

    async fn delete_performance(&self, performance_id: i64) -> StoreResult<()> {
        self.performance
            .write()
            .await
            .remove(performance_id)
            .ok_or_else(|| not_found("performance"))?;
        record_write("performance", "deleted");
        Ok(())
    }

    async fn link(&self, link: Link) -> StoreResult<()> {
        if link.kind == LinkKind::PlanogramProduct {
            let mut positions = self.positions.write().await;
            let count = positions
                .rows
                .values()
                .filter(|position| {
                    position.db_planogram_parent_key == link.parent_id
                        && position.db_product_parent_key == link.child_id
                })
                .count();
            if count > 0 {
                return Err(StoreError::Conflict("already linked".into()));
            }
            positions.insert_with(|key| {
                Position::from_fields(key, PositionFields::unplaced(link.parent_id, link.child_id))
            });
        } else {
            let mut junctions = self.junctions.write().await;
            let pairs = junctions.entry(link.kind).or_default();
            let count = pairs
                .iter()
                .filter(|pair| **pair == (link.parent_id, link.child_id))
                .count();
            if count > 0 {
                return Err(StoreError::Conflict("already linked".into()));
            }
            pairs.push((link.parent_id, link.child_id));
        }
        record_write(link.kind.as_str(), "linked");
        Ok(())
    }

    async fn unlink(&self, link: Link) -> StoreResult<()> {
        let removed = if link.kind == LinkKind::PlanogramProduct {
            let mut positions = self.positions.write().await;
            let before = positions.rows.len();
            positions.rows.retain(|_, position| {
                !(position.db_planogram_parent_key == link.parent_id
                    && position.db_product_parent_key == link.child_id)
            });
            before - positions.rows.len()
        } else {
            let mut junctions = self.junctions.write().await;
            let pairs = junctions.entry(link.kind).or_default();
            let before = pairs.len();
            pairs.retain(|pair| *pair != (link.parent_id, link.child_id));
            before - pairs.len()
        };
        if removed == 0 {
            return Err(not_found("link"));
        }
        record_write(link.kind.as_str(), "unlinked");
        Ok(())
    }

    async fn list_cluster_stores(&self, cluster_id: i64) -> StoreResult<Vec<Store>> {
        let store_ids = linked_children(&self.junctions, LinkKind::ClusterStore, cluster_id).await;
        let stores = self.stores.read().await;
        Ok(store_ids.into_iter().filter_map(|id| stores.get(id)).collect())
    }

    async fn list_store_floor_plans(&self, store_id: i64) -> StoreResult<Vec<FloorPlan>> {
        let floor_plan_ids =
            linked_children(&self.junctions, LinkKind::StoreFloorPlan, store_id).await;
        let floor_plans = self.floor_plans.read().await;
        Ok(floor_plan_ids
            .into_iter()
            .filter_map(|id| floor_plans.get(id))
            .collect())
    }

    async fn list_floor_plan_planograms(&self, floor_plan_id: i64) -> StoreResult<Vec<Planogram>> {
        let planogram_ids =
            linked_children(&self.junctions, LinkKind::FloorPlanPlanogram, floor_plan_id).await;
        let planograms = self.planograms.read().await;
        Ok(planogram_ids
            .into_iter()
            .filter_map(|id| planograms.get(id))
            .collect())
    }

    async fn list_planogram_products(&self, planogram_id: i64) -> StoreResult<Vec<Product>> {
        let positions = self.positions.read().await;
        let products = self.products.read().await;
        Ok(positions
            .rows
            .values()
            .filter(|position| position.db_planogram_parent_key == planogram_id)
            .filter_map(|position| products.get(position.db_product_parent_key))
            .collect())
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<bool> {
        Ok(self
            .users
            .get(username)
            .is_some_and(|expected| expected == password))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

async fn linked_children(
    junctions: &RwLock<HashMap<LinkKind, Vec<(i64, i64)>>>,
    kind: LinkKind,
    parent_id: i64,
) -> Vec<i64> {
    junctions
        .read()
        .await
        .get(&kind)
        .map(|pairs| {
            pairs
                .iter()
                .filter(|(parent, _)| *parent == parent_id)
                .map(|(_, child)| *child)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_fields(name: &str) -> StoreFields {
        StoreFields {
            store_name: name.to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            db_status: 1,
        }
    }

    #[tokio::test]
    async fn keys_are_generated_in_order() {
        let store = InMemoryStore::new();
        let first = store.create_store(store_fields("North")).await.expect("first");
        let second = store.create_store(store_fields("South")).await.expect("second");
        assert_eq!(first.store_id, 1);
        assert_eq!(second.store_id, 2);
        assert_eq!(store.list_stores().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows_are_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update_store(42, store_fields("Ghost"))
            .await
            .expect_err("update missing");
        assert!(matches!(err, StoreError::NotFound(_)));
        let err = store.delete_store(42).await.expect_err("delete missing");
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.list_stores().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn duplicate_upc_conflicts() {
        let store = InMemoryStore::new();
        let fields = ProductFields {
            upc: "0001".to_string(),
            product_name: "Cola".to_string(),
            category: "Beverage".to_string(),
            subcategory: "Soda".to_string(),
            dimensions: "4x4x12".to_string(),
            weight: 0.5,
            price: Some(1.99),
            db_status: 1,
        };
        store.create_product(fields.clone()).await.expect("create");
        let err = store.create_product(fields).await.expect_err("dup");
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn junction_pairs_are_unique_and_removable() {
        let store = InMemoryStore::new();
        let link = Link::new(LinkKind::ClusterStore, 1, 2);
        store.link(link).await.expect("first link");
        let err = store.link(link).await.expect_err("second link");
        assert!(matches!(err, StoreError::Conflict(_)));
        store.unlink(link).await.expect("unlink");
        let err = store.unlink(link).await.expect_err("unlink again");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn planogram_product_links_use_positions() {
        let store = InMemoryStore::new();
        store
            .link(Link::new(LinkKind::PlanogramProduct, 7, 9))
            .await
            .expect("link");
        let positions = store.list_positions().await.expect("positions");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].db_planogram_parent_key, 7);
        assert_eq!(positions[0].db_product_parent_key, 9);
        assert_eq!(positions[0].h_facing, 0);
    }

    #[tokio::test]
    async fn deleting_planogram_drops_its_pdf() {
        let store = InMemoryStore::new();
        let created = store
            .create_planogram(
                PlanogramFields {
                    planogram_name: "Endcap".to_string(),
                    db_status: 1,
                },
                Some(b"%PDF-1.4".to_vec()),
            )
            .await
            .expect("create");
        let pdf_id = created.pdf_id.expect("pdf id");
        store
            .delete_planogram(created.planogram.db_key)
            .await
            .expect("delete");
        let err = store.get_planogram_pdf(pdf_id).await.expect_err("pdf gone");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn verify_credentials_checks_configured_users() {
        let store = InMemoryStore::new().with_users([("analyst", "secret")]);
        assert!(store.verify_credentials("analyst", "secret").await.expect("ok"));
        assert!(!store.verify_credentials("analyst", "wrong").await.expect("ok"));
        assert!(!store.verify_credentials("nobody", "secret").await.expect("ok"));
    }
}
