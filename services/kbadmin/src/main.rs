//! Knowledge base admin service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the session table and the HTTP router, then
//! serves until interrupted.
use anyhow::Context;
use kbadmin::app::{AppState, build_router};
use kbadmin::auth::session::SessionStore;
use kbadmin::config::{self, KbAdminConfig};
use kbadmin::observability;
use kbadmin::store::{KnowledgeBaseStore, memory::InMemoryStore, postgres::PostgresStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = KbAdminConfig::from_env_or_yaml().context("load kbadmin config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: KbAdminConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("kbadmin");
    let state = build_state(&config).await?;
    tracing::info!(
        backend = state.store.backend_name(),
        durable = state.store.is_durable(),
        "knowledge base storage ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));
    let purge_task = tokio::spawn(purge_sessions(state.sessions.clone()));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "kbadmin listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    purge_task.abort();
    let _ = metrics_task.await;
    let _ = purge_task.await;
    Ok(())
}

async fn purge_sessions(sessions: SessionStore) {
    let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
    loop {
        ticker.tick().await;
        let purged = sessions.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }
    }
}

async fn build_state(config: &KbAdminConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn KnowledgeBaseStore + Send + Sync> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new().with_users(
            config
                .memory_users
                .iter()
                .map(|user| (user.username.clone(), user.password.clone())),
        )),
        config::StorageBackend::Postgres => {
            let warehouse = config
                .warehouse
                .as_ref()
                .context("warehouse configuration missing")?;
            Arc::new(
                PostgresStore::connect(warehouse)
                    .await
                    .context("connect to warehouse")?,
            )
        }
    };

    Ok(AppState {
        store,
        sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
        cookie_secure: config.cookie_secure,
        max_upload_bytes: config.max_upload_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbadmin::config::{MemoryUser, StorageBackend, WarehouseConfig};
    use serial_test::serial;

    fn test_config(storage: StorageBackend, warehouse: Option<WarehouseConfig>) -> KbAdminConfig {
        KbAdminConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            storage,
            warehouse,
            session_ttl_secs: 60,
            cookie_secure: false,
            max_upload_bytes: 1024,
            memory_users: vec![MemoryUser {
                username: "analyst".to_string(),
                password: "secret".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn build_state_memory_backend() {
        let state = build_state(&test_config(StorageBackend::Memory, None))
            .await
            .expect("state");
        assert_eq!(state.store.backend_name(), "memory");
        assert!(!state.store.is_durable());
        assert_eq!(state.max_upload_bytes, 1024);
        assert!(
            state
                .store
                .verify_credentials("analyst", "secret")
                .await
                .expect("verify")
        );
    }

    #[tokio::test]
    async fn build_state_postgres_requires_config() {
        let err = build_state(&test_config(StorageBackend::Postgres, None))
            .await
            .err()
            .expect("missing warehouse");
        assert!(err.to_string().contains("warehouse configuration missing"));
    }

    #[tokio::test]
    async fn build_state_postgres_fails_when_warehouse_unreachable() {
        let warehouse = WarehouseConfig {
            url: "postgres://kb:kb@127.0.0.1:1/kb".to_string(),
            max_connections: 1,
            connect_timeout_ms: 500,
            acquire_timeout_ms: 500,
        };
        let err = build_state(&test_config(StorageBackend::Postgres, Some(warehouse)))
            .await
            .err()
            .expect("connect should fail");
        assert!(err.to_string().contains("connect to warehouse"));
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        run_with_shutdown(test_config(StorageBackend::Memory, None), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
