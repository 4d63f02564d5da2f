use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

// Admin service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct KbAdminConfig {
    // HTTP API listener.
    pub bind_addr: SocketAddr,
    // Prometheus listener.
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    // Required when `storage` is postgres.
    pub warehouse: Option<WarehouseConfig>,
    pub session_ttl_secs: u64,
    // Adds `Secure` to the session cookie; enable behind TLS.
    pub cookie_secure: bool,
    // Largest accepted planogram upload body.
    pub max_upload_bytes: usize,
    // Login accounts for the in-memory backend (development only).
    pub memory_users: Vec<MemoryUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

/// Warehouse connection settings for the service identity.
///
/// The URL may carry credentials; it is never logged.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MemoryUser {
    pub username: String,
    pub password: String,
}

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9100";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct KbAdminConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    warehouse_url: Option<String>,
    warehouse_max_connections: Option<u32>,
    warehouse_connect_timeout_ms: Option<u64>,
    warehouse_acquire_timeout_ms: Option<u64>,
    session_ttl_secs: Option<u64>,
    cookie_secure: Option<bool>,
    max_upload_bytes: Option<usize>,
    memory_users: Option<Vec<MemoryUser>>,
}

fn env_positive<T: std::str::FromStr + PartialOrd + Default>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .filter(|value| *value > T::default())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl KbAdminConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("CKB_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse CKB_BIND")?;
        let metrics_bind = std::env::var("CKB_METRICS_BIND")
            .unwrap_or_else(|_| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse CKB_METRICS_BIND")?;
        let storage = match std::env::var("CKB_STORAGE") {
            Ok(value) => StorageBackend::parse(&value).with_context(|| "parse CKB_STORAGE")?,
            Err(_) => StorageBackend::Memory,
        };
        let warehouse = std::env::var("CKB_WAREHOUSE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| WarehouseConfig {
                url,
                max_connections: env_positive(
                    "CKB_WAREHOUSE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                ),
                connect_timeout_ms: env_positive(
                    "CKB_WAREHOUSE_CONNECT_TIMEOUT_MS",
                    DEFAULT_CONNECT_TIMEOUT_MS,
                ),
                acquire_timeout_ms: env_positive(
                    "CKB_WAREHOUSE_ACQUIRE_TIMEOUT_MS",
                    DEFAULT_ACQUIRE_TIMEOUT_MS,
                ),
            });
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            warehouse,
            session_ttl_secs: env_positive("CKB_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            cookie_secure: env_flag("CKB_COOKIE_SECURE"),
            max_upload_bytes: env_positive("CKB_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            memory_users: Vec::new(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CKB_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read CKB_CONFIG: {path}"))?;
            let override_cfg: KbAdminConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse kbadmin config yaml")?;
            config.apply(override_cfg)?;
        }
        Ok(config)
    }

    fn apply(&mut self, override_cfg: KbAdminConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = StorageBackend::parse(&value).with_context(|| "parse storage")?;
        }
        if let Some(url) = override_cfg.warehouse_url {
            let warehouse = self.warehouse.get_or_insert_with(|| WarehouseConfig {
                url: String::new(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
                acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            });
            warehouse.url = url;
        }
        if let Some(warehouse) = self.warehouse.as_mut() {
            if let Some(value) = override_cfg.warehouse_max_connections.filter(|v| *v > 0) {
                warehouse.max_connections = value;
            }
            if let Some(value) = override_cfg.warehouse_connect_timeout_ms.filter(|v| *v > 0) {
                warehouse.connect_timeout_ms = value;
            }
            if let Some(value) = override_cfg.warehouse_acquire_timeout_ms.filter(|v| *v > 0) {
                warehouse.acquire_timeout_ms = value;
            }
        }
        if let Some(value) = override_cfg.session_ttl_secs.filter(|v| *v > 0) {
            self.session_ttl_secs = value;
        }
        if let Some(value) = override_cfg.cookie_secure {
            self.cookie_secure = value;
        }
        if let Some(value) = override_cfg.max_upload_bytes.filter(|v| *v > 0) {
            self.max_upload_bytes = value;
        }
        if let Some(users) = override_cfg.memory_users {
            self.memory_users = users;
        }
        Ok(())
    }
}
