//! Logging, trace propagation and the Prometheus exporter.
//!
//! Every counter the service exports is named here. Handlers and stores go
//! through [`record_store_write`] and [`record_login`] rather than calling the
//! `metrics` macros with string literals of their own.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Committed knowledge base writes, labelled `entity` and `op`.
pub const STORE_WRITES_TOTAL: &str = "ckb_store_writes_total";
/// Login attempts, labelled `outcome`.
pub const LOGINS_TOTAL: &str = "ckb_logins_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static SUBSCRIBER_INIT: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Rejected,
    Error,
}

impl LoginOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

pub fn record_store_write(entity: &'static str, op: &'static str) {
    metrics::counter!(STORE_WRITES_TOTAL, "entity" => entity, "op" => op).increment(1);
}

pub fn record_login(outcome: LoginOutcome) {
    metrics::counter!(LOGINS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

fn describe_metrics() {
    metrics::describe_counter!(
        STORE_WRITES_TOTAL,
        "Committed knowledge base writes by entity and operation"
    );
    metrics::describe_counter!(LOGINS_TOTAL, "Login attempts by outcome");
}

/// Install the log subscriber and the global Prometheus recorder. Safe to call
/// more than once; later calls return the first handle.
pub fn init_observability(service_name: &str) -> PrometheusHandle {
    SUBSCRIBER_INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        match build_tracer_provider(service_name) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                let _ = registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init();
            }
            None => {
                let _ = registry.try_init();
            }
        }
    });

    METRICS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new().install_recorder().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "metrics recorder already installed");
                PrometheusBuilder::new().build_recorder().handle()
            });
            describe_metrics();
            handle
        })
        .clone()
}

fn build_tracer_provider(service_name: &str) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let instance = std::env::var("CKB_SERVICE_INSTANCE_ID")
        .or_else(|_| std::env::var("HOSTNAME"))
        .ok();
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    Some(
        opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(
                Resource::builder_empty()
                    .with_attributes(resource_attributes(service_name, instance))
                    .build(),
            )
            .build(),
    )
}

fn resource_attributes(service_name: &str, instance: Option<String>) -> Vec<KeyValue> {
    let mut attrs = vec![KeyValue::new("service.name", service_name.to_string())];
    if let Some(instance) = instance.filter(|value| !value.is_empty()) {
        attrs.push(KeyValue::new("service.instance.id", instance));
    }
    attrs
}

/// Parent context for a request span, read from its `traceparent` header.
pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    TraceContextPropagator::new().extract(&HeaderMapExtractor(headers))
}

struct HeaderMapExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listening");
    serve_metrics_on(listener, handle, std::future::pending()).await
}

async fn serve_metrics_on<F>(
    listener: tokio::net::TcpListener,
    handle: PrometheusHandle,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}
