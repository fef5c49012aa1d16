use crate::defaults;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
};
use tzindex_database::{ColumnType, FieldDescriptor, ModelDescriptor, ModelRegistry};
use tzindex_lib::config::HasuraConfig;

/// What the fake gateway has seen and what it currently holds.
#[derive(Debug)]
pub struct GatewayState {
    /// Number of upcoming `/healthz` calls answered with 503.
    pub unhealthy_for: usize,
    pub health_calls: usize,
    /// Answer `replace_metadata` with an error payload.
    pub reject_replace: bool,
    pub metadata: Value,
    /// `type` of every `/v1/query` body, in order.
    pub queries: Vec<String>,
    pub admin_secrets: Vec<Option<String>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            unhealthy_for: 0,
            health_calls: 0,
            reject_replace: false,
            metadata: json!({"version": 2, "tables": []}),
            queries: Vec::new(),
            admin_secrets: Vec::new(),
        }
    }
}

pub type SharedGateway = Arc<Mutex<GatewayState>>;

async fn healthz(State(state): State<SharedGateway>) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.health_calls += 1;
    if state.unhealthy_for > 0 {
        state.unhealthy_for -= 1;
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn query(
    State(state): State<SharedGateway>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.admin_secrets.push(
        headers
            .get("x-hasura-admin-secret")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let kind = body["type"].as_str().unwrap_or_default().to_string();
    state.queries.push(kind.clone());

    match kind.as_str() {
        "export_metadata" => (StatusCode::OK, Json(state.metadata.clone())),
        "replace_metadata" if state.reject_replace => (
            StatusCode::OK,
            Json(json!({"code": "constraint-violation", "error": "table not found"})),
        ),
        "replace_metadata" => {
            state.metadata = body["args"].clone();
            (StatusCode::OK, Json(json!({"message": "success"})))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": "parse-failed", "error": "unknown query type"})),
        ),
    }
}

/// Serve a fake Hasura gateway on an ephemeral port.
pub async fn spawn_gateway(state: GatewayState) -> (SocketAddr, SharedGateway) {
    let shared = Arc::new(Mutex::new(state));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/query", post(query))
        .with_state(shared.clone());

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());

    tokio::spawn(async move {
        server.await.unwrap();
    });

    (addr, shared)
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A listener whose backlog completes handshakes but which never reads or
/// answers. Keep it alive for as long as the gateway should hang.
pub fn silent_gateway() -> (SocketAddr, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (addr, listener)
}

pub fn hasura_config(addr: SocketAddr, attempts: usize) -> HasuraConfig {
    HasuraConfig {
        url: format!("http://{addr}/"),
        admin_secret: Some(defaults::ADMIN_SECRET.to_string()),
        health_check_attempts: attempts,
        health_check_interval_ms: defaults::HEALTH_CHECK_INTERVAL_MS,
        health_check_timeout_ms: defaults::HEALTH_CHECK_TIMEOUT_MS,
    }
}

/// `Account` and a `Token` whose `holder` points at it.
pub fn token_registry(related_name: Option<&'static str>) -> ModelRegistry {
    ModelRegistry::new()
        .register_descriptor(
            ModelDescriptor::new("models", "Token")
                .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
                .field(FieldDescriptor::foreign_key(
                    "holder",
                    "models.Account",
                    related_name,
                    ColumnType::Address,
                )),
        )
        .register_descriptor(
            ModelDescriptor::new("models", "Account")
                .field(FieldDescriptor::primary_key("address", ColumnType::Address)),
        )
}
