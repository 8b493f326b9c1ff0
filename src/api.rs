// QuantumCoin Wallet - REST API with Axum

use crate::balance::{BalanceResponse, ErrorResponse, ADDRESS_PARAM};
use crate::ledger::{count_addresses, get_balance};
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub http_port: String,
}

impl AppState {
    pub fn new(conn: Connection, http_port: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            http_port: http_port.into(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    addresses: i64,
    #[serde(rename = "httpPort")]
    http_port: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn lookup(state: &AppState, address: &str) -> Response {
    let address = address.trim();
    if address.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "address required");
    }

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "ledger unavailable"),
    };

    match get_balance(&conn, address) {
        Ok(balance) => (
            StatusCode::OK,
            Json(BalanceResponse {
                address: address.to_string(),
                balance,
            }),
        )
            .into_response(),
        Err(e) => {
            log::error!("Error reading balance for {}: {:#}", address, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read balance")
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/address/balance?addr=... - Balance lookup used by the wallet page
async fn address_balance(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let address = params.get(ADDRESS_PARAM).map(String::as_str).unwrap_or("");
    lookup(&state, address)
}

/// GET /api/wallet/balance/*rest - Path-style lookup kept for node clients.
/// Only the first segment is the address; anything after it is ignored.
async fn wallet_balance(State(state): State<AppState>, Path(rest): Path<String>) -> Response {
    let address = rest.trim_start_matches('/').split('/').next().unwrap_or("");
    lookup(&state, address)
}

/// GET /api/wallet/balance/ - No address segment at all
async fn wallet_balance_missing(State(state): State<AppState>) -> Response {
    lookup(&state, "")
}

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> Response {
    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return error_response(StatusCode::SERVICE_UNAVAILABLE, "ledger unavailable"),
    };

    match count_addresses(&conn) {
        Ok(addresses) => Json(HealthResponse {
            ok: true,
            addresses,
            http_port: state.http_port.clone(),
        })
        .into_response(),
        Err(e) => {
            log::error!("Health check failed: {:#}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "ledger unavailable")
        }
    }
}

/// GET / - Serve the wallet page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    log::info!("{} {} {} {:?}", method, path, response.status().as_u16(), start.elapsed());
    response
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/address/balance", get(address_balance))
        .route("/wallet/balance", get(wallet_balance_missing))
        .route("/wallet/balance/", get(wallet_balance_missing))
        .route("/wallet/balance/*rest", get(wallet_balance))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{setup_database, upsert_balances, BalanceRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        upsert_balances(
            &mut conn,
            &[BalanceRecord {
                address: "abc".to_string(),
                balance: 42,
            }],
        )
        .unwrap();
        router(AppState::new(conn, ":8081"))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_query_balance() {
        let (status, json) = get_json(test_router(), "/api/address/balance?addr=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["address"], "abc");
        assert_eq!(json["balance"], 42);
    }

    #[tokio::test]
    async fn test_unknown_address_is_zero() {
        let (status, json) = get_json(test_router(), "/api/address/balance?addr=QC%20new").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["address"], "QC new");
        assert_eq!(json["balance"], 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_bad_request() {
        for uri in ["/api/address/balance", "/api/address/balance?addr="] {
            let (status, json) = get_json(test_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "address required");
        }
    }

    #[tokio::test]
    async fn test_path_balance() {
        let (status, json) = get_json(test_router(), "/api/wallet/balance/abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["balance"], 42);
    }

    #[tokio::test]
    async fn test_path_balance_without_address() {
        for uri in ["/api/wallet/balance/", "/api/wallet/balance"] {
            let (status, json) = get_json(test_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "address required");
        }
    }

    #[tokio::test]
    async fn test_path_balance_uses_first_segment() {
        let (status, json) = get_json(test_router(), "/api/wallet/balance/abc/extra").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["address"], "abc");
        assert_eq!(json["balance"], 42);
    }

    /// Router over a connection that never had its schema created
    fn router_without_schema() -> Router {
        router(AppState::new(Connection::open_in_memory().unwrap(), ":8081"))
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let (status, json) = get_json(router_without_schema(), "/api/address/balance?addr=abc").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorResponse = serde_json::from_value(json).unwrap();
        assert_eq!(body, ErrorResponse::new("failed to read balance"));
    }

    #[tokio::test]
    async fn test_health_reports_unavailable_ledger() {
        let (status, json) = get_json(router_without_schema(), "/api/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let body: ErrorResponse = serde_json::from_value(json).unwrap();
        assert_eq!(body, ErrorResponse::new("ledger unavailable"));
    }

    #[tokio::test]
    async fn test_poisoned_ledger_lock_is_server_error() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        let state = AppState::new(conn, ":8081");

        let db = state.db.clone();
        let _ = std::thread::spawn(move || {
            let _guard = db.lock().unwrap();
            panic!("writer died holding the ledger lock");
        })
        .join();
        assert!(state.db.is_poisoned());

        let (status, json) = get_json(router(state.clone()), "/api/address/balance?addr=abc").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "ledger unavailable");

        let (status, json) = get_json(router(state), "/api/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json(test_router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["addresses"], 1);
        assert_eq!(json["httpPort"], ":8081");
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = test_router()
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("QuantumCoin Wallet"));
        assert!(html.contains("/api/address/balance"));
    }
}
