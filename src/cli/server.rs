//! HTTP server mode for REST access to table queries

use axum::{
    extract::{Path, Query as QueryParams, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result, ResultExt};
use crate::sink::CollectingSink;
use crate::tables::{Plugin, Query};
use crate::types::Row;

/// Query parameter carrying the row limit; every other parameter is a qual
const LIMIT_PARAM: &str = "limit";

/// App state shared across handlers
struct AppState {
    plugin: Plugin,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router serving `plugin`
pub fn router(plugin: Plugin) -> Router {
    let state = AppState { plugin };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tables", get(list_tables))
        .route("/tables/:name/rows", get(list_rows))
        .route("/tables/:name/row", get(get_row))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(plugin: Plugin, port: u16) -> Result<()> {
    let app = router(plugin);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Table metadata
async fn list_tables(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tables = state.plugin.tables();
    Json(ApiResponse::success(tables)).into_response()
}

/// List rows; query parameters other than `limit` become quals
async fn list_rows(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    let query = match build_query(params) {
        Ok(query) => query,
        Err(e) => return error_response(&e),
    };

    let mut sink = CollectingSink::<Row>::new();
    match state.plugin.list(&name, &query, &mut sink).await {
        Ok(_) => {
            let rows: Vec<Value> = sink.into_items().into_iter().map(Value::Object).collect();
            (StatusCode::OK, Json(ApiResponse::success(rows))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Fetch the single row addressed by the quals, `null` when absent
async fn get_row(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    let query = match build_query(params) {
        Ok(query) => query,
        Err(e) => return error_response(&e),
    };

    match state.plugin.get(&name, &query).await {
        Ok(row) => {
            let data = row.map_or(Value::Null, Value::Object);
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn build_query(mut params: HashMap<String, String>) -> Result<Query> {
    let mut query = Query::new();
    if let Some(raw) = params.remove(LIMIT_PARAM) {
        let limit = raw
            .parse()
            .map_err(|_| Error::invalid_value(LIMIT_PARAM, format!("'{raw}' is not a row count")))?;
        query = query.limit(limit);
    }
    for (column, value) in params {
        query = query.qual(column, value);
    }
    Ok(query)
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::TableNotFound { .. } => StatusCode::NOT_FOUND,
        e if e.is_misconfiguration() => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: &Error) -> Response {
    (
        status_for(err),
        Json(ApiResponse::<()>::error(err.to_string())),
    )
        .into_response()
}
