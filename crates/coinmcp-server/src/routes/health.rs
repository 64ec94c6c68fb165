use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

async fn info() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "MCP",
        "description": "Cryptocurrency financial data MCP server",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub fn routes() -> Router {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
}
