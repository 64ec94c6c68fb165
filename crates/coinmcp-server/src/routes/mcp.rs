use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use coinmcp::models::tool::ToolCall;
use serde_json::json;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !state.auth.verify(authorization) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.router.tools() }))
}

async fn call_tool(
    State(state): State<AppState>,
    Json(call): Json<ToolCall>,
) -> Result<Response, ApiError> {
    let known = state.router.has_tool(&call.name);
    let response = state.router.dispatch(call).await?;

    if known {
        Ok(Json(response).into_response())
    } else {
        warn!("Rejected call to unknown tool: {}", response.text());
        Ok((StatusCode::NOT_FOUND, Json(response)).into_response())
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/mcp/list-tools", post(list_tools))
        .route("/mcp/call-tool", post(call_tool))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, empty_request, json_request, state, API_KEY};
    use axum::{body::Body, http::Request as HttpRequest};
    use tower::ServiceExt;

    fn authorized(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        let mut request = json_request("POST", uri, body);
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", API_KEY).parse().unwrap(),
        );
        request
    }

    #[tokio::test]
    async fn test_list_tools_requires_auth() {
        let app = routes(state());

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/mcp/list-tools"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["detail"], "Invalid or missing API key");

        let mut request = empty_request("POST", "/mcp/list-tools");
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_tools() {
        let response = routes(state())
            .oneshot(authorized("/mcp/list-tools", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let names: Vec<&str> = body["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["get_crypto_price", "get_trending_coins", "get_market_data"]
        );
        assert_eq!(
            body["tools"][0]["inputSchema"]["required"],
            json!(["coin_id"])
        );
    }

    #[tokio::test]
    async fn test_call_tool_requires_auth_before_dispatch() {
        let response = routes(state())
            .oneshot(json_request(
                "POST",
                "/mcp/call-tool",
                json!({"name": "get_crypto_price", "arguments": {"coin_id": "bitcoin"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let response = routes(state())
            .oneshot(authorized(
                "/mcp/call-tool",
                json!({"name": "get_crypto_price", "arguments": {"coin_id": "bitcoin", "vs_currency": "eur"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["isError"], false);
        assert_eq!(body["content"][0]["type"], "text");
        let payload: serde_json::Value =
            serde_json::from_str(body["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(payload["coin"], "bitcoin");
        assert_eq!(payload["currency"], "eur");
        assert_eq!(payload["price"], 50000.0);
    }

    #[tokio::test]
    async fn test_call_tool_missing_coin_id_is_validation_error() {
        let response = routes(state())
            .oneshot(authorized(
                "/mcp/call-tool",
                json!({"name": "get_crypto_price", "arguments": {}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["detail"], "Missing required parameter: coin_id");
        assert_eq!(body["status_code"], 400);
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let response = routes(state())
            .oneshot(authorized(
                "/mcp/call-tool",
                json!({"name": "get_weather", "arguments": {}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["isError"], true);
        assert_eq!(body["content"][0]["text"], "Tool 'get_weather' not found");
    }

    #[tokio::test]
    async fn test_upstream_failure_travels_in_envelope() {
        let app = routes(state());

        let response = app
            .clone()
            .oneshot(authorized(
                "/mcp/call-tool",
                json!({"name": "get_trending_coins"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["isError"], true);
        assert_eq!(
            body["content"][0]["text"],
            "Rate limit exceeded. Please try again later."
        );

        let response = app
            .oneshot(authorized(
                "/mcp/call-tool",
                json!({"name": "get_crypto_price", "arguments": {"coin_id": "dogecorn"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["isError"], true);
        assert_eq!(
            body["content"][0]["text"],
            "Coin 'dogecorn' not found. Please check the coin ID."
        );
    }
}
