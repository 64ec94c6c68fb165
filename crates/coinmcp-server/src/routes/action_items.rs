use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use coinmcp::{extract::ExtractionMethod, store::ActionItem};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Serialize)]
struct ExtractRequest {
    text: String,
    #[serde(default)]
    save_note: bool,
    #[serde(default)]
    use_llm: bool,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    note_id: Option<i64>,
    items: Vec<ActionItem>,
    extraction_method: ExtractionMethod,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    note_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct MarkDoneRequest {
    #[serde(default = "default_done")]
    done: bool,
}

#[derive(Debug, Serialize)]
struct MarkDoneResponse {
    id: i64,
    done: bool,
}

fn default_done() -> bool {
    true
}

async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Text cannot be empty".to_string()));
    }

    let note_id = request
        .save_note
        .then(|| state.store.insert_note(text).id);

    let extraction = state.extractor.extract(text, request.use_llm).await;
    let items = state
        .store
        .insert_action_items(&extraction.items, note_id);
    info!(
        "Extracted {} action items ({:?})",
        items.len(),
        extraction.extraction_method
    );

    Ok(Json(ExtractResponse {
        note_id,
        items,
        extraction_method: extraction.extraction_method,
    }))
}

async fn list_action_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ActionItem>> {
    Json(state.store.list_action_items(query.note_id))
}

async fn get_action_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ActionItem>, ApiError> {
    Ok(Json(state.store.get_action_item(id)?))
}

async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MarkDoneRequest>,
) -> Result<Json<MarkDoneResponse>, ApiError> {
    let item = state.store.mark_done(id, request.done)?;
    Ok(Json(MarkDoneResponse {
        id: item.id,
        done: item.done,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/action-items/extract", post(extract))
        .route("/action-items", get(list_action_items))
        .route("/action-items/:id", get(get_action_item))
        .route("/action-items/:id/done", post(mark_done))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, empty_request, json_request, state};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_extract_heuristic_without_note() {
        let response = routes(state())
            .oneshot(json_request(
                "POST",
                "/action-items/extract",
                json!({"text": "- [ ] Set up database\n* implement API\nSome narrative."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["note_id"], serde_json::Value::Null);
        assert_eq!(body["extraction_method"], "heuristic");
        assert_eq!(body["items"][0]["text"], "Set up database");
        assert_eq!(body["items"][1]["text"], "implement API");
        assert_eq!(body["items"][0]["done"], false);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_extract_with_llm_and_saved_note() {
        let app = routes(state());
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/action-items/extract",
                json!({"text": "free-form notes", "save_note": true, "use_llm": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["note_id"], 1);
        assert_eq!(body["extraction_method"], "llm");
        assert_eq!(body["items"], json!([{
            "id": 1,
            "text": "Ask the model",
            "note_id": 1,
            "done": false,
            "created_at": body["items"][0]["created_at"],
        }]));

        let response = app
            .oneshot(empty_request("GET", "/action-items?note_id=1"))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_rejects_blank_text() {
        let response = routes(state())
            .oneshot(json_request(
                "POST",
                "/action-items/extract",
                json!({"text": "   \n"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["detail"], "Text cannot be empty");
    }

    #[tokio::test]
    async fn test_list_filter_and_mark_done() {
        let app = routes(state());
        for (text, save) in [("- one\n- two", true), ("- three", false)] {
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/action-items/extract",
                    json!({"text": text, "save_note": save}),
                ))
                .await
                .unwrap();
        }

        let all = body_json(
            app.clone()
                .oneshot(empty_request("GET", "/action-items"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let for_note = body_json(
            app.clone()
                .oneshot(empty_request("GET", "/action-items?note_id=1"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(for_note.as_array().unwrap().len(), 2);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/action-items/3/done",
                json!({"done": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"id": 3, "done": true}));

        let item = body_json(
            app.oneshot(empty_request("GET", "/action-items/3"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(item["text"], "three");
        assert_eq!(item["done"], true);
    }

    #[tokio::test]
    async fn test_unknown_action_item() {
        let app = routes(state());

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/action-items/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["detail"], "Action item with id 42 not found");

        let response = app
            .oneshot(json_request("POST", "/action-items/42/done", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
