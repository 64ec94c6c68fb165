use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coinmcp::store::Note;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Serialize)]
struct CreateNoteRequest {
    content: String,
}

#[derive(Debug, Serialize)]
struct NoteListResponse {
    notes: Vec<Note>,
    total: usize,
}

async fn create_note(
    State(state): State<AppState>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Content cannot be empty".to_string()));
    }
    Ok((StatusCode::CREATED, Json(state.store.insert_note(content))))
}

async fn list_notes(State(state): State<AppState>) -> Json<NoteListResponse> {
    let notes = state.store.list_notes();
    Json(NoteListResponse {
        total: notes.len(),
        notes,
    })
}

async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.store.get_note(id)?))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_note(id)?;
    Ok(Json(json!({
        "message": format!("Note {} deleted successfully", id)
    })))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", get(get_note).delete(delete_note))
        .with_state(state)
}
