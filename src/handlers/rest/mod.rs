mod extract;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{ErrorResponse, NoteResponse, SaveNoteRequest, SaveNoteResponse},
    service::{NoteService, NoteServiceError},
};

use extract::NoteContent;

/// Request bodies above this many bytes are refused before parsing.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(get_note, save_note),
    components(schemas(NoteResponse, SaveNoteRequest, SaveNoteResponse, ErrorResponse)),
    tags(
        (name = "note", description = "Single note storage API")
    )
)]
pub struct ApiDoc;

pub fn router(service: Arc<NoteService>) -> Router {
    Router::new()
        .route("/api/note", get(get_note).post(save_note))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/api/note",
    responses(
        (status = 200, description = "Current note, empty if never saved", body = NoteResponse),
        (status = 500, description = "Note could not be read", body = ErrorResponse)
    ),
    tag = "note"
)]
#[debug_handler]
pub async fn get_note(State(service): State<Arc<NoteService>>) -> Response {
    match service.get_note().await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => {
            tracing::error!("failed to read note: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read note")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/note",
    request_body = SaveNoteRequest,
    responses(
        (status = 200, description = "Note saved", body = SaveNoteResponse),
        (status = 413, description = "Content or request body too large", body = ErrorResponse),
        (status = 500, description = "Note could not be written", body = ErrorResponse)
    ),
    tag = "note"
)]
#[debug_handler]
pub async fn save_note(
    State(service): State<Arc<NoteService>>,
    NoteContent(content): NoteContent,
) -> Response {
    match service.save_note(content).await {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(NoteServiceError::ContentTooLarge { length }) => {
            tracing::warn!("rejected note of length {}", length);
            error_response(StatusCode::PAYLOAD_TOO_LARGE, "Content too large")
        }
        Err(e) => {
            tracing::error!("failed to write note: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write note")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
