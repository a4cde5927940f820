//! Upload, chat and reset endpoints

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use tracing::{debug, info};
use uuid::Uuid;

use super::state::AppState;
use super::types::{ApiError, ApiErrorType, ChatRequest, Json, MessageResponse, UploadResponse};
use crate::domain::rag::Answer;

const FILE_FIELD: &str = "file";

/// POST /upload-document/
///
/// Expects a multipart form with the document in the `file` field.
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        ApiError::new(e.status(), ApiErrorType::InvalidRequestError, e.body_text())
            .with_code("invalid_multipart")
    })?;

    let request_id = Uuid::new_v4().to_string();
    let (filename, bytes) = read_file_field(multipart).await?;
    info!(
        request_id = %request_id,
        filename = %filename,
        bytes = bytes.len(),
        "Processing document upload"
    );

    let document = state.service.upload_file(&filename, bytes).await?;

    Ok(Json(UploadResponse::new(document)))
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(e.status(), ApiErrorType::InvalidRequestError, e.body_text())
            .with_code("invalid_multipart")
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no filename"))?;

        let bytes = field.bytes().await.map_err(|e| {
            ApiError::new(
                e.status(),
                ApiErrorType::InvalidRequestError,
                format!("Failed to read file '{}': {}", filename, e.body_text()),
            )
        })?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// POST /chat/
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Answer>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    debug!(request_id = %request_id, query_len = request.query.len(), "Processing chat request");

    let answer = state.service.query(&request.query).await?;

    info!(
        request_id = %request_id,
        sources = answer.sources.len(),
        not_found = answer.is_not_found(),
        "Chat request answered"
    );
    Ok(Json(answer))
}

/// POST /reset-chatbot/
pub async fn reset_chatbot(State(state): State<AppState>) -> Json<MessageResponse> {
    state.service.reset().await;
    Json(MessageResponse::new(
        "Chatbot has been reset. Please upload a new document.",
    ))
}
