use std::path::PathBuf;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Document, DomainError, IngestReceipt};

#[derive(Debug, Deserialize)]
pub struct IngestPathRequest {
    pub path: PathBuf,
    pub source_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngestTextRequest {
    pub source_id: String,
    pub text: String,
}

const UPLOAD_FIELD: &str = "file";

pub async fn ingest_path(
    State(state): State<AppState>,
    Json(request): Json<IngestPathRequest>,
) -> Result<Json<IngestReceipt>, ApiError> {
    let document = state
        .loader
        .load_path(&request.path, request.source_id.as_deref())
        .await?;

    Ok(Json(state.rag.ingest(&document).await?))
}

pub async fn ingest_text(
    State(state): State<AppState>,
    Json(request): Json<IngestTextRequest>,
) -> Result<Json<IngestReceipt>, ApiError> {
    let document = Document::new(request.source_id, request.text);
    Ok(Json(state.rag.ingest(&document).await?))
}

/// Multipart upload; the uploaded file name becomes the source id.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestReceipt>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::invalid_argument(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| DomainError::document_load(format!("failed to read upload: {e}")))?;

        let loader = state.loader.clone();
        let document = tokio::task::spawn_blocking(move || loader.load_bytes(&name, &bytes, None))
            .await
            .map_err(|e| DomainError::document_load(format!("loader task failed: {e}")))??;
        return Ok(Json(state.rag.ingest(&document).await?));
    }

    Err(DomainError::invalid_argument(format!("missing multipart field '{UPLOAD_FIELD}'")).into())
}

pub async fn delete_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.rag.delete_source(&source_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
