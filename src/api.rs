//! HTTP surface: the describe endpoint and a liveness probe.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    response::Json,
};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};

use crate::{describe::DescriptionService, errors::Error, transient::TransientFile};

pub struct AppState {
    pub service: DescriptionService,
    pub temp_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub text: String,
}

/// Handler for `/`. The whole request body is the image.
pub async fn describe_photo(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DescriptionResponse>, Error> {
    if method != Method::POST {
        return Err(Error::InvalidMethod);
    }

    let body = body.map_err(|rejection| Error::PayloadRead {
        status: rejection.status(),
    })?;
    if body.is_empty() {
        return Err(Error::EmptyPayload);
    }

    tracing::info!(bytes = body.len(), "📸 image received");

    let file = TransientFile::create(&state.temp_dir, &body)
        .await
        .map_err(Error::StorageWriteFailure)?;
    let described = state.service.describe(file.path()).await;
    file.remove().await;

    let text = described?;
    tracing::info!(chars = text.chars().count(), "✅ description ready");
    Ok(Json(DescriptionResponse { text }))
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
