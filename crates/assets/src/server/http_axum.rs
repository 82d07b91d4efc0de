// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Depot.
//
// Depot is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Depot is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Depot. If not, see <https://www.gnu.org/licenses/>.

//! Axum HTTP handlers for asset upload, metadata and retrieval
//!
//! Endpoints:
//! - POST /files - Upload a file (multipart/form-data, field `files`)
//! - GET /files/{id} - Asset metadata as JSON
//! - GET /assets/{id}?fit=&width=&height=&quality=&format= - Asset bytes,
//!   transformed on the fly when the asset is an image
//! - GET /health - Liveness probe

use crate::{AssetError, AssetService};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "files";

/// Create Axum router for asset HTTP endpoints
pub fn create_asset_router(asset_service: Arc<AssetService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/files", post(handle_upload))
        .route("/files/:id", get(handle_get_metadata))
        .route("/assets/:id", get(handle_get_asset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(asset_service)
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handle file upload (multipart/form-data)
async fn handle_upload(
    State(asset_service): State<Arc<AssetService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AssetError> {
    let mut multipart = multipart
        .map_err(|e| AssetError::ValidationFailure(format!("Expected multipart/form-data: {}", e.body_text())))?;

    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            // Ignore unknown fields
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, content_type, data));
    }

    let (file_name, content_type, data) = upload.ok_or_else(|| {
        AssetError::ValidationFailure(format!("Missing '{}' file field", UPLOAD_FIELD))
    })?;

    let record = asset_service
        .upload_asset(&file_name, content_type, data)
        .await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "id": record.id,
            "message": "File uploaded successfully",
        })),
    ))
}

/// Handle metadata lookup
async fn handle_get_metadata(
    State(asset_service): State<Arc<AssetService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AssetError> {
    let record = asset_service.get_asset(&id).await?;
    Ok(Json(record))
}

/// Handle asset retrieval with optional image transform
async fn handle_get_asset(
    State(asset_service): State<Arc<AssetService>>,
    Path(id): Path<String>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Response, AssetError> {
    let Query(query) = query
        .map_err(|e| AssetError::ValidationFailure(format!("Malformed query string: {}", e.body_text())))?;
    debug!(asset_id = %id, ?query, "GET /assets");

    let asset = asset_service.retrieve_asset(&id, &query).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::CONTENT_LENGTH, asset.data.len().to_string()),
        ],
        asset.data,
    )
        .into_response())
}

fn multipart_error(err: MultipartError) -> AssetError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AssetError::PayloadTooLarge(err.body_text())
    } else {
        AssetError::ValidationFailure(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// HTTP status for each failure kind
pub fn status_code(err: &AssetError) -> StatusCode {
    match err {
        AssetError::NotFound(_) => StatusCode::NOT_FOUND,
        AssetError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
        AssetError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        AssetError::IoFailure(_)
        | AssetError::TransformFailure(_)
        | AssetError::TimeoutFailure(_)
        | AssetError::ConfigError(_)
        | AssetError::RepositoryError(_)
        | AssetError::SerializationError(_)
        | AssetError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert AssetError to HTTP response
impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let message = self.to_string();

        if self.is_client_error() {
            warn!(kind = self.kind(), "request rejected: {}", message);
        } else {
            error!(kind = self.kind(), "request failed: {}", message);
        }

        let body = serde_json::json!({
            "error": message,
            "kind": self.kind(),
        });

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            serde_json::to_string(&body).unwrap_or_else(|_| "{\"error\":\"Internal error\"}".to_string()),
        )
            .into_response()
    }
}
