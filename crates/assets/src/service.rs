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

//! Asset service: upload ingestion and the retrieval/transform pipeline

use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::blob_store::BlobStore;
use crate::config::{AssetServerConfig, DEFAULT_MAX_DIMENSION, DEFAULT_TRANSFORM_TIMEOUT_SECS};
use crate::helpers::{disk_filename, DEFAULT_CONTENT_TYPE};
use crate::model::AssetRecord;
use crate::transform::{self, TransformRequest, TransformResult};
use crate::{AssetError, AssetRepository, AssetResult};

/// Per-service tunables for the retrieval path
#[derive(Debug, Clone, Copy)]
pub struct RetrievalOptions {
    pub max_dimension: u32,
    pub transform_timeout: Duration,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            transform_timeout: Duration::from_secs(DEFAULT_TRANSFORM_TIMEOUT_SECS),
        }
    }
}

impl From<&AssetServerConfig> for RetrievalOptions {
    fn from(config: &AssetServerConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            transform_timeout: config.transform_timeout(),
        }
    }
}

/// Body and content type ready to be written to a response
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedAsset {
    pub data: Bytes,
    pub content_type: String,
}

impl From<TransformResult> for RetrievedAsset {
    fn from(result: TransformResult) -> Self {
        Self {
            data: result.data,
            content_type: result.content_type,
        }
    }
}

/// Asset service
///
/// Holds the metadata store and blob store handles; both are shared
/// read-only across requests.
pub struct AssetService {
    repository: Arc<dyn AssetRepository>,
    blob_store: BlobStore,
    options: RetrievalOptions,
}

impl AssetService {
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        blob_store: BlobStore,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            repository,
            blob_store,
            options,
        }
    }

    pub fn options(&self) -> RetrievalOptions {
        self.options
    }

    /// Store an uploaded file and record its metadata
    ///
    /// Bytes are written before the record so a saved record always points
    /// at an existing blob. When the record cannot be saved the blob is
    /// removed again and the save error is returned.
    pub async fn upload_asset(
        &self,
        original_name: &str,
        content_type: Option<String>,
        data: Bytes,
    ) -> AssetResult<AssetRecord> {
        if data.is_empty() {
            return Err(AssetError::ValidationFailure("file cannot be empty".to_string()));
        }

        let id = Ulid::new().to_string();
        let filename_disk = disk_filename(&id, original_name);
        let content_type = content_type
            .map(|ct| ct.trim().to_string())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let record = AssetRecord::new(
            id,
            filename_disk,
            original_name,
            content_type,
            data.len() as i64,
            Utc::now().to_rfc3339(),
        );

        self.blob_store.write_bytes(&record.filename_disk, data).await?;
        if let Err(save_err) = self.repository.save(&record).await {
            // No record points at the blob; drop it so the upload dir holds no orphans
            if let Err(delete_err) = self.blob_store.delete_bytes(&record.filename_disk).await {
                warn!(
                    asset_id = %record.id,
                    "failed to remove blob after metadata save error: {}",
                    delete_err
                );
            }
            return Err(save_err);
        }

        info!(
            asset_id = %record.id,
            content_type = %record.content_type,
            size = record.filesize,
            "asset uploaded"
        );
        Ok(record)
    }

    /// Get asset metadata
    pub async fn get_asset(&self, id: &str) -> AssetResult<AssetRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AssetError::NotFound(id.to_string()))
    }

    /// Resolve, load and (for images) transform an asset
    ///
    /// ## Flow
    /// 1. Metadata lookup; unknown ids fail before the blob store is touched
    /// 2. Blob read by disk filename
    /// 3. Non-images are returned verbatim, query parameters ignored
    /// 4. Images: parse and validate the query, then run the engine on a
    ///    blocking worker bounded by the transform timeout
    ///
    /// The returned body is complete; nothing is streamed before the
    /// transform outcome is known.
    pub async fn retrieve_asset(
        &self,
        id: &str,
        query: &HashMap<String, String>,
    ) -> AssetResult<RetrievedAsset> {
        let record = self.get_asset(id).await?;
        let data = self.blob_store.read_bytes(&record.filename_disk).await?;

        if !record.is_image() {
            debug!(asset_id = %id, content_type = %record.content_type, "serving non-image verbatim");
            return Ok(RetrievedAsset {
                data,
                content_type: record.content_type,
            });
        }

        let request = TransformRequest::from_query(query, self.options.max_dimension)?;
        debug!(asset_id = %id, ?request, "transforming image");

        let result = self
            .run_transform(data, record.content_type, request)
            .await?;
        Ok(result.into())
    }

    async fn run_transform(
        &self,
        data: Bytes,
        content_type: String,
        request: TransformRequest,
    ) -> AssetResult<TransformResult> {
        if request.is_empty() {
            return transform::transform(data, &content_type, &request);
        }

        let timeout = self.options.transform_timeout;
        let max_dimension = self.options.max_dimension;
        let task = tokio::task::spawn_blocking(move || {
            transform::transform_within(data, &content_type, &request, max_dimension)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(AssetError::InternalError(format!(
                "Transform task failed: {}",
                join_err
            ))),
            Err(_) => Err(AssetError::TimeoutFailure(timeout.as_secs())),
        }
    }
}
