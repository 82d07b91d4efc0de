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

//! Local disk blob store holding raw uploaded bytes

use bytes::Bytes;
use object_store::{local::LocalFileSystem, path::Path as ObjectPath, ObjectStore};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::{AssetError, AssetResult};

/// Blob store keyed by disk filename
///
/// Backed by an [`ObjectStore`]; production uses [`LocalFileSystem`] rooted
/// at the upload directory, tests may inject any store.
#[derive(Clone)]
pub struct BlobStore {
    object_store: Arc<dyn ObjectStore>,
}

impl BlobStore {
    /// Blob store rooted at a local directory, which must already exist
    pub fn local(root: impl AsRef<Path>) -> AssetResult<Self> {
        let root = root.as_ref();
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            AssetError::ConfigError(format!(
                "Failed to open blob directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self::with_object_store(Arc::new(store)))
    }

    /// Create blob store with custom object store (for testing)
    pub fn with_object_store(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }

    /// Read every byte of a stored blob
    ///
    /// A missing or unreadable file is an `IoFailure`; an empty file is
    /// returned as-is, never substituted.
    pub async fn read_bytes(&self, disk_filename: &str) -> AssetResult<Bytes> {
        let path = blob_path(disk_filename)?;
        let result = self.object_store.get(&path).await.map_err(|e| {
            AssetError::IoFailure(format!("Failed to open blob '{}': {}", disk_filename, e))
        })?;
        let bytes = result.bytes().await.map_err(|e| {
            AssetError::IoFailure(format!("Failed to read blob '{}': {}", disk_filename, e))
        })?;

        debug!(disk_filename, len = bytes.len(), "read blob");
        Ok(bytes)
    }

    /// Write a blob, replacing any previous content under the same name
    pub async fn write_bytes(&self, disk_filename: &str, data: Bytes) -> AssetResult<()> {
        let path = blob_path(disk_filename)?;
        let len = data.len();
        self.object_store.put(&path, data.into()).await.map_err(|e| {
            AssetError::IoFailure(format!("Failed to write blob '{}': {}", disk_filename, e))
        })?;

        debug!(disk_filename, len, "wrote blob");
        Ok(())
    }

    /// Remove a stored blob
    pub async fn delete_bytes(&self, disk_filename: &str) -> AssetResult<()> {
        let path = blob_path(disk_filename)?;
        self.object_store.delete(&path).await.map_err(|e| {
            AssetError::IoFailure(format!("Failed to delete blob '{}': {}", disk_filename, e))
        })?;

        debug!(disk_filename, "deleted blob");
        Ok(())
    }
}

/// Disk filenames are single path segments; anything that would escape the
/// upload directory is rejected before touching the store.
fn blob_path(disk_filename: &str) -> AssetResult<ObjectPath> {
    if disk_filename.is_empty()
        || disk_filename == "."
        || disk_filename == ".."
        || disk_filename.contains('/')
        || disk_filename.contains('\\')
    {
        return Err(AssetError::IoFailure(format!(
            "Invalid blob name: '{}'",
            disk_filename
        )));
    }
    ObjectPath::parse(disk_filename)
        .map_err(|e| AssetError::IoFailure(format!("Invalid blob name '{}': {}", disk_filename, e)))
}
