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

//! Asset record stored in the metadata store

use serde::{Deserialize, Serialize};

/// Storage adapter recorded for every asset written by this service
pub const DISK_STORAGE: &str = "disk";

/// Metadata row for one uploaded asset
///
/// Created once at upload time and never mutated on the read path. The disk
/// filename is an internal locator and is not exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    #[serde(skip_serializing)]
    pub filename_disk: String,
    pub filename_download: String,
    /// Declared MIME type
    #[serde(rename = "type")]
    pub content_type: String,
    pub filesize: i64,
    /// RFC 3339 upload timestamp
    pub uploaded_on: String,
    pub storage: String,
    pub title: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub focal_point_x: Option<i64>,
    pub focal_point_y: Option<i64>,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// JSON-encoded tag list
    pub tags: Option<String>,
    /// JSON-encoded free-form metadata
    pub metadata: Option<String>,
}

impl AssetRecord {
    /// New record with every descriptive attribute left empty
    pub fn new(
        id: impl Into<String>,
        filename_disk: impl Into<String>,
        filename_download: impl Into<String>,
        content_type: impl Into<String>,
        filesize: i64,
        uploaded_on: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            filename_disk: filename_disk.into(),
            filename_download: filename_download.into(),
            content_type: content_type.into(),
            filesize,
            uploaded_on: uploaded_on.into(),
            storage: DISK_STORAGE.to_string(),
            title: None,
            width: None,
            height: None,
            focal_point_x: None,
            focal_point_y: None,
            duration: None,
            description: None,
            location: None,
            tags: None,
            metadata: None,
        }
    }

    pub fn is_image(&self) -> bool {
        crate::helpers::is_image_content_type(&self.content_type)
    }
}
