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

//! Helper functions for asset naming and validation

use crate::model::AssetRecord;

/// Content type recorded when the client does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// True when the declared MIME type belongs to the `image/` family
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Extension of the client-supplied filename, lowercased
///
/// Only the segment after the last `.` counts, and it must be non-empty
/// ASCII alphanumerics; anything else yields `None` so user input never
/// reaches the blob store path.
pub fn file_extension(original_name: &str) -> Option<String> {
    let (stem, ext) = original_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 16 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Name under which an asset's bytes are stored in the blob store
pub fn disk_filename(asset_id: &str, original_name: &str) -> String {
    match file_extension(original_name) {
        Some(ext) => format!("{}.{}", asset_id, ext),
        None => asset_id.to_string(),
    }
}

pub fn validate_record(record: &AssetRecord) -> Result<(), String> {
    if record.id.is_empty() {
        return Err("id is required".to_string());
    }
    if record.filename_disk.is_empty() {
        return Err("filename_disk is required".to_string());
    }
    if record.filename_disk.contains('/') || record.filename_disk.contains('\\') {
        return Err("filename_disk must be a bare file name".to_string());
    }
    if record.content_type.is_empty() {
        return Err("type is required".to_string());
    }
    if record.filesize < 0 {
        return Err("filesize must be non-negative".to_string());
    }
    Ok(())
}
