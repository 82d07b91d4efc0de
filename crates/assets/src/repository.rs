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

//! Repository trait and implementations for asset metadata storage

use async_trait::async_trait;

use crate::model::AssetRecord;
use crate::AssetResult;

/// Repository trait for asset metadata storage
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Get asset metadata by ID
    ///
    /// ## Returns
    /// The record if found, None otherwise.
    async fn find_by_id(&self, id: &str) -> AssetResult<Option<AssetRecord>>;

    /// Save a newly uploaded asset record
    ///
    /// ## Notes
    /// Records are immutable once saved; saving an existing ID fails.
    async fn save(&self, record: &AssetRecord) -> AssetResult<()>;
}

#[path = "repository/sql.rs"]
pub mod sql;

pub use sql::SqlAssetRepository;
