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

//! SQL-based repository implementation for asset metadata

use async_trait::async_trait;
use sqlx::{any::AnyRow, Pool, Row};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::AssetRepository;
use crate::helpers::validate_record;
use crate::model::AssetRecord;
use crate::{AssetError, AssetResult};

const SELECT_COLUMNS: &str = r#"
    SELECT id, filename_disk, filename_download, type, filesize, uploaded_on, storage,
           title, width, height, focal_point_x, focal_point_y, duration,
           description, location, tags, metadata
    FROM files
"#;

/// SQL-based asset metadata repository (SQLite or PostgreSQL via `sqlx::Any`)
pub struct SqlAssetRepository {
    pool: Arc<Pool<sqlx::Any>>,
}

impl SqlAssetRepository {
    /// Create new SQL repository, applying the schema first
    ///
    /// For in-memory SQLite the pool must use max_connections=1, every
    /// connection otherwise sees its own empty database.
    pub async fn new(pool: Pool<sqlx::Any>) -> Result<Self, sqlx::Error> {
        Self::migrate(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create the `files` table if it does not exist
    ///
    /// The DDL sticks to types both SQLite and PostgreSQL understand, so one
    /// statement serves both backends.
    pub async fn migrate(pool: &Pool<sqlx::Any>) -> Result<(), sqlx::Error> {
        info!("[ASSET_MIGRATION] Starting migration for files table");

        let mut conn = pool.acquire().await.map_err(|e| {
            error!("[ASSET_MIGRATION] Failed to acquire connection: {}", e);
            e
        })?;

        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                filename_disk TEXT NOT NULL,
                filename_download TEXT NOT NULL,
                type TEXT NOT NULL,
                filesize BIGINT NOT NULL,
                uploaded_on TEXT NOT NULL,
                storage TEXT NOT NULL,
                title TEXT,
                width BIGINT,
                height BIGINT,
                focal_point_x BIGINT,
                focal_point_y BIGINT,
                duration BIGINT,
                description TEXT,
                location TEXT,
                tags TEXT,
                metadata TEXT
            )
            "#,
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!("[ASSET_MIGRATION] CREATE TABLE failed: {}", e);
            e
        })?;
        debug!(
            "[ASSET_MIGRATION] CREATE TABLE executed, rows_affected: {}",
            result.rows_affected()
        );

        info!("[ASSET_MIGRATION] Migration completed successfully");
        Ok(())
    }
}

#[async_trait]
impl AssetRepository for SqlAssetRepository {
    async fn find_by_id(&self, id: &str) -> AssetResult<Option<AssetRecord>> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn save(&self, record: &AssetRecord) -> AssetResult<()> {
        validate_record(record).map_err(AssetError::ValidationFailure)?;

        sqlx::query(
            r#"
            INSERT INTO files (
                id, filename_disk, filename_download, type, filesize, uploaded_on, storage,
                title, width, height, focal_point_x, focal_point_y, duration,
                description, location, tags, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&record.id)
        .bind(&record.filename_disk)
        .bind(&record.filename_download)
        .bind(&record.content_type)
        .bind(record.filesize)
        .bind(&record.uploaded_on)
        .bind(&record.storage)
        .bind(record.title.as_deref())
        .bind(record.width)
        .bind(record.height)
        .bind(record.focal_point_x)
        .bind(record.focal_point_y)
        .bind(record.duration)
        .bind(record.description.as_deref())
        .bind(record.location.as_deref())
        .bind(record.tags.as_deref())
        .bind(record.metadata.as_deref())
        .execute(&*self.pool)
        .await?;

        debug!(asset_id = %record.id, "saved asset record");
        Ok(())
    }
}

fn row_to_record(row: &AnyRow) -> AssetResult<AssetRecord> {
    Ok(AssetRecord {
        id: row.try_get("id")?,
        filename_disk: row.try_get("filename_disk")?,
        filename_download: row.try_get("filename_download")?,
        content_type: row.try_get("type")?,
        filesize: row.try_get("filesize")?,
        uploaded_on: row.try_get("uploaded_on")?,
        storage: row.try_get("storage")?,
        title: row.try_get("title")?,
        width: row.try_get("width")?,
        height: row.try_get("height")?,
        focal_point_x: row.try_get("focal_point_x")?,
        focal_point_y: row.try_get("focal_point_y")?,
        duration: row.try_get("duration")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        tags: row.try_get("tags")?,
        metadata: row.try_get("metadata")?,
    })
}
