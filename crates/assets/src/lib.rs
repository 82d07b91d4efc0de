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

//! Depot Asset Service
//!
//! ## Purpose
//! Upload, retrieve, and transform binary assets (primarily images) on the fly.
//!
//! ## Architecture
//! - **Metadata Store**: [`AssetRecord`] rows in SQL (SQLite/PostgreSQL) via [`AssetRepository`]
//! - **Blob Store**: raw bytes on local disk, named by disk filename ([`BlobStore`])
//! - **Transform Engine**: pure resize/quality/format pipeline ([`transform`])
//! - **Retrieval**: [`AssetService::retrieve_asset`] ties the three together;
//!   the `server` feature exposes it over HTTP with axum
//!
//! ## Usage
//! ```rust,no_run
//! use depot_assets::{AssetService, BlobStore, RetrievalOptions, SqlAssetRepository};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! sqlx::any::install_default_drivers();
//! let pool = sqlx::any::AnyPoolOptions::new()
//!     .max_connections(1)
//!     .connect("sqlite::memory:")
//!     .await?;
//! let repository = Arc::new(SqlAssetRepository::new(pool).await?);
//! let blob_store = BlobStore::local("uploads")?;
//! let service = AssetService::new(repository, blob_store, RetrievalOptions::default());
//!
//! let record = service
//!     .upload_asset("cat.png", Some("image/png".to_string()), std::fs::read("cat.png")?.into())
//!     .await?;
//!
//! let mut query = HashMap::new();
//! query.insert("width".to_string(), "100".to_string());
//! query.insert("height".to_string(), "100".to_string());
//! query.insert("format".to_string(), "webp".to_string());
//! let thumbnail = service.retrieve_asset(&record.id, &query).await?;
//! assert_eq!(thumbnail.content_type, "image/webp");
//! # Ok(())
//! # }
//! ```

pub mod blob_store;
pub mod config;
pub mod error;
pub mod helpers;
pub mod model;
pub mod repository;
pub mod service;
pub mod transform;

#[cfg(feature = "server")]
pub mod server;

pub use blob_store::BlobStore;
pub use config::AssetServerConfig;
pub use error::{AssetError, AssetResult};
pub use helpers::{disk_filename, is_image_content_type};
pub use model::AssetRecord;
pub use repository::{AssetRepository, SqlAssetRepository};
pub use service::{AssetService, RetrievalOptions, RetrievedAsset};
pub use transform::{FitMode, OutputFormat, TransformRequest, TransformResult};

#[cfg(feature = "server")]
pub use server::http_axum::create_asset_router;
