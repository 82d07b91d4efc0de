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

//! Depot server
//!
//! ## Purpose
//! Boots the asset service: configuration, logging, metadata store, blob
//! store, and the HTTP listener. Collaborators are built here and passed
//! down explicitly.

use anyhow::{Context, Result};
use clap::Parser;
use depot_assets::{
    create_asset_router, AssetServerConfig, AssetService, BlobStore, RetrievalOptions,
    SqlAssetRepository,
};
use sqlx::any::AnyPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod asset_http_router;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(about = "Depot - asset upload, retrieval and image transformation server", long_about = None)]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Metadata database URL (overrides DATABASE_URL / DB_*)
    #[arg(long)]
    database_url: Option<String>,

    /// Blob directory (overrides UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply(self, config: &mut AssetServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }
        if let Some(upload_dir) = self.upload_dir {
            config.upload_dir = upload_dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init_tracing(&cli.log_level)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let mut config = AssetServerConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;

    // sqlx::any needs its drivers registered before the first connect
    sqlx::any::install_default_drivers();
    let pool_options = if config.is_in_memory_database() {
        AnyPoolOptions::new().max_connections(1)
    } else {
        AnyPoolOptions::new()
    };
    let pool = pool_options
        .connect(&config.database_url)
        .await
        .context("Failed to connect to metadata database")?;

    let repository = Arc::new(
        SqlAssetRepository::new(pool)
            .await
            .context("Failed to migrate metadata database")?,
    );
    let blob_store = BlobStore::local(&config.upload_dir)?;
    let service = Arc::new(AssetService::new(
        repository,
        blob_store,
        RetrievalOptions::from(&config),
    ));

    let router = create_asset_router(service, config.max_upload_bytes);
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    info!(
        upload_dir = %config.upload_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Depot server starting"
    );
    asset_http_router::serve_asset_router(listener, router).await?;

    info!("Depot server stopped");
    Ok(())
}
