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

//! Asset server configuration
//!
//! Values come from environment variables (optionally seeded from a `.env`
//! file by the server binary) with sensible defaults for local development.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{AssetError, AssetResult};

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default upper bound for requested width/height
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Default transform timeout in seconds
pub const DEFAULT_TRANSFORM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port to bind
    pub port: u16,

    /// Metadata store URL (sqlite: or postgres:)
    pub database_url: String,

    /// Directory holding raw uploaded bytes
    pub upload_dir: PathBuf,

    /// Largest accepted upload body
    pub max_upload_bytes: usize,

    /// Largest accepted `width`/`height` transform parameter
    pub max_dimension: u32,

    /// Upper bound on a single decode/transform/encode run
    pub transform_timeout_secs: u64,
}

impl Default for AssetServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite::memory:".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            transform_timeout_secs: DEFAULT_TRANSFORM_TIMEOUT_SECS,
        }
    }
}

impl AssetServerConfig {
    /// Create config from environment variables
    ///
    /// Unparseable numeric values are reported as errors instead of being
    /// replaced by defaults.
    pub fn from_env() -> AssetResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT")?.unwrap_or(defaults.port),
            database_url: database_url_from_env().unwrap_or(defaults.database_url),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes),
            max_dimension: parse_env("MAX_IMAGE_DIMENSION")?.unwrap_or(defaults.max_dimension),
            transform_timeout_secs: parse_env("TRANSFORM_TIMEOUT_SECS")?
                .unwrap_or(defaults.transform_timeout_secs),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AssetResult<()> {
        if self.port == 0 {
            return Err(AssetError::ConfigError("port must be non-zero".to_string()));
        }

        let scheme_ok = ["sqlite:", "postgres:", "postgresql:"]
            .iter()
            .any(|scheme| self.database_url.starts_with(scheme));
        if !scheme_ok {
            return Err(AssetError::ConfigError(format!(
                "Unsupported database url: {}",
                self.database_url
            )));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(AssetError::ConfigError("upload_dir is required".to_string()));
        }

        if self.max_upload_bytes == 0 {
            return Err(AssetError::ConfigError("max_upload_bytes must be non-zero".to_string()));
        }

        if self.max_dimension == 0 {
            return Err(AssetError::ConfigError("max_dimension must be non-zero".to_string()));
        }

        if self.transform_timeout_secs == 0 {
            return Err(AssetError::ConfigError(
                "transform_timeout_secs must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn transform_timeout(&self) -> Duration {
        Duration::from_secs(self.transform_timeout_secs)
    }

    /// True when the metadata store lives in a private in-memory SQLite database
    pub fn is_in_memory_database(&self) -> bool {
        self.database_url.starts_with("sqlite::memory:")
            || self.database_url.starts_with("sqlite://:memory:")
    }
}

/// `DATABASE_URL` wins; otherwise assemble a Postgres URL from the discrete
/// `DB_*` variables when all of them are present.
fn database_url_from_env() -> Option<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Some(url);
    }

    let user = env::var("DB_USER").ok()?;
    let password = env::var("DB_PASSWORD").ok()?;
    let host = env::var("DB_HOST").ok()?;
    let database = env::var("DB_DATABASE").ok()?;
    Some(format!("postgres://{}:{}@{}/{}", user, password, host, database))
}

fn parse_env<T>(key: &str) -> AssetResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AssetError::ConfigError(format!("Invalid {}='{}': {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}
