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

//! Error types for the asset service

use thiserror::Error;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Closed set of failure kinds for asset operations
///
/// Callers branch on the variant, never on the message. Each variant maps to
/// exactly one HTTP status (see `status_code` in the axum server module).
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    ValidationFailure(String),

    #[error("Blob I/O failure: {0}")]
    IoFailure(String),

    #[error("Image transform failed: {0}")]
    TransformFailure(#[from] image::ImageError),

    #[error("Image transform timed out after {0}s")]
    TimeoutFailure(u64),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AssetError {
    /// Stable name of the failure kind, reported to clients next to the message
    pub fn kind(&self) -> &'static str {
        match self {
            AssetError::NotFound(_) => "NotFound",
            AssetError::ValidationFailure(_) => "ValidationFailure",
            AssetError::IoFailure(_) => "IOFailure",
            AssetError::TransformFailure(_) => "TransformFailure",
            AssetError::TimeoutFailure(_) => "TimeoutFailure",
            AssetError::PayloadTooLarge(_) => "PayloadTooLarge",
            AssetError::ConfigError(_) => "ConfigError",
            AssetError::RepositoryError(_) => "RepositoryError",
            AssetError::SerializationError(_) => "SerializationError",
            AssetError::InternalError(_) => "InternalError",
        }
    }

    /// True for failures caused by the request itself rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssetError::NotFound(_)
                | AssetError::ValidationFailure(_)
                | AssetError::PayloadTooLarge(_)
        )
    }
}

impl From<object_store::Error> for AssetError {
    fn from(err: object_store::Error) -> Self {
        AssetError::IoFailure(err.to_string())
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::IoFailure(err.to_string())
    }
}

impl From<&str> for AssetError {
    fn from(s: &str) -> Self {
        AssetError::InternalError(s.to_string())
    }
}

impl From<String> for AssetError {
    fn from(s: String) -> Self {
        AssetError::InternalError(s)
    }
}
