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

//! Tests for error types

use depot_assets::AssetError;

#[test]
fn test_error_from_str() {
    let err: AssetError = "test error".into();
    match err {
        AssetError::InternalError(msg) => assert_eq!(msg, "test error"),
        _ => panic!("Expected InternalError"),
    }
}

#[test]
fn test_error_from_string() {
    let err: AssetError = "test error".to_string().into();
    match err {
        AssetError::InternalError(msg) => assert_eq!(msg, "test error"),
        _ => panic!("Expected InternalError"),
    }
}

#[test]
fn test_error_from_io_is_io_failure() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: AssetError = io.into();
    assert!(matches!(err, AssetError::IoFailure(_)));
    assert_eq!(err.kind(), "IOFailure");
}

#[test]
fn test_error_display() {
    let err = AssetError::ConfigError("invalid config".to_string());
    assert!(format!("{}", err).contains("invalid config"));

    let err = AssetError::NotFound("asset-1".to_string());
    assert!(format!("{}", err).contains("asset-1"));

    let err = AssetError::ValidationFailure("width must be a positive integer".to_string());
    assert!(format!("{}", err).contains("width"));

    let err = AssetError::TimeoutFailure(30);
    assert!(format!("{}", err).contains("30s"));
}

#[test]
fn test_error_kinds_and_client_classification() {
    assert_eq!(AssetError::NotFound("x".into()).kind(), "NotFound");
    assert_eq!(AssetError::ValidationFailure("x".into()).kind(), "ValidationFailure");
    assert_eq!(AssetError::IoFailure("x".into()).kind(), "IOFailure");
    assert_eq!(AssetError::TimeoutFailure(1).kind(), "TimeoutFailure");

    assert!(AssetError::NotFound("x".into()).is_client_error());
    assert!(AssetError::ValidationFailure("x".into()).is_client_error());
    assert!(AssetError::PayloadTooLarge("x".into()).is_client_error());
    assert!(!AssetError::IoFailure("x".into()).is_client_error());
    assert!(!AssetError::TimeoutFailure(1).is_client_error());
}

#[test]
fn test_image_error_is_transform_failure() {
    let err = image::load_from_memory(b"definitely not an image").unwrap_err();
    let err: AssetError = err.into();
    assert!(matches!(err, AssetError::TransformFailure(_)));
    assert_eq!(err.kind(), "TransformFailure");
}
