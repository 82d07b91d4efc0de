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

//! Tests for HTTP handlers (upload/metadata/retrieval)

#[cfg(feature = "server")]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use bytes::Bytes;
    use depot_assets::{create_asset_router, AssetService, BlobStore, RetrievalOptions, SqlAssetRepository};
    use http_body_util::BodyExt;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
    use sqlx::any::AnyPoolOptions;
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "----DepotFormBoundary7MA4YWxkTrZu0gW";

    async fn create_test_service() -> (Arc<AssetService>, TempDir) {
        let temp_dir = TempDir::new().unwrap();

        sqlx::any::install_default_drivers();
        let any_pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let repository = Arc::new(SqlAssetRepository::new(any_pool).await.unwrap());
        let blob_store = BlobStore::local(temp_dir.path()).unwrap();

        let service = AssetService::new(repository, blob_store, RetrievalOptions::default());
        (Arc::new(service), temp_dir)
    }

    async fn create_test_router() -> (Router, Arc<AssetService>, TempDir) {
        let (service, temp_dir) = create_test_service().await;
        let router = create_asset_router(service.clone(), 1024 * 1024);
        (router, service, temp_dir)
    }

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        }));
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        Bytes::from(buf.into_inner())
    }

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/files")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(resp: axum::response::Response) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[tokio::test]
    async fn test_http_health() {
        let (router, _service, _temp_dir) = create_test_router().await;
        let resp = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_http_upload_handler() {
        let (router, service, _temp_dir) = create_test_router().await;

        let body = multipart_body("files", "test.txt", "text/plain", b"Hello, World!");
        let resp = router.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "File uploaded successfully");
        let id = json["id"].as_str().unwrap();

        let record = service.get_asset(id).await.unwrap();
        assert_eq!(record.filename_download, "test.txt");
        assert_eq!(record.content_type, "text/plain");
        assert_eq!(record.filesize, 13);
    }

    #[tokio::test]
    async fn test_http_upload_missing_field() {
        let (router, _service, _temp_dir) = create_test_router().await;

        let body = multipart_body("attachment", "test.txt", "text/plain", b"Hello");
        let resp = router.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["kind"], "ValidationFailure");
    }

    #[tokio::test]
    async fn test_http_upload_not_multipart() {
        let (router, _service, _temp_dir) = create_test_router().await;

        let req = Request::builder()
            .method(Method::POST)
            .uri("/files")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_http_upload_too_large() {
        let (service, _temp_dir) = create_test_service().await;
        let router = create_asset_router(service, 1024);

        let body = multipart_body("files", "big.bin", "application/octet-stream", &vec![7u8; 4096]);
        let resp = router.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_http_metadata_handler() {
        let (router, service, _temp_dir) = create_test_router().await;
        let record = service
            .upload_asset("cat.png", Some("image/png".to_string()), png_bytes(10, 10))
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!("/files/{}", record.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["id"], record.id.as_str());
        assert_eq!(json["type"], "image/png");
        assert!(json.get("filename_disk").is_none());
    }

    #[tokio::test]
    async fn test_http_metadata_not_found() {
        let (router, _service, _temp_dir) = create_test_router().await;
        let resp = router.oneshot(get_request("/files/nonexistent")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_http_asset_not_found() {
        let (router, _service, _temp_dir) = create_test_router().await;

        let resp = router
            .oneshot(get_request("/assets/nonexistent?width=10&height=10"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let json = body_json(resp).await;
        assert_eq!(json["kind"], "NotFound");
        assert!(json["error"].as_str().unwrap().contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_http_asset_non_image_passthrough() {
        let (router, service, _temp_dir) = create_test_router().await;
        let record = service
            .upload_asset("notes.txt", Some("text/plain".to_string()), Bytes::from_static(b"plain text"))
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!("/assets/{}?width=abc&format=png", record.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(body_bytes(resp).await.as_ref(), b"plain text");
    }

    #[tokio::test]
    async fn test_http_asset_resize_cover() {
        let (router, service, _temp_dir) = create_test_router().await;
        let record = service
            .upload_asset("wide.png", Some("image/png".to_string()), png_bytes(240, 120))
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!(
                "/assets/{}?width=100&height=100&fit=cover",
                record.id
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");

        let output = image::load_from_memory(&body_bytes(resp).await).unwrap();
        assert_eq!(output.dimensions(), (100, 100));
    }

    #[tokio::test]
    async fn test_http_asset_format_png() {
        let (router, service, _temp_dir) = create_test_router().await;

        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([10, 20, 30])))
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();
        let record = service
            .upload_asset("photo.jpg", Some("image/jpeg".to_string()), jpeg.into_inner().into())
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!("/assets/{}?format=png", record.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");

        let data = body_bytes(resp).await;
        assert!(image::load_from_memory_with_format(&data, ImageFormat::Png).is_ok());
    }

    #[tokio::test]
    async fn test_http_asset_non_numeric_width_is_client_error() {
        let (router, service, _temp_dir) = create_test_router().await;
        let record = service
            .upload_asset("pic.png", Some("image/png".to_string()), png_bytes(20, 20))
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!("/assets/{}?width=abc&height=10", record.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["kind"], "ValidationFailure");
    }

    #[tokio::test]
    async fn test_http_asset_corrupt_image_is_server_error() {
        let (router, service, _temp_dir) = create_test_router().await;
        let record = service
            .upload_asset("broken.png", Some("image/png".to_string()), Bytes::from_static(b"not a png"))
            .await
            .unwrap();

        let resp = router
            .oneshot(get_request(&format!("/assets/{}?width=10&height=10", record.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let json = body_json(resp).await;
        assert_eq!(json["kind"], "TransformFailure");
    }

    #[tokio::test]
    async fn test_http_unknown_route() {
        let (router, _service, _temp_dir) = create_test_router().await;
        let resp = router.oneshot(get_request("/api/v1/unknown")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
