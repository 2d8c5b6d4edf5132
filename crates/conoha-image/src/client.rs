//! Asynchronous image client.

use crate::models::{CreateIsoImageRequest, Image, ImageListParams, ImageQuota, ImageUsage};
use crate::Result;
use bytes::Bytes;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;
use serde_json::json;
use tracing::debug;

const PREFIX: &str = "/v2";

/// Client for the image service.
#[derive(Debug, Clone)]
pub struct ImageClient {
    inner: ServiceClient,
}

impl ImageClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::Image),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    /// List images.
    pub async fn list_images(&self, params: &ImageListParams) -> Result<Vec<Image>> {
        self.inner
            .get_key(&format!("{PREFIX}/images"), params.to_pairs(), "images")
            .await
    }

    /// Fetch one image. The body is the image itself, with no envelope.
    pub async fn get_image(&self, image_id: &str) -> Result<Image> {
        self.inner
            .get_json(&format!("{PREFIX}/images/{image_id}"), Vec::new())
            .await
    }

    /// Delete an image.
    pub async fn delete_image(&self, image_id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{PREFIX}/images/{image_id}"))
            .await
    }

    /// Register an ISO image. Upload the data with [`Self::upload_iso_image`].
    pub async fn create_iso_image(&self, name: &str) -> Result<Image> {
        self.inner
            .send_json(
                Method::POST,
                &format!("{PREFIX}/images"),
                &CreateIsoImageRequest::new(name),
            )
            .await
    }

    /// Upload ISO data for a registered image.
    pub async fn upload_iso_image(&self, image_id: &str, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        debug!(image_id, bytes = data.len(), "uploading ISO image");
        let request = self
            .inner
            .request(Method::PUT, &format!("{PREFIX}/images/{image_id}/file"))?
            .with_bytes(data)
            .with_header("Content-Type", "application/octet-stream")?;
        self.inner.execute(&request).await.map(|_| ())
    }

    /// Storage used by saved images.
    pub async fn get_image_usage(&self) -> Result<ImageUsage> {
        self.inner
            .get_key(&format!("{PREFIX}/images/total"), Vec::new(), "images")
            .await
    }

    /// Current image storage quota.
    pub async fn get_image_quota(&self) -> Result<ImageQuota> {
        self.inner
            .get_key(&format!("{PREFIX}/quota"), Vec::new(), "quota")
            .await
    }

    /// Change the image storage quota. Sizes grow in 500 GB steps from 50 GB.
    pub async fn update_image_quota(&self, image_size_gb: u64) -> Result<ImageQuota> {
        let body = json!({ "quota": { "image_size": format!("{image_size_gb}GB") } });
        self.inner
            .send_key(Method::PUT, &format!("{PREFIX}/quota"), &body, "quota")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conoha_core::{ConohaConfig, Credentials};
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ImageClient {
        let config = ConohaConfig::new().with_endpoint("image", server.uri());
        let session =
            Session::from_config(&config, Credentials::token("test-token"), HashMap::new())
                .unwrap();
        ImageClient::new(session)
    }

    #[tokio::test]
    async fn list_images_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images"))
            .and(query_param("visibility", "private"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [
                    { "id": "img-1", "name": "backup", "visibility": "private", "size": 1024 }
                ],
                "first": "/v2/images?limit=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = ImageListParams {
            limit: Some(2),
            visibility: Some("private".into()),
            ..ImageListParams::default()
        };
        let images = test_client(&server).list_images(&params).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].size, Some(1024));
    }

    #[tokio::test]
    async fn get_image_returns_whole_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/img-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "img-1",
                "status": "active",
                "self": "/v2/images/img-1"
            })))
            .mount(&server)
            .await;

        let image = test_client(&server).get_image("img-1").await.unwrap();
        assert_eq!(image.status.as_deref(), Some("active"));
        assert_eq!(image.self_link.as_deref(), Some("/v2/images/img-1"));
    }

    #[tokio::test]
    async fn create_iso_image_fixed_formats() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/images"))
            .and(body_json(json!({
                "name": "rescue.iso",
                "disk_format": "iso",
                "hw_rescue_bus": "ide",
                "hw_rescue_device": "cdrom",
                "container_format": "bare"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "iso-1",
                "name": "rescue.iso",
                "status": "queued",
                "file": "/v2/images/iso-1/file"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = test_client(&server)
            .create_iso_image("rescue.iso")
            .await
            .unwrap();
        assert_eq!(image.file.as_deref(), Some("/v2/images/iso-1/file"));
    }

    #[tokio::test]
    async fn upload_iso_sends_octet_stream() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v2/images/iso-1/file"))
            .and(header("content-type", "application/octet-stream"))
            .and(header("x-auth-token", "test-token"))
            .and(body_string("ISO-DATA"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .upload_iso_image("iso-1", Bytes::from_static(b"ISO-DATA"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn quota_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v2/quota"))
            .and(body_json(json!({ "quota": { "image_size": "550GB" } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "quota": { "image_size": "550GB" } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/images/total"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "images": { "size": 4096 } })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let quota = client.update_image_quota(550).await.unwrap();
        assert_eq!(quota.size_gb(), Some(550));
        assert_eq!(client.get_image_usage().await.unwrap().size, 4096);
    }
}
