//! Asynchronous block storage client.

use crate::models::{
    Backup, BackupListParams, BackupRestore, BackupSchedule, CreateVolumeRequest,
    EnableBackupRequest, UpdateVolumeRequest, Volume, VolumeImageUpload, VolumeType,
};
use crate::Result;
use conoha_core::client::wrap;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;
use serde_json::json;

/// Client for the block storage service.
#[derive(Debug, Clone)]
pub struct VolumeClient {
    inner: ServiceClient,
}

impl VolumeClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::BlockStorage),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    async fn project_path(&self, path: &str) -> Result<String> {
        let tenant_id = self.inner.tenant_id().await?;
        Ok(format!("/v3/{tenant_id}{path}"))
    }

    // Volumes

    /// List volumes with minimal information.
    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        let path = self.project_path("/volumes").await?;
        self.inner.get_key(&path, Vec::new(), "volumes").await
    }

    /// List volumes with full details.
    pub async fn list_volumes_detail(&self) -> Result<Vec<Volume>> {
        let path = self.project_path("/volumes/detail").await?;
        self.inner.get_key(&path, Vec::new(), "volumes").await
    }

    /// Fetch one volume.
    pub async fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        let path = self.project_path(&format!("/volumes/{volume_id}")).await?;
        self.inner.get_key(&path, Vec::new(), "volume").await
    }

    /// Create a volume.
    pub async fn create_volume(&self, request: &CreateVolumeRequest) -> Result<Volume> {
        let path = self.project_path("/volumes").await?;
        self.inner
            .send_key(Method::POST, &path, &wrap("volume", request), "volume")
            .await
    }

    /// Rename or re-describe a volume.
    pub async fn update_volume(
        &self,
        volume_id: &str,
        request: &UpdateVolumeRequest,
    ) -> Result<Volume> {
        let path = self.project_path(&format!("/volumes/{volume_id}")).await?;
        self.inner
            .send_key(Method::PUT, &path, &wrap("volume", request), "volume")
            .await
    }

    /// Delete a volume.
    pub async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        let path = self.project_path(&format!("/volumes/{volume_id}")).await?;
        self.inner.delete(&path).await
    }

    /// Save a volume as a qcow2 image.
    pub async fn save_volume_as_image(
        &self,
        volume_id: &str,
        image_name: &str,
    ) -> Result<VolumeImageUpload> {
        let path = self
            .project_path(&format!("/volumes/{volume_id}/action"))
            .await?;
        let body = json!({
            "os-volume_upload_image": {
                "image_name": image_name,
                "disk_format": "qcow2",
                "container_format": "ovf",
            }
        });
        self.inner
            .send_key(Method::POST, &path, &body, "os-volume_upload_image")
            .await
    }

    // Volume types

    /// List volume types.
    pub async fn list_volume_types(&self) -> Result<Vec<VolumeType>> {
        let path = self.project_path("/types").await?;
        self.inner.get_key(&path, Vec::new(), "volume_types").await
    }

    /// Fetch one volume type.
    pub async fn get_volume_type(&self, type_id: &str) -> Result<VolumeType> {
        let path = self.project_path(&format!("/types/{type_id}")).await?;
        self.inner.get_key(&path, Vec::new(), "volume_type").await
    }

    // Backups

    /// List backups.
    pub async fn list_backups(&self, params: &BackupListParams) -> Result<Vec<Backup>> {
        let path = self.project_path("/backups").await?;
        self.inner.get_key(&path, params.to_pairs(), "backups").await
    }

    /// List backups with full details.
    pub async fn list_backups_detail(&self, params: &BackupListParams) -> Result<Vec<Backup>> {
        let path = self.project_path("/backups/detail").await?;
        self.inner.get_key(&path, params.to_pairs(), "backups").await
    }

    /// Fetch one backup.
    pub async fn get_backup(&self, backup_id: &str) -> Result<Backup> {
        let path = self.project_path(&format!("/backups/{backup_id}")).await?;
        self.inner.get_key(&path, Vec::new(), "backup").await
    }

    /// Subscribe a server to automatic backups.
    ///
    /// `retention` (days, 14 to 30) only applies to daily schedules.
    pub async fn enable_auto_backup(
        &self,
        server_id: &str,
        schedule: Option<BackupSchedule>,
        retention: Option<u32>,
    ) -> Result<Backup> {
        let path = self.project_path("/backups").await?;
        let body = EnableBackupRequest {
            instance_uuid: server_id,
            schedule,
            retention,
        };
        self.inner
            .send_key(Method::POST, &path, &wrap("backup", &body), "backup")
            .await
    }

    /// Change the retention of an active daily subscription.
    pub async fn update_backup_retention(&self, server_id: &str, retention: u32) -> Result<Backup> {
        let path = self.project_path(&format!("/backups/{server_id}")).await?;
        let body = json!({ "backup": { "retention": retention } });
        self.inner.send_key(Method::PUT, &path, &body, "backup").await
    }

    /// Cancel every backup subscription of a server.
    pub async fn disable_auto_backup(&self, server_id: &str) -> Result<()> {
        let path = self.project_path(&format!("/backups/{server_id}")).await?;
        self.inner.delete(&path).await
    }

    /// Restore a backup onto a volume.
    pub async fn restore_backup(&self, backup_id: &str, volume_id: &str) -> Result<BackupRestore> {
        let path = self
            .project_path(&format!("/backups/{backup_id}/restore"))
            .await?;
        let body = json!({ "restore": { "volume_id": volume_id } });
        self.inner.send_key(Method::POST, &path, &body, "restore").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conoha_core::{ConohaConfig, Credentials, Error, ProjectScope};
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with(server: &MockServer, credentials: Credentials) -> VolumeClient {
        let config = ConohaConfig::new().with_endpoint("block_storage", server.uri());
        VolumeClient::new(Session::from_config(&config, credentials, HashMap::new()).unwrap())
    }

    fn test_client(server: &MockServer) -> VolumeClient {
        client_with(
            server,
            Credentials::token("test-token").with_scope(ProjectScope::Id("tenant-1".into())),
        )
    }

    #[tokio::test]
    async fn list_volumes_uses_project_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/tenant-1/volumes/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "volumes": [{ "id": "vol-1", "name": "boot", "size": 100, "bootable": "true" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let volumes = test_client(&server).list_volumes_detail().await.unwrap();
        assert_eq!(volumes[0].size, Some(100));
        assert_eq!(volumes[0].bootable.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn missing_tenant_is_a_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_with(&server, Credentials::token("test-token"));
        let err = client.list_volumes().await.unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[tokio::test]
    async fn create_volume_wraps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/tenant-1/volumes"))
            .and(body_json(json!({
                "volume": { "size": 200, "name": "data", "volume_type": "c3j1-ds02-add" }
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "volume": { "id": "vol-2", "name": "data", "size": 200, "status": "creating" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateVolumeRequest::new(200)
            .with_name("data")
            .with_volume_type("c3j1-ds02-add");
        let volume = test_client(&server).create_volume(&request).await.unwrap();
        assert_eq!(volume.id, "vol-2");
        assert_eq!(volume.status.as_deref(), Some("creating"));
    }

    #[tokio::test]
    async fn update_volume_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v3/tenant-1/volumes/vol-1"))
            .and(body_json(json!({ "volume": { "name": "renamed" } })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "volume": { "id": "vol-1", "name": "renamed" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = UpdateVolumeRequest {
            name: Some("renamed".into()),
            ..UpdateVolumeRequest::default()
        };
        let volume = test_client(&server)
            .update_volume("vol-1", &request)
            .await
            .unwrap();
        assert_eq!(volume.name.as_deref(), Some("renamed"));
    }

    #[tokio::test]
    async fn save_volume_as_image_uses_qcow2() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/tenant-1/volumes/vol-1/action"))
            .and(body_json(json!({
                "os-volume_upload_image": {
                    "image_name": "snapshot",
                    "disk_format": "qcow2",
                    "container_format": "ovf"
                }
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "os-volume_upload_image": {
                    "id": "vol-1",
                    "image_id": "img-9",
                    "image_name": "snapshot",
                    "status": "uploading"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upload = test_client(&server)
            .save_volume_as_image("vol-1", "snapshot")
            .await
            .unwrap();
        assert_eq!(upload.image_id.as_deref(), Some("img-9"));
    }

    #[tokio::test]
    async fn list_backups_passes_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/tenant-1/backups/detail"))
            .and(query_param("limit", "5"))
            .and(query_param("sort", "created_at:desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "backups": [{ "id": "bk-1", "instance_uuid": "srv-1", "schedule": "daily", "retention": 14 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = BackupListParams {
            limit: Some(5),
            offset: None,
            sort: Some("created_at:desc".into()),
        };
        let backups = test_client(&server)
            .list_backups_detail(&params)
            .await
            .unwrap();
        assert_eq!(backups[0].schedule, Some(BackupSchedule::Daily));
        assert_eq!(backups[0].retention, Some(14));
    }

    #[tokio::test]
    async fn enable_auto_backup_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/tenant-1/backups"))
            .and(body_json(json!({
                "backup": { "instance_uuid": "srv-1", "schedule": "daily", "retention": 30 }
            })))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({ "backup": { "id": "bk-2", "instance_uuid": "srv-1" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backup = test_client(&server)
            .enable_auto_backup("srv-1", Some(BackupSchedule::Daily), Some(30))
            .await
            .unwrap();
        assert_eq!(backup.id, "bk-2");
    }

    #[tokio::test]
    async fn retention_disable_and_restore() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v3/tenant-1/backups/srv-1"))
            .and(body_json(json!({ "backup": { "retention": 20 } })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "backup": { "id": "bk-2", "retention": 20 } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v3/tenant-1/backups/srv-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v3/tenant-1/backups/bk-2/restore"))
            .and(body_json(json!({ "restore": { "volume_id": "vol-1" } })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "restore": { "backup_id": "bk-2", "volume_id": "vol-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let backup = client.update_backup_retention("srv-1", 20).await.unwrap();
        assert_eq!(backup.retention, Some(20));
        client.disable_auto_backup("srv-1").await.unwrap();
        let restore = client.restore_backup("bk-2", "vol-1").await.unwrap();
        assert_eq!(restore.volume_id, "vol-1");
    }

    #[tokio::test]
    async fn volume_types() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/tenant-1/types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "volume_types": [{ "id": "t-1", "name": "c3j1-ds02-boot", "extra_specs": {} }]
            })))
            .mount(&server)
            .await;

        let types = test_client(&server).list_volume_types().await.unwrap();
        assert_eq!(types[0].name, "c3j1-ds02-boot");
    }
}
