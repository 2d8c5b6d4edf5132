//! Asynchronous compute client.

use crate::models::{
    Address, CreateKeypairRequest, CreateServerRequest, Flavor, Graph, GraphParams,
    InterfaceAttachment, Keypair, KeypairEntry, RebootType, RemoteConsole, Server,
    ServerSecurityGroup, ServerSettings, VolumeAttachment,
};
use crate::Result;
use conoha_core::client::wrap;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

const PREFIX: &str = "/v2.1";

/// Console type requested when none is given.
pub const DEFAULT_CONSOLE_TYPE: &str = "novnc";

/// Client for the compute service.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    inner: ServiceClient,
}

impl ComputeClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::Compute),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    // Servers

    /// List servers with minimal information.
    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        self.inner
            .get_key(&format!("{PREFIX}/servers"), Vec::new(), "servers")
            .await
    }

    /// List servers with full details.
    pub async fn list_servers_detail(&self) -> Result<Vec<Server>> {
        self.inner
            .get_key(&format!("{PREFIX}/servers/detail"), Vec::new(), "servers")
            .await
    }

    /// Fetch one server.
    pub async fn get_server(&self, server_id: &str) -> Result<Server> {
        self.inner
            .get_key(&server_path(server_id), Vec::new(), "server")
            .await
    }

    /// Create a server. The response carries the id and the root password.
    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<Server> {
        self.inner
            .send_key(
                Method::POST,
                &format!("{PREFIX}/servers"),
                &wrap("server", request),
                "server",
            )
            .await
    }

    /// Delete a server.
    pub async fn delete_server(&self, server_id: &str) -> Result<()> {
        self.inner.delete(&server_path(server_id)).await
    }

    // Actions

    async fn action(&self, server_id: &str, body: &Value) -> Result<()> {
        debug!(server_id, action = ?body.as_object().and_then(|o| o.keys().next()), "server action");
        self.inner
            .send_empty(
                Method::POST,
                &format!("{}/action", server_path(server_id)),
                Some(body),
            )
            .await
    }

    /// Power on a server.
    pub async fn start_server(&self, server_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "os-start": null })).await
    }

    /// Shut a server down gracefully.
    pub async fn stop_server(&self, server_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "os-stop": null })).await
    }

    /// Power a server off immediately.
    pub async fn force_stop_server(&self, server_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "os-stop": { "force_shutdown": true } }))
            .await
    }

    /// Reboot a server.
    pub async fn reboot_server(&self, server_id: &str, reboot_type: RebootType) -> Result<()> {
        self.action(server_id, &json!({ "reboot": { "type": reboot_type } }))
            .await
    }

    /// Change the flavor of a stopped server.
    pub async fn resize_server(&self, server_id: &str, flavor_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "resize": { "flavorRef": flavor_id } }))
            .await
    }

    /// Confirm a pending resize.
    pub async fn confirm_resize(&self, server_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "confirmResize": null })).await
    }

    /// Roll back a pending resize.
    pub async fn revert_resize(&self, server_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "revertResize": null })).await
    }

    /// Reinstall the OS from an image.
    pub async fn rebuild_server(
        &self,
        server_id: &str,
        image_id: &str,
        admin_pass: &str,
    ) -> Result<()> {
        let body = json!({ "rebuild": { "imageRef": image_id, "adminPass": admin_pass } });
        self.action(server_id, &body).await
    }

    /// Insert an ISO image into the virtual drive.
    pub async fn mount_iso(&self, server_id: &str, image_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "mountImage": { "imageid": image_id } }))
            .await
    }

    /// Eject an ISO image.
    pub async fn unmount_iso(&self, server_id: &str, image_id: &str) -> Result<()> {
        self.action(server_id, &json!({ "unmountImage": { "imageid": image_id } }))
            .await
    }

    /// Change hardware settings of a stopped server.
    pub async fn set_server_settings(
        &self,
        server_id: &str,
        settings: &ServerSettings,
    ) -> Result<()> {
        self.action(server_id, &json!({ "setServerSettings": settings }))
            .await
    }

    // Metadata, addresses, security groups

    /// Fetch user metadata.
    pub async fn get_server_metadata(&self, server_id: &str) -> Result<HashMap<String, String>> {
        self.inner
            .get_key(
                &format!("{}/metadata", server_path(server_id)),
                Vec::new(),
                "metadata",
            )
            .await
    }

    /// Replace user metadata and return the stored result.
    pub async fn update_server_metadata(
        &self,
        server_id: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        self.inner
            .send_key(
                Method::PUT,
                &format!("{}/metadata", server_path(server_id)),
                &wrap("metadata", metadata),
                "metadata",
            )
            .await
    }

    /// Addresses of a server, keyed by network name.
    pub async fn get_server_addresses(
        &self,
        server_id: &str,
    ) -> Result<HashMap<String, Vec<Address>>> {
        self.inner
            .get_key(
                &format!("{}/ips", server_path(server_id)),
                Vec::new(),
                "addresses",
            )
            .await
    }

    /// Addresses of a server on one network.
    pub async fn get_server_addresses_by_network(
        &self,
        server_id: &str,
        network_name: &str,
    ) -> Result<Vec<Address>> {
        self.inner
            .get_key(
                &format!("{}/ips/{network_name}", server_path(server_id)),
                Vec::new(),
                network_name,
            )
            .await
    }

    /// Security groups attached to a server.
    pub async fn get_server_security_groups(
        &self,
        server_id: &str,
    ) -> Result<Vec<ServerSecurityGroup>> {
        self.inner
            .get_key(
                &format!("{}/os-security-groups", server_path(server_id)),
                Vec::new(),
                "security_groups",
            )
            .await
    }

    /// Open a remote console; `console_type` defaults to `novnc`.
    pub async fn get_console_url(
        &self,
        server_id: &str,
        console_type: Option<&str>,
    ) -> Result<RemoteConsole> {
        let body = json!({
            "remote_console": {
                "protocol": "vnc",
                "type": console_type.unwrap_or(DEFAULT_CONSOLE_TYPE),
            }
        });
        self.inner
            .send_key(
                Method::POST,
                &format!("{}/remote-consoles", server_path(server_id)),
                &body,
                "remote_console",
            )
            .await
    }

    // Flavors

    /// List flavors with minimal information.
    pub async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        self.inner
            .get_key(&format!("{PREFIX}/flavors"), Vec::new(), "flavors")
            .await
    }

    /// List flavors with full details.
    pub async fn list_flavors_detail(&self) -> Result<Vec<Flavor>> {
        self.inner
            .get_key(&format!("{PREFIX}/flavors/detail"), Vec::new(), "flavors")
            .await
    }

    /// Fetch one flavor.
    pub async fn get_flavor(&self, flavor_id: &str) -> Result<Flavor> {
        self.inner
            .get_key(&format!("{PREFIX}/flavors/{flavor_id}"), Vec::new(), "flavor")
            .await
    }

    // Keypairs

    /// List SSH keypairs.
    ///
    /// The service nests each entry as `{"keypair": {..}}`. The wrapper is
    /// stripped, so the result holds the same [`Keypair`] shape that
    /// [`get_keypair`](Self::get_keypair) returns.
    pub async fn list_keypairs(&self) -> Result<Vec<Keypair>> {
        let entries: Vec<KeypairEntry> = self
            .inner
            .get_key(&format!("{PREFIX}/os-keypairs"), Vec::new(), "keypairs")
            .await?;
        Ok(entries.into_iter().map(|entry| entry.keypair).collect())
    }

    /// Import `public_key`, or let the server generate a pair when `None`.
    pub async fn create_keypair(&self, name: &str, public_key: Option<&str>) -> Result<Keypair> {
        let body = CreateKeypairRequest {
            name,
            public_key: public_key.filter(|key| !key.is_empty()),
        };
        self.inner
            .send_key(
                Method::POST,
                &format!("{PREFIX}/os-keypairs"),
                &wrap("keypair", &body),
                "keypair",
            )
            .await
    }

    /// Fetch one keypair.
    pub async fn get_keypair(&self, name: &str) -> Result<Keypair> {
        self.inner
            .get_key(&format!("{PREFIX}/os-keypairs/{name}"), Vec::new(), "keypair")
            .await
    }

    /// Delete a keypair.
    pub async fn delete_keypair(&self, name: &str) -> Result<()> {
        self.inner
            .delete(&format!("{PREFIX}/os-keypairs/{name}"))
            .await
    }

    // Ports

    /// Ports attached to a server.
    pub async fn list_attached_ports(&self, server_id: &str) -> Result<Vec<InterfaceAttachment>> {
        self.inner
            .get_key(&interfaces_path(server_id), Vec::new(), "interfaceAttachments")
            .await
    }

    /// One attached port.
    pub async fn get_attached_port(
        &self,
        server_id: &str,
        port_id: &str,
    ) -> Result<InterfaceAttachment> {
        self.inner
            .get_key(
                &format!("{}/{port_id}", interfaces_path(server_id)),
                Vec::new(),
                "interfaceAttachment",
            )
            .await
    }

    /// Attach an existing port.
    pub async fn attach_port(&self, server_id: &str, port_id: &str) -> Result<InterfaceAttachment> {
        let body = json!({ "interfaceAttachment": { "port_id": port_id } });
        self.inner
            .send_key(
                Method::POST,
                &interfaces_path(server_id),
                &body,
                "interfaceAttachment",
            )
            .await
    }

    /// Detach a port.
    pub async fn detach_port(&self, server_id: &str, port_id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{}/{port_id}", interfaces_path(server_id)))
            .await
    }

    // Volumes

    /// Volumes attached to a server.
    pub async fn list_attached_volumes(&self, server_id: &str) -> Result<Vec<VolumeAttachment>> {
        self.inner
            .get_key(&attachments_path(server_id), Vec::new(), "volumeAttachments")
            .await
    }

    /// One attached volume.
    pub async fn get_attached_volume(
        &self,
        server_id: &str,
        volume_id: &str,
    ) -> Result<VolumeAttachment> {
        self.inner
            .get_key(
                &format!("{}/{volume_id}", attachments_path(server_id)),
                Vec::new(),
                "volumeAttachment",
            )
            .await
    }

    /// Attach a volume to a stopped server.
    pub async fn attach_volume(&self, server_id: &str, volume_id: &str) -> Result<VolumeAttachment> {
        let body = json!({ "volumeAttachment": { "volumeId": volume_id } });
        self.inner
            .send_key(
                Method::POST,
                &attachments_path(server_id),
                &body,
                "volumeAttachment",
            )
            .await
    }

    /// Detach a volume from a stopped server.
    pub async fn detach_volume(&self, server_id: &str, volume_id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{}/{volume_id}", attachments_path(server_id)))
            .await
    }

    // Monitoring

    /// CPU usage graph.
    pub async fn get_cpu_graph(&self, server_id: &str, params: &GraphParams) -> Result<Graph> {
        self.inner
            .get_key(&rrd_path(server_id, "cpu"), params.to_pairs(), "cpu")
            .await
    }

    /// Disk I/O graph, optionally for one device such as `vda`.
    pub async fn get_disk_io_graph(
        &self,
        server_id: &str,
        device: Option<&str>,
        params: &GraphParams,
    ) -> Result<Graph> {
        let mut pairs = Vec::new();
        if let Some(device) = device.filter(|d| !d.is_empty()) {
            pairs.push(("device", device.to_string()));
        }
        pairs.extend(params.to_pairs());
        self.inner
            .get_key(&rrd_path(server_id, "disk"), pairs, "disk")
            .await
    }

    /// Network traffic graph for one port.
    pub async fn get_traffic_graph(
        &self,
        server_id: &str,
        port_id: &str,
        params: &GraphParams,
    ) -> Result<Graph> {
        let mut pairs = vec![("port_id", port_id.to_string())];
        pairs.extend(params.to_pairs());
        self.inner
            .get_key(&rrd_path(server_id, "interface"), pairs, "interface")
            .await
    }
}

fn server_path(server_id: &str) -> String {
    format!("{PREFIX}/servers/{server_id}")
}

fn interfaces_path(server_id: &str) -> String {
    format!("{}/os-interface", server_path(server_id))
}

fn attachments_path(server_id: &str) -> String {
    format!("{}/os-volume_attachments", server_path(server_id))
}

fn rrd_path(server_id: &str, metric: &str) -> String {
    format!("{}/rrd/{metric}", server_path(server_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conoha_core::{ConohaConfig, Credentials, Error};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ComputeClient {
        let config = ConohaConfig::new().with_endpoint("compute", server.uri());
        let session =
            Session::from_config(&config, Credentials::token("test-token"), HashMap::new())
                .unwrap();
        ComputeClient::new(session)
    }

    async fn expect_action(server: &MockServer, id: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/v2.1/servers/{id}/action").as_str()))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn list_servers_detail_parses_servers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/servers/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "servers": [{
                    "id": "srv-1",
                    "name": "web",
                    "status": "ACTIVE",
                    "image": "",
                    "OS-EXT-STS:power_state": 1,
                    "metadata": { "instance_name_tag": "web-01" },
                    "addresses": {
                        "ext-net": [{ "addr": "203.0.113.10", "version": 4 }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let servers = test_client(&server).list_servers_detail().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].status.as_deref(), Some("ACTIVE"));
        assert_eq!(servers[0].power_state, Some(1));
        assert_eq!(servers[0].image, Some(json!("")));
        let addresses = servers[0].addresses.as_ref().unwrap();
        assert_eq!(addresses["ext-net"][0].addr, "203.0.113.10");
    }

    #[tokio::test]
    async fn create_server_wraps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.1/servers"))
            .and(body_json(json!({
                "server": {
                    "flavorRef": "flv",
                    "adminPass": "P@ssw0rd",
                    "block_device_mapping_v2": [{ "uuid": "vol" }],
                    "metadata": { "instance_name_tag": "tag" }
                }
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "server": { "id": "srv-9", "adminPass": "P@ssw0rd", "links": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateServerRequest::new("flv", "P@ssw0rd", "vol", "tag");
        let created = test_client(&server).create_server(&request).await.unwrap();
        assert_eq!(created.id, "srv-9");
        assert_eq!(created.admin_pass.as_deref(), Some("P@ssw0rd"));
    }

    #[tokio::test]
    async fn power_actions_send_expected_bodies() {
        let server = MockServer::start().await;
        expect_action(&server, "a", json!({ "os-start": null })).await;
        expect_action(&server, "b", json!({ "os-stop": null })).await;
        expect_action(&server, "c", json!({ "os-stop": { "force_shutdown": true } })).await;
        expect_action(&server, "d", json!({ "reboot": { "type": "HARD" } })).await;

        let client = test_client(&server);
        client.start_server("a").await.unwrap();
        client.stop_server("b").await.unwrap();
        client.force_stop_server("c").await.unwrap();
        client.reboot_server("d", RebootType::Hard).await.unwrap();
    }

    #[tokio::test]
    async fn resize_and_rebuild_actions() {
        let server = MockServer::start().await;
        expect_action(&server, "a", json!({ "resize": { "flavorRef": "big" } })).await;
        expect_action(&server, "b", json!({ "confirmResize": null })).await;
        expect_action(&server, "c", json!({ "revertResize": null })).await;
        expect_action(
            &server,
            "d",
            json!({ "rebuild": { "imageRef": "img", "adminPass": "pw" } }),
        )
        .await;

        let client = test_client(&server);
        client.resize_server("a", "big").await.unwrap();
        client.confirm_resize("b").await.unwrap();
        client.revert_resize("c").await.unwrap();
        client.rebuild_server("d", "img", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn iso_and_settings_actions() {
        let server = MockServer::start().await;
        expect_action(&server, "a", json!({ "mountImage": { "imageid": "iso" } })).await;
        expect_action(&server, "b", json!({ "unmountImage": { "imageid": "iso" } })).await;
        expect_action(
            &server,
            "c",
            json!({ "setServerSettings": { "hwVideoModel": "vga", "hwVifModel": "e1000" } }),
        )
        .await;

        let client = test_client(&server);
        client.mount_iso("a", "iso").await.unwrap();
        client.unmount_iso("b", "iso").await.unwrap();
        let settings = ServerSettings {
            hw_video_model: Some("vga".into()),
            hw_vif_model: Some("e1000".into()),
            hw_disk_bus: None,
        };
        client.set_server_settings("c", &settings).await.unwrap();
    }

    #[tokio::test]
    async fn update_metadata_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v2.1/servers/srv/metadata"))
            .and(body_json(json!({ "metadata": { "role": "db" } })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "metadata": { "role": "db", "instance_name_tag": "x" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let metadata = HashMap::from([("role".to_string(), "db".to_string())]);
        let stored = test_client(&server)
            .update_server_metadata("srv", &metadata)
            .await
            .unwrap();
        assert_eq!(stored["role"], "db");
        assert_eq!(stored["instance_name_tag"], "x");
    }

    #[tokio::test]
    async fn addresses_by_network_unwraps_network_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/servers/srv/ips/ext-net"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ext-net": [
                    { "addr": "203.0.113.10", "version": 4 },
                    { "addr": "2001:db8::10", "version": 6 }
                ]
            })))
            .mount(&server)
            .await;

        let addresses = test_client(&server)
            .get_server_addresses_by_network("srv", "ext-net")
            .await
            .unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[1].version, 6);
    }

    #[tokio::test]
    async fn console_defaults_to_novnc() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.1/servers/srv/remote-consoles"))
            .and(body_json(json!({ "remote_console": { "protocol": "vnc", "type": "novnc" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "remote_console": {
                    "protocol": "vnc",
                    "type": "novnc",
                    "url": "https://console.example/vnc_auto.html?token=abc"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let console = test_client(&server)
            .get_console_url("srv", None)
            .await
            .unwrap();
        assert_eq!(console.console_type, "novnc");
        assert!(console.url.contains("token=abc"));
    }

    #[tokio::test]
    async fn keypair_listing_is_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/os-keypairs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keypairs": [
                    { "keypair": { "name": "deploy", "fingerprint": "aa:bb", "type": "ssh" } },
                    { "keypair": { "name": "ops" } }
                ]
            })))
            .mount(&server)
            .await;

        let keypairs = test_client(&server).list_keypairs().await.unwrap();
        let names: Vec<_> = keypairs.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["deploy", "ops"]);
        assert_eq!(
            serde_json::to_value(&keypairs[0]).unwrap(),
            json!({ "name": "deploy", "fingerprint": "aa:bb", "type": "ssh" })
        );
    }

    #[tokio::test]
    async fn get_server_returns_inner_object_unchanged() {
        let server = MockServer::start().await;
        let inner = json!({
            "id": "srv-1",
            "name": "web",
            "hostId": "abc",
            "OS-EXT-AZ:availability_zone": "nova",
            "config_drive": "",
            "accessIPv4": ""
        });
        Mock::given(method("GET"))
            .and(path("/v2.1/servers/srv-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "server": inner })))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = test_client(&server).get_server("srv-1").await.unwrap();
        assert_eq!(fetched.extra["hostId"], "abc");
        assert_eq!(serde_json::to_value(&fetched).unwrap(), inner);
    }

    #[tokio::test]
    async fn create_keypair_without_public_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.1/os-keypairs"))
            .and(body_json(json!({ "keypair": { "name": "gen" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keypair": { "name": "gen", "private_key": "-----BEGIN" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let keypair = test_client(&server)
            .create_keypair("gen", None)
            .await
            .unwrap();
        assert_eq!(keypair.private_key.as_deref(), Some("-----BEGIN"));
    }

    #[tokio::test]
    async fn attach_volume_and_port() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.1/servers/srv/os-volume_attachments"))
            .and(body_json(json!({ "volumeAttachment": { "volumeId": "vol" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "volumeAttachment": { "id": "vol", "volumeId": "vol", "serverId": "srv", "device": "/dev/vdb" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2.1/servers/srv/os-interface"))
            .and(body_json(json!({ "interfaceAttachment": { "port_id": "port" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "interfaceAttachment": {
                    "port_id": "port",
                    "net_id": "net",
                    "fixed_ips": [{ "ip_address": "10.0.0.5", "subnet_id": "sub" }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let attachment = client.attach_volume("srv", "vol").await.unwrap();
        assert_eq!(attachment.device.as_deref(), Some("/dev/vdb"));
        let port = client.attach_port("srv", "port").await.unwrap();
        assert_eq!(port.fixed_ips[0].ip_address, "10.0.0.5");
    }

    #[tokio::test]
    async fn detach_calls_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2.1/servers/srv/os-volume_attachments/vol"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v2.1/servers/srv/os-interface/port"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.detach_volume("srv", "vol").await.unwrap();
        client.detach_port("srv", "port").await.unwrap();
    }

    #[tokio::test]
    async fn traffic_graph_sends_port_and_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/servers/srv/rrd/interface"))
            .and(query_param("port_id", "port"))
            .and(query_param("start_date_raw", "1700000000"))
            .and(query_param("mode", "max"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "interface": {
                    "schema": ["unixtime", "rx", "tx"],
                    "data": [[1_700_000_000, 10.5, null]]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = GraphParams {
            start_date_raw: Some(1_700_000_000),
            end_date_raw: None,
            mode: Some("max".into()),
        };
        let graph = test_client(&server)
            .get_traffic_graph("srv", "port", &params)
            .await
            .unwrap();
        assert_eq!(graph.schema, ["unixtime", "rx", "tx"]);
        assert!(graph.data[0][2].is_null());
    }

    #[tokio::test]
    async fn disk_graph_includes_device() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/servers/srv/rrd/disk"))
            .and(query_param("device", "vda"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "disk": { "schema": ["unixtime"], "data": [] } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let graph = test_client(&server)
            .get_disk_io_graph("srv", Some("vda"), &GraphParams::default())
            .await
            .unwrap();
        assert!(graph.data.is_empty());
    }

    #[tokio::test]
    async fn get_flavor_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.1/flavors/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "itemNotFound": { "code": 404, "message": "Flavor nope could not be found." }
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).get_flavor("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.status_code(), Some(404));
    }
}
