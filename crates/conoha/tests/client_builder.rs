//! Integration tests for building a `ConohaClient`.

use conoha::{ConohaClient, Error};
use secrecy::ExposeSecret;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn no_environment() -> HashMap<String, String> {
    HashMap::new()
}

#[tokio::test]
async fn test_token_client_uses_templates() {
    let client = ConohaClient::builder()
        .token("T")
        .tenant_id("X")
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap();

    assert_eq!(
        client.resolve_endpoint("compute").unwrap(),
        "https://compute.c3j1.conoha.io"
    );
    assert_eq!(
        client.resolve_endpoint("block_storage").unwrap(),
        "https://block-storage.c3j1.conoha.io"
    );
    assert_eq!(client.region(), "c3j1");
    assert_eq!(client.tenant_id().await.as_deref(), Some("X"));
    assert_eq!(client.token().await.unwrap().expose_secret(), "T");
}

#[tokio::test]
async fn test_explicit_endpoint_beats_environment() {
    let environment = HashMap::from([
        ("compute".to_string(), "https://from-env".to_string()),
        ("dns".to_string(), "https://dns-from-env".to_string()),
    ]);
    let client = ConohaClient::builder()
        .token("T")
        .region("c3j2")
        .endpoint("compute", "https://custom")
        .environment_overrides(environment)
        .build()
        .await
        .unwrap();

    assert_eq!(client.resolve_endpoint("compute").unwrap(), "https://custom");
    assert_eq!(client.resolve_endpoint("dns").unwrap(), "https://dns-from-env");
    assert_eq!(
        client.resolve_endpoint("image").unwrap(),
        "https://image-service.c3j2.conoha.io"
    );
}

#[tokio::test]
async fn test_unknown_service_is_config_error() {
    let client = ConohaClient::builder()
        .token("T")
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap();

    let err = client.resolve_endpoint("mail").unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[tokio::test]
async fn test_password_client_authenticates_on_build() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Subject-Token", "tok-1")
                .set_body_json(json!({
                    "token": {
                        "expires_at": "2099-01-01T00:00:00Z",
                        "project": { "id": "tenant-9", "name": "gnct" },
                        "user": { "id": "user-9", "name": "api-user" },
                        "catalog": [
                            {
                                "type": "compute",
                                "name": "nova",
                                "endpoints": [
                                    { "interface": "public", "url": format!("{}/compute", server.uri()) }
                                ]
                            }
                        ]
                    }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers"))
        .and(header("x-auth-token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [ { "id": "srv-1", "name": "web" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConohaClient::builder()
        .username("api-user")
        .password("secret")
        .tenant_name("gnct")
        .endpoint("identity", server.uri())
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap();

    assert_eq!(client.tenant_id().await.as_deref(), Some("tenant-9"));
    assert_eq!(client.user_id().await.as_deref(), Some("user-9"));
    assert_eq!(
        client.resolve_endpoint("compute").unwrap(),
        format!("{}/compute", server.uri())
    );

    let servers = client.compute().list_servers().await.unwrap();
    assert_eq!(servers[0].id, "srv-1");
}

#[tokio::test]
async fn test_supplied_token_skips_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = ConohaClient::builder()
        .username("api-user")
        .password("secret")
        .token("pre-issued")
        .endpoint("identity", server.uri())
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap();

    assert_eq!(client.token().await.unwrap().expose_secret(), "pre-issued");
}

#[tokio::test]
async fn test_build_propagates_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
        .mount(&server)
        .await;

    let err = ConohaClient::builder()
        .user_id("user-9")
        .password("wrong")
        .endpoint("identity", server.uri())
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_password_without_user_is_rejected() {
    let err = ConohaClient::builder()
        .password("secret")
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigError(_)));
}

#[tokio::test]
async fn test_invalid_endpoint_is_rejected() {
    let err = ConohaClient::builder()
        .token("T")
        .endpoint("compute", "not a url")
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigError(_)));
}

#[tokio::test]
async fn test_service_handles_are_memoized() {
    let client = ConohaClient::builder()
        .token("T")
        .environment_overrides(no_environment())
        .build()
        .await
        .unwrap();

    assert!(std::ptr::eq(client.compute(), client.compute()));
    assert!(std::ptr::eq(client.dns(), client.dns()));
    assert!(std::ptr::eq(client.object_storage(), client.object_storage()));
    assert_eq!(
        client.load_balancer().base_url().unwrap(),
        "https://lbaas.c3j1.conoha.io"
    );
}
