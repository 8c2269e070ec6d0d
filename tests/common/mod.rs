//! Shared helpers for the integration tests: fixtures, configs and a mock identity provider.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;

use jwt_mint::config::{CustomConfig, RsConfig};
use jwt_mint::services::DebugSink;
use serde_json::{Map, Value, json};
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_string(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture")
}

pub fn claims() -> Map<String, Value> {
    match json!({
        "iss": "https://issuer.test",
        "aud": "https://aud.test",
        "sub": "user-1",
        "client_id": "client-1"
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Custom-token config using the local `jwks.json` fixture and `kid = "k1"`.
pub fn custom_config() -> CustomConfig {
    CustomConfig {
        claims: claims(),
        header: [("kid".to_string(), Some("k1".to_string()))].into(),
        well_known_endpoint: None,
        jwk_local_file: Some(fixture("jwks.json")),
        private_key_file_path: Some(fixture("rsa_private_pkcs1.pem")),
    }
}

pub fn rs_config(setup_rs: bool) -> RsConfig {
    RsConfig {
        domain: Some("tenant.test".to_string()),
        client_id: Some("client-1".to_string()),
        client_secret: Some("client-secret".to_string()),
        username: Some("alice@example.test".to_string()),
        password: Some("hunter2".to_string()),
        setup_rs,
    }
}

pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[derive(Default)]
pub struct RecordingSink {
    entries: RefCell<Vec<(String, Value)>>,
}

impl RecordingSink {
    pub fn labels(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn get(&self, label: &str) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.clone())
    }
}

impl DebugSink for RecordingSink {
    fn emit(&self, label: &str, value: &Value) {
        self.entries
            .borrow_mut()
            .push((label.to_string(), value.clone()));
    }
}

/// Mock tenant serving the token endpoint and the management API.
pub struct MockIdentityProvider {
    pub server: MockServer,
}

impl MockIdentityProvider {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&self.server.uri()).expect("mock server url")
    }

    pub async fn mock_jwks(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_management_token(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "scope": "create:resource_servers create:client_grants",
                "expires_in": 86400,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_password_grant(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "scope": "create:authentication-methods",
                "expires_in": 600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_password_grant_error(&self, status: u16, error: &str, description: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": error,
                "error_description": description
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_resource_server_created(&self, management_token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v2/resource-servers"))
            .and(header("authorization", format!("Bearer {management_token}").as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "rs-1",
                "identifier": "https://tenant.test/me/",
                "name": "Auth0 My Account API",
                "token_dialect": "rfc9068_profile"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_resource_server_conflict(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v2/resource-servers"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "statusCode": 409,
                "error": "Conflict",
                "message": "A resource server with the same identifier already exists",
                "errorCode": "inexistent_resource_server"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_client_grant_created(&self, management_token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v2/client-grants"))
            .and(header("authorization", format!("Bearer {management_token}").as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "cgr-1",
                "client_id": "client-1",
                "audience": "https://tenant.test/me/",
                "scope": ["create:authentication-methods"]
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}
