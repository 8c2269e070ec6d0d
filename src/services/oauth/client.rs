use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ProviderError;
use crate::services::DebugSink;
use crate::services::oauth::types::{
    ApiErrorBody, ClientGrantRequest, OAuthErrorBody, OAuthTokenResponse, ResourceServerRequest,
};

const TOKEN_PATH: &str = "/oauth/token";
const RESOURCE_SERVERS_PATH: &str = "/api/v2/resource-servers";
const CLIENT_GRANTS_PATH: &str = "/api/v2/client-grants";

pub const MY_ACCOUNT_SCOPE: &str = "create:authentication-methods";
const MY_ACCOUNT_API_NAME: &str = "Auth0 My Account API";
const TOKEN_DIALECT: &str = "rfc9068_profile";

/// Resource-owner credentials for the password grant.
#[derive(Clone, Copy)]
pub struct PasswordGrant<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Thin client over the tenant's OAuth token endpoint and management API.
///
/// Audiences and identifiers are always derived from `domain`; `base_url` only decides
/// where requests are sent.
#[derive(Clone, Debug)]
pub struct IdentityProviderClient {
    http: Client,
    base_url: Url,
    domain: String,
}

impl IdentityProviderClient {
    pub fn new(http: Client, domain: &str) -> Result<Self, ProviderError> {
        let raw = format!("https://{domain}/");
        let base_url = Url::parse(&raw).map_err(|e| ProviderError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })?;
        Ok(Self::with_base_url(http, domain, base_url))
    }

    pub fn with_base_url(http: Client, domain: &str, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            domain: domain.to_string(),
        }
    }

    pub fn management_audience(&self) -> String {
        format!("https://{}/api/v2/", self.domain)
    }

    pub fn my_account_audience(&self) -> String {
        format!("https://{}/me/", self.domain)
    }

    /// Management API token via the client-credentials grant.
    pub fn client_credentials_token(
        &self,
        client_id: &str,
        client_secret: &str,
        debug: Option<&dyn DebugSink>,
    ) -> Result<OAuthTokenResponse, ProviderError> {
        let audience = self.management_audience();
        let request = self.http.post(self.endpoint(TOKEN_PATH)?).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("audience", audience.as_str()),
        ]);

        self.token_request(request, debug)
    }

    pub fn create_my_account_resource_server(
        &self,
        management_token: &str,
        debug: Option<&dyn DebugSink>,
    ) -> Result<Value, ProviderError> {
        let body = ResourceServerRequest {
            identifier: self.my_account_audience(),
            name: MY_ACCOUNT_API_NAME.to_string(),
            skip_consent_for_verifiable_first_party_clients: false,
            token_dialect: TOKEN_DIALECT.to_string(),
        };
        let request = self
            .http
            .post(self.endpoint(RESOURCE_SERVERS_PATH)?)
            .bearer_auth(management_token)
            .json(&body);

        self.management_request(RESOURCE_SERVERS_PATH, request, debug)
    }

    pub fn create_my_account_client_grant(
        &self,
        management_token: &str,
        client_id: &str,
        debug: Option<&dyn DebugSink>,
    ) -> Result<Value, ProviderError> {
        let body = ClientGrantRequest {
            client_id: client_id.to_string(),
            audience: self.my_account_audience(),
            scope: vec![MY_ACCOUNT_SCOPE.to_string()],
        };
        let request = self
            .http
            .post(self.endpoint(CLIENT_GRANTS_PATH)?)
            .bearer_auth(management_token)
            .json(&body);

        self.management_request(CLIENT_GRANTS_PATH, request, debug)
    }

    /// My Account API token via the resource-owner password grant.
    pub fn password_grant(
        &self,
        grant: PasswordGrant<'_>,
        debug: Option<&dyn DebugSink>,
    ) -> Result<OAuthTokenResponse, ProviderError> {
        let audience = self.my_account_audience();
        let request = self.http.post(self.endpoint(TOKEN_PATH)?).form(&[
            ("grant_type", "password"),
            ("username", grant.username),
            ("password", grant.password),
            ("scope", MY_ACCOUNT_SCOPE),
            ("audience", audience.as_str()),
            ("client_id", grant.client_id),
            ("client_secret", grant.client_secret),
        ]);

        self.token_request(request, debug)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    fn token_request(
        &self,
        request: RequestBuilder,
        debug: Option<&dyn DebugSink>,
    ) -> Result<OAuthTokenResponse, ProviderError> {
        let (status, body) = read_json(TOKEN_PATH, request)?;

        if let Some(error) = error_field(&body) {
            let parsed: OAuthErrorBody = decode(TOKEN_PATH, body.clone())?;
            warn!(endpoint = TOKEN_PATH, %status, error, "token request rejected");
            return Err(ProviderError::OAuth {
                endpoint: TOKEN_PATH.to_string(),
                error: error.to_string(),
                description: parsed.error_description,
            });
        }
        ensure_success(TOKEN_PATH, status)?;

        if let Some(sink) = debug {
            sink.emit(&debug_label(TOKEN_PATH), &body);
        }
        decode(TOKEN_PATH, body)
    }

    fn management_request(
        &self,
        path: &'static str,
        request: RequestBuilder,
        debug: Option<&dyn DebugSink>,
    ) -> Result<Value, ProviderError> {
        let (status, body) = read_json(path, request)?;

        if let Some(sink) = debug {
            sink.emit(&debug_label(path), &body);
        }

        if let Some(error) = error_field(&body) {
            let parsed: ApiErrorBody = decode(path, body.clone())?;
            warn!(
                endpoint = path,
                status = ?parsed.status_code,
                error_code = ?parsed.error_code,
                "management API request rejected"
            );
            return Err(ProviderError::Api {
                endpoint: path.to_string(),
                error: error.to_string(),
                message: parsed.message.unwrap_or_default(),
            });
        }
        ensure_success(path, status)?;

        debug!(endpoint = path, %status, "management API request succeeded");
        Ok(body)
    }
}

/// Send the request and read the whole body as JSON. An empty body reads as `null`.
fn read_json(
    endpoint: &str,
    request: RequestBuilder,
) -> Result<(StatusCode, Value), ProviderError> {
    let transport = |source| ProviderError::Transport {
        endpoint: endpoint.to_string(),
        source,
    };

    let response = request.send().map_err(transport)?;
    let status = response.status();
    let bytes = response.bytes().map_err(transport)?;

    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }

    match serde_json::from_slice(&bytes) {
        Ok(body) => Ok((status, body)),
        Err(_) if !status.is_success() => Err(ProviderError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        }),
        Err(e) => Err(ProviderError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn ensure_success(endpoint: &str, status: StatusCode) -> Result<(), ProviderError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ProviderError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Non-empty `error` member, if the body has one.
fn error_field(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T, ProviderError> {
    serde_json::from_value(body).map_err(|e| ProviderError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

fn debug_label(endpoint: &str) -> String {
    format!("DEBUG {endpoint}")
}
