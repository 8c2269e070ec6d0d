use reqwest::blocking::Client;
use tracing::info;
use url::Url;

use crate::config::RsConfig;
use crate::error::ProviderError;
use crate::services::DebugSink;
use crate::services::oauth::client::{IdentityProviderClient, PasswordGrant};
use crate::services::oauth::types::OAuthTokenResponse;

/// `rs` settings after the presence checks.
#[derive(Clone, Copy)]
struct Credentials<'a> {
    domain: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    username: &'a str,
    password: &'a str,
}

fn check_config(config: &RsConfig) -> Result<Credentials<'_>, ProviderError> {
    fn required<'a>(
        value: &'a Option<String>,
        name: &'static str,
    ) -> Result<&'a str, ProviderError> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ProviderError::ConfigIncomplete(name))
    }

    Ok(Credentials {
        domain: required(&config.domain, "domain")?,
        client_id: required(&config.client_id, "client_id")?,
        client_secret: required(&config.client_secret, "client_secret")?,
        username: required(&config.username, "username")?,
        password: required(&config.password, "password")?,
    })
}

/// Obtain a My Account API access token from the identity provider.
///
/// With `setup_rs`, the resource server and the client grant are created first using a
/// management token. Steps run in order and the first failure ends the flow.
#[derive(Clone, Debug)]
pub struct ResourceServerFlow {
    http: Client,
    base_url: Option<Url>,
}

impl ResourceServerFlow {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: None,
        }
    }

    /// Send requests to `base_url` instead of `https://{domain}/`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn run(
        &self,
        config: &RsConfig,
        debug: Option<&dyn DebugSink>,
    ) -> Result<OAuthTokenResponse, ProviderError> {
        let creds = check_config(config)?;

        let client = match &self.base_url {
            Some(base_url) => {
                IdentityProviderClient::with_base_url(self.http.clone(), creds.domain, base_url.clone())
            }
            None => IdentityProviderClient::new(self.http.clone(), creds.domain)?,
        };

        if config.setup_rs {
            let management = client.client_credentials_token(creds.client_id, creds.client_secret, debug)?;
            client.create_my_account_resource_server(&management.access_token, debug)?;
            client.create_my_account_client_grant(&management.access_token, creds.client_id, debug)?;
            info!(domain = creds.domain, "My Account API resource server and client grant created");
        }

        let token = client.password_grant(
            PasswordGrant {
                client_id: creds.client_id,
                client_secret: creds.client_secret,
                username: creds.username,
                password: creds.password,
            },
            debug,
        )?;

        info!(domain = creds.domain, scope = ?token.scope, "obtained access token");
        Ok(token)
    }
}
