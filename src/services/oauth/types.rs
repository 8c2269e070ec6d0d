use serde::{Deserialize, Serialize};

/// Successful `/oauth/token` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// RFC 6749 error body.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Management API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "errorCode")]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceServerRequest {
    pub identifier: String,
    pub name: String,
    pub skip_consent_for_verifiable_first_party_clients: bool,
    pub token_dialect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientGrantRequest {
    pub client_id: String,
    pub audience: String,
    pub scope: Vec<String>,
}
