use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MintError;

/// One entry of a JWK set. Only RSA keys can be turned into verification keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkKey {
    #[serde(default)]
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,
    // Certificate chain is never used; providers disagree on its shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<JwkKey>,
}

impl JwkSet {
    /// Key whose `kid` matches exactly (case-sensitive).
    pub fn find(&self, kid: &str) -> Option<&JwkKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// RSA public key as a standalone PEM `PUBLIC KEY` (SPKI) block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial(String);

impl PublicKeyMaterial {
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    pub fn as_pem(&self) -> &str {
        &self.0
    }
}

impl JwkKey {
    /// Rebuild the RSA public key from `n`/`e` and encode it as PEM.
    pub fn to_public_key(&self) -> Result<PublicKeyMaterial, MintError> {
        if self.kty != "RSA" {
            return Err(MintError::UnsupportedKeyType {
                kty: self.kty.clone(),
            });
        }

        let n = decode_component("n", self.n.as_deref())?;
        let e = decode_component("e", self.e.as_deref())?;

        let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|err| MintError::KeyDecodeError(err.to_string()))?;

        key.to_public_key_pem(LineEnding::LF)
            .map(PublicKeyMaterial)
            .map_err(|err| MintError::KeyDecodeError(err.to_string()))
    }
}

fn decode_component(name: &str, value: Option<&str>) -> Result<Vec<u8>, MintError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MintError::KeyDecodeError(format!("missing '{name}'")))?;

    // Some providers pad their base64url values.
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|err| MintError::KeyDecodeError(format!("'{name}' is not base64url: {err}")))?;

    if bytes.iter().all(|b| *b == 0) {
        return Err(MintError::KeyDecodeError(format!("'{name}' is zero")));
    }
    Ok(bytes)
}
