use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::MintError;
use crate::services::jwks::PublicKeyMaterial;

/// Signature algorithms accepted on verification. Everything else (`none`, HMAC, EC, ...)
/// is rejected before the signature is looked at.
const RSA_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Header and claims of a token whose signature checked out.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: Header,
    pub claims: Value,
}

impl DecodedToken {
    pub fn claims_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.claims.clone())
    }

    pub fn to_json(&self) -> Value {
        json!({
            "header": self.header,
            "claims": self.claims,
        })
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Signature + algorithm check of a compact token.
///
/// Self-verification only: `exp`, `nbf`, `aud` and `iss` are not validated here.
/// Relying parties enforce those.
#[derive(Clone, Debug, Default)]
pub struct TokenVerifier;

impl TokenVerifier {
    pub fn verify(
        &self,
        token: &str,
        public_key: &PublicKeyMaterial,
    ) -> Result<DecodedToken, MintError> {
        let alg = rsa_algorithm(token)?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_pem().as_bytes())
            .map_err(|e| MintError::KeyDecodeError(e.to_string()))?;

        let mut validation = Validation::new(alg);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Value>(token, &decoding_key, &validation)
            .map_err(map_jwt_error)?;

        Ok(DecodedToken {
            header: data.header,
            claims: data.claims,
        })
    }
}

/// Structural check (three base64url segments, JSON header) and algorithm allow-list.
fn rsa_algorithm(token: &str) -> Result<Algorithm, MintError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(MintError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    if header.is_empty() || payload.is_empty() {
        return Err(MintError::MalformedToken(
            "header and payload must not be empty".to_string(),
        ));
    }

    let header_bytes = decode_segment("header", header)?;
    decode_segment("payload", payload)?;
    decode_segment("signature", signature)?;

    let raw: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| MintError::MalformedToken(format!("invalid header: {e}")))?;

    match Algorithm::from_str(&raw.alg) {
        Ok(alg) if RSA_ALGORITHMS.contains(&alg) => Ok(alg),
        _ => {
            warn!(alg = %raw.alg, "rejecting token signed with a non-RSA algorithm");
            Err(MintError::UnacceptableAlgorithm(raw.alg))
        }
    }
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, MintError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| MintError::MalformedToken(format!("{name} is not base64url: {e}")))
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> MintError {
    match e.kind() {
        ErrorKind::InvalidSignature => MintError::SignatureInvalid,
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            MintError::KeyDecodeError(e.to_string())
        }
        ErrorKind::InvalidAlgorithm => MintError::UnacceptableAlgorithm(e.to_string()),
        _ => MintError::MalformedToken(e.to_string()),
    }
}
