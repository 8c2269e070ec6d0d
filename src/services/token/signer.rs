use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

use crate::error::MintError;
use crate::services::token::claims::{ClaimSet, HeaderOverrides};

/// Compact token plus the claims that went into it (defaults applied).
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: ClaimSet,
}

/// RS256 signer for custom tokens.
///
/// The private key is read from disk on every call and dropped once the token is
/// signed; nothing about it is kept or logged.
#[derive(Clone, Debug)]
pub struct TokenSigner {
    clock: fn() -> i64,
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSigner {
    pub fn new() -> Self {
        Self { clock: now_unix }
    }

    /// Signer with a fixed time source for `iat`/`exp` defaults.
    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self { clock }
    }

    pub fn sign(
        &self,
        mut claims: ClaimSet,
        headers: &HeaderOverrides,
        private_key_path: &Path,
    ) -> Result<SignedToken, MintError> {
        claims.apply_defaults((self.clock)())?;

        let encoding_key = load_signing_key(private_key_path)?;

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = headers.kid.clone();

        let token = jsonwebtoken::encode(&header, &claims, &encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            MintError::SigningFailure(e.to_string())
        })?;

        debug!(kid = ?header.kid, jti = ?claims.jti, "signed custom token");

        Ok(SignedToken { token, claims })
    }
}

/// Read an RSA private key (PKCS#1 or PKCS#8 PEM) and turn it into a signing key.
pub fn load_signing_key(path: &Path) -> Result<EncodingKey, MintError> {
    let pem = Zeroizing::new(fs::read(path).map_err(|e| MintError::KeyFileUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?);

    let text = std::str::from_utf8(&pem)
        .map_err(|_| MintError::InvalidKeyFormat("key file is not PEM text".to_string()))?;

    // jsonwebtoken only checks the PEM envelope; make sure there is an RSA key inside.
    RsaPrivateKey::from_pkcs1_pem(text)
        .map(drop)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(text).map(drop))
        .map_err(|e| {
            warn!(path = %path.display(), "private key is not an RSA key in PKCS#1 or PKCS#8 PEM");
            MintError::InvalidKeyFormat(e.to_string())
        })?;

    EncodingKey::from_rsa_pem(&pem).map_err(|e| MintError::InvalidKeyFormat(e.to_string()))
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
