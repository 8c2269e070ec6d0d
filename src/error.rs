/*
 * Responsibility
 * - Error types for the token pipeline (MintError) and the identity-provider flow (ProviderError)
 * - AppError wraps them (and ConfigError) for the binary
 */
use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Stage of the custom-token pipeline a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateConfig,
    Sign,
    ResolveVerificationKey,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidateConfig => "validate config",
            Stage::Sign => "sign",
            Stage::ResolveVerificationKey => "resolve verification key",
            Stage::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum MintError {
    #[error("{0} is required in your config file")]
    ConfigIncomplete(String),

    #[error("invalid configuration value for {field}: {reason}")]
    ConfigInvalid { field: String, reason: String },

    #[error("could not load JWK set from {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("malformed JWK set: {0}")]
    MalformedKeySet(String),

    #[error("the JWK set contains no keys")]
    NoKeysAvailable,

    #[error("unsupported key type {kty:?} (expected RSA)")]
    UnsupportedKeyType { kty: String },

    #[error("could not decode RSA key: {0}")]
    KeyDecodeError(String),

    #[error("could not read private key file {path}: {reason}")]
    KeyFileUnreadable { path: String, reason: String },

    #[error("private key is not a valid RSA key (PKCS#1 or PKCS#8 PEM): {0}")]
    InvalidKeyFormat(String),

    #[error("failed to sign token: {0}")]
    SigningFailure(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unacceptable signing algorithm: {0}")]
    UnacceptableAlgorithm(String),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("signed token failed self-verification: {source}")]
    VerificationFailed {
        #[source]
        source: Box<MintError>,
    },
}

impl MintError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::ConfigIncomplete(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn verification_failed(source: MintError) -> Self {
        Self::VerificationFailed {
            source: Box::new(source),
        }
    }

    /// The pipeline stage this error is reported from.
    pub fn stage(&self) -> Stage {
        match self {
            MintError::ConfigIncomplete(_) | MintError::ConfigInvalid { .. } => {
                Stage::ValidateConfig
            }
            MintError::KeyFileUnreadable { .. }
            | MintError::InvalidKeyFormat(_)
            | MintError::SigningFailure(_) => Stage::Sign,
            MintError::SourceUnavailable { .. }
            | MintError::MalformedKeySet(_)
            | MintError::NoKeysAvailable
            | MintError::UnsupportedKeyType { .. }
            | MintError::KeyDecodeError(_) => Stage::ResolveVerificationKey,
            MintError::MalformedToken(_)
            | MintError::UnacceptableAlgorithm(_)
            | MintError::SignatureInvalid
            | MintError::VerificationFailed { .. } => Stage::Verify,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is required in your config file")]
    ConfigIncomplete(&'static str),

    #[error("invalid identity provider URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("{endpoint}: {error}{}", paren(.description))]
    OAuth {
        endpoint: String,
        error: String,
        description: Option<String>,
    },

    #[error("{endpoint}: {error}: {message}")]
    Api {
        endpoint: String,
        error: String,
        message: String,
    },
}

fn paren(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Top-level error of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{} failed: {}", .0.stage(), .0)]
    Mint(#[from] MintError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not initialise HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
