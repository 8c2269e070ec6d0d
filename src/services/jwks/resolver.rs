//! Verification-key lookup: load a JWK set, pick a key, turn it into PEM.
//!
//! Key selection policy:
//! - `kid` requested and present: that key.
//! - `kid` requested but absent: the first key, reported as [`KeySelection::Fallback`].
//! - no `kid` requested: the first key.
//! - empty set: `NoKeysAvailable`.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::MintError;
use crate::services::DebugSink;
use crate::services::jwks::source::JwkSource;
use crate::services::jwks::types::{JwkKey, JwkSet, PublicKeyMaterial};

/// How the key was chosen from the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// The requested `kid` was found.
    Exact,
    /// No `kid` was requested; the first key was used.
    First,
    /// The requested `kid` was not in the set; the first key was used instead.
    Fallback { requested: String },
}

#[derive(Debug, Clone)]
pub struct ResolvedKey {
    pub public_key: PublicKeyMaterial,
    pub kid: Option<String>,
    pub selection: KeySelection,
}

#[derive(Clone, Debug)]
pub struct JwkResolver {
    http: Client,
}

impl JwkResolver {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn resolve_key(
        &self,
        source: &JwkSource,
        kid: Option<&str>,
        debug: Option<&dyn DebugSink>,
    ) -> Result<ResolvedKey, MintError> {
        let raw = source.load(&self.http)?;
        let set = parse_key_set(&raw, debug)?;
        let (key, selection) = select_key(&set, kid)?;
        let public_key = key.to_public_key()?;

        debug!(source = %source, kid = ?key.kid, selection = ?selection, "resolved verification key");

        Ok(ResolvedKey {
            public_key,
            kid: key.kid.clone(),
            selection,
        })
    }
}

/// Parse a JWK set document. The raw document goes to the debug sink before it is
/// interpreted; a body that is not JSON is dumped as text.
pub fn parse_key_set(raw: &[u8], debug: Option<&dyn DebugSink>) -> Result<JwkSet, MintError> {
    let document: Value = match serde_json::from_slice(raw) {
        Ok(document) => document,
        Err(e) => {
            if let Some(sink) = debug {
                let text = String::from_utf8_lossy(raw).into_owned();
                sink.emit("DEBUG JWK RESPONSE", &Value::String(text));
            }
            return Err(MintError::MalformedKeySet(format!("not valid JSON: {e}")));
        }
    };

    if let Some(sink) = debug {
        sink.emit("DEBUG JWK RESPONSE", &document);
    }

    serde_json::from_value(document).map_err(|e| MintError::MalformedKeySet(e.to_string()))
}

pub fn select_key<'a>(
    set: &'a JwkSet,
    kid: Option<&str>,
) -> Result<(&'a JwkKey, KeySelection), MintError> {
    let first = set.keys.first().ok_or(MintError::NoKeysAvailable)?;

    let Some(kid) = kid else {
        return Ok((first, KeySelection::First));
    };

    match set.find(kid) {
        Some(key) => Ok((key, KeySelection::Exact)),
        None => {
            warn!(
                kid = %kid,
                "could not find key with requested kid; using the first key from the set instead"
            );
            Ok((
                first,
                KeySelection::Fallback {
                    requested: kid.to_string(),
                },
            ))
        }
    }
}
