use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::MintError;

/// Lifetime given to tokens that do not carry their own `exp`.
pub const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

const JTI_BYTES: usize = 16;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Claims of a custom token.
///
/// Built from the untyped claim map of the config file with [`ClaimSet::from_map`],
/// which checks the required claims once. Claims this tool does not know about are
/// carried through `extra` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub iss: String,
    pub aud: Audience,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const KNOWN_CLAIMS: &[&str] = &["iss", "aud", "sub", "client_id", "azp", "exp", "iat", "jti"];

impl ClaimSet {
    /// Validate a raw claim map.
    ///
    /// Checks `iss`, `aud`, `sub` and then `client_id` (or `azp`), in that order, and
    /// fails with `ConfigIncomplete` naming the first one that is absent, null or empty.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, MintError> {
        let iss = required_str(map, "iss")?;
        let aud = audience(map)?;
        let sub = required_str(map, "sub")?;

        let client_id = optional_str(map, "client_id")?;
        let azp = optional_str(map, "azp")?;
        if client_id.is_none() && azp.is_none() {
            return Err(MintError::missing("client_id"));
        }

        let exp = optional_timestamp(map, "exp")?;
        let iat = optional_timestamp(map, "iat")?;
        let jti = optional_str(map, "jti")?;

        let extra = map
            .iter()
            .filter(|(k, _)| !KNOWN_CLAIMS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            iss,
            aud,
            sub,
            client_id,
            azp,
            exp,
            iat,
            jti,
            extra,
        })
    }

    /// Fill `exp`, `iat` and `jti` when absent. Values already present are kept.
    pub fn apply_defaults(&mut self, now: i64) -> Result<(), MintError> {
        self.exp.get_or_insert(now + DEFAULT_TTL_SECONDS);
        self.iat.get_or_insert(now);
        if self.jti.is_none() {
            self.jti = Some(generate_jti()?);
        }
        Ok(())
    }
}

/// 16 random bytes, URL-safe base64 without padding.
pub fn generate_jti() -> Result<String, MintError> {
    let mut bytes = [0u8; JTI_BYTES];
    getrandom::fill(&mut bytes)
        .map_err(|e| MintError::SigningFailure(format!("could not generate jti: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn required_str(map: &Map<String, Value>, name: &str) -> Result<String, MintError> {
    optional_str(map, name)?
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| MintError::missing(name))
}

fn optional_str(map: &Map<String, Value>, name: &str) -> Result<Option<String>, MintError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MintError::invalid(name, "expected a string")),
    }
}

fn optional_timestamp(map: &Map<String, Value>, name: &str) -> Result<Option<i64>, MintError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().and_then(whole_seconds))
            .map(Some)
            .ok_or_else(|| MintError::invalid(name, "expected unix seconds (whole number)")),
    }
}

// JSON numbers such as `1893456000.0` are common in hand-written configs.
fn whole_seconds(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn audience(map: &Map<String, Value>) -> Result<Audience, MintError> {
    match map.get("aud") {
        None | Some(Value::Null) => Err(MintError::missing("aud")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(MintError::missing("aud")),
        Some(Value::String(s)) => Ok(Audience::One(s.clone())),
        Some(Value::Array(items)) => {
            let many = items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| MintError::invalid("aud", "expected a string or an array of strings"))?;
            if many.is_empty() {
                return Err(MintError::missing("aud"));
            }
            Ok(Audience::Many(many))
        }
        Some(_) => Err(MintError::invalid(
            "aud",
            "expected a string or an array of strings",
        )),
    }
}

/// Header fields the caller may set. Only `kid` is honoured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOverrides {
    pub kid: Option<String>,
}

impl HeaderOverrides {
    pub fn from_map(map: &HashMap<String, Option<String>>) -> Self {
        for name in map.keys().filter(|name| name.as_str() != "kid") {
            debug!(header = %name, "ignoring unsupported header override");
        }

        let kid = map
            .get("kid")
            .cloned()
            .flatten()
            .filter(|kid| !kid.is_empty());

        Self { kid }
    }
}
