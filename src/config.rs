/*
 * Responsibility
 * - Load the JSON config file (claims, header, JWK source, key path, identity-provider settings)
 * - Apply command-line / environment overrides on top of it
 * - Presence of required claims is NOT checked here; the token pipeline validates that itself
 */
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "could not read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub custom: CustomConfig,
    pub rs: RsConfig,
}

/// Settings for minting a locally signed token.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    // Untyped on purpose: required claims are checked by the pipeline so it can name the missing one.
    pub claims: Map<String, Value>,
    pub header: HashMap<String, Option<String>>,
    pub well_known_endpoint: Option<String>,
    pub jwk_local_file: Option<PathBuf>,
    pub private_key_file_path: Option<PathBuf>,
}

/// Settings for obtaining a token from the identity provider.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RsConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    // Create the resource server + client grant before requesting the token.
    pub setup_rs: bool,
}

impl fmt::Debug for RsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print credentials
        f.debug_struct("RsConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("setup_rs", &self.setup_rs)
            .finish()
    }
}

/// Values given on the command line (or through the environment) that win over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub private_key_file: Option<PathBuf>,
    pub jwk_file: Option<PathBuf>,
    pub debug: bool,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(path) = overrides.private_key_file {
            self.custom.private_key_file_path = Some(path);
        }
        if let Some(path) = overrides.jwk_file {
            self.custom.jwk_local_file = Some(path);
        }
        self.debug |= overrides.debug;
    }
}
