use std::path::{Path, PathBuf};
use std::{fmt, fs};

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::MintError;

/// Where the JWK set document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwkSource {
    File(PathBuf),
    Remote(Url),
}

impl JwkSource {
    /// Pick the source from config. A local file wins over the well-known endpoint.
    pub fn from_config(
        local_file: Option<&Path>,
        well_known_endpoint: Option<&str>,
    ) -> Result<Self, MintError> {
        if let Some(path) = local_file.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self::File(path.to_path_buf()));
        }

        let endpoint = well_known_endpoint
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MintError::missing("well_known_endpoint"))?;

        Url::parse(endpoint)
            .map(Self::Remote)
            .map_err(|e| MintError::invalid("well_known_endpoint", e.to_string()))
    }

    /// Raw bytes of the document. The file handle / response body is released before returning.
    pub fn load(&self, http: &Client) -> Result<Vec<u8>, MintError> {
        match self {
            JwkSource::File(path) => {
                debug!(path = %path.display(), "reading local JWK set");
                fs::read(path).map_err(|e| self.unavailable(e))
            }
            JwkSource::Remote(url) => {
                debug!(url = %url, "fetching JWK set");
                let response = http
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| self.unavailable(e))?;

                response
                    .bytes()
                    .map(|body| body.to_vec())
                    .map_err(|e| self.unavailable(e))
            }
        }
    }

    fn unavailable(&self, reason: impl fmt::Display) -> MintError {
        MintError::SourceUnavailable {
            location: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for JwkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwkSource::File(path) => write!(f, "{}", path.display()),
            JwkSource::Remote(url) => write!(f, "{}", url),
        }
    }
}
