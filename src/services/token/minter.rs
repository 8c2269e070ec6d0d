use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::CustomConfig;
use crate::error::MintError;
use crate::services::DebugSink;
use crate::services::jwks::{JwkResolver, JwkSource, KeySelection};
use crate::services::token::claims::{ClaimSet, HeaderOverrides};
use crate::services::token::signer::TokenSigner;
use crate::services::token::verifier::{DecodedToken, TokenVerifier};

/// Custom-token settings after the presence checks.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub claims: ClaimSet,
    pub headers: HeaderOverrides,
    pub jwk_source: JwkSource,
    pub private_key_path: PathBuf,
}

/// Check the custom-token settings without touching the filesystem or network.
///
/// Order: required claims, then the JWK source, then the private key path.
pub fn validate(config: &CustomConfig) -> Result<ValidatedRequest, MintError> {
    let claims = ClaimSet::from_map(&config.claims)?;
    let jwk_source = JwkSource::from_config(
        config.jwk_local_file.as_deref(),
        config.well_known_endpoint.as_deref(),
    )?;
    let private_key_path = config
        .private_key_file_path
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| MintError::missing("private_key_file_path"))?;

    Ok(ValidatedRequest {
        claims,
        headers: HeaderOverrides::from_map(&config.header),
        jwk_source,
        private_key_path,
    })
}

/// A token that was signed and then verified against the published key.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub claims: ClaimSet,
    pub key_selection: KeySelection,
    pub verified: DecodedToken,
}

/// Runs validate -> sign -> resolve verification key -> verify.
///
/// - TokenSigner applies claim defaults and signs with the local private key.
/// - JwkResolver loads the public half from the JWK set.
/// - TokenVerifier checks the fresh token; a token that does not verify is never returned.
#[derive(Clone, Debug)]
pub struct CustomTokenService {
    signer: TokenSigner,
    resolver: JwkResolver,
    verifier: TokenVerifier,
}

impl CustomTokenService {
    pub fn new(signer: TokenSigner, resolver: JwkResolver, verifier: TokenVerifier) -> Self {
        Self {
            signer,
            resolver,
            verifier,
        }
    }

    pub fn mint(
        &self,
        config: &CustomConfig,
        debug: Option<&dyn DebugSink>,
    ) -> Result<MintedToken, MintError> {
        let request = validate(config)?;
        debug!(source = %request.jwk_source, kid = ?request.headers.kid, "custom token request validated");

        let signed = self
            .signer
            .sign(request.claims, &request.headers, &request.private_key_path)?;

        let resolved = self.resolver.resolve_key(
            &request.jwk_source,
            request.headers.kid.as_deref(),
            debug,
        )?;

        let verified = self
            .verifier
            .verify(&signed.token, &resolved.public_key)
            .map_err(MintError::verification_failed)?;

        if let Some(sink) = debug {
            sink.emit("DEBUG VERIFIED TOKEN", &verified.to_json());
        }

        info!(kid = ?resolved.kid, jti = ?signed.claims.jti, "minted custom token");

        Ok(MintedToken {
            token: signed.token,
            claims: signed.claims,
            key_selection: resolved.selection,
            verified,
        })
    }
}
