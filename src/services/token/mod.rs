pub mod claims;
pub mod minter;
pub mod signer;
pub mod verifier;

pub use claims::{Audience, ClaimSet, HeaderOverrides};
pub use minter::{CustomTokenService, MintedToken, ValidatedRequest};
pub use signer::{SignedToken, TokenSigner};
pub use verifier::{DecodedToken, TokenVerifier};
