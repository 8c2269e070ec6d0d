pub mod resolver;
pub mod source;
pub mod types;

pub use resolver::{JwkResolver, KeySelection, ResolvedKey};
pub use source::JwkSource;
pub use types::{JwkKey, JwkSet, PublicKeyMaterial};
