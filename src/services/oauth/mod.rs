pub mod client;
pub mod flow;
pub mod types;

pub use client::IdentityProviderClient;
pub use flow::ResourceServerFlow;
pub use types::OAuthTokenResponse;
