pub mod debug_sink;
pub mod http;
pub mod jwks;
pub mod oauth;
pub mod token;

pub use debug_sink::DebugSink;
