use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// Mint RSA-signed JWTs for local testing.
///
/// - `custom` (default): sign the configured claims with a local private key and verify the
///   result against the published JWK set
/// - `rs`: obtain a real access token from the identity provider (password grant), optionally
///   creating the resource server and client grant first
#[derive(Parser, Debug)]
#[command(name = "jwt-mint", version, about)]
pub struct Cli {
    /// JSON config file with the claims, key locations and identity-provider settings
    #[arg(
        short,
        long,
        global = true,
        env = "JWT_MINT_CONFIG",
        value_name = "FILE",
        default_value = "config.json"
    )]
    pub config_file: PathBuf,

    /// RSA private key (PKCS#1 or PKCS#8 PEM); overrides `custom.private_key_file_path`
    #[arg(long, global = true, env = "JWT_MINT_PRIVATE_KEY", value_name = "FILE")]
    pub private_key_file: Option<PathBuf>,

    /// Local JWK set; overrides `custom.jwk_local_file` and skips the well-known endpoint
    #[arg(long, global = true, env = "JWT_MINT_JWK_FILE", value_name = "FILE")]
    pub jwk_file: Option<PathBuf>,

    /// Dump JWK / provider responses and the verified token
    #[arg(long, global = true, env = "JWT_MINT_DEBUG")]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print only the token
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sign a token locally and verify it against the JWK set
    Custom,
    /// Get an access token from the identity provider
    Rs,
}

impl Cli {
    pub fn selected(&self) -> Command {
        self.command.unwrap_or(Command::Custom)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            private_key_file: self.private_key_file.clone(),
            jwk_file: self.jwk_file.clone(),
            debug: self.debug,
        }
    }
}
