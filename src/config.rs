// ABOUTME: Command-line and environment configuration for the claimdesk server
// ABOUTME: Database location, bind address, collaborator limit and log filter

use clap::Parser;

/// Soft cap on guests per shared claim, checked before every share insert.
pub const DEFAULT_COLLABORATOR_LIMIT: u64 = 50;

#[derive(Debug, Clone, Parser)]
#[command(name = "claimdesk")]
#[command(about = "Claim and evidence management service")]
pub struct Config {
    /// Database connection string
    #[arg(long, env = "CLAIMDESK_DATABASE_URL", default_value = "sqlite:claimdesk.db?mode=rwc")]
    pub database_url: String,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "CLAIMDESK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP listener to
    #[arg(short, long, env = "CLAIMDESK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Maximum number of guests a single claim can be shared with
    #[arg(long, env = "CLAIMDESK_COLLABORATOR_LIMIT", default_value_t = DEFAULT_COLLABORATOR_LIMIT)]
    pub collaborator_limit: u64,

    /// Mark session cookies as Secure (enable behind HTTPS)
    #[arg(long, env = "CLAIMDESK_SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Tracing filter directive, e.g. "claimdesk=debug"
    #[arg(long, env = "RUST_LOG", default_value = "claimdesk=info")]
    pub log: String,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["claimdesk"]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.collaborator_limit, DEFAULT_COLLABORATOR_LIMIT);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "claimdesk",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--collaborator-limit",
            "3",
        ]);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.collaborator_limit, 3);
    }
}
