//! UniFi Inventory
//!
//! Command-line front end for the Site Manager API. Prints each response as
//! pretty JSON on stdout so output can be piped into `jq`.
//!
//! Configuration comes from flags, falling back to the same `UNIFI_*`
//! environment variables the library reads.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;
use unifi_client::config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_SESSION_TTL, DEFAULT_TIMEOUT};
use unifi_client::{ClientConfig, UniFiClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inventory of UniFi Site Manager resources")]
struct Cli {
    /// Site Manager API key
    #[arg(long, env = "UNIFI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API version path segment
    #[arg(long, env = "UNIFI_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Base URL of the Site Manager API
    #[arg(long, env = "UNIFI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "UNIFI_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Session lifetime in minutes
    #[arg(long, env = "UNIFI_SESSION_TTL_MINUTES", default_value_t = DEFAULT_SESSION_TTL.as_secs() / 60)]
    session_ttl_minutes: u64,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(self.api_key.clone())?
            .with_api_version(self.api_version.clone())?
            .with_base_url(self.base_url.clone())?
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_session_ttl(Duration::from_secs(self.session_ttl_minutes.saturating_mul(60)));
        Ok(config)
    }
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.client_config().context("Invalid client configuration")?;

    info!("Configuration:");
    info!("  API root: {}", config.api_root());
    info!("  Session TTL: {:?}", config.session_ttl());

    let client = UniFiClient::with_config(config);
    let output = commands::run(&client, &cli.command)
        .with_context(|| format!("{} failed", cli.command.name()))?;
    client.close();

    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["unifi-inventory", "--api-key", "test-key", "sites"]).unwrap();
        let from_cli = cli.client_config().unwrap();
        let library = ClientConfig::new("test-key").unwrap();

        assert_eq!(from_cli.api_version(), library.api_version());
        assert_eq!(from_cli.base_url(), library.base_url());
        assert_eq!(from_cli.timeout(), library.timeout());
        assert_eq!(from_cli.session_ttl(), library.session_ttl());
    }
}
