//! Configuration of the charge gateway server.

use crate::application::retry::{Backoff, RetryPolicy};
use crate::domain::provider::{ProviderName, ProviderRegistry, ProviderStatus};
use crate::error::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI arguments for the charge gateway server.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "charge-gateway")]
#[command(version, about = "Card charge gateway with per-processor adapters")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CHARGE_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(long, env = "HOST")]
    pub host: Option<IpAddr>,

    /// Port to listen on, overrides the config file
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

/// Server configuration.
///
/// Every key is optional; missing keys fall back to [`config_defaults`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_processor_base_url")]
    processor_base_url: String,
    #[serde(default = "config_defaults::default_identifier")]
    identifier: String,
    #[serde(default = "config_defaults::default_max_attempts")]
    max_attempts: u32,
    #[serde(default = "config_defaults::default_backoff_unit_ms")]
    backoff_unit_ms: u64,
    #[serde(default = "config_defaults::default_request_timeout_ms")]
    request_timeout_ms: u64,
    /// Status overrides applied on top of the default registry.
    #[serde(default)]
    providers: BTreeMap<ProviderName, ProviderStatus>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            host: config_defaults::default_host(),
            port: config_defaults::default_port(),
            processor_base_url: config_defaults::default_processor_base_url(),
            identifier: config_defaults::default_identifier(),
            max_attempts: config_defaults::default_max_attempts(),
            backoff_unit_ms: config_defaults::default_backoff_unit_ms(),
            request_timeout_ms: config_defaults::default_request_timeout_ms(),
            providers: BTreeMap::new(),
        }
    }
}

pub mod config_defaults {
    use crate::application::retry::MAX_ATTEMPTS;
    use std::net::{IpAddr, Ipv4Addr};

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    pub const DEFAULT_PROCESSOR_BASE_URL: &str = "https://interview.riskxint.com";
    pub const DEFAULT_IDENTIFIER: &str = "charge-gateway";
    pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 1_000;
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

    pub fn default_port() -> u16 {
        DEFAULT_PORT
    }

    pub fn default_host() -> IpAddr {
        DEFAULT_HOST
    }

    pub fn default_processor_base_url() -> String {
        DEFAULT_PROCESSOR_BASE_URL.to_string()
    }

    pub fn default_identifier() -> String {
        DEFAULT_IDENTIFIER.to_string()
    }

    pub fn default_max_attempts() -> u32 {
        MAX_ATTEMPTS
    }

    pub fn default_backoff_unit_ms() -> u64 {
        DEFAULT_BACKOFF_UNIT_MS
    }

    pub fn default_request_timeout_ms() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_MS
    }
}

impl GatewayConfig {
    /// Loads the configuration described by the CLI arguments.
    ///
    /// Without `--config` the built-in defaults are used. `--host` and `--port`
    /// (or `$HOST` / `$PORT`) win over the file.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        if let Some(host) = args.host {
            config.host = host;
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.processor_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "processor_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn processor_base_url(&self) -> &str {
        &self.processor_base_url
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Backoff::quadratic(Duration::from_millis(self.backoff_unit_ms)),
        )
    }

    pub fn registry(&self) -> ProviderRegistry {
        self.providers
            .iter()
            .fold(ProviderRegistry::default(), |registry, (name, status)| {
                registry.with_status(*name, *status)
            })
    }
}
