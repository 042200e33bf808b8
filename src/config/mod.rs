//! Configuration management for the chain notification client.
//!
//! Provides layered configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Optional TOML config file
//! 3. Environment variables prefixed with `CHAIN__` (highest priority)
//!

mod connection;
mod liveness;
mod retry;
pub use connection::*;
pub use liveness::*;
pub use retry::*;


//---
use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::ChainParams;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainClientConfig {
    /// Name of the network the wallet operates on (mainnet, testnet3, simnet, regnet)
    #[serde(default = "default_network")]
    pub network: String,

    /// Node RPC endpoint and credentials
    #[serde(default)]
    pub connection: ConnConfig,

    /// Idle-triggered liveness probing of the node connection
    #[serde(default)]
    pub liveness: LivenessConfig,

    /// Backoff policy used while `start` retries an unreachable node
    #[serde(default = "default_connect_retry")]
    pub retry: BackoffPolicy,
}

impl Default for ChainClientConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            connection: ConnConfig::default(),
            liveness: LivenessConfig::default(),
            retry: default_connect_retry(),
        }
    }
}

impl ChainClientConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Hardcoded defaults
    /// 2. `config_path` (if given)
    /// 3. Environment variables
    ///
    /// # Arguments
    /// * `config_path` - Optional path to a TOML configuration file
    ///
    /// # Returns
    /// Merged and validated configuration
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = config_path {
            config = config.add_source(File::with_name(path).required(true));
        }

        // Environment variables (highest priority)
        config = config.add_source(
            Environment::with_prefix("CHAIN")
                .prefix_separator("__")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Self = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates every configuration section
    pub fn validate(&self) -> Result<()> {
        self.chain_params()?;
        self.connection.validate()?;
        self.liveness.validate()?;
        self.retry.validate()?;
        Ok(())
    }

    /// Chain parameters of the configured network
    pub fn chain_params(&self) -> Result<ChainParams> {
        ChainParams::from_name(&self.network)
    }
}

pub(crate) fn invalid(msg: impl Into<String>) -> Error {
    Error::Config(ConfigError::Message(msg.into()))
}

fn default_network() -> String {
    "mainnet".to_string()
}
