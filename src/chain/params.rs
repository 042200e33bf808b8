use std::fmt;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Network identifier reported by the node's `getcurrentnet` call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyNet(pub u32);

impl CurrencyNet {
    pub const MAIN_NET: CurrencyNet = CurrencyNet(0xd9b4_00f9);
    pub const TEST_NET3: CurrencyNet = CurrencyNet(0xb194_aa75);
    pub const SIM_NET: CurrencyNet = CurrencyNet(0x1214_1c16);
    pub const REG_NET: CurrencyNet = CurrencyNet(0xdab5_bffa);
}

impl fmt::Display for CurrencyNet {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match *self {
            CurrencyNet::MAIN_NET => write!(f, "MainNet"),
            CurrencyNet::TEST_NET3 => write!(f, "TestNet3"),
            CurrencyNet::SIM_NET => write!(f, "SimNet"),
            CurrencyNet::REG_NET => write!(f, "RegNet"),
            CurrencyNet(other) => write!(f, "Unknown CurrencyNet ({:#010x})", other),
        }
    }
}

impl fmt::Debug for CurrencyNet {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The subset of chain parameters the notification client needs: which
/// network the wallet expects its node to be serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub name: &'static str,
    pub net: CurrencyNet,
}

impl ChainParams {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet",
            net: CurrencyNet::MAIN_NET,
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "testnet3",
            net: CurrencyNet::TEST_NET3,
        }
    }

    pub fn simnet() -> Self {
        Self {
            name: "simnet",
            net: CurrencyNet::SIM_NET,
        }
    }

    pub fn regnet() -> Self {
        Self {
            name: "regnet",
            net: CurrencyNet::REG_NET,
        }
    }

    /// Resolve a configured network name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::mainnet()),
            "testnet" | "testnet3" => Ok(Self::testnet()),
            "simnet" => Ok(Self::simnet()),
            "regnet" => Ok(Self::regnet()),
            other => Err(Error::Config(ConfigError::Message(format!(
                "unknown network name: {}",
                other
            )))),
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
