use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TbcError;

/// Default explorer API endpoint for TBC mainnet.
pub const MAINNET_API: &str = "https://turingwallet.xyz/v1/tbc/main/";

/// Default explorer API endpoint for TBC testnet.
pub const TESTNET_API: &str = "https://tbcdev.org/v1/tbc/main/";

/// Supported TBC networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TbcNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl TbcNetwork {
    /// Return the default explorer API base URL for this network.
    ///
    /// The returned URL always ends with `/` so endpoint paths can be
    /// appended directly.
    pub fn default_base_url(self) -> &'static str {
        match self {
            TbcNetwork::Mainnet => MAINNET_API,
            TbcNetwork::Testnet => TESTNET_API,
        }
    }

    /// Resolve an optional network selector, falling back to mainnet.
    pub fn resolve(network: Option<TbcNetwork>) -> TbcNetwork {
        network.unwrap_or_default()
    }
}

impl FromStr for TbcNetwork {
    type Err = TbcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(TbcNetwork::Mainnet),
            "testnet" | "test" => Ok(TbcNetwork::Testnet),
            other => Err(TbcError::InvalidArgument(format!("unknown network: {other}"))),
        }
    }
}

impl std::fmt::Display for TbcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TbcNetwork::Mainnet => write!(f, "mainnet"),
            TbcNetwork::Testnet => write!(f, "testnet"),
        }
    }
}
