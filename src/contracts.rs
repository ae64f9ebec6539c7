//! Addresses of the marketplace contracts the dialog refers to.

use serde::{Deserialize, Serialize};

/// Marketplace contract on Ethereum mainnet
pub const MAINNET_MARKETPLACE: &str = "0x8e5660b4ab70168b5a6feea0e0315cb49c8cd539";

/// MANA token contract on Ethereum mainnet
pub const MAINNET_MANA: &str = "0x0f5d2fb29fb7d3cfee444a200298f468908cc942";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Contract that takes orders and must be approved to move NFTs
    #[serde(default = "default_marketplace")]
    pub marketplace: String,
    #[serde(default = "default_mana")]
    pub mana: String,
}

fn default_marketplace() -> String {
    MAINNET_MARKETPLACE.to_string()
}

fn default_mana() -> String {
    MAINNET_MANA.to_string()
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            marketplace: default_marketplace(),
            mana: default_mana(),
        }
    }
}
