//! Listing fixtures: the NFT, its current order and the connected wallet,
//! as handed to the sell dialog by the host.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nft::{is_valid_address, Nft, Order, Wallet};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("failed to read listing {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse listing: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field} address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("token id must not be empty")]
    EmptyTokenId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub nft: Nft,
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default)]
    pub wallet: Option<Wallet>,
}

impl Listing {
    pub fn from_json(content: &str) -> Result<Self, ListingError> {
        let listing: Listing = serde_json::from_str(content)?;
        listing.validate()?;
        Ok(listing)
    }

    pub fn load(path: &Path) -> Result<Self, ListingError> {
        let content = std::fs::read_to_string(path).map_err(|source| ListingError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<(), ListingError> {
        check_address("contract", &self.nft.contract_address)?;
        check_address("owner", &self.nft.owner)?;
        if let Some(wallet) = &self.wallet {
            check_address("wallet", &wallet.address)?;
        }
        if self.nft.token_id.trim().is_empty() {
            return Err(ListingError::EmptyTokenId);
        }
        Ok(())
    }

    pub fn is_update(&self) -> bool {
        self.order.is_some()
    }
}

fn check_address(field: &'static str, value: &str) -> Result<(), ListingError> {
    if is_valid_address(value) {
        Ok(())
    } else {
        Err(ListingError::InvalidAddress {
            field,
            value: value.to_string(),
        })
    }
}
