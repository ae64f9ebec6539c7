//! Application locations the dialog can navigate to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A route inside the marketplace application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location(String);

impl Location {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub mod locations {
    use super::Location;

    /// Detail page of a single NFT
    pub fn nft(contract_address: &str, token_id: &str) -> Location {
        Location(format!("/contracts/{contract_address}/tokens/{token_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::locations;

    #[test]
    fn test_nft_location() {
        assert_eq!(locations::nft("0xabc", "42").as_str(), "/contracts/0xabc/tokens/42");
    }

    #[test]
    fn test_location_displays_as_path() {
        let location = locations::nft("0xabc", "7");
        assert_eq!(location.to_string(), location.as_str());
    }
}
