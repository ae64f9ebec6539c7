//! NFT, order and wallet shapes supplied by the host, plus the display and
//! ownership helpers the sell dialog needs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mana::Mana;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

/// Token ids longer than this are abbreviated in display names
const TOKEN_ID_DISPLAY_LEN: usize = 8;

/// Check that a string looks like an EVM address
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// Compare two addresses ignoring checksum casing
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Kind of item, used for the fallback display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NftCategory {
    Parcel,
    Estate,
    Wearable,
    Ens,
    #[default]
    Other,
}

impl NftCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Parcel => "Parcel",
            Self::Estate => "Estate",
            Self::Wearable => "Wearable",
            Self::Ens => "Name",
            Self::Other => "NFT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub contract_address: String,
    pub token_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: NftCategory,
    pub owner: String,
}

/// An open order for an NFT. Read-only from the dialog's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Price in wei
    pub price: Mana,
    /// Expiration as epoch milliseconds
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
}

/// Human-facing name of an NFT
pub fn nft_name(nft: &Nft) -> String {
    match nft.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let id = if nft.token_id.chars().count() > TOKEN_ID_DISPLAY_LEN {
                let head: String = nft.token_id.chars().take(TOKEN_ID_DISPLAY_LEN).collect();
                format!("{head}…")
            } else {
                nft.token_id.clone()
            };
            format!("{} #{}", nft.category.label(), id)
        }
    }
}

/// Whether the wallet owns the NFT
pub fn is_owned_by(nft: &Nft, wallet: Option<&Wallet>) -> bool {
    wallet.is_some_and(|w| same_address(&nft.owner, &w.address))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0xAbCdEf0123456789abcdef0123456789ABCDEF01";

    fn make_nft(name: Option<&str>, token_id: &str) -> Nft {
        Nft {
            contract_address: "0x1111111111111111111111111111111111111111".to_string(),
            token_id: token_id.to_string(),
            name: name.map(String::from),
            category: NftCategory::Parcel,
            owner: OWNER.to_string(),
        }
    }

    #[test]
    fn test_nft_name_prefers_name() {
        assert_eq!(nft_name(&make_nft(Some("Genesis Plaza"), "1")), "Genesis Plaza");
    }

    #[test]
    fn test_nft_name_falls_back_to_category_and_id() {
        assert_eq!(nft_name(&make_nft(None, "42")), "Parcel #42");
        assert_eq!(nft_name(&make_nft(Some("  "), "42")), "Parcel #42");
        assert_eq!(
            nft_name(&make_nft(None, "115792089237316195423570985")),
            "Parcel #11579208…"
        );
    }

    #[test]
    fn test_is_owned_by_ignores_case() {
        let nft = make_nft(None, "1");
        let wallet = Wallet {
            address: OWNER.to_lowercase(),
        };
        assert!(is_owned_by(&nft, Some(&wallet)));
    }

    #[test]
    fn test_is_owned_by_requires_wallet() {
        let nft = make_nft(None, "1");
        assert!(!is_owned_by(&nft, None));
        let other = Wallet {
            address: "0x2222222222222222222222222222222222222222".to_string(),
        };
        assert!(!is_owned_by(&nft, Some(&other)));
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address(OWNER));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address("AbCdEf0123456789abcdef0123456789ABCDEF0123"));
    }

    #[test]
    fn test_order_deserializes_wei_string() {
        let order: Order =
            serde_json::from_str(r#"{"price": "2500000000000000000", "expiresAt": 1700000000000}"#)
                .unwrap();
        assert_eq!(order.price, crate::mana::from_mana("2.5"));
        assert_eq!(order.expires_at, 1_700_000_000_000);
    }
}
