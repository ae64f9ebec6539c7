//! nft-sell - terminal dialog for listing an NFT on the marketplace
//!
//! The library holds the dialog and its collaborators so hosts other than
//! the bundled binary can embed it.

pub mod app;
pub mod authorization;
pub mod config;
pub mod contracts;
pub mod i18n;
pub mod listing;
pub mod logging;
pub mod mana;
pub mod nft;
pub mod order;
pub mod routing;
pub mod ui;
