//! Token authorizations: whether a contract may move a user's tokens.
//!
//! The chain is the source of truth in production. Here the
//! [`AuthorizationStore`] trait is the seam, and [`LocalAuthorizations`]
//! keeps granted authorizations in memory with optional JSON persistence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nft::same_address;

/// Kind of on-chain authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationType {
    /// ERC20 allowance (spending MANA)
    Allowance,
    /// ERC721 operator approval (transferring NFTs)
    Approval,
}

impl AuthorizationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowance => "allowance",
            Self::Approval => "approval",
        }
    }
}

/// `authorized_address` may act on `owner`'s tokens of `contract_address`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub owner: String,
    pub authorized_address: String,
    pub contract_address: String,
    #[serde(rename = "type")]
    pub authorization_type: AuthorizationType,
}

impl Authorization {
    fn normalized(&self) -> Self {
        Self {
            owner: self.owner.to_lowercase(),
            authorized_address: self.authorized_address.to_lowercase(),
            contract_address: self.contract_address.to_lowercase(),
            authorization_type: self.authorization_type,
        }
    }

    fn matches(
        &self,
        owner: &str,
        authorized_address: &str,
        contract_address: &str,
        authorization_type: AuthorizationType,
    ) -> bool {
        self.authorization_type == authorization_type
            && same_address(&self.owner, owner)
            && same_address(&self.authorized_address, authorized_address)
            && same_address(&self.contract_address, contract_address)
    }
}

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("failed to read authorizations from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse authorizations in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write authorizations to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize authorizations: {0}")]
    Serialize(serde_json::Error),
    #[error("authorization store lock poisoned")]
    Poisoned,
}

/// Lookup and grant of authorizations
pub trait AuthorizationStore: Send + Sync {
    fn has_authorization(
        &self,
        owner: &str,
        authorized_address: &str,
        contract_address: &str,
        authorization_type: AuthorizationType,
    ) -> bool;

    fn grant(&self, authorization: Authorization) -> Result<(), AuthorizationError>;
}

/// In-memory authorizations, optionally backed by a JSON file
#[derive(Debug, Default)]
pub struct LocalAuthorizations {
    entries: RwLock<HashSet<Authorization>>,
    path: Option<PathBuf>,
}

impl LocalAuthorizations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = Authorization>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().map(|a| a.normalized()).collect()),
            path: None,
        }
    }

    /// Load from a JSON array file. A missing file yields an empty store that
    /// will be created on the first grant.
    pub fn load(path: &Path) -> Result<Self, AuthorizationError> {
        let entries: Vec<Authorization> = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| AuthorizationError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| AuthorizationError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), count = entries.len(), "Loaded authorizations");

        let mut store = Self::with_entries(entries);
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    fn save(&self, entries: &HashSet<Authorization>) -> Result<(), AuthorizationError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut list: Vec<&Authorization> = entries.iter().collect();
        list.sort_by(|a, b| {
            (&a.owner, &a.contract_address, &a.authorized_address).cmp(&(
                &b.owner,
                &b.contract_address,
                &b.authorized_address,
            ))
        });
        let json = serde_json::to_string_pretty(&list).map_err(AuthorizationError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AuthorizationError::Write {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| AuthorizationError::Write {
            path: path.clone(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuthorizationStore for LocalAuthorizations {
    fn has_authorization(
        &self,
        owner: &str,
        authorized_address: &str,
        contract_address: &str,
        authorization_type: AuthorizationType,
    ) -> bool {
        let Ok(entries) = self.entries.read() else {
            return false;
        };
        entries
            .iter()
            .any(|a| a.matches(owner, authorized_address, contract_address, authorization_type))
    }

    fn grant(&self, authorization: Authorization) -> Result<(), AuthorizationError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthorizationError::Poisoned)?;
        tracing::info!(
            contract = %authorization.contract_address,
            operator = %authorization.authorized_address,
            kind = authorization.authorization_type.as_str(),
            "Granting authorization"
        );
        entries.insert(authorization.normalized());
        self.save(&entries)
    }
}
