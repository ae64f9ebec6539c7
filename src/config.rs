use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::contracts::ContractAddresses;
use crate::i18n::Translator;
use crate::order::{DEFAULT_EXPIRATION_DAYS, MAX_EXPIRATION_DAYS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub sell: SellConfig,
    #[serde(default)]
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for logs and local authorization state
    pub state: String,
    /// Authorization store file (default: `{state}/authorizations.json`)
    #[serde(default)]
    pub authorizations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval in milliseconds
    pub refresh_rate_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellConfig {
    /// Days from today used as the expiration of a new order (default: 30)
    #[serde(default = "default_expiration_days")]
    pub default_expiration_days: i64,
}

fn default_expiration_days() -> i64 {
    DEFAULT_EXPIRATION_DAYS
}

impl Default for SellConfig {
    fn default() -> Self {
        Self {
            default_expiration_days: default_expiration_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct I18nConfig {
    /// Optional JSON catalog overriding the built-in English messages
    #[serde(default)]
    pub catalog: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the tool works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/nft-sell/ (optional global overrides)
        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with NFT_SELL_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("NFT_SELL")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the dialog cannot work with
    pub fn validate(&self) -> Result<()> {
        let days = self.sell.default_expiration_days;
        anyhow::ensure!(
            (1..=MAX_EXPIRATION_DAYS).contains(&days),
            "sell.default_expiration_days must be between 1 and {MAX_EXPIRATION_DAYS}, got {days}"
        );
        Ok(())
    }

    /// Path of the per-user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("nft-sell").join("config.toml"))
    }

    /// Write this config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.state)
    }

    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn authorizations_path(&self) -> PathBuf {
        self.paths
            .authorizations
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.state_path().join("authorizations.json"))
    }

    /// Build the translator, applying the configured override catalog
    pub fn translator(&self) -> Result<Translator> {
        match &self.i18n.catalog {
            Some(path) => Translator::with_overrides(Path::new(path)),
            None => Ok(Translator::english()),
        }
    }
}

fn default_state_dir() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("nft-sell"))
        .unwrap_or_else(|| PathBuf::from(".nft-sell"))
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                state: default_state_dir(),
                authorizations: None,
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
            },
            sell: SellConfig::default(),
            contracts: ContractAddresses::default(),
            i18n: I18nConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths_derive_from_state() {
        let mut config = Config::default();
        config.paths.state = "/tmp/nft-sell-state".to_string();
        assert_eq!(config.logs_path(), PathBuf::from("/tmp/nft-sell-state/logs"));
        assert_eq!(
            config.authorizations_path(),
            PathBuf::from("/tmp/nft-sell-state/authorizations.json")
        );
    }

    #[test]
    fn test_authorizations_path_override() {
        let mut config = Config::default();
        config.paths.authorizations = Some("/elsewhere/auth.json".to_string());
        assert_eq!(config.authorizations_path(), PathBuf::from("/elsewhere/auth.json"));
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[sell]\ndefault_expiration_days = 7\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.sell.default_expiration_days, 7);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.ui.refresh_rate_ms, 250);
    }

    #[test]
    fn test_load_rejects_out_of_range_expiration_days() {
        let temp_dir = TempDir::new().unwrap();
        for days in ["-5", "0", "9223372036854775"] {
            let path = temp_dir.path().join(format!("days{days}.toml"));
            std::fs::write(&path, format!("[sell]\ndefault_expiration_days = {days}\n")).unwrap();

            let err = Config::load(Some(path.to_str().unwrap())).unwrap_err();
            assert!(
                format!("{err:#}").contains("default_expiration_days"),
                "unexpected error for {days}: {err:#}"
            );
        }
    }

    #[test]
    fn test_validate_accepts_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_save_to_roundtrips_through_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sell.default_expiration_days = 90;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.sell.default_expiration_days, 90);
    }

    #[test]
    fn test_translator_without_catalog_is_english() {
        let config = Config::default();
        let tr = config.translator().unwrap();
        assert_eq!(tr.t("global.cancel"), "Cancel");
    }
}
