//! Translation lookup.
//!
//! Messages live in flat `key -> template` catalogs. Templates use
//! handlebars placeholders (`{{name}}`). The English catalog is embedded and
//! an optional override catalog can replace any subset of keys.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::Value;

const EN_CATALOG: &str = include_str!("../locales/en.json");

pub struct Translator {
    messages: HashMap<String, String>,
    handlebars: Handlebars<'static>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator {
    /// Translator with the embedded English catalog
    pub fn english() -> Self {
        let messages: HashMap<String, String> =
            serde_json::from_str(EN_CATALOG).unwrap_or_default();
        Self::from_messages(messages)
    }

    pub fn from_messages(messages: HashMap<String, String>) -> Self {
        let mut handlebars = Handlebars::new();
        // Messages are plain text
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);
        Self {
            messages,
            handlebars,
        }
    }

    /// English catalog with keys replaced from an override file
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations from {}", path.display()))?;
        let overrides: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse translations in {}", path.display()))?;

        let mut translator = Self::english();
        tracing::debug!(count = overrides.len(), "Applying translation overrides");
        translator.messages.extend(overrides);
        Ok(translator)
    }

    /// Message for `key`, or the key itself when missing
    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Message for `key` with placeholders filled from `values`
    pub fn t_with(&self, key: &str, values: &Value) -> String {
        let Some(template) = self.messages.get(key) else {
            return key.to_string();
        };
        match self.handlebars.render_template(template, values) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to render translation");
                template.clone()
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}
