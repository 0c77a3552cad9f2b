use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Store display names, in the column order the inventory sheet uses.
pub const DEFAULT_STORES: [&str; 7] = [
    "LJ 1Mega Loja",
    "LJ 2Mascote",
    "LJ 3Tatuape",
    "LJ 4Indianopolis",
    "LJ 5Praia Grande",
    "LJ 6Fábrica",
    "LJ 10Osasco",
];

/// Zero-based column of the first store's sales cell. Columns 0..6 hold
/// code, description, reference, prior balance, total receipts and total sales.
pub const DEFAULT_METRICS_START_COL: usize = 6;

pub const DEFAULT_SUBGROUP_SENTINEL: &str = "Sub-Grupo";
pub const DEFAULT_PLACEHOLDER: &str = "-";
pub const DEFAULT_STORE_PREFIX: &str = "LJ ";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    /// Ordered store list. Order fixes both column layout and output order.
    pub stores: Vec<String>,
    pub metrics_start_col: usize,
    /// Token that locates the store header row. Defaults to the first store.
    pub anchor: Option<String>,
    /// Description text marking a sub-group header row.
    pub subgroup_sentinel: String,
    /// Cell text treated as "no value".
    pub placeholder: String,
    /// Prefix stripped from store names in reports.
    pub store_prefix: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            stores: DEFAULT_STORES.iter().map(|s| s.to_string()).collect(),
            metrics_start_col: DEFAULT_METRICS_START_COL,
            anchor: None,
            subgroup_sentinel: DEFAULT_SUBGROUP_SENTINEL.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            store_prefix: DEFAULT_STORE_PREFIX.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl TransferConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: TransferConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.stores.is_empty() {
            return Err(EngineError::ConfigValidation(
                "at least one store is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for store in &self.stores {
            if store.trim().is_empty() {
                return Err(EngineError::ConfigValidation(
                    "store names must not be empty".into(),
                ));
            }
            if !seen.insert(store.as_str()) {
                return Err(EngineError::ConfigValidation(format!(
                    "duplicate store '{store}'"
                )));
            }
        }

        if let Some(ref anchor) = self.anchor {
            if anchor.is_empty() {
                return Err(EngineError::ConfigValidation(
                    "anchor must not be empty".into(),
                ));
            }
        }

        if self.subgroup_sentinel.is_empty() {
            return Err(EngineError::ConfigValidation(
                "subgroup_sentinel must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// The token the grid locator searches for.
    pub fn anchor(&self) -> &str {
        match self.anchor {
            Some(ref anchor) => anchor,
            None => self.stores.first().map(String::as_str).unwrap_or_default(),
        }
    }
}
