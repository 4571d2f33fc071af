use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{CountryKey, IndicatorRecord};
use crate::error::ConfigError;

/// Country-name table shipped with the binary.
const BUNDLED_COUNTRY_NAMES: &str = include_str!("../../config/country_names.json");

// ---------------------------------------------------------------------------
// CountryNames – replacement table + aggregate-region exclusions
// ---------------------------------------------------------------------------

/// Versioned, hand-curated mapping of spelling variants to canonical names,
/// plus the substrings that mark a label as an aggregate region.
///
/// Exclusion is a substring heuristic: any label containing an entry
/// (case-insensitive) is dropped, including real countries that contain it
/// by accident ("Indonesia" contains "nes").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryNames {
    pub version: u32,
    #[serde(default)]
    pub replacements: BTreeMap<String, String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl CountryNames {
    /// The table compiled into the binary from `config/country_names.json`.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_COUNTRY_NAMES)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let names = Self::from_json(&text)?;
        log::info!(
            "Loaded country-name table v{} from {} ({} replacements, {} exclusions)",
            names.version,
            path.display(),
            names.replacements.len(),
            names.exclusions.len()
        );
        Ok(names)
    }

    /// Canonical form of a raw label. Exact match on the trimmed label;
    /// unmapped labels pass through unchanged.
    pub fn canonical(&self, raw: &str) -> CountryKey {
        let label = raw.trim();
        match self.replacements.get(label) {
            Some(canonical) => CountryKey::new(canonical.as_str()),
            None => CountryKey::new(label),
        }
    }

    /// Whether the label names an aggregate region rather than a country.
    pub fn is_aggregate(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.exclusions
            .iter()
            .filter(|needle| !needle.is_empty())
            .any(|needle| label.contains(&needle.to_lowercase()))
    }

    /// Drop records whose country is an aggregate region.
    pub fn retain_countries(&self, records: Vec<IndicatorRecord>) -> Vec<IndicatorRecord> {
        records
            .into_iter()
            .filter(|r| !self.is_aggregate(r.country.as_str()))
            .collect()
    }
}
