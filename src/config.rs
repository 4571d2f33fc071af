use std::path::{Path, PathBuf};

use crate::data::model::Metric;
use crate::data::normalize::CountryNames;
use crate::error::ConfigError;

pub const POPULATION_FILE: &str = "world_population.csv";
pub const GDP_FILE: &str = "world_gdp_data.csv";
pub const INFLATION_FILE: &str = "global_inflation_data.csv";
pub const TRADE_FILE: &str = "34_years_world_export_import_dataset.csv";

pub const DEFAULT_DATA_DIR: &str = "Datasets";
pub const DEFAULT_FLAG_ENDPOINT: &str = "https://restcountries.com/v3.1/name";
pub const DEFAULT_TOP_N: usize = 6;

const ENV_DATA_DIR: &str = "WORLD_DASHBOARD_DATA_DIR";
const ENV_COUNTRY_NAMES: &str = "WORLD_DASHBOARD_COUNTRY_NAMES";
const ENV_FLAG_ENDPOINT: &str = "WORLD_DASHBOARD_FLAG_ENDPOINT";
const ENV_TOP_N: &str = "WORLD_DASHBOARD_TOP_N";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime configuration shared by the dashboard and the EDA tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the four dataset files.
    pub data_dir: PathBuf,
    /// Country-name table override; the bundled table is used when `None`.
    pub country_names: Option<PathBuf>,
    /// REST Countries `name` endpoint used for flag / profile lookups.
    pub flag_endpoint: String,
    /// Number of countries in the comparative heatmap.
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            country_names: None,
            flag_endpoint: DEFAULT_FLAG_ENDPOINT.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Settings {
    /// Read `WORLD_DASHBOARD_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();
        if let Some(dir) = get(ENV_DATA_DIR) {
            settings.data_dir = PathBuf::from(dir);
        }
        settings.country_names = get(ENV_COUNTRY_NAMES).map(PathBuf::from);
        if let Some(endpoint) = get(ENV_FLAG_ENDPOINT) {
            settings.flag_endpoint = endpoint;
        }
        if let Some(raw) = get(ENV_TOP_N) {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => settings.top_n = n,
                _ => log::warn!("{ENV_TOP_N}={raw:?} is not a positive integer, using {DEFAULT_TOP_N}"),
            }
        }
        settings
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn population_path(&self) -> PathBuf {
        self.data_dir.join(POPULATION_FILE)
    }

    pub fn gdp_path(&self) -> PathBuf {
        self.data_dir.join(GDP_FILE)
    }

    pub fn inflation_path(&self) -> PathBuf {
        self.data_dir.join(INFLATION_FILE)
    }

    pub fn trade_path(&self) -> PathBuf {
        self.data_dir.join(TRADE_FILE)
    }

    /// The configured country-name table, or the bundled one.
    pub fn load_country_names(&self) -> Result<CountryNames, ConfigError> {
        match &self.country_names {
            Some(path) => CountryNames::from_path(path),
            None => CountryNames::bundled(),
        }
    }

    /// Years sampled for the top-N heatmap of a metric.
    pub fn heatmap_years(&self, metric: Metric) -> Vec<i32> {
        let last = match metric {
            Metric::Export | Metric::Import => 2020,
            _ => 2024,
        };
        (2000..=last).step_by(4).collect()
    }
}
