use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::loader::{load_table, require_column, CsvFormat};
use super::model::{CountryKey, IndicatorTable, Metric};
use super::normalize::CountryNames;
use super::reshape::{melt, read_long};
use crate::config::Settings;
use crate::error::LoadError;

pub const POPULATION_COUNTRY_COLUMN: &str = "Country/Territory";
pub const POPULATION_CODE_COLUMN: &str = "CCA3";
pub const INDICATOR_COUNTRY_COLUMN: &str = "country_name";
pub const TRADE_PARTNER_COLUMN: &str = "Partner Name";
pub const TRADE_COUNTRY_COLUMN: &str = "Country";
pub const TRADE_YEAR_COLUMN: &str = "Year";
pub const TRADE_EXPORT_COLUMN: &str = "Export (US$ Thousand)";
pub const TRADE_IMPORT_COLUMN: &str = "Import (US$ Thousand)";

// ---------------------------------------------------------------------------
// Per-dataset results
// ---------------------------------------------------------------------------

/// Population per country and year, plus the CCA3 code used to key maps.
#[derive(Debug, Clone, Default)]
pub struct PopulationData {
    pub table: IndicatorTable,
    pub codes: BTreeMap<CountryKey, String>,
}

impl PopulationData {
    pub fn cca3(&self, country: &CountryKey) -> Option<&str> {
        self.codes.get(country).map(String::as_str)
    }
}

/// Exports and imports from the long-form trade dataset.
#[derive(Debug, Clone, Default)]
pub struct TradeData {
    pub exports: IndicatorTable,
    pub imports: IndicatorTable,
}

pub fn load_population(path: &Path, names: &CountryNames) -> Result<PopulationData, LoadError> {
    let raw = load_table(path, CsvFormat::utf8_comma())?;
    let country_idx = require_column(&raw, path, POPULATION_COUNTRY_COLUMN)?;
    let code_idx = require_column(&raw, path, POPULATION_CODE_COLUMN)?;

    let mut codes = BTreeMap::new();
    for row in &raw.rows {
        let (label, code) = (&row[country_idx], &row[code_idx]);
        if label.is_empty() || code.is_empty() {
            continue;
        }
        codes.entry(names.canonical(label)).or_insert_with(|| code.clone());
    }

    let table = IndicatorTable::new("population", melt(&raw, country_idx, names));
    Ok(PopulationData { table, codes })
}

/// GDP-growth or inflation file: `country_name`, `indicator_name`, one column per year.
pub fn load_indicator(
    path: &Path,
    name: &str,
    names: &CountryNames,
) -> Result<IndicatorTable, LoadError> {
    let raw = load_table(path, CsvFormat::latin1_semicolon())?;
    let country_idx = require_column(&raw, path, INDICATOR_COUNTRY_COLUMN)?;
    Ok(IndicatorTable::new(name, melt(&raw, country_idx, names)))
}

pub fn load_trade(path: &Path, names: &CountryNames) -> Result<TradeData, LoadError> {
    let mut raw = load_table(path, CsvFormat::latin1_semicolon())?;
    raw.rename_column(TRADE_PARTNER_COLUMN, TRADE_COUNTRY_COLUMN);
    let country_idx = require_column(&raw, path, TRADE_COUNTRY_COLUMN)?;
    let year_idx = require_column(&raw, path, TRADE_YEAR_COLUMN)?;
    let export_idx = require_column(&raw, path, TRADE_EXPORT_COLUMN)?;
    let import_idx = require_column(&raw, path, TRADE_IMPORT_COLUMN)?;

    Ok(TradeData {
        exports: IndicatorTable::new(
            "exports",
            read_long(&raw, country_idx, year_idx, export_idx, names),
        ),
        imports: IndicatorTable::new(
            "imports",
            read_long(&raw, country_idx, year_idx, import_idx, names),
        ),
    })
}

// ---------------------------------------------------------------------------
// Datasets – everything one dashboard refresh works from
// ---------------------------------------------------------------------------

/// All four datasets, each loaded independently so one failure only
/// disables the views that depend on it.
#[derive(Debug)]
pub struct Datasets {
    pub population: Result<PopulationData, LoadError>,
    pub gdp: Result<IndicatorTable, LoadError>,
    pub inflation: Result<IndicatorTable, LoadError>,
    pub trade: Result<TradeData, LoadError>,
}

impl Datasets {
    pub fn load(settings: &Settings, names: &CountryNames) -> Self {
        let datasets = Datasets {
            population: load_population(&settings.population_path(), names),
            gdp: load_indicator(&settings.gdp_path(), "gdp", names),
            inflation: load_indicator(&settings.inflation_path(), "inflation", names),
            trade: load_trade(&settings.trade_path(), names),
        };
        for err in datasets.errors() {
            log::warn!("{err}");
        }
        datasets
    }

    /// The long-form table backing a metric.
    pub fn table(&self, metric: Metric) -> Result<&IndicatorTable, &LoadError> {
        match metric {
            Metric::Population => self.population.as_ref().map(|p| &p.table),
            Metric::Gdp => self.gdp.as_ref(),
            Metric::Inflation => self.inflation.as_ref(),
            Metric::Export => self.trade.as_ref().map(|t| &t.exports),
            Metric::Import => self.trade.as_ref().map(|t| &t.imports),
        }
    }

    /// Load failures, in dataset order.
    pub fn errors(&self) -> Vec<&LoadError> {
        [
            self.population.as_ref().err(),
            self.gdp.as_ref().err(),
            self.inflation.as_ref().err(),
            self.trade.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Countries offered by the population view, sorted.
    pub fn population_countries(&self) -> Vec<CountryKey> {
        self.population
            .as_ref()
            .map(|p| p.table.countries().into_iter().collect())
            .unwrap_or_default()
    }

    /// Union of countries across the GDP, inflation and trade datasets, sorted.
    pub fn financial_countries(&self) -> Vec<CountryKey> {
        let mut all = BTreeSet::new();
        for metric in Metric::FINANCIAL {
            if let Ok(table) = self.table(metric) {
                all.extend(table.countries());
            }
        }
        all.into_iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    use crate::config::{GDP_FILE, INFLATION_FILE, POPULATION_FILE, TRADE_FILE};

    /// Write a small but complete set of dataset files into `dir`.
    pub fn write_all(dir: &Path) {
        fs::write(
            dir.join(POPULATION_FILE),
            "Rank,CCA3,Country/Territory,Capital,2022 Population,2020 Population,2015 Population,2010 Population\n\
             1,ALA,Aland,A,3000000,2900000,2800000,2700000\n\
             2,BLA,Bland,B,1000000,990000,980000,970000\n\
             3,TST,Testland,T,30,20,15,10\n",
        )
        .unwrap();
        let gdp = "\u{feff}country_name;indicator_name;2000;2004;2008;2022\n\
                   Aland;GDP growth;1.0;2.0;3.0;4.0\n\
                   Bland;GDP growth;-1.0;n/a;-3.0;-2.5\n\
                   World;GDP growth;9.0;9.0;9.0;9.0\n\
                   Russian Federation;GDP growth;5.0;6.0;;1.5\n";
        fs::write(dir.join(GDP_FILE), gdp.as_bytes()).unwrap();
        // Latin-1 encoded, BOM mis-decoded into the first header
        let mut inflation = b"\xef\xbb\xbfcountry_name;indicator_name;2000;2022\n".to_vec();
        inflation.extend_from_slice(b"C\xf4te d'Ivoire;Inflation;2.5;4.5\nAland;Inflation;1.0;8.0\n");
        fs::write(dir.join(INFLATION_FILE), inflation).unwrap();
        fs::write(
            dir.join(TRADE_FILE),
            "Partner Name;Year;Export (US$ Thousand);Import (US$ Thousand)\n\
             Aland;2020;100;50\n\
             Aland;2021;120;60\n\
             Bland;2021;80;n/a\n\
             Other Asia, nes;2021;999;999\n",
        )
        .unwrap();
    }
}
