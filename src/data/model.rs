use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RawTable – a decoded CSV file
// ---------------------------------------------------------------------------

/// A parsed CSV file: header names plus rows of trimmed text cells.
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rename a column in place. No-op when `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.headers[idx] = to.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CountryKey – canonical country label
// ---------------------------------------------------------------------------

/// Canonical country name. Produced by [`CountryNames::canonical`](super::normalize::CountryNames::canonical);
/// two datasets naming the same country compare equal only after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryKey(String);

impl CountryKey {
    pub fn new(name: impl Into<String>) -> Self {
        CountryKey(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryKey {
    fn from(s: &str) -> Self {
        CountryKey(s.to_string())
    }
}

impl From<String> for CountryKey {
    fn from(s: String) -> Self {
        CountryKey(s)
    }
}

// ---------------------------------------------------------------------------
// IndicatorRecord / IndicatorTable – long-form data
// ---------------------------------------------------------------------------

/// One (country, year, value) triple. `value` is `None` when the source cell
/// could not be read as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub country: CountryKey,
    pub year: i32,
    pub value: Option<f64>,
}

impl IndicatorRecord {
    pub fn new(country: impl Into<CountryKey>, year: i32, value: Option<f64>) -> Self {
        IndicatorRecord {
            country: country.into(),
            year,
            value,
        }
    }
}

/// All records of one indicator from one source dataset.
/// At most one record per (country, year).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    pub name: String,
    pub records: Vec<IndicatorRecord>,
}

impl IndicatorTable {
    pub fn new(name: impl Into<String>, records: Vec<IndicatorRecord>) -> Self {
        IndicatorTable {
            name: name.into(),
            records,
        }
    }

    /// Sorted set of years that have at least one record.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Inclusive (min, max) year, `None` for an empty table.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.years();
        Some((*years.first()?, *years.last()?))
    }

    /// Sorted set of countries that have at least one record.
    pub fn countries(&self) -> BTreeSet<CountryKey> {
        self.records.iter().map(|r| r.country.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Metric – which indicator a view shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Population,
    Gdp,
    Inflation,
    Export,
    Import,
}

impl Metric {
    /// Metrics selectable in the financial view, in display order.
    pub const FINANCIAL: [Metric; 4] = [Metric::Gdp, Metric::Inflation, Metric::Export, Metric::Import];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Population => "Population",
            Metric::Gdp => "GDP growth",
            Metric::Inflation => "Inflation",
            Metric::Export => "Exports",
            Metric::Import => "Imports",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Population => "people",
            Metric::Gdp | Metric::Inflation => "%",
            Metric::Export | Metric::Import => "US$ thousand",
        }
    }

    /// Year preselected when the metric is first shown.
    pub fn default_year(self) -> i32 {
        match self {
            Metric::Export | Metric::Import => 2021,
            _ => 2022,
        }
    }

    /// Whether map colouring uses the sign-preserving log scale.
    pub fn is_signed(self) -> bool {
        !matches!(self, Metric::Population)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
