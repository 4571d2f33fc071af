use std::collections::{BTreeMap, HashMap};

use super::model::{CountryKey, IndicatorRecord, RawTable};
use super::normalize::CountryNames;

// ---------------------------------------------------------------------------
// Column / cell coercion
// ---------------------------------------------------------------------------

/// Year encoded in a wide-table column name: `"2020"` or `"2020 Population"`.
pub fn year_from_column(name: &str) -> Option<i32> {
    let name = name.trim();
    let (digits, rest) = name.split_at_checked(4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    digits.parse().ok()
}

/// Numeric value of a cell; `None` for empty, non-numeric or non-finite text.
pub fn coerce_value(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Cell texts conventionally written for a missing value in published CSV data.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell is an explicit missing-value marker (or empty).
pub fn is_na_token(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// Year in a long-table cell: `"2021"` or a whole float such as `"2021.0"`.
pub fn coerce_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    let v = coerce_value(cell)?;
    (v.fract() == 0.0 && v.abs() < i32::MAX as f64).then_some(v as i32)
}

// ---------------------------------------------------------------------------
// Wide → long
// ---------------------------------------------------------------------------

/// Collects records while keeping at most one per (country, year).
/// A later duplicate only replaces an earlier missing value.
#[derive(Default)]
struct RecordSink {
    records: Vec<IndicatorRecord>,
    index: HashMap<(CountryKey, i32), usize>,
}

impl RecordSink {
    fn push(&mut self, record: IndicatorRecord) {
        let key = (record.country.clone(), record.year);
        match self.index.get(&key) {
            Some(&pos) => {
                let existing = &mut self.records[pos];
                if existing.value.is_none() && record.value.is_some() {
                    existing.value = record.value;
                } else {
                    log::debug!("duplicate record for {} {}, keeping first", key.0, key.1);
                }
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn finish(self) -> Vec<IndicatorRecord> {
        self.records
    }
}

/// Melt a wide table (one column per year) into long-form records.
///
/// Columns whose names carry no year are ignored. Country labels are
/// canonicalised; rows with an empty label are skipped. Cells that are not
/// numbers become records with a missing value.
pub fn melt(table: &RawTable, country_column: usize, names: &CountryNames) -> Vec<IndicatorRecord> {
    let year_columns: Vec<(usize, i32)> = table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| year_from_column(h).map(|y| (idx, y)))
        .collect();

    let mut sink = RecordSink::default();
    for row in &table.rows {
        let Some(label) = row.get(country_column).filter(|l| !l.is_empty()) else {
            continue;
        };
        let country = names.canonical(label);
        for &(idx, year) in &year_columns {
            let value = row.get(idx).and_then(|cell| coerce_value(cell));
            sink.push(IndicatorRecord {
                country: country.clone(),
                year,
                value,
            });
        }
    }
    sink.finish()
}

/// Read records from a table that is already long-form (one row per
/// country and year). Rows without a readable year are skipped.
pub fn read_long(
    table: &RawTable,
    country_column: usize,
    year_column: usize,
    value_column: usize,
    names: &CountryNames,
) -> Vec<IndicatorRecord> {
    let mut sink = RecordSink::default();
    for row in &table.rows {
        let Some(label) = row.get(country_column).filter(|l| !l.is_empty()) else {
            continue;
        };
        let Some(year) = row.get(year_column).and_then(|c| coerce_year(c)) else {
            continue;
        };
        sink.push(IndicatorRecord {
            country: names.canonical(label),
            year,
            value: row.get(value_column).and_then(|c| coerce_value(c)),
        });
    }
    sink.finish()
}

/// Long → (country, year) lookup; the inverse of [`melt`].
pub fn pivot(records: &[IndicatorRecord]) -> BTreeMap<(CountryKey, i32), Option<f64>> {
    records
        .iter()
        .map(|r| ((r.country.clone(), r.year), r.value))
        .collect()
}

// ---------------------------------------------------------------------------
// Colour-scale transforms
// ---------------------------------------------------------------------------

/// Sign-preserving log compression: `sign(v) * log10(|v| + 1)`.
pub fn symlog(value: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    value.signum() * (value.abs() + 1.0).log10()
}

/// `log10(p + 1)` for non-negative population counts.
pub fn log_population(population: f64) -> f64 {
    (population + 1.0).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> CountryNames {
        CountryNames::bundled().unwrap()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn year_columns_are_recognised() {
        assert_eq!(year_from_column("2020"), Some(2020));
        assert_eq!(year_from_column("2022 Population"), Some(2022));
        assert_eq!(year_from_column("country_name"), None);
        assert_eq!(year_from_column("20201"), None);
        assert_eq!(year_from_column("Year"), None);
        assert_eq!(year_from_column("Growth Rate"), None);
        assert_eq!(year_from_column("1990s"), None);
    }

    #[test]
    fn cells_coerce_or_go_missing() {
        assert_eq!(coerce_value(" 3.5 "), Some(3.5));
        assert_eq!(coerce_value("-2"), Some(-2.0));
        assert_eq!(coerce_value("n/a"), None);
        assert_eq!(coerce_value(""), None);
        assert_eq!(coerce_value("NaN"), None);
        assert_eq!(coerce_value("inf"), None);
        assert_eq!(coerce_year("2021"), Some(2021));
        assert_eq!(coerce_year("2021.0"), Some(2021));
        assert_eq!(coerce_year("2021.5"), None);
    }

    #[test]
    fn na_tokens_cover_common_markers() {
        for cell in ["", "  ", "n/a", "NA", "NaN", "null", "#N/A"] {
            assert!(is_na_token(cell), "{cell:?}");
        }
        assert!(!is_na_token("0"));
        assert!(!is_na_token("Namibia"));
    }

    #[test]
    fn testland_population_melts_to_three_records() {
        let raw = table(
            &["Country/Territory", "CCA3", "2020 Population", "2015 Population", "2010 Population"],
            &[&["Testland", "TST", "30", "20", "10"]],
        );
        let mut records = melt(&raw, 0, &names());
        records.sort_by_key(|r| r.year);
        assert_eq!(
            records,
            vec![
                IndicatorRecord::new("Testland", 2010, Some(10.0)),
                IndicatorRecord::new("Testland", 2015, Some(20.0)),
                IndicatorRecord::new("Testland", 2020, Some(30.0)),
            ]
        );
    }

    #[test]
    fn melt_keeps_unparseable_cells_as_missing() {
        let raw = table(
            &["country_name", "indicator_name", "2000", "2001"],
            &[&["Germany", "GDP growth", "n/a", "1.7"]],
        );
        let records = melt(&raw, 0, &names());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, None);
        assert_eq!(records[1].value, Some(1.7));
    }

    #[test]
    fn melt_then_pivot_reconstructs_numeric_cells() {
        let raw = table(
            &["country_name", "1999", "2000", "2001"],
            &[
                &["Aland", "1.25", "-0.5", "n/a"],
                &["Bland", "0", "1e3", "42"],
                &["Cland", "", "7.125", "-3"],
            ],
        );
        let pivoted = pivot(&melt(&raw, 0, &names()));
        for row in &raw.rows {
            for (col, cell) in row.iter().enumerate().skip(1) {
                let year = year_from_column(&raw.headers[col]).unwrap();
                let key = (CountryKey::new(row[0].as_str()), year);
                if let Some(expected) = coerce_value(cell) {
                    assert_eq!(pivoted[&key], Some(expected));
                } else {
                    assert_eq!(pivoted[&key], None);
                }
            }
        }
    }

    #[test]
    fn canonicalised_duplicates_collapse_to_one_record() {
        let raw = table(
            &["country_name", "2020"],
            &[&["Türkiye", ""], &["Turkey, Republic of", "1.9"], &["Turkey", "5.0"]],
        );
        let records = melt(&raw, 0, &names());
        assert_eq!(records, vec![IndicatorRecord::new("Turkey", 2020, Some(1.9))]);
    }

    #[test]
    fn read_long_skips_rows_without_year() {
        let raw = table(
            &["Country", "Year", "Export (US$ Thousand)"],
            &[&["Aland", "2020", "10"], &["Aland", "", "11"], &["Bland", "2020", "x"]],
        );
        let records = read_long(&raw, 0, 1, 2, &names());
        assert_eq!(
            records,
            vec![
                IndicatorRecord::new("Aland", 2020, Some(10.0)),
                IndicatorRecord::new("Bland", 2020, None),
            ]
        );
    }

    #[test]
    fn symlog_is_odd_symmetric() {
        for x in [0.0, 0.3, 1.0, 9.0, 99.0, 12_345.678, 1e12] {
            assert_eq!(symlog(-x), -symlog(x));
        }
        assert!((symlog(9.0) - 1.0).abs() < 1e-12);
        assert!((symlog(-99.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn log_population_shifts_by_one() {
        assert_eq!(log_population(0.0), 0.0);
        assert!((log_population(999_999.0) - 6.0).abs() < 1e-12);
    }
}
