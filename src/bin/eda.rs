//! Exploratory look at the raw dataset files: headers, leading rows,
//! missing cells and per-column numeric summaries, followed by the
//! country-name table the dashboard applies.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use world_dashboard::config::Settings;
use world_dashboard::data::datasets::{
    INDICATOR_COUNTRY_COLUMN, POPULATION_COUNTRY_COLUMN, TRADE_PARTNER_COLUMN,
};
use world_dashboard::data::loader::{load_table, CsvFormat};
use world_dashboard::data::model::RawTable;
use world_dashboard::data::normalize::CountryNames;
use world_dashboard::data::reshape::{coerce_value, is_na_token};

#[derive(Parser, Debug)]
#[command(name = "eda", about = "Summarise the raw dashboard datasets")]
struct Args {
    /// Directory holding the dataset files (defaults to WORLD_DASHBOARD_DATA_DIR or ./Datasets)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Country-name table to use instead of the bundled one
    #[arg(long)]
    country_names: Option<PathBuf>,

    /// Number of leading rows to print per dataset
    #[arg(long, default_value_t = 5)]
    rows: usize,
}

struct DatasetFile {
    title: &'static str,
    path: PathBuf,
    format: CsvFormat,
    country_column: &'static str,
}

fn dataset_files(settings: &Settings) -> Vec<DatasetFile> {
    vec![
        DatasetFile {
            title: "Population",
            path: settings.population_path(),
            format: CsvFormat::utf8_comma(),
            country_column: POPULATION_COUNTRY_COLUMN,
        },
        DatasetFile {
            title: "GDP growth",
            path: settings.gdp_path(),
            format: CsvFormat::latin1_semicolon(),
            country_column: INDICATOR_COUNTRY_COLUMN,
        },
        DatasetFile {
            title: "Inflation",
            path: settings.inflation_path(),
            format: CsvFormat::latin1_semicolon(),
            country_column: INDICATOR_COUNTRY_COLUMN,
        },
        DatasetFile {
            title: "Export / import",
            path: settings.trade_path(),
            format: CsvFormat::latin1_semicolon(),
            country_column: TRADE_PARTNER_COLUMN,
        },
    ]
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct ColumnStats {
    name: String,
    count: usize,
    mean: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct TableSummary {
    rows: usize,
    missing_cells: usize,
    complete_rows: usize,
    aggregate_rows: Option<usize>,
    numeric: Vec<ColumnStats>,
}

/// A column counts as numeric when every non-missing cell parses as a number.
fn numeric_stats(table: &RawTable, column: usize) -> Option<ColumnStats> {
    let mut values = Vec::new();
    for row in &table.rows {
        let cell = row.get(column).map(String::as_str).unwrap_or("");
        if is_na_token(cell) {
            continue;
        }
        values.push(coerce_value(cell)?);
    }
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ColumnStats {
        name: table.headers[column].clone(),
        count: values.len(),
        mean: values.iter().sum::<f64>() / values.len() as f64,
        min,
        max,
    })
}

fn summarize(table: &RawTable, country_column: &str, names: &CountryNames) -> TableSummary {
    let mut missing_cells = 0;
    let mut complete_rows = 0;
    for row in &table.rows {
        let missing = row.iter().filter(|cell| is_na_token(cell)).count();
        missing_cells += missing;
        if missing == 0 {
            complete_rows += 1;
        }
    }

    let aggregate_rows = table.column_index(country_column).map(|idx| {
        table
            .rows
            .iter()
            .filter(|row| row.get(idx).is_some_and(|label| names.is_aggregate(label)))
            .count()
    });

    TableSummary {
        rows: table.len(),
        missing_cells,
        complete_rows,
        aggregate_rows,
        numeric: (0..table.headers.len())
            .filter_map(|col| numeric_stats(table, col))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_dataset(file: &DatasetFile, table: &RawTable, names: &CountryNames, rows: usize) {
    println!("== {} ({}) ==", file.title, file.path.display());
    println!("Columns ({}): {}", table.headers.len(), table.headers.join(" | "));

    println!("First {} rows:", rows.min(table.len()));
    for row in table.rows.iter().take(rows) {
        println!("  {}", row.join(" | "));
    }

    let summary = summarize(table, file.country_column, names);
    println!("Rows: {}", summary.rows);
    println!("Missing cells: {}", summary.missing_cells);
    println!("Rows without missing cells: {}", summary.complete_rows);
    match summary.aggregate_rows {
        Some(n) => println!("Aggregate / region rows: {n}"),
        None => println!("Country column {:?} not found", file.country_column),
    }
    if !summary.numeric.is_empty() {
        println!("Numeric columns:");
        for s in &summary.numeric {
            println!(
                "  {:<28} count {:>6}  mean {:>16.3}  min {:>16.3}  max {:>16.3}",
                s.name, s.count, s.mean, s.min, s.max
            );
        }
    }
    println!();
}

fn print_country_names(names: &CountryNames) {
    println!("== Country names (version {}) ==", names.version);
    println!("Replacements:");
    for (from, to) in &names.replacements {
        println!("  {from:<36} -> {to}");
    }
    println!("Excluded label fragments: {}", names.exclusions.join(", "));
}

fn load_names(path: Option<&Path>) -> Result<CountryNames> {
    match path {
        Some(path) => CountryNames::from_path(path)
            .with_context(|| format!("loading country names from {}", path.display())),
        None => CountryNames::bundled().context("parsing the bundled country-name table"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::from_env();
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    if args.country_names.is_some() {
        settings.country_names = args.country_names;
    }
    let names = load_names(settings.country_names.as_deref())?;

    let mut failed = 0;
    for file in dataset_files(&settings) {
        match load_table(&file.path, file.format) {
            Ok(table) => print_dataset(&file, &table, &names, args.rows),
            Err(e) => {
                log::warn!("skipping {}: {e}", file.title);
                println!("== {} ==\nNot loaded: {e}\n", file.title);
                failed += 1;
            }
        }
    }

    print_country_names(&names);
    if failed > 0 {
        log::info!("{failed} dataset(s) could not be loaded");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn summary_counts_missing_and_aggregates() {
        let names = CountryNames::bundled().unwrap();
        let raw = table(
            &["country_name", "2000", "2001"],
            &[
                &["Aland", "1", "3"],
                &["Bland", "n/a", ""],
                &["World", "2", "2"],
            ],
        );
        let summary = summarize(&raw, "country_name", &names);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.missing_cells, 2);
        assert_eq!(summary.complete_rows, 2);
        assert_eq!(summary.aggregate_rows, Some(1));
        assert_eq!(summary.numeric.len(), 2);
        assert_eq!(summary.numeric[0].name, "2000");
        assert_eq!(summary.numeric[0].count, 2);
        assert_eq!(summary.numeric[0].mean, 1.5);
        assert_eq!(summary.numeric[1].min, 2.0);
        assert_eq!(summary.numeric[1].max, 3.0);
    }

    #[test]
    fn text_columns_have_no_stats() {
        let raw = table(&["Country", "Code"], &[&["Aland", "ALA"], &["Bland", "7"]]);
        assert_eq!(numeric_stats(&raw, 0), None);
        assert_eq!(numeric_stats(&raw, 1), None);
    }

    #[test]
    fn missing_country_column_is_reported() {
        let names = CountryNames::bundled().unwrap();
        let raw = table(&["name", "2000"], &[&["Aland", "1"]]);
        assert_eq!(summarize(&raw, "country_name", &names).aggregate_rows, None);
    }

    #[test]
    fn args_default_to_five_rows() {
        let args = Args::parse_from(["eda"]);
        assert_eq!(args.rows, 5);
        assert!(args.data_dir.is_none());
    }
}
