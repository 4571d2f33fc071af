use std::collections::{BTreeMap, HashMap};

use super::model::{CountryKey, IndicatorRecord, IndicatorTable, Metric};
use super::normalize::CountryNames;
use super::reshape::{log_population, symlog};

// ---------------------------------------------------------------------------
// Single-country time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: Option<f64>,
}

/// One country's values over every available year, ascending by year.
/// Missing values stay in `points` so gaps remain visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub country: CountryKey,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// `(year, value)` pairs with missing values dropped, for line charts.
    pub fn complete(&self) -> Vec<(i32, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.year, v)))
            .collect()
    }

    pub fn has_gaps(&self) -> bool {
        self.points.iter().any(|p| p.value.is_none())
    }

    /// True when no year carries a value.
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.value.is_none())
    }
}

pub fn country_series(table: &IndicatorTable, country: &CountryKey) -> Series {
    let mut points: Vec<SeriesPoint> = table
        .records
        .iter()
        .filter(|r| &r.country == country)
        .map(|r| SeriesPoint {
            year: r.year,
            value: r.value,
        })
        .collect();
    points.sort_by_key(|p| p.year);
    Series {
        country: country.clone(),
        points,
    }
}

// ---------------------------------------------------------------------------
// All-countries snapshot for one year
// ---------------------------------------------------------------------------

/// Map colour value for a metric: log10(p + 1) for population, symlog otherwise.
pub fn color_value(metric: Metric, value: f64) -> f64 {
    if metric.is_signed() {
        symlog(value)
    } else {
        log_population(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub country: CountryKey,
    pub value: f64,
    /// Transformed value driving the choropleth colour.
    pub color: f64,
}

/// Ranked table of every country with a value in `year`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub metric: Metric,
    pub year: i32,
    /// Descending by value; ties keep source order.
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// (min, max) of the raw values, for progress-bar scaling.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        range(self.rows.iter().map(|r| r.value))
    }

    /// (min, max) of the colour values.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        range(self.rows.iter().map(|r| r.color))
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

pub fn snapshot(table: &IndicatorTable, metric: Metric, year: i32, names: &CountryNames) -> Snapshot {
    let mut rows: Vec<SnapshotRow> = table
        .records
        .iter()
        .filter(|r| r.year == year && !names.is_aggregate(r.country.as_str()))
        .filter_map(|r| {
            let value = r.value?;
            Some(SnapshotRow {
                country: r.country.clone(),
                value,
                color: color_value(metric, value),
            })
        })
        .collect();
    // sort_by is stable
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));
    Snapshot { metric, year, rows }
}

// ---------------------------------------------------------------------------
// Top-N over time
// ---------------------------------------------------------------------------

/// The N countries with the largest mean over the sampled years, with their
/// values in those years.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopN {
    /// Ranked countries with their mean over the sampled years.
    pub ranking: Vec<(CountryKey, f64)>,
    pub years: Vec<i32>,
    /// Non-missing records of the ranked countries, by rank then year.
    pub records: Vec<IndicatorRecord>,
}

impl TopN {
    pub fn value(&self, country: &CountryKey, year: i32) -> Option<f64> {
        self.records
            .iter()
            .find(|r| &r.country == country && r.year == year)
            .and_then(|r| r.value)
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}

/// Rank countries by mean over `sampled_years` and keep the largest `n`.
///
/// Aggregate regions are excluded first. Countries without a single value in
/// the sampled years are left out of the ranking. Equal means keep the order
/// in which the countries first appear in the table.
pub fn top_n_over_time(
    table: &IndicatorTable,
    sampled_years: &[i32],
    n: usize,
    names: &CountryNames,
) -> TopN {
    let sampled: Vec<&IndicatorRecord> = table
        .records
        .iter()
        .filter(|r| r.value.is_some() && sampled_years.contains(&r.year))
        .filter(|r| !names.is_aggregate(r.country.as_str()))
        .collect();

    let mut order: Vec<CountryKey> = Vec::new();
    let mut sums: HashMap<&CountryKey, (f64, usize)> = HashMap::new();
    for r in &sampled {
        let entry = sums.entry(&r.country).or_insert_with(|| {
            order.push(r.country.clone());
            (0.0, 0)
        });
        entry.0 += r.value.unwrap_or_default();
        entry.1 += 1;
    }

    let mut ranking: Vec<(CountryKey, f64)> = order
        .into_iter()
        .map(|country| {
            let (sum, count) = sums[&country];
            (country, sum / count as f64)
        })
        .collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking.truncate(n);

    let rank: HashMap<&CountryKey, usize> = ranking
        .iter()
        .enumerate()
        .map(|(i, (c, _))| (c, i))
        .collect();
    let mut records: Vec<IndicatorRecord> = sampled
        .into_iter()
        .filter(|r| rank.contains_key(&r.country))
        .cloned()
        .collect();
    records.sort_by_key(|r| (rank[&r.country], r.year));

    let mut years: Vec<i32> = sampled_years.to_vec();
    years.sort_unstable();
    years.dedup();

    TopN {
        ranking,
        years,
        records,
    }
}

// ---------------------------------------------------------------------------
// Population trend (metric cards)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendScale {
    Millions,
    Billions,
}

impl TrendScale {
    pub fn factor(self) -> f64 {
        match self {
            TrendScale::Millions => 1e6,
            TrendScale::Billions => 1e9,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TrendScale::Millions => "M",
            TrendScale::Billions => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub year: i32,
    pub population: f64,
    /// `population / scale.factor()`.
    pub scaled: f64,
    /// Change in scaled units against the next older year.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationTrend {
    pub label: String,
    pub scale: TrendScale,
    /// Newest year first.
    pub points: Vec<TrendPoint>,
}

/// Population per year for one country (in millions) or, when `country` is
/// `None`, summed over all countries (in billions).
pub fn population_trend(table: &IndicatorTable, country: Option<&CountryKey>) -> PopulationTrend {
    let mut per_year: BTreeMap<i32, f64> = BTreeMap::new();
    for r in &table.records {
        if country.is_some_and(|c| c != &r.country) {
            continue;
        }
        if let Some(v) = r.value {
            *per_year.entry(r.year).or_default() += v;
        }
    }

    let (label, scale) = match country {
        Some(c) => (c.to_string(), TrendScale::Millions),
        None => ("World".to_string(), TrendScale::Billions),
    };

    let newest_first: Vec<(i32, f64)> = per_year.into_iter().rev().collect();
    let points = newest_first
        .iter()
        .enumerate()
        .map(|(i, &(year, population))| {
            let scaled = population / scale.factor();
            let delta = newest_first
                .get(i + 1)
                .map(|&(_, older)| scaled - older / scale.factor());
            TrendPoint {
                year,
                population,
                scaled,
                delta,
            }
        })
        .collect();

    PopulationTrend {
        label,
        scale,
        points,
    }
}

// ---------------------------------------------------------------------------
// Year selection
// ---------------------------------------------------------------------------

/// The year to show: `requested` (or `fallback`) clamped into the table's
/// year range. `None` for an empty table.
pub fn resolve_year(table: &IndicatorTable, requested: Option<i32>, fallback: i32) -> Option<i32> {
    let (lo, hi) = table.year_range()?;
    Some(requested.unwrap_or(fallback).clamp(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> CountryNames {
        CountryNames::bundled().unwrap()
    }

    fn rec(country: &str, year: i32, value: Option<f64>) -> IndicatorRecord {
        IndicatorRecord::new(country, year, value)
    }

    fn gdp_table() -> IndicatorTable {
        IndicatorTable::new(
            "gdp",
            vec![
                rec("Chile", 2004, Some(7.0)),
                rec("Chile", 2000, Some(5.0)),
                rec("Chile", 2008, None),
                rec("World", 2000, Some(99.0)),
                rec("World", 2004, Some(99.0)),
                rec("Peru", 2000, Some(5.0)),
                rec("Peru", 2004, Some(-1.0)),
                rec("Mali", 2000, Some(6.0)),
                rec("Fiji", 2000, None),
                rec("Fiji", 2004, None),
                rec("Laos", 2000, Some(6.0)),
            ],
        )
    }

    #[test]
    fn series_is_sorted_and_drops_missing_for_charts() {
        let series = country_series(&gdp_table(), &CountryKey::from("Chile"));
        let years: Vec<i32> = series.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2000, 2004, 2008]);
        assert!(series.has_gaps());
        assert_eq!(series.complete(), vec![(2000, 5.0), (2004, 7.0)]);
    }

    #[test]
    fn na_cell_is_not_plotted_as_zero() {
        let table = IndicatorTable::new(
            "inflation",
            vec![rec("Chile", 2000, Some(3.0)), rec("Chile", 2001, crate::data::reshape::coerce_value("n/a"))],
        );
        let series = country_series(&table, &CountryKey::from("Chile"));
        assert_eq!(series.complete(), vec![(2000, 3.0)]);
    }

    #[test]
    fn unknown_country_gives_empty_series() {
        let series = country_series(&gdp_table(), &CountryKey::from("Atlantis"));
        assert!(series.points.is_empty());
        assert!(series.is_empty());
    }

    #[test]
    fn snapshot_ranks_descending_and_excludes_world() {
        let snap = snapshot(&gdp_table(), Metric::Gdp, 2000, &names());
        let order: Vec<&str> = snap.rows.iter().map(|r| r.country.as_str()).collect();
        // Mali and Laos tie at 6.0 and keep source order; Fiji has no value
        assert_eq!(order, vec!["Mali", "Laos", "Chile", "Peru"]);
        assert_eq!(snap.value_range(), Some((5.0, 6.0)));
    }

    #[test]
    fn snapshot_never_contains_excluded_labels() {
        let names = names();
        let table = IndicatorTable::new(
            "exports",
            vec![
                rec("World", 2021, Some(1e9)),
                rec("High income", 2021, Some(1e8)),
                rec("East Asia & Pacific regions", 2021, Some(1e7)),
                rec("Chile", 2021, Some(10.0)),
            ],
        );
        for metric in Metric::FINANCIAL {
            for year in [2020, 2021, 2022] {
                let snap = snapshot(&table, metric, year, &names);
                assert!(snap.rows.iter().all(|r| !names.is_aggregate(r.country.as_str())));
            }
        }
        assert_eq!(snapshot(&table, Metric::Export, 2021, &names).rows.len(), 1);
    }

    #[test]
    fn snapshot_colors_use_metric_transform() {
        let table = IndicatorTable::new("pop", vec![rec("Chile", 2022, Some(999_999.0))]);
        let snap = snapshot(&table, Metric::Population, 2022, &names());
        assert!((snap.rows[0].color - 6.0).abs() < 1e-12);

        let table = IndicatorTable::new("gdp", vec![rec("Chile", 2022, Some(-9.0))]);
        let snap = snapshot(&table, Metric::Gdp, 2022, &names());
        assert!((snap.rows[0].color + 1.0).abs() < 1e-12);
    }

    #[test]
    fn top_n_ranks_by_mean_and_skips_empty_countries() {
        let top = top_n_over_time(&gdp_table(), &[2000, 2004, 2008], 3, &names());
        let ranked: Vec<&str> = top.ranking.iter().map(|(c, _)| c.as_str()).collect();
        // Chile 6.0, Mali 6.0, Laos 6.0, Peru 2.0; World excluded; Fiji has no values
        assert_eq!(ranked, vec!["Chile", "Mali", "Laos"]);
        assert_eq!(top.ranking[0].1, 6.0);
        assert_eq!(top.value(&CountryKey::from("Chile"), 2004), Some(7.0));
        assert_eq!(top.value(&CountryKey::from("Chile"), 2008), None);
        let first: Vec<(&str, i32)> = top
            .records
            .iter()
            .map(|r| (r.country.as_str(), r.year))
            .collect();
        assert_eq!(first, vec![("Chile", 2000), ("Chile", 2004), ("Mali", 2000), ("Laos", 2000)]);
    }

    #[test]
    fn top_n_returns_at_most_n_countries_with_values() {
        let table = gdp_table();
        for n in 0..8 {
            let top = top_n_over_time(&table, &[2000, 2004], n, &names());
            assert!(top.ranking.len() <= n);
            for (country, _) in &top.ranking {
                assert!(top.records.iter().any(|r| &r.country == country && r.value.is_some()));
            }
        }
    }

    #[test]
    fn top_n_ignores_years_outside_sample() {
        let top = top_n_over_time(&gdp_table(), &[2008], 6, &names());
        assert!(top.is_empty());
        assert!(top.records.is_empty());
    }

    #[test]
    fn world_trend_sums_and_scales_to_billions() {
        let table = IndicatorTable::new(
            "population",
            vec![
                rec("A", 2015, Some(1.0e9)),
                rec("B", 2015, Some(0.5e9)),
                rec("A", 2020, Some(1.5e9)),
                rec("B", 2020, None),
                rec("A", 2022, Some(2.0e9)),
                rec("B", 2022, Some(1.0e9)),
            ],
        );
        let trend = population_trend(&table, None);
        assert_eq!(trend.scale, TrendScale::Billions);
        assert_eq!(trend.label, "World");
        let years: Vec<i32> = trend.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2020, 2015]);
        assert_eq!(trend.points[0].scaled, 3.0);
        assert_eq!(trend.points[0].delta, Some(1.5));
        assert_eq!(trend.points[1].delta, Some(0.0));
        assert_eq!(trend.points[2].delta, None);
    }

    #[test]
    fn country_trend_uses_millions() {
        let table = IndicatorTable::new(
            "population",
            vec![rec("A", 2010, Some(2.0e6)), rec("A", 2020, Some(3.0e6)), rec("B", 2020, Some(9.0e6))],
        );
        let trend = population_trend(&table, Some(&CountryKey::from("A")));
        assert_eq!(trend.scale.suffix(), "M");
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].delta, Some(1.0));
    }

    #[test]
    fn resolve_year_clamps_into_range() {
        let table = gdp_table();
        assert_eq!(resolve_year(&table, None, 2022), Some(2008));
        assert_eq!(resolve_year(&table, Some(1990), 2022), Some(2000));
        assert_eq!(resolve_year(&table, Some(2004), 2022), Some(2004));
        assert_eq!(resolve_year(&IndicatorTable::default(), None, 2022), None);
    }
}
