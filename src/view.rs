//! Request/response entry point: one [`Selection`] in, one [`DashboardView`]
//! out. Each panel of the view succeeds or fails on its own.

use std::fmt;

use crate::config::Settings;
use crate::data::datasets::Datasets;
use crate::data::model::{CountryKey, Metric};
use crate::data::normalize::CountryNames;
use crate::data::query::{
    color_value, country_series, population_trend, resolve_year, snapshot, top_n_over_time,
    PopulationTrend, Series, Snapshot, TopN,
};
use crate::flags::{CountryLookup, CountryProfile, Lookup};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Population,
    Financial,
}

/// What the user asked to see. `country == None` means all countries.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub mode: Mode,
    /// Ignored in population mode.
    pub metric: Metric,
    /// `None` picks the metric's default year.
    pub year: Option<i32>,
    pub country: Option<CountryKey>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            mode: Mode::Population,
            metric: Metric::Gdp,
            year: None,
            country: None,
        }
    }
}

impl Selection {
    /// The metric actually displayed.
    pub fn effective_metric(&self) -> Metric {
        match self.mode {
            Mode::Population => Metric::Population,
            Mode::Financial => self.metric,
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// One panel's content, or the reason it cannot be shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Section<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Section::Ready(v),
            Err(e) => Section::Unavailable(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            Section::Unavailable(_) => None,
        }
    }
}

/// The country highlighted on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub country: CountryKey,
    pub cca3: String,
    /// Colour value for the shown year, when the country has one.
    pub color: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    PopulationWorld {
        year: Option<i32>,
        years: Vec<i32>,
        trend: Section<PopulationTrend>,
        snapshot: Section<Snapshot>,
    },
    PopulationCountry {
        country: CountryKey,
        trend: Section<PopulationTrend>,
        highlight: Section<Highlight>,
        profile: Lookup<CountryProfile>,
    },
    FinancialWorld {
        metric: Metric,
        year: Option<i32>,
        year_range: Option<(i32, i32)>,
        snapshot: Section<Snapshot>,
        heatmap: Section<TopN>,
    },
    FinancialCountry {
        country: CountryKey,
        highlight: Section<Highlight>,
        profile: Lookup<CountryProfile>,
        series: Vec<(Metric, Section<Series>)>,
    },
}

/// Build the view for `selection`. Pure apart from `lookup`, which is only
/// called for single-country views.
pub fn build_view(
    datasets: &Datasets,
    names: &CountryNames,
    settings: &Settings,
    selection: &Selection,
    lookup: &dyn CountryLookup,
) -> DashboardView {
    match (selection.mode, &selection.country) {
        (Mode::Population, None) => population_world(datasets, names, selection),
        (Mode::Population, Some(country)) => DashboardView::PopulationCountry {
            country: country.clone(),
            trend: Section::from_result(
                datasets
                    .population
                    .as_ref()
                    .map(|p| population_trend(&p.table, Some(country))),
            ),
            highlight: highlight(datasets, country, Metric::Population, selection.year),
            profile: lookup.lookup(country),
        },
        (Mode::Financial, None) => financial_world(datasets, names, settings, selection),
        (Mode::Financial, Some(country)) => DashboardView::FinancialCountry {
            country: country.clone(),
            highlight: highlight(datasets, country, Metric::Population, None),
            profile: lookup.lookup(country),
            series: Metric::FINANCIAL
                .into_iter()
                .map(|metric| (metric, metric_series(datasets, metric, country)))
                .collect(),
        },
    }
}

fn population_world(datasets: &Datasets, names: &CountryNames, selection: &Selection) -> DashboardView {
    let table = datasets.table(Metric::Population);
    let year = table
        .ok()
        .and_then(|t| resolve_year(t, selection.year, Metric::Population.default_year()));
    let snap = match (table, year) {
        (Err(e), _) => Section::Unavailable(e.to_string()),
        (Ok(_), None) => Section::Unavailable("no population figures".to_string()),
        (Ok(t), Some(y)) => Section::Ready(snapshot(t, Metric::Population, y, names)),
    };
    DashboardView::PopulationWorld {
        year,
        years: table.map(|t| t.years().into_iter().collect()).unwrap_or_default(),
        trend: Section::from_result(table.map(|t| population_trend(t, None))),
        snapshot: snap,
    }
}

fn financial_world(
    datasets: &Datasets,
    names: &CountryNames,
    settings: &Settings,
    selection: &Selection,
) -> DashboardView {
    let metric = selection.metric;
    let table = match datasets.table(metric) {
        Ok(t) => t,
        Err(e) => {
            return DashboardView::FinancialWorld {
                metric,
                year: None,
                year_range: None,
                snapshot: Section::Unavailable(e.to_string()),
                heatmap: Section::Unavailable(e.to_string()),
            }
        }
    };

    let year = resolve_year(table, selection.year, metric.default_year());
    let snap = match year {
        Some(y) => Section::Ready(snapshot(table, metric, y, names)),
        None => Section::Unavailable(format!("no {} figures", metric.label())),
    };
    let top = top_n_over_time(table, &settings.heatmap_years(metric), settings.top_n, names);
    let heatmap = if top.is_empty() {
        Section::Unavailable(format!("no {} values in the sampled years", metric.label()))
    } else {
        Section::Ready(top)
    };

    DashboardView::FinancialWorld {
        metric,
        year,
        year_range: table.year_range(),
        snapshot: snap,
        heatmap,
    }
}

fn highlight(
    datasets: &Datasets,
    country: &CountryKey,
    metric: Metric,
    year: Option<i32>,
) -> Section<Highlight> {
    let population = match &datasets.population {
        Ok(p) => p,
        Err(e) => return Section::Unavailable(e.to_string()),
    };
    let Some(cca3) = population.cca3(country) else {
        return Section::Unavailable(format!("no map code for {country}"));
    };
    let color = resolve_year(&population.table, year, metric.default_year()).and_then(|y| {
        population
            .table
            .records
            .iter()
            .find(|r| &r.country == country && r.year == y)
            .and_then(|r| r.value)
            .map(|v| color_value(metric, v))
    });
    Section::Ready(Highlight {
        country: country.clone(),
        cca3: cca3.to_string(),
        color,
    })
}

fn metric_series(datasets: &Datasets, metric: Metric, country: &CountryKey) -> Section<Series> {
    match datasets.table(metric) {
        Err(e) => Section::Unavailable(e.to_string()),
        Ok(table) => {
            let series = country_series(table, country);
            if series.is_empty() {
                Section::Unavailable(format!("no {} data for {country}", metric.label()))
            } else {
                Section::Ready(series)
            }
        }
    }
}
