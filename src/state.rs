use std::path::PathBuf;

use world_dashboard::config::Settings;
use world_dashboard::data::datasets::Datasets;
use world_dashboard::data::model::{CountryKey, Metric};
use world_dashboard::data::normalize::CountryNames;
use world_dashboard::flags::{CountryLookup, OfflineLookup, RestCountriesClient};
use world_dashboard::view::{build_view, DashboardView, Mode, Selection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Every change to the
/// selection marks the view stale; the next frame reloads the datasets and
/// rebuilds it.
pub struct AppState {
    pub settings: Settings,

    /// Current user selection.
    pub selection: Selection,

    /// Last built view (None until the first refresh).
    pub view: Option<DashboardView>,

    /// Countries offered by the selector for the current mode.
    pub countries: Vec<CountryKey>,

    /// Dataset / config problems from the last refresh.
    pub warnings: Vec<String>,

    /// Status message shown in the top bar.
    pub status_message: Option<String>,

    lookup: Box<dyn CountryLookup>,
    stale: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let lookup: Box<dyn CountryLookup> = match RestCountriesClient::new(&settings.flag_endpoint) {
            Ok(client) => Box::new(client),
            Err(e) => {
                log::error!("Cannot build HTTP client, flags disabled: {e}");
                Box::new(OfflineLookup)
            }
        };
        Self {
            settings,
            selection: Selection::default(),
            view: None,
            countries: Vec::new(),
            warnings: Vec::new(),
            status_message: None,
            lookup,
            stale: true,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Reload every dataset and rebuild the view for the current selection.
    pub fn refresh(&mut self) {
        self.warnings.clear();
        let names = match self.settings.load_country_names() {
            Ok(names) => names,
            Err(e) => {
                log::error!("{e}");
                self.warnings.push(format!("Country-name table not loaded: {e}"));
                CountryNames::bundled().unwrap_or_default()
            }
        };

        let datasets = Datasets::load(&self.settings, &names);
        self.warnings
            .extend(datasets.errors().iter().map(|e| e.to_string()));

        self.countries = match self.selection.mode {
            Mode::Population => datasets.population_countries(),
            Mode::Financial => datasets.financial_countries(),
        };
        if let Some(country) = &self.selection.country {
            if !self.countries.contains(country) {
                log::info!("{country} not in the {:?} datasets, showing all", self.selection.mode);
                self.selection.country = None;
            }
        }

        self.view = Some(build_view(
            &datasets,
            &names,
            &self.settings,
            &self.selection,
            self.lookup.as_ref(),
        ));
        self.stale = false;
    }

    /// Force a reload on the next frame.
    pub fn reload(&mut self) {
        self.stale = true;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.selection.mode != mode {
            self.selection.mode = mode;
            self.selection.country = None;
            self.selection.year = None;
            self.stale = true;
        }
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.selection.metric != metric {
            self.selection.metric = metric;
            self.selection.year = None;
            self.stale = true;
        }
    }

    pub fn set_country(&mut self, country: Option<CountryKey>) {
        if self.selection.country != country {
            self.selection.country = country;
            self.stale = true;
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if self.selection.year != Some(year) {
            self.selection.year = Some(year);
            self.stale = true;
        }
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Data directory: {}", dir.display());
        self.status_message = Some("Data folder changed, reloading".to_string());
        self.settings.data_dir = dir;
        self.stale = true;
    }
}
