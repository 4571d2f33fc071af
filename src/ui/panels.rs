use eframe::egui::{self, Color32, ScrollArea, Ui};
use world_dashboard::data::model::Metric;
use world_dashboard::view::{DashboardView, Mode};

use crate::state::AppState;

const ALL_COUNTRIES: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel: mode, metric, country, year.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🌍 Global Dashboard");
    ui.separator();

    // ---- Mode ----
    ui.strong("Display mode");
    let mut mode = state.selection.mode;
    ui.radio_value(&mut mode, Mode::Population, "Population");
    ui.radio_value(&mut mode, Mode::Financial, "Financial");
    state.set_mode(mode);
    ui.separator();

    // ---- Metric (financial only) ----
    if state.selection.mode == Mode::Financial {
        ui.strong("Financial metric");
        let current = state.selection.metric;
        egui::ComboBox::from_id_salt("metric")
            .selected_text(current.label())
            .show_ui(ui, |ui: &mut Ui| {
                for metric in Metric::FINANCIAL {
                    if ui.selectable_label(current == metric, metric.label()).clicked() {
                        state.set_metric(metric);
                    }
                }
            });
        ui.separator();
    }

    // ---- Country ----
    ui.strong("Country");
    let selected_text = state
        .selection
        .country
        .as_ref()
        .map_or_else(|| ALL_COUNTRIES.to_string(), |c| c.to_string());
    let countries = state.countries.clone();
    egui::ComboBox::from_id_salt("country")
        .selected_text(selected_text)
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(state.selection.country.is_none(), ALL_COUNTRIES)
                .clicked()
            {
                state.set_country(None);
            }
            for country in &countries {
                let is_selected = state.selection.country.as_ref() == Some(country);
                if ui.selectable_label(is_selected, country.as_str()).clicked() {
                    state.set_country(Some(country.clone()));
                }
            }
        });
    ui.separator();

    // ---- Year ----
    year_selector(ui, state);

    // ---- Warnings ----
    if !state.warnings.is_empty() {
        ui.separator();
        ui.strong("Data problems");
        ScrollArea::vertical()
            .max_height(200.0)
            .show(ui, |ui: &mut Ui| {
                for warning in &state.warnings {
                    ui.colored_label(Color32::YELLOW, warning);
                }
            });
    }
}

/// Year control matching the current view: discrete buttons for population
/// (few census years), a slider for the financial metrics.
fn year_selector(ui: &mut Ui, state: &mut AppState) {
    let choice = match &state.view {
        Some(DashboardView::PopulationWorld {
            year: Some(year),
            years,
            ..
        }) => {
            ui.strong("Year");
            let mut current = *year;
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for &y in years {
                    ui.selectable_value(&mut current, y, y.to_string());
                }
            });
            Some(current)
        }
        Some(DashboardView::FinancialWorld {
            year: Some(year),
            year_range: Some((lo, hi)),
            ..
        }) => {
            ui.strong("Year");
            let mut current = *year;
            ui.add(egui::Slider::new(&mut current, *lo..=*hi));
            Some(current)
        }
        _ => None,
    };
    if let Some(year) = choice {
        state.set_year(year);
    }
}

// ---------------------------------------------------------------------------
// Top bar – menu + status
// ---------------------------------------------------------------------------

pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                ui.close_menu();
                open_folder_dialog(state);
            }
            if ui.button("Reload").clicked() {
                ui.close_menu();
                state.reload();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.settings.data_dir.display()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });
}

fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Choose the dataset folder")
        .set_directory(&state.settings.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        state.set_data_dir(dir);
    }
}
