use eframe::egui::{self, Color32, RichText, ScrollArea, Sense, Ui};
use world_dashboard::data::model::{CountryKey, Metric};
use world_dashboard::data::query::{PopulationTrend, Snapshot};
use world_dashboard::flags::{CountryProfile, Lookup};
use world_dashboard::view::{DashboardView, Highlight, Section};

use crate::color::ColorScale;
use crate::state::AppState;
use crate::ui::plot::{format_value, heatmap, line_chart};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the current view. Clicking a row of a ranked table selects that country.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading datasets…");
        });
        return;
    };

    let mut clicked: Option<CountryKey> = None;

    match view {
        DashboardView::PopulationWorld {
            year,
            trend,
            snapshot,
            ..
        } => {
            ui.heading("🌐 Population over time");
            section(ui, trend, trend_cards);
            ui.separator();
            let title = match year {
                Some(y) => format!("🏆 Population of all countries in {y}"),
                None => "🏆 Population of all countries".to_string(),
            };
            ui.heading(title);
            section(ui, snapshot, |ui, snap| {
                clicked = ranked_table(ui, snap, ColorScale::population());
            });
        }
        DashboardView::PopulationCountry {
            country,
            trend,
            highlight,
            profile,
        } => {
            ui.heading(format!("🌐 Population of {country}"));
            section(ui, trend, trend_cards);
            ui.separator();
            ui.columns(2, |cols| {
                section(&mut cols[0], highlight, |ui, h| map_highlight(ui, h, ColorScale::population()));
                flag(&mut cols[1], profile);
            });
            about(ui, country, profile);
        }
        DashboardView::FinancialWorld {
            metric,
            year,
            snapshot,
            heatmap: top,
            ..
        } => {
            let year_text = year.map(|y| y.to_string()).unwrap_or_default();
            ui.heading(format!("💰 {} of all countries in {year_text}", metric.label()));
            section(ui, snapshot, |ui, snap| {
                clicked = ranked_table(ui, snap, ColorScale::from_range(snap.color_range()));
            });
            ui.separator();
            ui.heading(format!("📈 {}: top countries over time", metric.label()));
            section(ui, top, |ui, top| heatmap(ui, *metric, top));
        }
        DashboardView::FinancialCountry {
            country,
            highlight,
            profile,
            series,
        } => {
            ui.heading(format!("🗺 Financial data for {country}"));
            ui.columns(2, |cols| {
                section(&mut cols[0], highlight, |ui, h| map_highlight(ui, h, ColorScale::population()));
                flag(&mut cols[1], profile);
            });
            ui.separator();
            ui.heading("📊 Financial metrics over time");
            egui::Grid::new("financial_series")
                .num_columns(2)
                .min_col_width(ui.available_width() / 2.0 - 8.0)
                .show(ui, |ui: &mut Ui| {
                    for (i, (metric, s)) in series.iter().enumerate() {
                        ui.vertical(|ui: &mut Ui| {
                            ui.strong(format!("{} ({})", metric.label(), metric.unit()));
                            section(ui, s, |ui, s| line_chart(ui, metric_plot_id(*metric), *metric, s));
                        });
                        if i % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        }
    }

    if let Some(country) = clicked {
        state.set_country(Some(country));
    }
}

fn metric_plot_id(metric: Metric) -> &'static str {
    match metric {
        Metric::Population => "plot_population",
        Metric::Gdp => "plot_gdp",
        Metric::Inflation => "plot_inflation",
        Metric::Export => "plot_export",
        Metric::Import => "plot_import",
    }
}

/// Render a ready section, or a soft warning with the reason.
fn section<T>(ui: &mut Ui, section: &Section<T>, show: impl FnOnce(&mut Ui, &T)) {
    match section {
        Section::Ready(v) => show(ui, v),
        Section::Unavailable(reason) => {
            ui.colored_label(Color32::YELLOW, format!("⚠ {reason}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn trend_cards(ui: &mut Ui, trend: &PopulationTrend) {
    let suffix = trend.scale.suffix();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for point in &trend.points {
            egui::Frame::group(ui.style())
                .fill(Color32::from_gray(57))
                .show(ui, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.label(point.year.to_string());
                        ui.label(RichText::new(format!("{:.2} {suffix}", point.scaled)).heading());
                        if let Some(delta) = point.delta {
                            let color = if delta >= 0.0 {
                                Color32::LIGHT_GREEN
                            } else {
                                Color32::LIGHT_RED
                            };
                            ui.colored_label(color, format!("{delta:+.2} {suffix}"));
                        }
                    });
                });
        }
    });
}

/// Ranked table with colour swatch and progress bar. Returns the clicked country.
fn ranked_table(ui: &mut Ui, snap: &Snapshot, scale: ColorScale) -> Option<CountryKey> {
    if snap.rows.is_empty() {
        ui.label(format!("No {} values for {}.", snap.metric.label(), snap.year));
        return None;
    }
    let (lo, hi) = snap.value_range().unwrap_or((0.0, 0.0));
    let bar_lo = if snap.metric.is_signed() { lo } else { 0.0 };
    let span = hi - bar_lo;

    let mut clicked = None;
    ScrollArea::vertical()
        .id_salt("ranked_table")
        .max_height(600.0)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("ranked_rows")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("");
                    ui.strong("Country");
                    ui.strong(snap.metric.label());
                    ui.strong("");
                    ui.end_row();

                    for row in &snap.rows {
                        let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, scale.color_for(row.color));
                        if ui.link(row.country.as_str()).clicked() {
                            clicked = Some(row.country.clone());
                        }
                        ui.label(format_value(row.value));
                        let fraction = if span > 0.0 {
                            ((row.value - bar_lo) / span) as f32
                        } else {
                            1.0
                        };
                        ui.add(egui::ProgressBar::new(fraction).desired_width(160.0));
                        ui.end_row();
                    }
                });
        });
    clicked
}

fn map_highlight(ui: &mut Ui, highlight: &Highlight, scale: ColorScale) {
    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(48.0, 32.0), Sense::hover());
        let fill = highlight
            .color
            .map_or(Color32::from_gray(90), |c| scale.color_for(c));
        ui.painter().rect_filled(rect, 4.0, fill);
        ui.vertical(|ui: &mut Ui| {
            ui.strong(highlight.country.as_str());
            ui.label(format!("Map region {}", highlight.cca3));
        });
    });
}

fn flag(ui: &mut Ui, profile: &Lookup<CountryProfile>) {
    match profile {
        Lookup::Found(p) => {
            // egui decodes PNG; fall back to the SVG link
            match &p.flag_png {
                Some(png) => {
                    ui.add(egui::Image::new(png.as_str()).max_width(320.0));
                }
                None => {
                    ui.hyperlink_to("Flag", &p.flag_url);
                }
            }
        }
        Lookup::NotFound => {
            ui.colored_label(Color32::YELLOW, "No flag available.");
        }
        Lookup::Failed(reason) => {
            log::debug!("flag lookup failed: {reason}");
            ui.colored_label(Color32::YELLOW, "No flag available.");
        }
    }
}

fn about(ui: &mut Ui, country: &CountryKey, profile: &Lookup<CountryProfile>) {
    egui::CollapsingHeader::new("About")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let Some(p) = profile.found() else {
                ui.colored_label(Color32::LIGHT_RED, "ℹ No further information available.");
                return;
            };
            ui.strong(country.as_str());
            ui.label(format!("🏛 Capital: {}", p.capital.join(", ")));
            if let Some(area) = p.area_km2 {
                ui.label(format!("📏 Area: {area:.0} km²"));
            }
            ui.label(format!("🧭 Neighbours: {}", p.borders.join(", ")));
            ui.label(format!("💱 Currencies: {}", p.currencies.join(", ")));
            ui.label(format!("🗣 Languages: {}", p.languages.join(", ")));
            if let Some(region) = &p.region {
                ui.label(format!("🌍 Region: {region}"));
            }
            ui.label(format!("🕒 Time zones: {}", p.timezones.join(", ")));
        });
}
