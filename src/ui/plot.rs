use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};
use world_dashboard::data::model::Metric;
use world_dashboard::data::query::{Series, TopN};

use crate::color::ColorScale;

const LINE_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Line chart (single-country time series)
// ---------------------------------------------------------------------------

/// Plot a country's series; missing years are left out, not drawn as zero.
pub fn line_chart(ui: &mut Ui, id: &str, metric: Metric, series: &Series) {
    let points: Vec<[f64; 2]> = series
        .complete()
        .into_iter()
        .map(|(year, value)| [year as f64, value])
        .collect();

    Plot::new(id)
        .height(240.0)
        .x_axis_label("Year")
        .y_axis_label(format!("{} ({})", metric.label(), metric.unit()))
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(series.country.as_str())
                    .color(LINE_COLOR)
                    .width(1.5),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0).color(LINE_COLOR));
        });
}

// ---------------------------------------------------------------------------
// Heatmap (top-N countries over the sampled years)
// ---------------------------------------------------------------------------

const CELL: egui::Vec2 = egui::vec2(96.0, 26.0);

/// Years down, countries across; cell colour from the blue ramp over the
/// shown values.
pub fn heatmap(ui: &mut Ui, metric: Metric, top: &TopN) {
    let scale = ColorScale::from_range(value_range(top));

    egui::Grid::new("top_n_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Year");
            for (country, _) in &top.ranking {
                ui.strong(country.as_str());
            }
            ui.end_row();

            for &year in &top.years {
                ui.label(year.to_string());
                for (country, _) in &top.ranking {
                    let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());
                    match top.value(country, year) {
                        Some(v) => {
                            ui.painter().rect_filled(rect, 2.0, scale.color_for(v));
                            ui.painter().text(
                                rect.center(),
                                Align2::CENTER_CENTER,
                                format_value(v),
                                FontId::proportional(11.0),
                                scale.text_color_for(v),
                            );
                            response.on_hover_text(format!(
                                "{country}, {year}: {} {}",
                                format_value(v),
                                metric.unit()
                            ));
                        }
                        None => {
                            ui.painter().rect_filled(rect, 2.0, Color32::from_gray(40));
                        }
                    }
                }
                ui.end_row();
            }
        });
}

fn value_range(top: &TopN) -> Option<(f64, f64)> {
    top.records
        .iter()
        .filter_map(|r| r.value)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Compact number for cells and tables: 1.2M, 3.4B, 12.3.
pub fn format_value(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_abbreviated() {
        assert_eq!(format_value(7_975_105_156.0), "7.98B");
        assert_eq!(format_value(-2_500_000.0), "-2.50M");
        assert_eq!(format_value(45_000.0), "45.0K");
        assert_eq!(format_value(3.14159), "3.14");
    }
}
