use eframe::egui;
use world_dashboard::config::Settings;

use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WorldDashboardApp {
    pub state: AppState,
}

impl WorldDashboardApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for WorldDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.is_stale() {
            self.state.refresh();
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    dashboard::central_panel(ui, &mut self.state);
                });
        });
    }
}
