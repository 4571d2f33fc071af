mod app;
mod color;
mod state;
mod ui;

use app::WorldDashboardApp;
use eframe::egui;
use world_dashboard::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::from_env();
    log::info!("Reading datasets from {}", settings.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "World Dashboard",
        options,
        Box::new(|cc| {
            // Image loaders (incl. http) so flags can be shown by URL.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(WorldDashboardApp::new(settings)))
        }),
    )
}
