//! Main application entry point.

use inkboard_app::{App, AppConfig, ShortcutRegistry};

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args().any(|arg| arg == "--shortcuts") {
        ShortcutRegistry::print_all();
        return Ok(());
    }

    let config = AppConfig::load();
    log::info!("Starting {}", config.title);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32, config.height as f32])
            .with_min_inner_size([640.0, 480.0])
            .with_title(config.title.clone()),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(App::new(config)))))
}
