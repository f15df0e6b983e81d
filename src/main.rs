use eframe::egui;
use padboard::app::Padboard;
use padboard::geometry::Size;
use padboard::gui::PadboardApp;
use padboard::logging;
use padboard::settings::{Settings, SETTINGS_FILE};
use std::time::Instant;

const INITIAL_SIZE: [f32; 2] = [1280.0, 800.0];

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!("starting padboard");

    let board = Padboard::new(
        settings,
        Size::new(INITIAL_SIZE[0], INITIAL_SIZE[1]),
        Instant::now(),
    )?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(INITIAL_SIZE)
            .with_min_inner_size([900.0, 600.0])
            .with_title("Padboard"),
        ..Default::default()
    };
    eframe::run_native(
        "Padboard",
        native_options,
        Box::new(move |_cc| Box::new(PadboardApp::new(board))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the UI: {e}"))?;
    Ok(())
}
