#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;
use flipbook_core::ViewerOptions;
use log::LevelFilter;
use std::path::PathBuf;

mod app;
mod book;
mod fullscreen;
mod logger;
mod textures;

#[derive(Parser)]
#[command(name = "flipbook-viewer", about = "Page-flip PDF viewer", version)]
struct Cli {
    /// PDF file to open on start
    file: Option<PathBuf>,

    /// Viewer options JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = logger::AppLogger::new(500, LevelFilter::Info);
    logger.clone().init()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let options = match &cli.config {
        Some(path) => runtime.block_on(ViewerOptions::load(path))?,
        None => ViewerOptions::default(),
    };
    // The loader is spawned onto this runtime from the UI thread
    let _guard = runtime.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::INITIAL_WINDOW_SIZE)
            .with_drag_and_drop(true)
            .with_title("Flipbook"),
        ..Default::default()
    };

    let file = cli.file;
    eframe::run_native(
        "Flipbook",
        native_options,
        Box::new(move |cc| {
            let app = app::FlipbookApp::new(cc, options, logger, file)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("Viewer window failed: {}", e))
}
