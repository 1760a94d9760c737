//! Entry point of the mod load order arranger.
use std::path::PathBuf;

use clap::Parser;
use egui_ddlist::app::ArrangerApp;
use egui_ddlist::profiles::GamePaths;
use egui_ddlist::{config, logging};

/// Reorder the mods of a game profile by drag and drop.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Game data directory containing `PlayerProfiles` and `Mods`
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Profile to open
    #[arg(long)]
    profile: Option<String>,
    /// Config file to use instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("Logging disabled: {err}");
    }

    let config = config::load(cli.config.as_deref())?;
    let paths = match cli.data_dir.or(config.data_dir) {
        Some(dir) => GamePaths::new(dir),
        None => GamePaths::from_documents()?,
    };
    tracing::info!("Game data in {}", paths.data_dir().display());

    let profile = cli.profile.or(config.profile);
    let app = ArrangerApp::new(paths, config.list.layout(), profile.as_deref())?;

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(app.preferred_window_size()),
        ..Default::default()
    };
    let outcome = eframe::run_native(
        "Mod Arranger",
        native_options,
        Box::new(move |_cc| Box::new(app)),
    );
    tracing::debug!(?outcome, "window closed");
    Ok(())
}
