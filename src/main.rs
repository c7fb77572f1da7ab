#![windows_subsystem = "windows"]

use std::process::ExitCode;

use eframe::egui;
use filterfe::app::FilterFEApp;
use filterfe::{cli, logger};

fn main() -> ExitCode {
    // -- CLI / headless mode -------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        return cli::run(args);
    }

    // -- GUI mode ------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("FilterFE"),
        ..Default::default()
    };

    match eframe::run_native(
        "FilterFE",
        options,
        Box::new(|cc| Box::new(FilterFEApp::new(cc))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: failed to start the window: {}", e);
            ExitCode::FAILURE
        }
    }
}
