use anyhow::Context;
use clap::Parser;
use client_core::{load_settings, normalize_base_url};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{DesktopGuiApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(about = "Desktop client for the E2ERA backend")]
struct Args {
    /// Backend base URL; overrides e2era.toml and the environment.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(log_filter) = args.log_filter {
        settings.log_filter = log_filter;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let base_url = normalize_base_url(&settings.base_url)?;
    tracing::info!(%base_url, "starting desktop gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(base_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("E2ERA")
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    let startup = StartupConfig { base_url };
    eframe::run_native(
        "E2ERA",
        options,
        Box::new(move |_cc| Ok(Box::new(DesktopGuiApp::bootstrap(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
    .context("desktop gui exited with an error")
}
