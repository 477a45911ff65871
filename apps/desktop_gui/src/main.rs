use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, ClientSettings, SettingsError};
use crossbeam_channel::{bounded, Sender};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::PredictorApp;

#[derive(Parser, Debug)]
struct Args {
    /// Base url of the prediction service; overrides settings file and env.
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file; defaults to ./predictor.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Applies the command line on top of the loaded settings. Problems are
/// reported to the UI and the defaults are used instead.
fn resolve_settings(
    loaded: Result<ClientSettings, SettingsError>,
    api_url: Option<&str>,
    ui_tx: &Sender<UiEvent>,
) -> ClientSettings {
    let settings = match loaded {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("failed to load settings: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::Settings,
                format!("{err}; using default settings"),
            )));
            ClientSettings::default()
        }
    };

    let Some(url) = api_url else {
        return settings;
    };
    match settings.clone().with_api_base_url(url) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("ignoring --api-url: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::Settings,
                format!("{err}; using {}", settings.api_base_url),
            )));
            settings
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    let settings = resolve_settings(
        load_settings(args.config.as_deref()),
        args.api_url.as_deref(),
        &ui_tx,
    );
    let api_base_url = settings.api_base_url.clone();
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Fake News Detector")
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Fake News Detector",
        options,
        Box::new(move |_cc| Ok(Box::new(PredictorApp::new(cmd_tx, ui_rx, api_base_url)))),
    )
}
