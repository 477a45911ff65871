use std::{
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{load_settings, DisplayOutcome, Settlement, SubmissionController};
use shared::{domain::Prediction, protocol::PredictResponse};
use tracing_subscriber::EnvFilter;

/// Check a news article against the prediction service.
#[derive(Parser, Debug)]
struct Args {
    /// Base url of the prediction service; overrides settings file and env.
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file; defaults to ./predictor.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Client-side request timeout in seconds; no timeout unless set.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the decoded response as JSON.
    #[arg(long)]
    json: bool,
    /// Article text; read from stdin when omitted.
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load predictor settings")?;
    if let Some(url) = &args.api_url {
        settings = settings.with_api_base_url(url)?;
    }
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_request_timeout_secs(secs)?;
    }
    tracing::debug!(api_base_url = %settings.api_base_url, "settings resolved");

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read article text from stdin")?;
            buf
        }
    };

    let controller = SubmissionController::from_settings(&settings)?;
    controller.update_input(text);
    let Some(handle) = controller.submit_current() else {
        eprintln!("Nothing to check: the article text is empty.");
        return Ok(());
    };

    if handle.settled().await == Settlement::Cancelled {
        bail!("prediction request was cancelled");
    }

    let snapshot = controller.snapshot();
    match snapshot.outcome() {
        DisplayOutcome::Prediction(prediction) if args.json => {
            println!("{}", serde_json::to_string_pretty(&to_wire(prediction))?);
        }
        DisplayOutcome::Prediction(prediction) => print!("{}", render_report(prediction)),
        DisplayOutcome::Error(message) => bail!("{message}"),
        DisplayOutcome::Nothing | DisplayOutcome::Pending { .. } => {
            bail!("prediction did not settle")
        }
    }

    Ok(())
}

fn to_wire(prediction: &Prediction) -> PredictResponse {
    PredictResponse {
        prediction: prediction.label,
        confidence: prediction.confidence,
        probabilities: prediction.probabilities,
    }
}

fn render_report(prediction: &Prediction) -> String {
    format!(
        "{}\nConfidence: {}%\nFake probability: {}%\nReal probability: {}%\n",
        prediction.label.headline(),
        prediction.confidence,
        prediction.probabilities.fake,
        prediction.probabilities.real,
    )
}
