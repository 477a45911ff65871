//! Runtime bridge between UI command queue and backend event intake.

use std::{thread, time::Duration};

use client_core::{ClientSettings, ControllerSnapshot, SubmissionController};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::watch;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const FULL_QUEUE_RETRY: Duration = Duration::from_millis(25);

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let controller = match SubmissionController::from_settings(&settings) {
            Ok(controller) => controller,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                tracing::error!("failed to build prediction client: {err}");
                return;
            }
        };
        tracing::info!(api_base_url = %settings.api_base_url, "prediction worker started");

        // Controller submissions spawn onto this runtime.
        let _runtime_guard = runtime.enter();

        runtime.spawn(forward_snapshots(controller.subscribe(), ui_tx));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::UpdateInput { text } => controller.update_input(text),
                BackendCommand::Submit => {
                    if controller.submit_current().is_none() {
                        tracing::debug!("blank article text; submission ignored");
                    }
                }
            }
        }

        tracing::info!("ui command queue closed; prediction worker exiting");
    });
}

/// Pushes controller snapshots into the UI queue. While the queue is full the
/// newest snapshot is retried, so the settled state is never lost.
async fn forward_snapshots(
    mut snapshots: watch::Receiver<ControllerSnapshot>,
    ui_tx: Sender<UiEvent>,
) {
    while snapshots.changed().await.is_ok() {
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            match ui_tx.try_send(UiEvent::Snapshot(snapshot)) {
                Ok(()) => break,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("ui event queue full; retrying latest controller snapshot");
                    tokio::time::sleep(FULL_QUEUE_RETRY).await;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}
