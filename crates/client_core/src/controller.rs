//! Submission lifecycle: input capture, dispatch, decoding into display state.

use std::{
    panic,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use shared::domain::Prediction;
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    config::{ClientSettings, OverlapPolicy},
    error::PredictionError,
    transport::{HttpPredictionService, PredictionService},
    types::{ControllerSnapshot, RequestStatus, Settlement},
};

/// Shown for every failure; the underlying cause only goes to the log.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to get prediction. Is the prediction service running?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerOptions {
    pub clear_result_on_failure: bool,
    pub clear_error_on_edit: bool,
    pub overlap: OverlapPolicy,
}

impl From<&ClientSettings> for ControllerOptions {
    fn from(value: &ClientSettings) -> Self {
        Self {
            clear_result_on_failure: value.clear_result_on_failure,
            clear_error_on_edit: value.clear_error_on_edit,
            overlap: value.overlap,
        }
    }
}

#[derive(Default)]
struct ControllerState {
    input: String,
    status: RequestStatus,
    result: Option<Prediction>,
    error: Option<String>,
    checked_at: Option<DateTime<Utc>>,
    latest_generation: u64,
    in_flight: usize,
    latest_task: Option<AbortHandle>,
}

impl ControllerState {
    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            input: self.input.clone(),
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
            checked_at: self.checked_at,
            in_flight: self.in_flight,
        }
    }
}

struct Shared {
    state: Mutex<ControllerState>,
    snapshots: watch::Sender<ControllerSnapshot>,
    options: ControllerOptions,
}

impl Shared {
    // Never held across an await point.
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn settle(
        &self,
        generation: u64,
        outcome: Result<Prediction, PredictionError>,
    ) -> Settlement {
        let mut state = self.lock();

        if self.options.overlap == OverlapPolicy::SupersedePrevious
            && generation != state.latest_generation
        {
            debug!(
                generation,
                latest = state.latest_generation,
                "discarding response of superseded submission"
            );
            return Settlement::Cancelled;
        }

        let settlement = match outcome {
            Ok(prediction) => {
                info!(
                    generation,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "prediction succeeded"
                );
                state.status = RequestStatus::Succeeded;
                state.result = Some(prediction);
                state.checked_at = Some(Utc::now());
                state.error = None;
                Settlement::Succeeded
            }
            Err(err) => {
                warn!(generation, error = %err, "prediction failed");
                state.status = RequestStatus::Failed;
                state.error = Some(GENERIC_FAILURE_MESSAGE.to_string());
                if self.options.clear_result_on_failure {
                    state.result = None;
                    state.checked_at = None;
                }
                Settlement::Failed
            }
        };

        if state.latest_generation == generation {
            state.latest_task = None;
        }
        self.publish(&state);
        settlement
    }
}

/// Counts a submission as outstanding until its task completes or is dropped.
struct InFlightGuard {
    shared: Arc<Shared>,
    generation: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 && state.status == RequestStatus::Pending {
            debug!(
                generation = self.generation,
                "no submission left outstanding; returning to idle"
            );
            state.status = RequestStatus::Idle;
        }
        self.shared.publish(&state);
    }
}

/// Handle to one outstanding submission.
///
/// Dropping the handle detaches the request; it still settles into the
/// controller state.
#[derive(Debug)]
pub struct SubmissionHandle {
    generation: u64,
    task: JoinHandle<Settlement>,
}

impl SubmissionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn settled(self) -> Settlement {
        match self.task.await {
            Ok(settlement) => settlement,
            Err(err) if err.is_cancelled() => Settlement::Cancelled,
            Err(err) => panic::resume_unwind(err.into_panic()),
        }
    }
}

#[derive(Clone)]
pub struct SubmissionController {
    service: Arc<dyn PredictionService>,
    shared: Arc<Shared>,
}

impl SubmissionController {
    pub fn new(service: Arc<dyn PredictionService>, options: ControllerOptions) -> Self {
        let (snapshots, _) = watch::channel(ControllerSnapshot::default());
        Self {
            service,
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState::default()),
                snapshots,
                options,
            }),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, PredictionError> {
        let service = HttpPredictionService::new(settings)?;
        Ok(Self::new(Arc::new(service), settings.into()))
    }

    pub fn options(&self) -> ControllerOptions {
        self.shared.options
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn input(&self) -> String {
        self.shared.lock().input.clone()
    }

    /// Replaces the input text. Request state and results are untouched unless
    /// `clear_error_on_edit` is set and the text actually changed.
    pub fn update_input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.shared.lock();
        if state.input == text {
            return;
        }
        state.input = text;
        if self.shared.options.clear_error_on_edit && state.status == RequestStatus::Failed {
            state.status = RequestStatus::Idle;
            state.error = None;
        }
        self.shared.publish(&state);
    }

    pub fn submit_current(&self) -> Option<SubmissionHandle> {
        let text = self.input();
        self.submit(text)
    }

    /// Starts one prediction request for `text`, sent untrimmed.
    ///
    /// Returns `None` without touching any state when `text` is blank. Must be
    /// called from within a tokio runtime.
    pub fn submit(&self, text: impl Into<String>) -> Option<SubmissionHandle> {
        let text = text.into();
        if text.trim().is_empty() {
            debug!("ignoring blank submission");
            return None;
        }

        let overlap = self.shared.options.overlap;
        let (generation, superseded) = {
            let mut state = self.shared.lock();
            state.latest_generation += 1;
            state.in_flight += 1;
            state.status = RequestStatus::Pending;
            state.error = None;
            let superseded = match overlap {
                OverlapPolicy::SupersedePrevious => state.latest_task.take(),
                OverlapPolicy::LastResponseWins => None,
            };
            self.shared.publish(&state);
            (state.latest_generation, superseded)
        };

        if let Some(previous) = superseded {
            debug!(generation, "cancelling superseded submission");
            previous.abort();
        }

        let guard = InFlightGuard {
            shared: self.shared.clone(),
            generation,
        };
        let service = self.service.clone();
        let shared = self.shared.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            debug!(generation, "dispatching prediction request");
            let outcome = service.predict(&text).await;
            shared.settle(generation, outcome)
        });

        if overlap == OverlapPolicy::SupersedePrevious {
            let mut state = self.shared.lock();
            if state.latest_generation == generation && !task.is_finished() {
                state.latest_task = Some(task.abort_handle());
            }
        }

        Some(SubmissionHandle { generation, task })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
