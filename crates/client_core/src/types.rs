use chrono::{DateTime, Utc};
use shared::domain::Prediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// How a submission ended from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Succeeded,
    Failed,
    /// Aborted through its handle, or superseded by a newer submission.
    Cancelled,
}

/// Point-in-time copy of the controller state, published on every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub input: String,
    pub status: RequestStatus,
    pub result: Option<Prediction>,
    pub error: Option<String>,
    /// When the stored `result` was received; travels with it.
    pub checked_at: Option<DateTime<Utc>>,
    pub in_flight: usize,
}

/// What a front end should render. Exactly one variant applies, so a result
/// and an error are never shown together even when a stale result is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayOutcome<'a> {
    Nothing,
    Pending { previous: Option<&'a Prediction> },
    Prediction(&'a Prediction),
    Error(&'a str),
}

impl ControllerSnapshot {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn outcome(&self) -> DisplayOutcome<'_> {
        match self.status {
            RequestStatus::Pending => DisplayOutcome::Pending {
                previous: self.result.as_ref(),
            },
            RequestStatus::Failed => match self.error.as_deref() {
                Some(message) => DisplayOutcome::Error(message),
                None => DisplayOutcome::Nothing,
            },
            RequestStatus::Succeeded | RequestStatus::Idle => match &self.result {
                Some(prediction) => DisplayOutcome::Prediction(prediction),
                None => DisplayOutcome::Nothing,
            },
        }
    }
}
