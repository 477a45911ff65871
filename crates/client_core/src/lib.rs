//! Client side of the news-credibility checker: settings, the HTTP transport
//! to the prediction service, and the submission controller front ends drive.

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;
pub mod types;

pub use config::{load_settings, ClientSettings, OverlapPolicy};
pub use controller::{
    ControllerOptions, SubmissionController, SubmissionHandle, GENERIC_FAILURE_MESSAGE,
};
pub use error::{PredictionError, SettingsError};
pub use transport::{HttpPredictionService, PredictionService};
pub use types::{ControllerSnapshot, DisplayOutcome, RequestStatus, Settlement};
