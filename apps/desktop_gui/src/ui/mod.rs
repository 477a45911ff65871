//! UI layer: app shell and result widgets.

pub mod app;
pub mod widgets;

pub use app::PredictorApp;
