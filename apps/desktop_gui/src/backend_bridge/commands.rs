//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    UpdateInput { text: String },
    Submit,
}
