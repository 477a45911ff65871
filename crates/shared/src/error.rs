use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown prediction label: {0:?}")]
pub struct UnknownLabel(pub String);
