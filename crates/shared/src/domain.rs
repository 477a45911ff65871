use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownLabel;

/// Classification returned by the prediction service.
///
/// `Uncertain` is emitted by the service when its own confidence falls below
/// its decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Real,
    Fake,
    Uncertain,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
            Label::Uncertain => "UNCERTAIN",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Label::Real => "REAL NEWS",
            Label::Fake => "FAKE NEWS",
            Label::Uncertain => "UNCERTAIN",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REAL" => Ok(Label::Real),
            "FAKE" => Ok(Label::Fake),
            "UNCERTAIN" => Ok(Label::Uncertain),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub fake: f64,
    pub real: f64,
}

impl Probabilities {
    /// Sum of both percentages. The service is expected to report 100 but
    /// nothing enforces it.
    pub fn total(&self) -> f64 {
        self.fake + self.real
    }
}

/// Decoded outcome of one successful prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f64,
    pub probabilities: Probabilities,
}
