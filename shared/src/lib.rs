use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The position inside a prediction list is the server's own ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    /// Both boundaries are exclusive on the low side: exactly 0.70 is
    /// still Medium and exactly 0.40 is still Low.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.70 {
            ConfidenceBucket::High
        } else if confidence > 0.40 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ErrorKind {
    ConnectionError,
    Timeout,
    ServerError,
    ParseError,
    UnexpectedError,
}

/// Transport and server failures are data here, not `Err` values, so
/// callers cannot skip the failure branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InferenceOutcome {
    Success { predictions: Vec<Prediction> },
    Failure { kind: ErrorKind, message: String },
}

impl InferenceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InferenceOutcome::Success { .. })
    }
}

/// `label` stays the canonical identifier; `display_label` is the
/// human-readable transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub rank: usize,
    pub label: String,
    pub display_label: String,
    pub confidence: f64,
    pub bucket: ConfidenceBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSummary {
    pub label: String,
    pub display_label: String,
    pub confidence: f64,
    pub bucket: ConfidenceBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ServerStatus {
    Online,
    Degraded,
    Offline,
}
