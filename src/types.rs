use serde::{Deserialize, Serialize};

use crate::arbiter::Confidence;

/// Opaque ID for one evaluation, used to correlate log lines
pub type EvaluationId = String;

/// Body of `POST /api/evaluate-answer`
///
/// Every field is optional on the wire so that a missing one is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateAnswerRequest {
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub user_answer: Option<String>,
}

/// Which stage decided the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Fuzzy,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateAnswerResponse {
    pub correct: bool,
    pub match_type: MatchType,
    /// Fuzzy similarity score, reported even when the arbiter decided
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
