//! HTTP API for answer evaluation.
//!
//! Answers are matched locally first; only answers the fuzzy matcher cannot
//! accept are sent to the arbiter.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::Instrument;

use crate::fuzzy;
use crate::llm::LlmError;
use crate::state::AppState;
use crate::types::{
    ErrorResponse, EvaluateAnswerRequest, EvaluateAnswerResponse, EvaluationId, MatchType,
};

/// Errors returned by the API, rendered as `{ "error": message }`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Question, correct answer, and user answer are required")]
    MissingFields,

    #[error("The {field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Answer arbitration is unavailable")]
    ArbitrationUnavailable,

    #[error("Failed to evaluate answer")]
    Arbitration(#[from] LlmError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::TooLong { .. } => StatusCode::BAD_REQUEST,
            ApiError::ArbitrationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Arbitration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/evaluate-answer", post(evaluate_answer))
        .with_state(state)
}

/// Keep a field only if it has non-whitespace content
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Evaluate a player's answer.
///
/// POST /api/evaluate-answer
///
/// Answers the fuzzy matcher accepts are returned with `matchType: "fuzzy"`
/// without contacting any model. Everything else is decided by the arbiter
/// and returned with `matchType: "ai"`.
pub async fn evaluate_answer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateAnswerRequest>,
) -> Result<Json<EvaluateAnswerResponse>, ApiError> {
    let (Some(question), Some(correct_answer), Some(user_answer)) = (
        required(request.question),
        required(request.correct_answer),
        required(request.user_answer),
    ) else {
        return Err(ApiError::MissingFields);
    };

    let max = state.config.max_answer_chars;
    for (field, value) in [
        ("question", &question),
        ("correct answer", &correct_answer),
        ("user answer", &user_answer),
    ] {
        if value.chars().count() > max {
            return Err(ApiError::TooLong { field, max });
        }
    }

    let evaluation_id: EvaluationId = ulid::Ulid::new().to_string();
    let span = tracing::info_span!("evaluate_answer", %evaluation_id);

    async move {
        let verdict = fuzzy::evaluate(&user_answer, &correct_answer);

        if verdict.is_match {
            tracing::info!(score = verdict.score, "Accepted by fuzzy match");
            return Ok(Json(EvaluateAnswerResponse {
                correct: true,
                match_type: MatchType::Fuzzy,
                score: verdict.score,
                explanation: None,
                confidence: None,
                correct_answer,
            }));
        }

        tracing::debug!(score = verdict.score, "Fuzzy match not confident, asking arbiter");

        let Some(arbiter) = state.arbiter.as_ref() else {
            tracing::warn!("No arbiter configured, cannot judge answer");
            return Err(ApiError::ArbitrationUnavailable);
        };

        let judgement = arbiter
            .judge(&question, &correct_answer, &user_answer)
            .await
            .map_err(|e| {
                tracing::error!("Error evaluating answer: {}", e);
                ApiError::from(e)
            })?;

        Ok::<_, ApiError>(Json(EvaluateAnswerResponse {
            correct: judgement.correct,
            match_type: MatchType::Ai,
            score: verdict.score,
            explanation: Some(judgement.explanation),
            confidence: Some(judgement.confidence),
            correct_answer,
        }))
    }
    .instrument(span)
    .await
}
