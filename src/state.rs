use std::sync::Arc;

use crate::arbiter::Arbiter;

/// Limits applied to incoming evaluation requests
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Longest accepted question or answer, in characters
    pub max_answer_chars: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_answer_chars: 500,
        }
    }
}

impl EvaluationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let max_answer_chars = std::env::var("MAX_ANSWER_CHARS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|&max: &usize| max > 0)
            .unwrap_or(Self::default().max_answer_chars);

        tracing::info!(max_answer_chars, "Evaluation config loaded");

        Self { max_answer_chars }
    }
}

/// Shared application state, immutable after startup
#[derive(Clone)]
pub struct AppState {
    /// None when no LLM provider is configured; fuzzy matches still work
    pub arbiter: Option<Arc<Arbiter>>,
    pub config: EvaluationConfig,
}

impl AppState {
    pub fn new(arbiter: Option<Arbiter>, config: EvaluationConfig) -> Self {
        Self {
            arbiter: arbiter.map(Arc::new),
            config,
        }
    }

    /// State without an arbiter, useful when only the fuzzy path is wanted
    pub fn fuzzy_only() -> Self {
        Self::new(None, EvaluationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        assert_eq!(EvaluationConfig::default().max_answer_chars, 500);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("MAX_ANSWER_CHARS", "120");
        assert_eq!(EvaluationConfig::from_env().max_answer_chars, 120);

        std::env::set_var("MAX_ANSWER_CHARS", "0");
        assert_eq!(EvaluationConfig::from_env().max_answer_chars, 500);

        std::env::set_var("MAX_ANSWER_CHARS", "lots");
        assert_eq!(EvaluationConfig::from_env().max_answer_chars, 500);

        std::env::remove_var("MAX_ANSWER_CHARS");
        assert_eq!(EvaluationConfig::from_env().max_answer_chars, 500);
    }

    #[test]
    fn test_fuzzy_only_state() {
        let state = AppState::fuzzy_only();
        assert!(state.arbiter.is_none());
    }
}
