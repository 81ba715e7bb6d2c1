//! Secondary answer judge
//!
//! Consulted when the fuzzy matcher is not confident. The verdict comes from a
//! language model and is authoritative for the turn.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::llm::{GenerateRequest, LlmConfig, LlmError, LlmManager, LlmResult};

/// How sure the model claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Judgement returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterVerdict {
    pub correct: bool,
    #[serde(default)]
    pub explanation: String,
    pub confidence: Confidence,
}

/// Instructions sent as the system prompt of every judging request
pub const JUDGE_SYSTEM_PROMPT: &str = r#"You are judging a trivia game answer. Be fair but reasonable - accept answers that are essentially correct even if not word-for-word.

Determine if the player's answer is correct. Consider:
- Spelling variations and typos are OK if the answer is clearly the same
- Partial answers may be acceptable if they capture the key information
- Alternative correct answers should be accepted

Respond in JSON format:
{
  "correct": true/false,
  "explanation": "Brief explanation of your judgment (1-2 sentences)",
  "confidence": "high/medium/low"
}

Only respond with the JSON, no other text."#;

/// Build the user prompt for one answer
pub fn build_judge_prompt(question: &str, correct_answer: &str, user_answer: &str) -> String {
    format!(
        "Question: {question}\nExpected Answer: {correct_answer}\nPlayer's Answer: {user_answer}"
    )
}

/// Parse JSON from model output that may be wrapped in a Markdown code block
pub fn parse_ai_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let mut json = text.trim();

    if let Some(rest) = json.strip_prefix("```json") {
        json = rest;
    } else if let Some(rest) = json.strip_prefix("```") {
        json = rest;
    }
    if let Some(rest) = json.strip_suffix("```") {
        json = rest;
    }

    serde_json::from_str(json.trim())
}

/// Asks the configured models to judge answers
pub struct Arbiter {
    manager: LlmManager,
    timeout: Duration,
    max_tokens: u32,
}

impl Arbiter {
    pub fn new(manager: LlmManager, config: &LlmConfig) -> Self {
        Self {
            manager,
            timeout: config.default_timeout,
            max_tokens: config.default_max_tokens,
        }
    }

    /// Judge a single answer
    pub async fn judge(
        &self,
        question: &str,
        correct_answer: &str,
        user_answer: &str,
    ) -> LlmResult<ArbiterVerdict> {
        let request = GenerateRequest {
            system_prompt: Some(JUDGE_SYSTEM_PROMPT.to_string()),
            prompt: build_judge_prompt(question, correct_answer, user_answer),
            max_tokens: Some(self.max_tokens),
            timeout: self.timeout,
        };

        let (provider, response) = self.manager.generate_with_fallback(request).await?;

        let verdict: ArbiterVerdict = parse_ai_json(&response.text).map_err(|e| {
            tracing::warn!(provider = %provider, raw = %response.text, "Unparseable verdict");
            LlmError::ParseError(e.to_string())
        })?;

        tracing::info!(
            provider = %provider,
            model = %response.metadata.model,
            latency_ms = response.metadata.latency_ms,
            tokens_used = ?response.metadata.tokens_used,
            correct = verdict.correct,
            confidence = ?verdict.confidence,
            "Arbiter verdict"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateResponse, LlmProvider, ResponseMetadata};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    // --- parse_ai_json ---

    #[test]
    fn test_parse_plain_json() {
        let parsed: Named = parse_ai_json(r#"{"name": "test"}"#).unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_array() {
        let parsed: Vec<u32> = parse_ai_json("[1, 2, 3]").unwrap();
        assert_eq!(parsed, [1, 2, 3]);
    }

    #[test]
    fn test_parse_with_whitespace() {
        let parsed: Named = parse_ai_json("\n   {\n  \"name\": \"test\"\n }\n  ").unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_json_fence() {
        let parsed: Named = parse_ai_json("```json\n{\"name\": \"test\"}\n```").unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_plain_fence() {
        let parsed: Named = parse_ai_json("```\n{\"name\": \"test\"}\n```").unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_fence_without_newlines() {
        let parsed: Named = parse_ai_json("```json{\"name\": \"test\"}```").unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_fence_with_padding() {
        let parsed: Named = parse_ai_json("  ```json\n  {\"name\": \"test\"}  \n```  ").unwrap();
        assert_eq!(parsed.name, "test");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_ai_json::<Named>("not json").is_err());
        assert!(parse_ai_json::<Named>("```json\n```").is_err());
        assert!(parse_ai_json::<Named>("").is_err());
    }

    // --- Verdict ---

    #[test]
    fn test_verdict_parsing() {
        let verdict: ArbiterVerdict = parse_ai_json(
            r#"{"correct": true, "explanation": "Close enough", "confidence": "high"}"#,
        )
        .unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.explanation, "Close enough");
        assert_eq!(verdict.confidence, Confidence::High);
    }

    #[test]
    fn test_verdict_missing_explanation() {
        let verdict: ArbiterVerdict =
            parse_ai_json(r#"{"correct": false, "confidence": "low"}"#).unwrap();
        assert!(!verdict.correct);
        assert!(verdict.explanation.is_empty());
    }

    #[test]
    fn test_verdict_unknown_confidence() {
        assert!(parse_ai_json::<ArbiterVerdict>(
            r#"{"correct": true, "explanation": "", "confidence": "certain"}"#
        )
        .is_err());
    }

    #[test]
    fn test_prompt_contains_answers() {
        let prompt = build_judge_prompt("Largest mammal?", "Blue Whale", "dolphin");
        assert!(prompt.contains("Question: Largest mammal?"));
        assert!(prompt.contains("Expected Answer: Blue Whale"));
        assert!(prompt.contains("Player's Answer: dolphin"));
        assert!(!prompt.contains("JSON"));
    }

    #[test]
    fn test_system_prompt_asks_for_json_verdict() {
        assert!(JUDGE_SYSTEM_PROMPT.starts_with("You are judging a trivia game answer."));
        assert!(JUDGE_SYSTEM_PROMPT.contains(r#""confidence": "high/medium/low""#));
        assert!(JUDGE_SYSTEM_PROMPT.ends_with("Only respond with the JSON, no other text."));
    }

    // --- Arbiter ---

    struct CannedProvider {
        reply: &'static str,
        requests: Arc<Mutex<Vec<GenerateRequest>>>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(GenerateResponse {
                text: self.reply.to_string(),
                metadata: ResponseMetadata {
                    provider: "canned".to_string(),
                    model: "canned-1".to_string(),
                    tokens_used: Some(42),
                    latency_ms: 3,
                },
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn arbiter(reply: &'static str) -> (Arbiter, Arc<Mutex<Vec<GenerateRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let manager = LlmManager::new(vec![Box::new(CannedProvider {
            reply,
            requests: requests.clone(),
        })]);
        (Arbiter::new(manager, &LlmConfig::default()), requests)
    }

    #[tokio::test]
    async fn test_judge_parses_fenced_verdict() {
        let (arbiter, _) = arbiter(
            "```json\n{\"correct\": true, \"explanation\": \"Same band\", \"confidence\": \"medium\"}\n```",
        );

        let verdict = arbiter
            .judge("Who sang Hey Jude?", "The Beatles", "Beatles band")
            .await
            .unwrap();

        assert!(verdict.correct);
        assert_eq!(verdict.explanation, "Same band");
        assert_eq!(verdict.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn test_judge_sends_instructions_as_system_prompt() {
        let (arbiter, requests) =
            arbiter(r#"{"correct": false, "explanation": "No", "confidence": "high"}"#);

        arbiter
            .judge("Who sang Hey Jude?", "The Beatles", "The Stones")
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].system_prompt.as_deref(),
            Some(JUDGE_SYSTEM_PROMPT)
        );
        assert_eq!(
            requests[0].prompt,
            "Question: Who sang Hey Jude?\nExpected Answer: The Beatles\nPlayer's Answer: The Stones"
        );
        assert_eq!(requests[0].max_tokens, Some(300));
        assert_eq!(requests[0].timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_judge_rejects_prose() {
        let (arbiter, _) = arbiter("I think the answer is correct.");
        assert!(matches!(
            arbiter.judge("Q?", "A", "B").await,
            Err(LlmError::ParseError(_))
        ));
    }
}
