//! Fuzzy answer matching
//!
//! The fast path of answer evaluation. A verdict with `is_match == true` can be
//! trusted as-is; anything else should be escalated to the arbiter
//! (see [`crate::arbiter`]).

mod normalize;
mod ratio;

use serde::Serialize;

pub use normalize::normalize;
pub use ratio::{partial_ratio, ratio, token_sort_ratio};

/// Minimum score (inclusive) for an answer to be accepted without arbitration
pub const MATCH_THRESHOLD: u8 = 85;

/// Below this user/correct length ratio the answer is never auto-accepted
pub const MIN_LENGTH_RATIO: f64 = 0.5;

/// Partial matching is only trusted from this length ratio on
pub const PARTIAL_RATIO_MIN_LENGTH_RATIO: f64 = 0.7;

/// Longer normalized answers are not scored at all
pub const MAX_COMPARE_CHARS: usize = 2048;

/// Outcome of comparing a player's answer with the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchVerdict {
    pub is_match: bool,
    /// Best similarity score, `0..=100`
    pub score: u8,
}

impl MatchVerdict {
    const EXACT: Self = Self {
        is_match: true,
        score: 100,
    };

    const DEFERRED: Self = Self {
        is_match: false,
        score: 0,
    };
}

/// Decide whether `user_answer` can be accepted as `correct_answer` without
/// asking the arbiter.
///
/// Both answers are normalized first. Equal normalized forms are an exact
/// match (score 100), which includes two empty answers. A user answer shorter
/// than half the expected one is never accepted here and scores 0. Otherwise
/// the score is the best of [`ratio`], [`token_sort_ratio`] and, when the
/// lengths are close enough, [`partial_ratio`].
///
/// Not symmetric: the guards look at the user answer relative to the
/// correct one.
pub fn evaluate(user_answer: &str, correct_answer: &str) -> MatchVerdict {
    let user = normalize(user_answer);
    let correct = normalize(correct_answer);

    if user == correct {
        return MatchVerdict::EXACT;
    }

    let user_len = user.chars().count();
    let correct_len = correct.chars().count();

    let length_ratio = if correct_len == 0 {
        0.0
    } else {
        user_len as f64 / correct_len as f64
    };

    if length_ratio < MIN_LENGTH_RATIO {
        tracing::debug!(
            user_len,
            correct_len,
            length_ratio,
            "Answer too short for fuzzy acceptance"
        );
        return MatchVerdict::DEFERRED;
    }

    if user_len > MAX_COMPARE_CHARS || correct_len > MAX_COMPARE_CHARS {
        tracing::warn!(user_len, correct_len, "Answer too long to score, deferring");
        return MatchVerdict::DEFERRED;
    }

    let mut score = ratio(&user, &correct).max(token_sort_ratio(&user, &correct));
    if length_ratio >= PARTIAL_RATIO_MIN_LENGTH_RATIO {
        score = score.max(partial_ratio(&user, &correct));
    }

    MatchVerdict {
        is_match: score >= MATCH_THRESHOLD,
        score,
    }
}
