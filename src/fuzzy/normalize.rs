//! Answer normalization
//!
//! Strips the superficial variation that should never decide whether a trivia
//! answer is right: casing, a leading article, punctuation and spacing.

/// Leading tokens dropped before comparison
const ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Normalize a free-text answer into its comparison form.
///
/// Lowercases, removes punctuation, collapses whitespace and drops a leading
/// `the`/`a`/`an` as long as another word follows it.
///
/// Connector punctuation (dashes, slashes, colons and the like) leaves a word
/// boundary behind, so `"Extra-Terrestrial"` becomes `"extra terrestrial"`.
/// Everything else is deleted in place, so `"What's"` becomes `"whats"` and
/// `"E.T."` becomes `"et"`.
///
/// The result only contains word characters and single spaces, which makes
/// the function idempotent.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if is_word_char(c) {
            cleaned.push(c);
        } else if c.is_whitespace() || is_connector(c) {
            cleaned.push(' ');
        }
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    // Articles are stripped on the cleaned tokens and repeatedly, otherwise
    // "the the beatles" or "a-ha" would change again on a second pass.
    // The last token is always kept.
    // Titles that start with a hyphenated article lose it too: "The A-Team"
    // becomes "team" and is an exact match for "The Team".
    let leading_articles = tokens
        .iter()
        .take_while(|token| ARTICLES.contains(*token))
        .count()
        .min(tokens.len().saturating_sub(1));

    tokens[leading_articles..].join(" ")
}

/// Letters, digits (any script) and underscore
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Punctuation that sits between two words rather than inside one
fn is_connector(c: char) -> bool {
    matches!(
        c,
        '-' | '/' | '\\' | '|' | '+' | '&' | ',' | ';' | ':' | '=' | '~'
            | '\u{2010}'..='\u{2015}' // hyphen, non-breaking hyphen, figure/en/em dashes
            | '\u{2026}' // ellipsis
    )
}
