//! Bot-token parsing and redaction.

/// Redacts a token for logging: first 2 and last 2 characters survive,
/// everything between becomes asterisks.
#[must_use]
pub fn hide(token: &str) -> String {
    let len = token.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let mut chars = token.chars();
    let head: String = chars.by_ref().take(2).collect();
    let tail: String = token.chars().skip(len - 2).collect();
    format!("{head}{}{tail}", "*".repeat(8))
}

/// A syntactically valid token has the shape `<bot_id>:<secret>`, where
/// `bot_id` parses as an integer and neither side is empty or contains
/// whitespace.
#[must_use]
pub fn validate(token: &str) -> bool {
    if token.chars().any(char::is_whitespace) {
        return false;
    }
    match token.split_once(':') {
        Some((left, right)) => !left.is_empty() && !right.is_empty() && left.parse::<i64>().is_ok(),
        None => false,
    }
}

/// Extracts the numeric bot id from a token, if it's syntactically valid.
#[must_use]
pub fn extract_bot_id(token: &str) -> Option<i64> {
    let (left, _) = token.split_once(':')?;
    left.parse().ok()
}
