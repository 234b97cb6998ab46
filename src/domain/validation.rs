//! Field checks shared by user and job payloads.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Check that `value` has between `min` and `max` characters (inclusive).
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("{field} must be at least {min} characters"));
    }
    if len > max {
        return Err(format!("{field} cannot exceed {max} characters"));
    }
    Ok(())
}

pub fn check_email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(format!("{value} is not a valid email address"))
    }
}

/// Lowercase and trim free-form terms, dropping blanks.
pub fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
