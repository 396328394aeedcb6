//! `password`: the text must be a strong password.
//!
//! A strong password is at least eight characters on a single line, holds
//! at least one ASCII digit, one uppercase and one lowercase ASCII letter,
//! and one of `!@#$%^&*`, and does not start with `.`.

use serde_json::Value;

use gotta_core::{is_truthy, text_of, Rule, RuleOutcome};

/// Registered rule name.
pub const NAME: &str = "password";

/// Message reported for a weak password.
pub const MESSAGE: &str = "must be greater than or equal to 8 characters long, contain one or more uppercase, lowercase, numeric, and special characters";

/// Minimum length in characters.
pub const MIN_LENGTH: usize = 8;

/// Characters that satisfy the special-character requirement.
pub const SPECIAL_CHARACTERS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*'];

const LINE_BREAKS: &[char] = &['\n', '\r', '\u{2028}', '\u{2029}'];

/// Build the rule.
pub fn rule() -> Rule {
    Rule::new(NAME, |_, value, _| check(value))
}

/// Evaluate a value without going through a registry. Falsy values pass.
pub fn check(value: Option<&Value>) -> RuleOutcome {
    let Some(value) = value.filter(|v| is_truthy(Some(*v))) else {
        return RuleOutcome::Pass;
    };
    RuleOutcome::from((!is_strong(&text_of(value))).then_some(MESSAGE))
}

/// Whether `text` meets every strength requirement.
pub fn is_strong(text: &str) -> bool {
    if text.starts_with('.') || text.contains(LINE_BREAKS) {
        return false;
    }
    text.chars().count() >= MIN_LENGTH
        && text.chars().any(|c| c.is_ascii_digit())
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().any(|c| c.is_ascii_lowercase())
        && text.contains(SPECIAL_CHARACTERS)
}
