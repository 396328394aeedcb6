//! `email`: the text must look like an email address.
//!
//! Only the shape is checked: a non-empty local part, an `@`, and a domain
//! with at least one dot, with no whitespace anywhere.

use regex::Regex;
use serde_json::Value;

use gotta_core::{is_truthy, text_of, Rule, RuleOutcome};

/// Registered rule name.
pub const NAME: &str = "email";

/// Message reported for a malformed address.
pub const MESSAGE: &str = "needs to be a valid email, e.g. \"email@valid.com\"";

/// Shape an address must match.
pub const PATTERN: &str = r"^\S+@\S+\.\S+$";

/// Build the rule, compiling [`PATTERN`] once for its lifetime.
///
/// # Errors
///
/// Returns the compile error if the pattern is rejected by `regex`.
pub fn rule() -> Result<Rule, regex::Error> {
    let pattern = Regex::new(PATTERN)?;
    Ok(Rule::new(NAME, move |_, value, _| check(&pattern, value)))
}

fn check(pattern: &Regex, value: Option<&Value>) -> RuleOutcome {
    let Some(value) = value.filter(|v| is_truthy(Some(*v))) else {
        return RuleOutcome::Pass;
    };
    RuleOutcome::from((!pattern.is_match(&text_of(value))).then_some(MESSAGE))
}
