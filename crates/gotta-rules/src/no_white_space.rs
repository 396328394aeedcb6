//! `no-white-space`: the text must not contain whitespace.

use serde_json::Value;

use gotta_core::{is_truthy, text_of, Rule, RuleOutcome};

/// Registered rule name.
pub const NAME: &str = "no-white-space";

/// Message reported for whitespace.
pub const MESSAGE: &str = "is not allowed to have spaces";

/// Build the rule.
pub fn rule() -> Rule {
    Rule::new(NAME, |_, value, _| check(value))
}

/// Evaluate a value without going through a registry. Falsy values pass.
pub fn check(value: Option<&Value>) -> RuleOutcome {
    let Some(value) = value.filter(|v| is_truthy(Some(*v))) else {
        return RuleOutcome::Pass;
    };
    let spaced = text_of(value).chars().any(char::is_whitespace);
    RuleOutcome::from(spaced.then_some(MESSAGE))
}
