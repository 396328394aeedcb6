//! `required`: the property must hold a truthy value.

use serde_json::Value;

use gotta_core::{is_truthy, Rule, RuleOutcome};

/// Registered rule name.
pub const NAME: &str = "required";

/// Message reported for a missing value.
pub const MESSAGE: &str = "is required";

/// Build the rule.
pub fn rule() -> Rule {
    Rule::new(NAME, |_, value, _| check(value))
}

/// Evaluate a value without going through a registry.
pub fn check(value: Option<&Value>) -> RuleOutcome {
    RuleOutcome::from((!is_truthy(value)).then_some(MESSAGE))
}
