//! # gotta-rules: Built-in Rules
//!
//! The rule set shipped with the engine. Install it on a registry with
//! [`install_default_rules`] before registering resources that reference
//! these names:
//!
//! | Name             | Fails when                                              |
//! |------------------|---------------------------------------------------------|
//! | `required`       | the value is falsy (absent, null, false, 0, "")         |
//! | `no-white-space` | the text contains any whitespace                        |
//! | `email`          | the text is not shaped like `local@domain.tld`          |
//! | `password`       | the text is not a strong password                       |
//!
//! Apart from `required`, every rule passes falsy values so that it can be
//! combined with `required` without reporting twice. Non-string values are
//! checked against their JSON text.

pub mod email;
pub mod no_white_space;
pub mod password;
pub mod required;

use gotta_core::{Rule, RuleDefinitionError};
use gotta_engine::Registry;

/// Errors raised while installing the built-in rules.
#[derive(Debug, thiserror::Error)]
pub enum DefaultRulesError {
    /// A built-in pattern failed to compile.
    #[error("built-in rule pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    /// The registry rejected a built-in rule.
    #[error(transparent)]
    Definition(#[from] RuleDefinitionError),
}

/// Every built-in rule, in installation order.
pub fn default_rules() -> Result<Vec<Rule>, DefaultRulesError> {
    Ok(vec![
        required::rule(),
        no_white_space::rule(),
        email::rule()?,
        password::rule(),
    ])
}

/// Register every built-in rule on `registry`, replacing any rule already
/// registered under the same name.
///
/// # Errors
///
/// Returns [`DefaultRulesError`] if a built-in rule cannot be constructed or
/// registered. None of them inherit, so registration itself cannot fail on
/// a well-formed registry.
pub fn install_default_rules(registry: &mut Registry) -> Result<&mut Registry, DefaultRulesError> {
    for rule in default_rules()? {
        registry.add_rule(rule)?;
    }
    tracing::debug!(rules = registry.rule_count(), "built-in rules installed");
    Ok(registry)
}
