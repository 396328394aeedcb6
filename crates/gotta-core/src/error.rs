//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Taxonomy
//!
//! - **Definition errors** ([`RuleDefinitionError`], [`ResourceDefinitionError`])
//!   are raised at registration time and carry every violation found.
//! - **Binding errors** ([`BindError`]) are raised when a validator is
//!   requested for an unregistered resource or mode.
//! - **Input errors** ([`InvalidInputError`]) are raised before traversal
//!   when the candidate is not an object.
//! - **Validation outcomes** ([`ValidationError`]) separate data that failed
//!   its rules ([`ValidationError::Rejected`]) from rules that misbehaved
//!   ([`ValidationError::Aggregation`]).

use std::fmt;

use thiserror::Error;

use crate::rule::BoxError;

/// One problem with a rule definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// An `inherits` entry names a rule that is not registered yet.
    MissingAncestor(String),
    /// The rule lists itself in `inherits`.
    SelfInheritance(String),
    /// The ancestor's chain already contains the rule being registered.
    Cycle {
        /// Rule being registered.
        rule: String,
        /// Ancestor whose chain leads back to `rule`.
        ancestor: String,
    },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAncestor(name) => {
                write!(f, "Rule [{name}] not found, add it before trying to inherit")
            }
            Self::SelfInheritance(name) => write!(f, "Rule [{name}] cannot inherit from itself"),
            Self::Cycle { rule, ancestor } => write!(
                f,
                "Rule [{rule}] would create an inheritance cycle through [{ancestor}]"
            ),
        }
    }
}

/// A rule could not be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid rule '{rule}':\n{}", bullet_list(.violations))]
pub struct RuleDefinitionError {
    /// Name of the rejected rule.
    pub rule: String,
    /// Every violation found, in `inherits` order.
    pub violations: Vec<RuleViolation>,
}

impl RuleDefinitionError {
    /// Violation messages, one per entry.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// One problem with a resource definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceViolation {
    /// `name` is empty.
    NameMissing,
    /// `mode` is empty.
    ModeMissing,
    /// `rules` is absent or null.
    RulesMissing,
    /// `rules` is present but not a mapping.
    RulesNotObject,
    /// A rule reference is not a string.
    RuleNotString {
        /// Property the reference belongs to.
        property: String,
        /// Dotted path from the schema root.
        path: String,
        /// JSON rendering of the offending value.
        found: String,
    },
    /// A rule reference names an unregistered rule.
    UnknownRule {
        /// The unknown rule name.
        rule: String,
        /// Property the reference belongs to.
        property: String,
        /// Dotted path from the schema root.
        path: String,
    },
}

impl fmt::Display for ResourceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameMissing => f.write_str("Name not defined"),
            Self::ModeMissing => f.write_str("Mode not defined"),
            Self::RulesMissing => f.write_str("Rules not defined"),
            Self::RulesNotObject => f.write_str("Rules has to be an object!"),
            Self::RuleNotString {
                property, found, ..
            } => write!(
                f,
                "Rule for property [{property}] must be a string, found {found}"
            ),
            Self::UnknownRule { rule, property, .. } => write!(
                f,
                "Rule \"{rule}\" for property [{property}] is not defined. Add it before adding a resource!"
            ),
        }
    }
}

/// A resource could not be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid resource definition:\n{}", bullet_list(.violations))]
pub struct ResourceDefinitionError {
    /// Every violation found, in discovery order.
    pub violations: Vec<ResourceViolation>,
}

impl ResourceDefinitionError {
    /// Violation messages, one per entry.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// A validator could not be bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No resource is registered under this name.
    #[error("Resource is not defined, add one via addResource before trying to instantiate! (resource '{resource}')")]
    UnknownResource {
        /// Requested resource name.
        resource: String,
    },

    /// The resource exists but not under this mode.
    #[error("Resource mode is not defined, add one via addResource before trying to instantiate! (resource '{resource}', mode '{mode}')")]
    UnknownMode {
        /// Requested resource name.
        resource: String,
        /// Requested mode.
        mode: String,
    },
}

/// The candidate handed to `validate` is not an object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Only objects can be validated. (got {found})")]
pub struct InvalidInputError {
    /// JSON type name of the rejected candidate.
    pub found: &'static str,
}

/// Ordered `"[property] message"` strings from a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessages(Vec<String>);

impl ErrorMessages {
    /// Wrap an ordered list of messages.
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all messages in traversal order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for ErrorMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {message}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ErrorMessages {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A rule misbehaved while its verdict was being collected.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// An asynchronous rule resolved an error record without `property`
    /// and/or `message`.
    #[error("rule '{rule}' on property [{property}] resolved a malformed result: {}", expected_fields(.missing))]
    MalformedResult {
        /// Rule that produced the record.
        rule: String,
        /// Property the rule was invoked for.
        property: String,
        /// Missing field names (`"property"`, `"message"`).
        missing: Vec<&'static str>,
    },

    /// An asynchronous rule's future resolved to an error.
    #[error("rule '{rule}' on property [{property}] failed to settle: {source}")]
    RuleRejected {
        /// Rule that failed.
        rule: String,
        /// Property the rule was invoked for.
        property: String,
        /// The rule's own error.
        #[source]
        source: BoxError,
    },
}

/// A validation call did not succeed.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The candidate broke one or more rules.
    #[error("validation failed:\n{0}")]
    Rejected(ErrorMessages),

    /// A rule implementation misbehaved; the candidate's validity is unknown.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
}

impl ValidationError {
    /// The rejection messages, if this is a [`ValidationError::Rejected`].
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Self::Rejected(messages) => Some(messages.as_slice()),
            Self::Aggregation(_) => None,
        }
    }

    /// Returns true if the candidate data failed its rules.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

fn bullet_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn expected_fields(missing: &[&'static str]) -> String {
    missing
        .iter()
        .map(|field| format!("[{field}] is expected on the resolved promise object"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ancestor_message() {
        let v = RuleViolation::MissingAncestor("ayyy".into());
        assert_eq!(
            v.to_string(),
            "Rule [ayyy] not found, add it before trying to inherit"
        );
    }

    #[test]
    fn rule_definition_error_lists_every_violation() {
        let err = RuleDefinitionError {
            rule: "cool-rule".into(),
            violations: vec![
                RuleViolation::MissingAncestor("a".into()),
                RuleViolation::MissingAncestor("b".into()),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("Rule [a] not found"));
        assert!(display.contains("Rule [b] not found"));
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn resource_violation_messages() {
        let err = ResourceDefinitionError {
            violations: vec![
                ResourceViolation::NameMissing,
                ResourceViolation::ModeMissing,
                ResourceViolation::RulesMissing,
            ],
        };
        assert_eq!(
            err.messages(),
            vec!["Name not defined", "Mode not defined", "Rules not defined"]
        );
    }

    #[test]
    fn unknown_rule_message() {
        let v = ResourceViolation::UnknownRule {
            rule: "ahh".into(),
            property: "token".into(),
            path: "tokens.token".into(),
        };
        assert_eq!(
            v.to_string(),
            r#"Rule "ahh" for property [token] is not defined. Add it before adding a resource!"#
        );
    }

    #[test]
    fn malformed_result_names_both_fields() {
        let err = AggregationError::MalformedResult {
            rule: "unique".into(),
            property: "email".into(),
            missing: vec!["property", "message"],
        };
        let display = err.to_string();
        assert!(display.contains("[property] is expected on the resolved promise object"));
        assert!(display.contains("[message] is expected on the resolved promise object"));
    }

    #[test]
    fn validation_error_distinguishes_kinds() {
        let rejected = ValidationError::Rejected(ErrorMessages::new(vec!["[id] bad".into()]));
        assert!(rejected.is_rejection());
        assert_eq!(rejected.messages(), Some(&["[id] bad".to_string()][..]));

        let fault: ValidationError = AggregationError::MalformedResult {
            rule: "r".into(),
            property: "p".into(),
            missing: vec!["message"],
        }
        .into();
        assert!(!fault.is_rejection());
        assert!(fault.messages().is_none());
    }

    #[test]
    fn error_messages_display_one_per_line() {
        let messages = ErrorMessages::new(vec!["[a] x".into(), "[b] y".into()]);
        assert_eq!(messages.to_string(), "  [a] x\n  [b] y");
    }
}
