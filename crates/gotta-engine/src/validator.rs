//! # Validation Engine
//!
//! Executes a traversal plan and aggregates the verdicts.
//!
//! [`Validator::validate`] invokes every planned rule before returning and
//! assigns each invocation a slot at its plan index. Synchronous verdicts
//! fill their slot immediately; asynchronous ones keep a pending future in
//! theirs. Awaiting the returned [`PendingValidation`] drives all pending
//! futures concurrently and then reads the slots in index order, so the
//! message order never depends on which rule settles first.

use std::future::IntoFuture;

use futures::future::{join_all, BoxFuture, FutureExt};
use serde_json::Value;
use tracing::Instrument;

use gotta_core::{
    AggregationError, ErrorMessages, InvalidInputError, RuleFuture, RuleOutcome, ValidationError,
};

use crate::registry::{Registry, Resource};
use crate::traverse::{self, Invocation};

/// A validator bound to one registered (resource, mode) pair.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r Registry,
    resource: &'r Resource,
}

impl<'r> Validator<'r> {
    pub(crate) fn new(registry: &'r Registry, resource: &'r Resource) -> Self {
        Self { registry, resource }
    }

    /// Bound resource name.
    pub fn resource(&self) -> &str {
        &self.resource.name
    }

    /// Bound mode.
    pub fn mode(&self) -> &str {
        &self.resource.mode
    }

    /// Validate an object against the bound schema.
    ///
    /// Every rule invocation is dispatched before this returns. Await the
    /// result for the outcome: `Ok(())` when no rule recorded a message,
    /// [`ValidationError::Rejected`] with the ordered messages otherwise, or
    /// [`ValidationError::Aggregation`] if an asynchronous rule misbehaved.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if `object` is not a JSON object.
    pub fn validate(&self, object: &Value) -> Result<PendingValidation, InvalidInputError> {
        if !object.is_object() {
            return Err(InvalidInputError {
                found: json_type(object),
            });
        }

        let span = tracing::debug_span!(
            "validate",
            resource = %self.resource.name,
            mode = %self.resource.mode,
        );

        let slots: Vec<Slot> = span.in_scope(|| {
            let slots: Vec<Slot> = traverse::plan(self.registry, &self.resource.schema, object)
                .into_iter()
                .map(Slot::dispatch)
                .collect();
            tracing::debug!(
                invocations = slots.len(),
                pending = slots.iter().filter(|s| s.is_pending()).count(),
                "rule invocations dispatched"
            );
            slots
        });

        Ok(PendingValidation { span, slots })
    }
}

/// Outcome of one [`Validator::validate`] call, awaiting asynchronous rules.
///
/// Owns its slots and does not borrow the registry.
#[must_use = "a validation outcome does nothing unless awaited"]
pub struct PendingValidation {
    span: tracing::Span,
    slots: Vec<Slot>,
}

impl PendingValidation {
    /// Number of rule invocations, one slot each.
    pub fn invocation_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of invocations still waiting on an asynchronous verdict.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_pending()).count()
    }

    /// Wait for every invocation and aggregate the verdicts.
    pub async fn outcome(self) -> Result<(), ValidationError> {
        let Self { span, slots } = self;
        aggregate(slots).instrument(span).await
    }
}

impl IntoFuture for PendingValidation {
    type Output = Result<(), ValidationError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.outcome().boxed()
    }
}

impl std::fmt::Debug for PendingValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingValidation")
            .field("invocations", &self.invocation_count())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Reserved position for one invocation's message.
enum Slot {
    Settled(Option<String>),
    Pending {
        rule: String,
        property: String,
        future: RuleFuture,
    },
}

impl Slot {
    fn dispatch(invocation: Invocation<'_>) -> Self {
        match invocation.rule.invoke(invocation.property, invocation.value) {
            RuleOutcome::Pass => Self::Settled(None),
            RuleOutcome::Fail(message) => {
                Self::Settled(Some(format!("[{}] {message}", invocation.property)))
            }
            RuleOutcome::Pending(future) => Self::Pending {
                rule: invocation.rule.name.clone(),
                property: invocation.property.to_string(),
                future,
            },
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    async fn settle(self) -> Result<Option<String>, AggregationError> {
        let (rule, property, future) = match self {
            Self::Settled(message) => return Ok(message),
            Self::Pending {
                rule,
                property,
                future,
            } => (rule, property, future),
        };

        match future.await {
            Ok(None) => Ok(None),
            Ok(Some(failure)) => match failure.render() {
                Some(message) => Ok(Some(message)),
                None => {
                    let missing = failure.missing_fields();
                    tracing::warn!(%rule, %property, ?missing, "asynchronous rule resolved a malformed result");
                    Err(AggregationError::MalformedResult {
                        rule,
                        property,
                        missing,
                    })
                }
            },
            Err(source) => {
                tracing::warn!(%rule, %property, error = %source, "asynchronous rule failed to settle");
                Err(AggregationError::RuleRejected {
                    rule,
                    property,
                    source,
                })
            }
        }
    }
}

/// Settle all slots concurrently, then read them in index order.
///
/// A misbehaving rule fails the whole outcome; the first one in slot order
/// is reported.
async fn aggregate(slots: Vec<Slot>) -> Result<(), ValidationError> {
    let settled = join_all(slots.into_iter().map(Slot::settle)).await;

    let mut messages = Vec::new();
    for slot in settled {
        if let Some(message) = slot? {
            messages.push(message);
        }
    }

    if messages.is_empty() {
        tracing::debug!("validation passed");
        Ok(())
    } else {
        tracing::debug!(messages = messages.len(), "validation rejected");
        Err(ValidationError::Rejected(ErrorMessages::new(messages)))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ResourceDefinition;
    use gotta_core::{AsyncFailure, Rule};
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .add_rule(Rule::new("required-synchronous", |_, value, _| {
                if gotta_core::is_truthy(value) {
                    RuleOutcome::Pass
                } else {
                    RuleOutcome::fail("is required")
                }
            }))
            .unwrap();
        registry
            .add_rule(Rule::new("taken", |property, _, _| {
                let property = property.to_string();
                RuleOutcome::pending(async move { Ok(Some(AsyncFailure::new(property, "is taken"))) })
            }))
            .unwrap();
        registry
            .add_resource(ResourceDefinition::new(
                "user",
                "create",
                json!({ "email": "required-synchronous", "uniqueEmail": "taken" }),
            ))
            .unwrap();
        registry
    }

    #[test]
    fn non_objects_are_rejected_before_traversal() {
        let registry = registry();
        let validator = registry.bind("user", "create").unwrap();
        for (input, found) in [
            (Value::Null, "null"),
            (json!("text"), "string"),
            (json!(3), "number"),
            (json!([1, 2]), "array"),
        ] {
            let err = validator.validate(&input).unwrap_err();
            assert_eq!(err.found, found);
            assert!(err.to_string().starts_with("Only objects can be validated."));
        }
    }

    #[test]
    fn validate_dispatches_every_invocation_up_front() {
        let registry = registry();
        let pending = registry
            .bind("user", "create")
            .unwrap()
            .validate(&json!({}))
            .unwrap();
        assert_eq!(pending.invocation_count(), 2);
        assert_eq!(pending.pending_count(), 1);
    }

    #[tokio::test]
    async fn sync_and_async_messages_are_combined_in_order() {
        let registry = registry();
        let validator = registry.bind("user", "create").unwrap();
        let err = validator.validate(&json!({})).unwrap().await.unwrap_err();
        assert_eq!(
            err.messages().unwrap(),
            ["[email] is required", "[uniqueEmail] is taken"]
        );
    }

    #[tokio::test]
    async fn outcome_outlives_the_validator() {
        let registry = registry();
        let pending = {
            let validator = registry.bind("user", "create").unwrap();
            validator.validate(&json!({ "email": "a@b.co" })).unwrap()
        };
        let err = pending.outcome().await.unwrap_err();
        assert_eq!(err.messages().unwrap(), ["[uniqueEmail] is taken"]);
    }

    #[test]
    fn validator_reports_its_binding() {
        let registry = registry();
        let validator = registry.bind("user", "create").unwrap();
        assert_eq!(validator.resource(), "user");
        assert_eq!(validator.mode(), "create");
    }
}
