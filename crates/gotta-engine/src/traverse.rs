//! # Schema Traversal
//!
//! Walks a schema tree against a candidate object and produces the flat,
//! ordered list of rule invocations for one validation call.
//!
//! Order is depth-first, pre-order, left-to-right over the schema's own
//! insertion order. For a leaf entry, each listed rule is expanded into its
//! inheritance chain; when the property value is an array the whole chain
//! runs once per element, otherwise once against the value itself. Nested
//! entries recurse with the property value as the new container, and a
//! missing container leaves every value beneath it absent.

use serde_json::Value;

use gotta_core::{Rule, Schema, SchemaEntry};

use crate::registry::Registry;

/// One scheduled execution of a rule against a value.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Property name the message is reported against.
    pub property: &'a str,
    /// The property value, or one element of an array value.
    pub value: Option<&'a Value>,
    /// The rule to run.
    pub rule: &'a Rule,
}

/// Plan every invocation for `object` against `schema`, in reporting order.
pub fn plan<'a>(
    registry: &'a Registry,
    schema: &'a Schema,
    object: &'a Value,
) -> Vec<Invocation<'a>> {
    let mut invocations = Vec::new();
    walk(registry, schema, Some(object), &mut invocations);
    invocations
}

fn walk<'a>(
    registry: &'a Registry,
    schema: &'a Schema,
    container: Option<&'a Value>,
    invocations: &mut Vec<Invocation<'a>>,
) {
    for (property, entry) in schema.entries() {
        let value = container.and_then(|c| c.get(property));

        match entry {
            SchemaEntry::Nested(child) => walk(registry, child, value, invocations),
            SchemaEntry::Leaf(rule_names) => {
                for name in rule_names {
                    let chain = registry.resolve_chain(name);
                    match value {
                        Some(Value::Array(items)) => {
                            for item in items {
                                push_chain(&chain, property, Some(item), invocations);
                            }
                        }
                        _ => push_chain(&chain, property, value, invocations),
                    }
                }
            }
        }
    }
}

fn push_chain<'a>(
    chain: &[&'a Rule],
    property: &'a str,
    value: Option<&'a Value>,
    invocations: &mut Vec<Invocation<'a>>,
) {
    invocations.extend(chain.iter().map(|&rule| Invocation {
        property,
        value,
        rule,
    }));
}
