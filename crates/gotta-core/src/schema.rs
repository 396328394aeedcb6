//! # Schema Trees
//!
//! A resource schema maps property names to either an ordered list of rule
//! names or a nested schema applied to the property's value. Entries keep
//! the insertion order of the source mapping; traversal order, and thus
//! the order of reported messages, follows it.
//!
//! Raw trees arrive as `serde_json::Value` (from `json!`, JSON or YAML) and
//! are parsed with [`Schema::parse`], which collects every malformed or
//! unknown rule reference with its property path.

use serde_json::Value;

use crate::error::ResourceViolation;

/// What a single schema property maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEntry {
    /// Rule names applied to the property value, in order.
    Leaf(Vec<String>),
    /// Sub-schema applied to the property value as a container.
    Nested(Schema),
}

/// An ordered mapping of property names to [`SchemaEntry`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: Vec<(String, SchemaEntry)>,
}

impl Schema {
    /// Parse a raw schema tree.
    ///
    /// `is_registered` is consulted for every rule name. All violations are
    /// collected before returning; the tree is only accepted if there are
    /// none.
    pub fn parse(
        raw: &Value,
        is_registered: impl Fn(&str) -> bool,
    ) -> Result<Self, Vec<ResourceViolation>> {
        let Value::Object(map) = raw else {
            return Err(vec![ResourceViolation::RulesNotObject]);
        };

        let mut violations = Vec::new();
        let schema = parse_mapping(map, "", &is_registered, &mut violations);
        if violations.is_empty() {
            Ok(schema)
        } else {
            Err(violations)
        }
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the schema has no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_mapping(
    map: &serde_json::Map<String, Value>,
    prefix: &str,
    is_registered: &dyn Fn(&str) -> bool,
    violations: &mut Vec<ResourceViolation>,
) -> Schema {
    let mut entries = Vec::with_capacity(map.len());

    for (property, raw) in map {
        let path = if prefix.is_empty() {
            property.clone()
        } else {
            format!("{prefix}.{property}")
        };

        let entry = match raw {
            Value::Object(child) => {
                SchemaEntry::Nested(parse_mapping(child, &path, is_registered, violations))
            }
            Value::Array(items) => {
                let mut rules = Vec::with_capacity(items.len());
                for item in items {
                    rules.extend(check_reference(
                        item,
                        property,
                        &path,
                        is_registered,
                        violations,
                    ));
                }
                SchemaEntry::Leaf(rules)
            }
            scalar => SchemaEntry::Leaf(
                check_reference(scalar, property, &path, is_registered, violations)
                    .into_iter()
                    .collect(),
            ),
        };

        entries.push((property.clone(), entry));
    }

    Schema { entries }
}

fn check_reference(
    raw: &Value,
    property: &str,
    path: &str,
    is_registered: &dyn Fn(&str) -> bool,
    violations: &mut Vec<ResourceViolation>,
) -> Option<String> {
    match raw {
        Value::String(rule) if is_registered(rule.as_str()) => Some(rule.clone()),
        Value::String(rule) => {
            violations.push(ResourceViolation::UnknownRule {
                rule: rule.clone(),
                property: property.to_string(),
                path: path.to_string(),
            });
            None
        }
        other => {
            violations.push(ResourceViolation::RuleNotString {
                property: property.to_string(),
                path: path.to_string(),
                found: other.to_string(),
            });
            None
        }
    }
}
