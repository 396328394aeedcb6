//! # Rule and Resource Registry
//!
//! A single caller-owned value holding two mappings:
//!
//! - rule name → [`Rule`]
//! - (resource name, mode) → [`Resource`]
//!
//! Both are validated on the way in. Rules may only inherit from rules that
//! are already registered, and resources may only reference registered
//! rules. Every problem with a definition is reported at once.
//!
//! Re-registering under an existing key overwrites the previous entry.
//! Entries are never removed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use gotta_core::{
    is_truthy, text_of, BindError, ResourceDefinitionError, ResourceViolation, Rule,
    RuleDefinitionError, RuleViolation, Schema,
};

use crate::validator::Validator;

/// Raw resource definition, as written by hand or loaded from a catalog.
///
/// `rules` stays an untyped tree until registration so that every shape
/// problem can be reported together with unknown rule names. `name` and
/// `mode` accept any JSON value when deserialized: falsy values read as
/// empty (reported as not defined), other non-strings as their JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource name.
    #[serde(default, deserialize_with = "lenient_key")]
    pub name: String,
    /// Schema variant, e.g. `"create"` or `"update"`.
    #[serde(default, deserialize_with = "lenient_key")]
    pub mode: String,
    /// Property → rule name, list of rule names, or nested mapping.
    #[serde(default)]
    pub rules: Option<Value>,
}

impl ResourceDefinition {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, mode: impl Into<String>, rules: Value) -> Self {
        Self {
            name: name.into(),
            mode: mode.into(),
            rules: Some(rules),
        }
    }
}

fn lenient_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if is_truthy(Some(&raw)) {
        Ok(text_of(&raw).into_owned())
    } else {
        Ok(String::new())
    }
}

/// A registered, parsed resource schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Resource name.
    pub name: String,
    /// Schema variant.
    pub mode: String,
    /// Parsed schema tree.
    pub schema: Schema,
}

/// Rule and resource registry.
///
/// ## Thread Safety
///
/// `Registry` is `Send + Sync`. Registration needs `&mut self`, so share it
/// behind `Arc<Registry>` once setup is complete.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: HashMap<String, Rule>,
    /// Resource name → mode → resource. Modes are kept sorted for listing.
    resources: HashMap<String, BTreeMap<String, Resource>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, overwriting any rule with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDefinitionError`] listing every `inherits` entry that is
    /// not registered, names the rule itself, or would close a cycle. The
    /// registry is left untouched on error.
    pub fn add_rule(&mut self, rule: Rule) -> Result<&mut Self, RuleDefinitionError> {
        let mut violations = Vec::new();

        for ancestor in &rule.inherits {
            if *ancestor == rule.name {
                violations.push(RuleViolation::SelfInheritance(ancestor.clone()));
            } else if !self.rules.contains_key(ancestor) {
                violations.push(RuleViolation::MissingAncestor(ancestor.clone()));
            } else if self
                .resolve_chain(ancestor)
                .iter()
                .any(|r| r.name == rule.name)
            {
                violations.push(RuleViolation::Cycle {
                    rule: rule.name.clone(),
                    ancestor: ancestor.clone(),
                });
            }
        }

        if !violations.is_empty() {
            tracing::debug!(rule = %rule.name, violations = violations.len(), "rule rejected");
            return Err(RuleDefinitionError {
                rule: rule.name,
                violations,
            });
        }

        tracing::debug!(rule = %rule.name, inherits = ?rule.inherits, "rule registered");
        self.rules.insert(rule.name.clone(), rule);
        Ok(self)
    }

    /// Expand a rule into its inheritance chain.
    ///
    /// Depth-first, pre-order: each ancestor's own chain comes first, in
    /// `inherits` order, followed by the rule itself. A rule inherited
    /// through two paths appears twice. Unregistered names expand to nothing.
    pub fn resolve_chain(&self, name: &str) -> Vec<&Rule> {
        let mut chain = Vec::new();
        self.expand_chain(name, &mut chain);
        chain
    }

    fn expand_chain<'a>(&'a self, name: &str, chain: &mut Vec<&'a Rule>) {
        let Some(rule) = self.rules.get(name) else {
            tracing::warn!(rule = name, "chain references an unregistered rule");
            return;
        };
        for ancestor in &rule.inherits {
            self.expand_chain(ancestor, chain);
        }
        chain.push(rule);
    }

    /// Register a resource schema under (name, mode), overwriting any
    /// previous registration for that exact pair.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDefinitionError`] carrying every violation found:
    /// missing name, missing mode, missing or non-mapping `rules`, and each
    /// non-string or unregistered rule reference with its property path.
    pub fn add_resource(
        &mut self,
        definition: ResourceDefinition,
    ) -> Result<&mut Self, ResourceDefinitionError> {
        let mut violations = Vec::new();

        if definition.name.is_empty() {
            violations.push(ResourceViolation::NameMissing);
        }
        if definition.mode.is_empty() {
            violations.push(ResourceViolation::ModeMissing);
        }

        let schema = match definition.rules.as_ref() {
            raw if !is_truthy(raw) => {
                violations.push(ResourceViolation::RulesMissing);
                None
            }
            Some(raw) => match Schema::parse(raw, |name| self.rules.contains_key(name)) {
                Ok(schema) => Some(schema),
                Err(found) => {
                    violations.extend(found);
                    None
                }
            },
            None => None,
        };

        let schema = match schema {
            Some(schema) if violations.is_empty() => schema,
            _ => {
                tracing::debug!(
                    resource = %definition.name,
                    mode = %definition.mode,
                    violations = violations.len(),
                    "resource rejected"
                );
                return Err(ResourceDefinitionError { violations });
            }
        };

        tracing::debug!(
            resource = %definition.name,
            mode = %definition.mode,
            properties = schema.len(),
            "resource registered"
        );

        self.resources
            .entry(definition.name.clone())
            .or_default()
            .insert(
                definition.mode.clone(),
                Resource {
                    name: definition.name,
                    mode: definition.mode,
                    schema,
                },
            );
        Ok(self)
    }

    /// Bind a validator to a registered (resource, mode) pair.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownResource`] if no mode of `resource` is registered,
    /// [`BindError::UnknownMode`] if the resource exists without `mode`.
    pub fn bind(&self, resource: &str, mode: &str) -> Result<Validator<'_>, BindError> {
        let modes = self
            .resources
            .get(resource)
            .ok_or_else(|| BindError::UnknownResource {
                resource: resource.to_string(),
            })?;
        let bound = modes.get(mode).ok_or_else(|| BindError::UnknownMode {
            resource: resource.to_string(),
            mode: mode.to_string(),
        })?;

        tracing::debug!(resource, mode, "validator bound");
        Ok(Validator::new(self, bound))
    }

    /// Get a registered rule by name.
    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Returns true if a rule is registered under `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Return the count of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Get a registered resource by (name, mode).
    pub fn get_resource(&self, name: &str, mode: &str) -> Option<&Resource> {
        self.resources.get(name).and_then(|modes| modes.get(mode))
    }

    /// Returns true if any mode of `name` is registered.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Registered modes of a resource, sorted.
    pub fn modes(&self, name: &str) -> Vec<&str> {
        self.resources
            .get(name)
            .map(|modes| modes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Return the count of registered (resource, mode) pairs.
    pub fn resource_count(&self) -> usize {
        self.resources.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotta_core::RuleOutcome;
    use proptest::prelude::*;
    use serde_json::json;

    fn noop(name: &str) -> Rule {
        Rule::new(name, |_, _, _| RuleOutcome::Pass)
    }

    fn chain_names(registry: &Registry, name: &str) -> Vec<String> {
        registry
            .resolve_chain(name)
            .into_iter()
            .map(|r| r.name.clone())
            .collect()
    }

    #[test]
    fn rule_without_inherits_resolves_to_itself() {
        let mut registry = Registry::new();
        registry.add_rule(noop("solo")).unwrap();
        assert_eq!(chain_names(&registry, "solo"), vec!["solo"]);
    }

    #[test]
    fn chain_expands_ancestors_in_list_order() {
        let mut registry = Registry::new();
        registry
            .add_rule(noop("base"))
            .unwrap()
            .add_rule(noop("a").inherit("base"))
            .unwrap()
            .add_rule(noop("b"))
            .unwrap()
            .add_rule(noop("r").inherits(["a", "b"]))
            .unwrap();
        assert_eq!(chain_names(&registry, "r"), vec!["base", "a", "b", "r"]);
    }

    #[test]
    fn diamond_inheritance_repeats_shared_ancestor() {
        let mut registry = Registry::new();
        registry.add_rule(noop("root")).unwrap();
        registry.add_rule(noop("left").inherit("root")).unwrap();
        registry.add_rule(noop("right").inherit("root")).unwrap();
        registry
            .add_rule(noop("leaf").inherits(["left", "right"]))
            .unwrap();
        assert_eq!(
            chain_names(&registry, "leaf"),
            vec!["root", "left", "root", "right", "leaf"]
        );
    }

    #[test]
    fn unknown_rule_resolves_to_empty_chain() {
        let registry = Registry::new();
        assert!(registry.resolve_chain("ghost").is_empty());
    }

    #[test]
    fn missing_ancestors_are_all_reported_and_nothing_is_stored() {
        let mut registry = Registry::new();
        registry.add_rule(noop("known")).unwrap();

        let err = registry
            .add_rule(noop("cool-rule").inherits(["ayyy", "known", "lmao"]))
            .unwrap_err();
        assert_eq!(err.rule, "cool-rule");
        assert_eq!(
            err.messages(),
            vec![
                "Rule [ayyy] not found, add it before trying to inherit",
                "Rule [lmao] not found, add it before trying to inherit",
            ]
        );
        assert!(!registry.has_rule("cool-rule"));
        assert_eq!(registry.rule_count(), 1);
    }

    #[test]
    fn single_missing_ancestor_message() {
        let mut registry = Registry::new();
        let err = registry
            .add_rule(noop("promise-rule-with-inheritance").inherit("no-exist"))
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Rule [no-exist] not found, add it before trying to inherit"]
        );
    }

    #[test]
    fn self_inheritance_is_rejected() {
        let mut registry = Registry::new();
        registry.add_rule(noop("a")).unwrap();
        let err = registry.add_rule(noop("a").inherit("a")).unwrap_err();
        assert_eq!(err.violations, vec![RuleViolation::SelfInheritance("a".into())]);
        assert!(registry.get_rule("a").unwrap().inherits.is_empty());
    }

    #[test]
    fn overwrite_cannot_close_a_cycle() {
        let mut registry = Registry::new();
        registry.add_rule(noop("a")).unwrap();
        registry.add_rule(noop("b").inherit("a")).unwrap();

        let err = registry.add_rule(noop("a").inherit("b")).unwrap_err();
        assert_eq!(
            err.violations,
            vec![RuleViolation::Cycle {
                rule: "a".into(),
                ancestor: "b".into(),
            }]
        );
        assert_eq!(chain_names(&registry, "b"), vec!["a", "b"]);
    }

    #[test]
    fn overwritten_ancestor_is_seen_by_descendants() {
        let mut registry = Registry::new();
        registry.add_rule(noop("x")).unwrap();
        registry.add_rule(noop("base")).unwrap();
        registry.add_rule(noop("child").inherit("base")).unwrap();
        registry.add_rule(noop("base").inherit("x")).unwrap();
        assert_eq!(chain_names(&registry, "child"), vec!["x", "base", "child"]);
    }

    #[test]
    fn empty_resource_reports_three_violations() {
        let mut registry = Registry::new();
        let err = registry
            .add_resource(ResourceDefinition::default())
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Name not defined", "Mode not defined", "Rules not defined"]
        );
        assert_eq!(registry.resource_count(), 0);
    }

    #[test]
    fn non_object_rules_are_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .add_resource(ResourceDefinition::new(
                "name",
                "create",
                json!("not an object"),
            ))
            .unwrap_err();
        assert_eq!(err.messages(), vec!["Rules has to be an object!"]);
    }

    #[test]
    fn header_and_schema_violations_are_combined() {
        let mut registry = Registry::new();
        let err = registry
            .add_resource(ResourceDefinition {
                name: String::new(),
                mode: "create".into(),
                rules: Some(json!({ "tokens": { "token": "ahh" } })),
            })
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Name not defined",
                r#"Rule "ahh" for property [token] is not defined. Add it before adding a resource!"#,
            ]
        );
    }

    #[test]
    fn resources_are_keyed_by_name_and_mode() {
        let mut registry = Registry::new();
        registry
            .add_rule(noop("defined"))
            .unwrap()
            .add_rule(noop("swag"))
            .unwrap();
        registry
            .add_resource(ResourceDefinition::new(
                "user",
                "update",
                json!({ "propertyName": "swag" }),
            ))
            .unwrap()
            .add_resource(ResourceDefinition::new(
                "user",
                "create",
                json!({ "propertyName": "defined", "anotherProperty": ["swag"] }),
            ))
            .unwrap();

        assert!(registry.has_resource("user"));
        assert_eq!(registry.modes("user"), vec!["create", "update"]);
        assert_eq!(registry.resource_count(), 2);
        assert_eq!(
            registry.get_resource("user", "create").unwrap().schema.len(),
            2
        );
    }

    #[test]
    fn re_registering_a_resource_overwrites_it() {
        let mut registry = Registry::new();
        registry.add_rule(noop("r")).unwrap();
        registry
            .add_resource(ResourceDefinition::new("res", "m", json!({ "a": "r" })))
            .unwrap();
        registry
            .add_resource(ResourceDefinition::new("res", "m", json!({ "b": "r", "c": "r" })))
            .unwrap();
        assert_eq!(registry.resource_count(), 1);
        assert_eq!(registry.get_resource("res", "m").unwrap().schema.len(), 2);
    }

    #[test]
    fn bind_reports_unknown_resource_then_unknown_mode() {
        let mut registry = Registry::new();
        registry.add_rule(noop("defined")).unwrap();
        registry
            .add_resource(ResourceDefinition::new(
                "name",
                "create",
                json!({ "propertyName": "defined" }),
            ))
            .unwrap();

        assert_eq!(
            registry.bind("not-defined", "not-defined").unwrap_err(),
            BindError::UnknownResource {
                resource: "not-defined".into()
            }
        );
        assert_eq!(
            registry.bind("name", "not-defined").unwrap_err(),
            BindError::UnknownMode {
                resource: "name".into(),
                mode: "not-defined".into()
            }
        );
        assert!(registry.bind("name", "create").is_ok());
    }

    #[test]
    fn definition_deserializes_with_defaults() {
        let def: ResourceDefinition = serde_json::from_value(json!({ "name": "x" })).unwrap();
        assert_eq!(def.name, "x");
        assert!(def.mode.is_empty());
        assert!(def.rules.is_none());
    }

    #[test]
    fn null_header_fields_are_reported_as_not_defined() {
        let def: ResourceDefinition = serde_json::from_value(json!({
            "name": null,
            "mode": false,
            "rules": { "a": "r" },
        }))
        .unwrap();
        assert!(def.name.is_empty());
        assert!(def.mode.is_empty());

        let mut registry = Registry::new();
        registry.add_rule(noop("r")).unwrap();
        let err = registry.add_resource(def).unwrap_err();
        assert_eq!(err.messages(), vec!["Name not defined", "Mode not defined"]);
    }

    #[test]
    fn non_string_header_fields_read_as_text() {
        let def: ResourceDefinition =
            serde_json::from_value(json!({ "name": "user", "mode": 1 })).unwrap();
        assert_eq!(def.mode, "1");
    }

    proptest! {
        /// For any acyclic inheritance graph registered bottom-up,
        /// chain(r) == chain(a1) ++ chain(a2) ++ ... ++ [r].
        #[test]
        fn chain_is_flattened_ancestor_chains_then_self(
            graph in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                1..8,
            )
        ) {
            let mut registry = Registry::new();
            let mut inherits_of = Vec::new();

            for (i, picks) in graph.iter().enumerate() {
                let ancestors: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    picks.iter().map(|p| format!("r{}", p.index(i))).collect()
                };
                registry.add_rule(noop(&format!("r{i}")).inherits(ancestors.clone())).unwrap();
                inherits_of.push(ancestors);
            }

            for (i, ancestors) in inherits_of.iter().enumerate() {
                let mut expected = Vec::new();
                for a in ancestors {
                    expected.extend(chain_names(&registry, a));
                }
                expected.push(format!("r{i}"));
                prop_assert_eq!(chain_names(&registry, &format!("r{i}")), expected);
            }
        }
    }
}
