//! # gotta-engine: Declarative Object Validation
//!
//! Callers register named rules and named, mode-scoped resources on a
//! [`Registry`], bind a [`Validator`] to a (resource, mode) pair, and
//! validate `serde_json::Value` objects against it.
//!
//! ```text
//! add_rule ──► add_resource ──► bind(resource, mode) ──► validate(object)
//!                                                          │
//!                           traverse::plan ◄───────────────┘
//!                                 │  ordered invocations
//!                                 ▼
//!                       dispatch every rule eagerly
//!                                 │  one slot per invocation
//!                                 ▼
//!                   PendingValidation.await ──► Ok(()) | Err(ValidationError)
//! ```
//!
//! ## Ordering
//!
//! Error messages are reported in depth-first, pre-order, left-to-right
//! schema order, with each rule's ancestors ahead of the rule itself. The
//! order is fixed when slots are allocated during traversal; asynchronous
//! rules may settle in any order without affecting it.
//!
//! ## Registration Discipline
//!
//! Registration takes `&mut Registry` and a [`Validator`] borrows the
//! registry, so registering while a validator is alive does not compile.
//! A [`PendingValidation`] owns everything it needs and may outlive both.
//!
//! ## Crate Policy
//!
//! - Depends only on `gotta-core` internally.
//! - No process-wide state: every registry is an explicit, caller-owned value.

pub mod registry;
pub mod traverse;
pub mod validator;

pub use registry::{Registry, Resource, ResourceDefinition};
pub use traverse::Invocation;
pub use validator::{PendingValidation, Validator};

pub use gotta_core::{
    AggregationError, AsyncFailure, BindError, Dependencies, ErrorMessages, InvalidInputError,
    ResourceDefinitionError, Rule, RuleDefinitionError, RuleOutcome, Schema, SchemaEntry,
    ValidationError,
};
