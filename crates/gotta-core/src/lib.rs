//! # gotta-core: Foundational Types for the Validation Engine
//!
//! This crate defines the data model shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed rule outcomes.** A rule returns [`RuleOutcome::Pass`],
//!    [`RuleOutcome::Fail`] or [`RuleOutcome::Pending`]. The engine never
//!    inspects the runtime shape of a return value to decide whether it is
//!    asynchronous.
//!
//! 2. **Tagged schema entries.** A schema property maps to either a
//!    [`SchemaEntry::Leaf`] (ordered rule names) or a
//!    [`SchemaEntry::Nested`] sub-schema. Raw JSON/YAML trees are parsed into
//!    this form once, at registration time, collecting every problem found.
//!
//! 3. **Complete error reports.** Definition errors carry the full list of
//!    violations, never just the first one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `gotta-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod rule;
pub mod schema;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{
    AggregationError, BindError, ErrorMessages, InvalidInputError, ResourceDefinitionError,
    ResourceViolation, RuleDefinitionError, RuleViolation, ValidationError,
};
pub use rule::{AsyncFailure, BoxError, Dependencies, Rule, RuleFn, RuleFuture, RuleOutcome};
pub use schema::{Schema, SchemaEntry};
pub use value::{is_truthy, text_of};
