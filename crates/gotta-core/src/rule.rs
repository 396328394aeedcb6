//! # Rule Definitions
//!
//! A rule is a named predicate over one property value. Rules may declare
//! ancestors (`inherits`) that run before them, and may carry opaque
//! [`Dependencies`] that are handed to the predicate unchanged on every
//! invocation.
//!
//! ## Outcome Contract
//!
//! The predicate returns a [`RuleOutcome`]:
//!
//! - [`RuleOutcome::Pass`]: nothing recorded.
//! - [`RuleOutcome::Fail`]: recorded as `"[property] message"`.
//! - [`RuleOutcome::Pending`]: a future resolving to `None` (pass) or an
//!   [`AsyncFailure`] naming the property and message to record. A future
//!   that resolves to `Err` is a misbehaving rule, not a validation failure.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boxed error returned by a rejected asynchronous rule.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future handed back by an asynchronous rule.
pub type RuleFuture = BoxFuture<'static, Result<Option<AsyncFailure>, BoxError>>;

/// Predicate signature: `(property_name, value, dependencies)`.
pub type RuleFn =
    Arc<dyn Fn(&str, Option<&Value>, Option<&Dependencies>) -> RuleOutcome + Send + Sync>;

/// Result of invoking a rule predicate once.
pub enum RuleOutcome {
    /// The value satisfied the rule.
    Pass,
    /// Synchronous failure with a message (without the property prefix).
    Fail(String),
    /// Asynchronous verdict, settled later.
    Pending(RuleFuture),
}

impl RuleOutcome {
    /// Synchronous failure.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Box an asynchronous verdict.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<AsyncFailure>, BoxError>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }
}

impl From<Option<String>> for RuleOutcome {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(m) => Self::Fail(m),
            None => Self::Pass,
        }
    }
}

impl From<Option<&str>> for RuleOutcome {
    fn from(message: Option<&str>) -> Self {
        message.map(String::from).into()
    }
}

impl fmt::Debug for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Pass"),
            Self::Fail(m) => f.debug_tuple("Fail").field(m).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Error record produced by a settled asynchronous rule.
///
/// Both fields are optional on the wire so that a malformed record can be
/// detected and reported instead of silently dropped. Empty strings count
/// as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncFailure {
    /// Property the message is reported against.
    #[serde(default)]
    pub property: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

impl AsyncFailure {
    /// A complete failure record.
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            message: Some(message.into()),
        }
    }

    /// Names of required fields that are absent or empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.property.as_deref().map_or(true, str::is_empty) {
            missing.push("property");
        }
        if self.message.as_deref().map_or(true, str::is_empty) {
            missing.push("message");
        }
        missing
    }

    /// `"[property] message"`, or `None` if either field is missing.
    pub fn render(&self) -> Option<String> {
        match (self.property.as_deref(), self.message.as_deref()) {
            (Some(p), Some(m)) if !p.is_empty() && !m.is_empty() => Some(format!("[{p}] {m}")),
            _ => None,
        }
    }
}

/// Opaque collaborators injected into a rule predicate.
#[derive(Clone)]
pub struct Dependencies(Arc<dyn Any + Send + Sync>);

impl Dependencies {
    /// Wrap any shareable value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it is a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dependencies(..)")
    }
}

/// A named, reusable validation rule.
#[derive(Clone)]
pub struct Rule {
    /// Registry key.
    pub name: String,
    /// The predicate.
    pub func: RuleFn,
    /// Ancestor rule names, evaluated in order before `func`.
    pub inherits: Vec<String>,
    /// Passed to `func` unchanged.
    pub dependencies: Option<Dependencies>,
}

impl Rule {
    /// Create a rule with no ancestors and no dependencies.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, Option<&Value>, Option<&Dependencies>) -> RuleOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            inherits: Vec::new(),
            dependencies: None,
        }
    }

    /// Append a single ancestor.
    pub fn inherit(mut self, ancestor: impl Into<String>) -> Self {
        self.inherits.push(ancestor.into());
        self
    }

    /// Append an ordered list of ancestors.
    pub fn inherits<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherits.extend(ancestors.into_iter().map(Into::into));
        self
    }

    /// Attach dependencies passed to every invocation.
    pub fn with_dependencies<T: Any + Send + Sync>(mut self, dependencies: T) -> Self {
        self.dependencies = Some(Dependencies::new(dependencies));
        self
    }

    /// Call the predicate for one property value.
    pub fn invoke(&self, property: &str, value: Option<&Value>) -> RuleOutcome {
        (self.func)(property, value, self.dependencies.as_ref())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("inherits", &self.inherits)
            .field("dependencies", &self.dependencies.is_some())
            .finish_non_exhaustive()
    }
}
