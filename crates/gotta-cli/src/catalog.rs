//! # Resource Catalog
//!
//! A catalog file declares the resources a `gotta` invocation validates
//! against, in YAML or JSON:
//!
//! ```yaml
//! default_rules: true   # install the built-in rules first (default)
//! resources:
//!   - name: user
//!     mode: create
//!     rules:
//!       email: [required, email]
//!       password: [required, password]
//! ```
//!
//! The catalog path comes from `--catalog` or, failing that, the
//! `GOTTA_CATALOG` environment variable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gotta_core::ResourceDefinitionError;
use gotta_engine::{Registry, ResourceDefinition};
use gotta_rules::DefaultRulesError;

/// Environment variable naming the catalog file.
pub const CATALOG_ENV: &str = "GOTTA_CATALOG";

/// Resource catalog as loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Install the built-in rules before registering resources.
    #[serde(default = "default_true")]
    pub default_rules: bool,
    /// Resource definitions, registered in order.
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            default_rules: true,
            resources: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One catalog resource the registry refused.
#[derive(Debug)]
pub struct RegistrationFailure {
    /// Position in the catalog's `resources` list.
    pub index: usize,
    pub name: String,
    pub mode: String,
    pub error: ResourceDefinitionError,
}

impl RegistrationFailure {
    /// Human-readable label, falling back to the list position when the
    /// definition has no name.
    pub fn label(&self) -> String {
        match (self.name.is_empty(), self.mode.is_empty()) {
            (false, false) => format!("{}/{}", self.name, self.mode),
            (false, true) => self.name.clone(),
            _ => format!("resources[{}]", self.index),
        }
    }
}

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no catalog given: pass --catalog or set GOTTA_CATALOG")]
    MissingPath,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error(transparent)]
    DefaultRules(#[from] DefaultRulesError),

    #[error("{} catalog resource(s) rejected", .0.len())]
    Registration(Vec<RegistrationFailure>),
}

impl Catalog {
    /// Resolve the catalog path from an explicit argument or the
    /// environment.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, CatalogError> {
        locate_with(explicit, std::env::var_os(CATALOG_ENV))
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog: Self = crate::load_file(path)?;
        tracing::debug!(
            path = %path.display(),
            resources = catalog.resources.len(),
            default_rules = catalog.default_rules,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a registry holding every catalog resource.
    ///
    /// Every resource is attempted; the error lists all that were refused.
    pub fn build_registry(&self) -> Result<Registry, CatalogError> {
        let mut registry = Registry::new();
        if self.default_rules {
            gotta_rules::install_default_rules(&mut registry)?;
        }

        let mut failures = Vec::new();
        for (index, definition) in self.resources.iter().enumerate() {
            if let Err(error) = registry.add_resource(definition.clone()) {
                tracing::warn!(
                    index,
                    resource = %definition.name,
                    mode = %definition.mode,
                    violations = error.violations.len(),
                    "catalog resource rejected"
                );
                failures.push(RegistrationFailure {
                    index,
                    name: definition.name.clone(),
                    mode: definition.mode.clone(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(registry)
        } else {
            Err(CatalogError::Registration(failures))
        }
    }
}

fn locate_with(explicit: Option<&Path>, env: Option<OsString>) -> Result<PathBuf, CatalogError> {
    match (explicit, env) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(value)) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(CatalogError::MissingPath),
    }
}
