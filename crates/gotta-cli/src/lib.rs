//! # gotta-cli: Command-Line Validation
//!
//! Provides the `gotta` command-line interface over the validation engine.
//!
//! ## Subcommands
//!
//! - `gotta check`: load the resource catalog and report every
//!   registration problem.
//! - `gotta validate`: validate one JSON or YAML document against a
//!   (resource, mode) pair from the catalog.
//!
//! ```bash
//! gotta --catalog resources.yaml check
//! GOTTA_CATALOG=resources.yaml gotta validate --resource user --mode create user.json
//! ```
//!
//! Exit codes: 0 valid, 1 rejected, 2 operational error.

pub mod catalog;
pub mod validate;

use std::path::Path;

use serde::de::DeserializeOwned;

pub use catalog::{Catalog, CatalogError, RegistrationFailure, CATALOG_ENV};

/// Exit code for a valid document or a clean catalog.
pub const EXIT_VALID: u8 = 0;
/// Exit code for a rejected document or a catalog with rejected resources.
pub const EXIT_REJECTED: u8 = 1;
/// Exit code for an operational error.
pub const EXIT_ERROR: u8 = 2;

/// Read a YAML or JSON file, chosen by extension. Anything other than
/// `.yaml` / `.yml` is parsed as JSON.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    } else {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    };

    parsed.map_err(|reason| CatalogError::Parse {
        path: path.display().to_string(),
        reason,
    })
}
