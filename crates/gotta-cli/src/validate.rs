//! # Validate and Check Subcommands
//!
//! `check` loads the catalog and reports every resource the registry
//! refuses. `validate` additionally loads one document and reports the
//! messages produced by the bound validator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use gotta_core::ValidationError;

use crate::catalog::{Catalog, CatalogError};
use crate::{EXIT_REJECTED, EXIT_VALID};

/// Arguments for the `gotta validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resource name registered in the catalog.
    #[arg(long)]
    pub resource: String,

    /// Resource mode, e.g. `create` or `update`.
    #[arg(long)]
    pub mode: String,

    /// JSON or YAML document to validate.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the document is valid, 1 when it is rejected.
/// Catalog, document, binding and rule failures are returned as errors.
pub async fn run_validate(args: &ValidateArgs, catalog_path: &Path) -> Result<u8> {
    let catalog = Catalog::load(catalog_path).context("failed to load catalog")?;
    let registry = match catalog.build_registry() {
        Ok(registry) => registry,
        Err(CatalogError::Registration(failures)) => {
            print_failures(&failures);
            anyhow::bail!("catalog has {} rejected resource(s)", failures.len());
        }
        Err(e) => return Err(e).context("failed to build registry"),
    };

    let document: Value = crate::load_file(&args.document).context("failed to load document")?;
    let validator = registry
        .bind(&args.resource, &args.mode)
        .context("failed to bind validator")?;
    let pending = validator
        .validate(&document)
        .with_context(|| format!("cannot validate {}", args.document.display()))?;

    tracing::info!(
        resource = %args.resource,
        mode = %args.mode,
        invocations = pending.invocation_count(),
        "validating document"
    );

    match pending.await {
        Ok(()) => {
            println!(
                "OK: {} is a valid {}/{}",
                args.document.display(),
                args.resource,
                args.mode
            );
            Ok(EXIT_VALID)
        }
        Err(ValidationError::Rejected(messages)) => {
            println!(
                "FAIL: {} is not a valid {}/{} ({} problem(s))",
                args.document.display(),
                args.resource,
                args.mode,
                messages.len()
            );
            println!("{messages}");
            Ok(EXIT_REJECTED)
        }
        Err(e) => Err(e).context("a rule failed while validating"),
    }
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when every catalog resource registers, 1 otherwise.
pub fn run_check(catalog_path: &Path) -> Result<u8> {
    let catalog = Catalog::load(catalog_path).context("failed to load catalog")?;
    match catalog.build_registry() {
        Ok(registry) => {
            println!(
                "OK: {} resource(s), {} rule(s)",
                registry.resource_count(),
                registry.rule_count()
            );
            Ok(EXIT_VALID)
        }
        Err(CatalogError::Registration(failures)) => {
            print_failures(&failures);
            println!(
                "\n{} of {} resource(s) rejected.",
                failures.len(),
                catalog.resources.len()
            );
            Ok(EXIT_REJECTED)
        }
        Err(e) => Err(e).context("failed to build registry"),
    }
}

fn print_failures(failures: &[crate::RegistrationFailure]) {
    for failure in failures {
        println!("  FAIL: {}", failure.label());
        for message in failure.error.messages() {
            println!("    - {message}");
        }
    }
}
