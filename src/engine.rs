//! # Validation Engine
//!
//! Runs every registered rule against one dataset bundle and aggregates
//! the results into a single frozen [`ValidationReport`].
//!
//! The engine owns exactly one [`DatasetView`] per run and drops it on
//! every control path. Rules execute sequentially in registry order: their
//! results are order-independent, and sequential execution keeps peak
//! memory at one rule's working set plus one matrix chunk. Runs over
//! different files may proceed in parallel; the only shared state is the
//! read-only catalog mapping.
//!
//! Failure classes stay disjoint:
//! - an unreadable bundle aborts the run with [`ValidatorError`] before a
//!   report exists;
//! - schema violations are collected and never abort: every rule runs
//!   even when earlier rules found errors, so one corrective pass by the
//!   uploader reveals every problem;
//! - an unexpected internal failure inside one rule becomes a single
//!   diagnostic violation naming that rule, and the other rules still run.

use std::path::Path;

use log::{debug, warn};

use crate::catalog::{CatalogError, Organism, ReferenceCatalogs};
use crate::report::{Severity, ValidationReport, Violation};
use crate::rules::{Registry, RuleContext};
use crate::view::{DatasetView, ViewError};

/// Fatal run failures, distinct from any schema violation
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The bundle could not be opened or is structurally corrupt
    #[error("unreadable dataset: {0}")]
    Unreadable(#[from] ViewError),

    /// A reference catalog could not be provided
    #[error("reference catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
}

/// Per-run engine configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Matrix rows per chunk during streaming scans
    pub chunk_rows: usize,
    /// Matrix rows sampled by the raw-counts check
    pub count_check_rows: usize,
    /// Organism override; when set, the declared organism is ignored
    pub organism: Option<Organism>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            chunk_rows: 4096,
            count_check_rows: 100,
            organism: None,
        }
    }
}

/// Validation engine bound to one rule registry and one catalog mapping
///
/// The catalogs are borrowed read-only for the engine's lifetime, so any
/// number of engines (and runs) can share one process-wide catalog load.
pub struct Validator<'c> {
    registry: Registry,
    catalogs: &'c ReferenceCatalogs,
    config: ValidatorConfig,
}

impl<'c> Validator<'c> {
    /// Engine with the standard registry and default configuration.
    pub fn new(catalogs: &'c ReferenceCatalogs) -> Self {
        Self::with_config(catalogs, ValidatorConfig::default())
    }

    /// Engine with the standard registry and an explicit configuration.
    pub fn with_config(catalogs: &'c ReferenceCatalogs, config: ValidatorConfig) -> Self {
        Self {
            registry: Registry::standard(),
            catalogs,
            config,
        }
    }

    /// Replace the rule registry (schema variants, tests).
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// The registry this engine executes.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate one bundle and return the complete report.
    ///
    /// Fails only for fatal run failures (unreadable bundle); schema
    /// violations always come back inside the report.
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Result<ValidationReport, ValidatorError> {
        let path = path.as_ref();
        debug!("begin validation of {}", path.display());

        let view = DatasetView::open(path)?;
        let mut report = ValidationReport::new(view.source());
        let ctx = RuleContext {
            view: &view,
            catalogs: self.catalogs,
            config: &self.config,
        };

        for rule in self.registry.rules() {
            debug!("running rule {}", rule.name());
            match rule.check(&ctx) {
                Ok(violations) => report.extend(violations),
                Err(e) => {
                    // One broken rule must not hide the findings of the rest.
                    warn!("rule {} failed internally: {:#}", rule.name(), e);
                    report.push(Violation::new(
                        rule.name(),
                        Severity::Error,
                        format!("internal failure in rule '{}': {:#}", rule.name(), e),
                    ));
                }
            }
        }

        debug!(
            "finished validation of {}: {} error(s), {} warning(s)",
            path.display(),
            report.error_count(),
            report.warning_count()
        );
        Ok(report)
    }
}
