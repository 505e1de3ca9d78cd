//! # Upload Schema Rules
//!
//! Every upload requirement is one [`Rule`]: an independent, reentrant
//! check from a read-only dataset view (plus the reference catalogs) to
//! zero or more [`Violation`]s. Rules never mutate shared state and never
//! see each other's results; expected malformation comes back as
//! violations, and an `Err` is reserved for genuinely unexpected internal
//! failures (the engine converts those into a single diagnostic violation
//! rather than aborting the run).
//!
//! The [`Registry`] is the authoritative, ordered enumeration of the
//! schema. Adding or removing a rule changes the schema; the engine never
//! does.

mod annotations;
mod dtypes;
mod genes;
mod matrix;
mod shape;
mod structure;
mod uniqueness;
mod version;

pub use annotations::{ObsRequiredValues, RequiredObsColumns, RequiredUnsKeys};
pub use dtypes::FieldDtypes;
pub use genes::{GeneCatalog, GeneVersionSuffix, OrganismColumn};
pub use matrix::{MatrixCounts, MatrixEmptySlices};
pub use shape::ShapeConsistency;
pub use structure::ContainerStructure;
pub use uniqueness::IndexUnique;
pub use version::FormatVersion;

use crate::catalog::{Organism, ReferenceCatalogs};
use crate::engine::ValidatorConfig;
use crate::report::{Severity, Violation};
use crate::view::DatasetView;

/// Everything a rule may look at during one check
///
/// The view and catalogs are shared read-only; nothing here lets a rule
/// mutate state another rule could observe.
pub struct RuleContext<'a> {
    /// Accessor over the file under validation
    pub view: &'a DatasetView,
    /// Reference catalogs, one per supported organism
    pub catalogs: &'a ReferenceCatalogs,
    /// Run configuration (chunk size, organism override, sample depth)
    pub config: &'a ValidatorConfig,
}

impl RuleContext<'_> {
    /// Declared organism string: the run override wins, otherwise the
    /// non-blank `organism` key of the metadata block.
    pub fn declared_organism_str(&self) -> Option<&str> {
        if let Some(organism) = self.config.organism {
            return Some(organism.name());
        }
        self.view.metadata()?.required_key("organism")
    }

    /// Declared organism resolved against the supported enumeration.
    pub fn declared_organism(&self) -> Option<Organism> {
        if let Some(organism) = self.config.organism {
            return Some(organism);
        }
        Organism::parse(self.declared_organism_str()?)
    }
}

/// One independent upload requirement
pub trait Rule: Send + Sync {
    /// Unique rule name (kebab-case, stable across releases).
    fn name(&self) -> &'static str;

    /// One-line human description of the requirement.
    fn description(&self) -> &'static str;

    /// Severity every violation of this rule carries.
    fn severity(&self) -> Severity;

    /// Run the check. Violations describe expected malformation; `Err` is
    /// an internal failure and is isolated by the engine.
    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>>;

    /// Build a violation attributed to this rule.
    fn violation(&self, message: impl Into<String>) -> Violation
    where
        Self: Sized,
    {
        Violation::new(self.name(), self.severity(), message)
    }
}

/// Ordered, named collection of the rules constituting the upload schema
pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
}

impl Registry {
    /// The shipped CAP upload schema, in execution order.
    pub fn standard() -> Self {
        Self::from_rules(vec![
            Box::new(ContainerStructure),
            Box::new(RequiredUnsKeys),
            Box::new(RequiredObsColumns),
            Box::new(ObsRequiredValues),
            Box::new(IndexUnique::obs()),
            Box::new(IndexUnique::var()),
            Box::new(FieldDtypes),
            Box::new(ShapeConsistency),
            Box::new(OrganismColumn),
            Box::new(GeneCatalog),
            Box::new(GeneVersionSuffix),
            Box::new(MatrixCounts),
            Box::new(MatrixEmptySlices),
            Box::new(FormatVersion),
        ])
    }

    /// Build a registry from an explicit rule list (schema variants, tests).
    pub fn from_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Rules in execution order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the registry holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_names_are_unique_and_ordered() {
        let registry = Registry::standard();
        assert_eq!(registry.len(), 14);

        let names: Vec<&str> = registry.rules().iter().map(|r| r.name()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len(), "duplicate rule name");

        // Structure runs first so later rules can skip missing sections.
        assert_eq!(names[0], "container-structure");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = Registry::standard();
        let rule = registry.get("var-genes-known").unwrap();
        assert_eq!(rule.severity(), Severity::Error);
        assert!(registry.get("no-such-rule").is_none());
    }
}
