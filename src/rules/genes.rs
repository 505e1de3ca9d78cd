use std::collections::HashSet;

use crate::catalog::Organism;
use crate::report::{Location, Severity, Violation};
use crate::schema::columns;
use crate::view::string_at;

use super::{Rule, RuleContext};

/// Strip an Ensembl version suffix: `ENSG0001.8` becomes `ENSG0001`.
pub(crate) fn strip_gene_version(id: &str) -> &str {
    id.split_once('.').map_or(id, |(base, _)| base)
}

/// Every obs organism value agrees with the declared organism.
pub struct OrganismColumn;

impl Rule for OrganismColumn {
    fn name(&self) -> &'static str {
        "organism-column"
    }

    fn description(&self) -> &'static str {
        "obs organism annotations match the declared organism"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(declared) = ctx.declared_organism_str() else {
            return Ok(Vec::new());
        };
        let Some(obs) = ctx.view.obs() else {
            return Ok(Vec::new());
        };
        let Some(column) = obs.column(columns::ORGANISM) else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        let mut reported: HashSet<String> = HashSet::new();

        for row in 0..obs.num_rows() {
            let Some(value) = string_at(column.as_ref(), row) else {
                continue; // blanks reported by obs-required-values
            };
            let value = value.trim();
            if value.is_empty() || value == declared {
                continue;
            }
            // One violation per distinct disagreeing value, in row order.
            if reported.insert(value.to_string()) {
                violations.push(
                    self.violation(format!(
                        "obs organism value '{}' (first at row {}) differs from declared organism '{}'",
                        value, row, declared
                    ))
                    .at(Location::section("obs").column(columns::ORGANISM).row(row as u64)),
                );
            }
        }

        Ok(violations)
    }
}

/// Every gene identifier is present in the declared organism's catalog.
///
/// The organism declaration is validated against the supported enumeration
/// first; an unsupported organism short-circuits the membership scan into
/// exactly one violation instead of one per gene.
pub struct GeneCatalog;

impl Rule for GeneCatalog {
    fn name(&self) -> &'static str {
        "var-genes-known"
    }

    fn description(&self) -> &'static str {
        "gene identifiers exist in the declared organism's Ensembl catalog"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(var) = ctx.view.var() else {
            return Ok(Vec::new());
        };
        let Some(index) = var.index() else {
            return Ok(Vec::new()); // missing index reported by var-index-unique
        };

        // Short-circuit on an undeclarable organism: absence is reported by
        // uns-required-keys, an unsupported name is reported exactly once
        // here, and in neither case do we emit per-gene violations.
        let Some(declared) = ctx.declared_organism_str() else {
            return Ok(Vec::new());
        };
        let Some(organism) = ctx.declared_organism() else {
            let supported = Organism::ALL.map(|o| o.name()).join(", ");
            return Ok(vec![self
                .violation(format!(
                    "declared organism '{}' is not supported (expected one of: {}); gene identifier check skipped",
                    declared, supported
                ))
                .at(Location::section("uns").column(columns::ORGANISM))]);
        };

        let catalog = ctx.catalogs.get(organism);
        let mut violations = Vec::new();

        for row in 0..var.num_rows() {
            let Some(id) = string_at(index.as_ref(), row) else {
                continue; // blanks reported by var-index-unique
            };
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            if !catalog.contains(strip_gene_version(id)) {
                violations.push(
                    self.violation(format!(
                        "gene identifier '{}' is not a known {} Ensembl id",
                        id, organism
                    ))
                    .at(Location::section("var").column(columns::VAR_ID).row(row as u64)),
                );
            }
        }

        Ok(violations)
    }
}

/// Gene identifiers should not carry Ensembl version suffixes.
///
/// Matching elsewhere strips versions, so this is a warning, not an error.
pub struct GeneVersionSuffix;

impl Rule for GeneVersionSuffix {
    fn name(&self) -> &'static str {
        "var-gene-versions"
    }

    fn description(&self) -> &'static str {
        "gene identifiers are unversioned"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(var) = ctx.view.var() else {
            return Ok(Vec::new());
        };
        let Some(index) = var.index() else {
            return Ok(Vec::new());
        };

        let mut versioned = 0usize;
        let mut first: Option<(u64, String)> = None;

        for row in 0..var.num_rows() {
            let Some(id) = string_at(index.as_ref(), row) else {
                continue;
            };
            let id = id.trim();
            if !id.is_empty() && strip_gene_version(id) != id {
                versioned += 1;
                if first.is_none() {
                    first = Some((row as u64, id.to_string()));
                }
            }
        }

        let Some((row, example)) = first else {
            return Ok(Vec::new());
        };
        Ok(vec![self
            .violation(format!(
                "{} gene identifier(s) carry version suffixes (e.g. '{}'); identifiers are matched with versions stripped",
                versioned, example
            ))
            .at(Location::section("var").column(columns::VAR_ID).row(row))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_gene_version() {
        assert_eq!(strip_gene_version("ENSG00000141510.11"), "ENSG00000141510");
        assert_eq!(strip_gene_version("ENSG00000141510"), "ENSG00000141510");
        assert_eq!(strip_gene_version(""), "");
    }
}
