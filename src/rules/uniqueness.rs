use std::collections::{HashMap, HashSet};

use crate::report::{Location, Severity, Violation};
use crate::view::{string_at, Axis};

use super::genes::strip_gene_version;
use super::{Rule, RuleContext};

/// Index values are unique within their axis.
///
/// One instance per axis; the var instance compares identifiers with
/// Ensembl version suffixes stripped, so `ENSG...1.2` and `ENSG...1.7`
/// collide the way they would after catalog matching.
pub struct IndexUnique {
    axis: Axis,
}

impl IndexUnique {
    /// Uniqueness over the observation index.
    pub fn obs() -> Self {
        Self { axis: Axis::Obs }
    }

    /// Uniqueness over the feature index.
    pub fn var() -> Self {
        Self { axis: Axis::Var }
    }

    fn normalize<'a>(&self, value: &'a str) -> &'a str {
        match self.axis {
            Axis::Obs => value,
            Axis::Var => strip_gene_version(value),
        }
    }
}

impl Rule for IndexUnique {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::Obs => "obs-index-unique",
            Axis::Var => "var-index-unique",
        }
    }

    fn description(&self) -> &'static str {
        match self.axis {
            Axis::Obs => "observation index values are unique",
            Axis::Var => "gene identifiers are unique after version stripping",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(table) = ctx.view.table(self.axis) else {
            return Ok(Vec::new());
        };
        let section = self.axis.section();
        let column_name = self.axis.index_column();

        let Some(index) = table.index() else {
            return Ok(vec![self
                .violation(format!("{} has no '{}' index column", section, column_name))
                .at(Location::section(section).column(column_name))]);
        };

        let mut first_seen: HashMap<String, u64> = HashMap::new();
        let mut reported: HashSet<String> = HashSet::new();
        let mut violations = Vec::new();
        let mut blank = 0usize;
        let mut first_blank = None;

        for row in 0..table.num_rows() {
            let row_index = row as u64;
            let Some(raw) = string_at(index.as_ref(), row) else {
                blank += 1;
                first_blank.get_or_insert(row_index);
                continue;
            };
            let value = self.normalize(raw.trim());
            if value.is_empty() {
                blank += 1;
                first_blank.get_or_insert(row_index);
                continue;
            }

            match first_seen.get(value).copied() {
                None => {
                    first_seen.insert(value.to_string(), row_index);
                }
                Some(first_row) => {
                    // Exactly one violation per duplicated value, emitted at
                    // its first repetition to keep row order deterministic.
                    if reported.insert(value.to_string()) {
                        violations.push(
                            self.violation(format!(
                                "duplicate {} index value '{}' (rows {} and {})",
                                section, value, first_row, row_index
                            ))
                            .at(Location::section(section).column(column_name).row(row_index)),
                        );
                    }
                }
            }
        }

        if let Some(first) = first_blank {
            violations.push(
                self.violation(format!(
                    "{} index has {} blank value(s), first at row {}",
                    section, blank, first
                ))
                .at(Location::section(section).column(column_name).row(first)),
            );
        }

        Ok(violations)
    }
}
