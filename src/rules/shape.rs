use crate::report::{Location, Severity, Violation};
use crate::view::Axis;

use super::{Rule, RuleContext};

/// Annotation tables and the matrix agree with the declared shape.
pub struct ShapeConsistency;

impl Rule for ShapeConsistency {
    fn name(&self) -> &'static str {
        "shape-consistency"
    }

    fn description(&self) -> &'static str {
        "obs/var row counts and matrix rows equal the declared (n_obs, n_var)"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(metadata) = ctx.view.metadata() else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();

        for (key, value) in [("n_obs", metadata.n_obs), ("n_var", metadata.n_var)] {
            if value.is_none() {
                violations.push(
                    self.violation(format!("metadata does not declare {}", key))
                        .at(Location::section("uns").column(key)),
                );
            }
        }

        let declared = [(Axis::Obs, metadata.n_obs), (Axis::Var, metadata.n_var)];
        for (axis, expected) in declared {
            let (Some(table), Some(expected)) = (ctx.view.table(axis), expected) else {
                continue;
            };
            let actual = table.num_rows() as u64;
            if actual != expected {
                violations.push(
                    self.violation(format!(
                        "{} table has {} rows but the declared {} is {}",
                        axis.section(),
                        actual,
                        if axis == Axis::Obs { "n_obs" } else { "n_var" },
                        expected
                    ))
                    .at(Location::section(axis.section())),
                );
            }
        }

        if let (Some(matrix), Some(n_obs)) = (ctx.view.matrix(), metadata.n_obs) {
            let actual = matrix.num_rows();
            if actual != n_obs {
                violations.push(
                    self.violation(format!(
                        "matrix has {} rows but the declared n_obs is {}",
                        actual, n_obs
                    ))
                    .at(Location::section("matrix")),
                );
            }
        }

        Ok(violations)
    }
}
