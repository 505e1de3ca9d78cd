use crate::report::{Location, Severity, Violation};
use crate::schema::{CAPMAT_MIMETYPE, ENTRY_METADATA};
use crate::view::{Axis, MimetypeStatus};

use super::{Rule, RuleContext};

/// All bundle sections exist and the container framing is well-formed.
///
/// This rule runs first: it is the single owner of "section missing"
/// violations, so later rules can silently skip absent sections without
/// double-reporting.
pub struct ContainerStructure;

impl Rule for ContainerStructure {
    fn name(&self) -> &'static str {
        "container-structure"
    }

    fn description(&self) -> &'static str {
        "bundle carries matrix, obs, var, metadata.json and a valid mimetype entry"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let mut violations = Vec::new();
        let view = ctx.view;

        match view.mimetype() {
            MimetypeStatus::Valid | MimetypeStatus::NotApplicable => {}
            MimetypeStatus::Missing => {
                violations.push(self.violation("container has no 'mimetype' entry"));
            }
            MimetypeStatus::Mismatch(found) => {
                violations.push(self.violation(format!(
                    "mimetype entry is '{}', expected '{}'",
                    found, CAPMAT_MIMETYPE
                )));
            }
            MimetypeStatus::NotFirst => {
                violations
                    .push(self.violation("mimetype must be the first entry of the container"));
            }
            MimetypeStatus::NotStored => {
                violations.push(self.violation("mimetype entry must be Stored (uncompressed)"));
            }
        }

        if view.metadata().is_none() {
            violations.push(
                self.violation(format!("bundle has no {} entry", ENTRY_METADATA))
                    .at(Location::section("uns")),
            );
        }
        if view.matrix().is_none() {
            violations.push(
                self.violation("bundle has no expression matrix table")
                    .at(Location::section("matrix")),
            );
        }
        for axis in [Axis::Obs, Axis::Var] {
            if view.table(axis).is_none() {
                violations.push(
                    self.violation(format!(
                        "bundle has no {} annotation table ({})",
                        axis.section(),
                        axis.entry()
                    ))
                    .at(Location::section(axis.section())),
                );
            }
        }

        Ok(violations)
    }
}
