use crate::report::{Location, Severity, Violation};
use crate::schema::CAPMAT_FORMAT_VERSION;

use super::{Rule, RuleContext};

/// The metadata block declares the expected bundle format version.
pub struct FormatVersion;

impl Rule for FormatVersion {
    fn name(&self) -> &'static str {
        "format-version"
    }

    fn description(&self) -> &'static str {
        "metadata declares the current bundle format version"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(metadata) = ctx.view.metadata() else {
            return Ok(Vec::new());
        };

        let violation = match metadata.required_key("format_version") {
            None => self
                .violation("metadata does not declare format_version")
                .at(Location::section("uns").column("format_version")),
            Some(version) if version != CAPMAT_FORMAT_VERSION => self
                .violation(format!(
                    "format version is {}, expected {}",
                    version, CAPMAT_FORMAT_VERSION
                ))
                .at(Location::section("uns").column("format_version")),
            Some(_) => return Ok(Vec::new()),
        };
        Ok(vec![violation])
    }
}
