use crate::report::{Location, Severity, Violation};
use crate::schema::{REQUIRED_OBS_COLUMNS, REQUIRED_UNS_KEYS};
use crate::view::{is_categorical, is_string_like, string_at};

use super::{Rule, RuleContext};

/// Mandatory unstructured metadata keys are present and non-blank.
pub struct RequiredUnsKeys;

impl Rule for RequiredUnsKeys {
    fn name(&self) -> &'static str {
        "uns-required-keys"
    }

    fn description(&self) -> &'static str {
        "metadata block declares a non-blank title and organism"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(metadata) = ctx.view.metadata() else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        for key in REQUIRED_UNS_KEYS {
            if metadata.required_key(key).is_none() {
                violations.push(
                    self.violation(format!("required metadata key '{}' is missing or blank", key))
                        .at(Location::section("uns").column(key)),
                );
            }
        }
        Ok(violations)
    }
}

/// Mandatory observation annotation columns are present.
pub struct RequiredObsColumns;

impl Rule for RequiredObsColumns {
    fn name(&self) -> &'static str {
        "obs-required-columns"
    }

    fn description(&self) -> &'static str {
        "obs carries the assay, disease, organism and tissue columns"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(obs) = ctx.view.obs() else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        for column in REQUIRED_OBS_COLUMNS {
            if !obs.has_column(column) {
                violations.push(
                    self.violation(format!("required obs column '{}' is missing", column))
                        .at(Location::section("obs").column(column)),
                );
            }
        }
        Ok(violations)
    }
}

/// Mandatory observation annotations carry no blank values.
///
/// Blank means null or empty after trimming, matching the upstream
/// whitespace-to-missing normalization.
pub struct ObsRequiredValues;

impl Rule for ObsRequiredValues {
    fn name(&self) -> &'static str {
        "obs-required-values"
    }

    fn description(&self) -> &'static str {
        "required obs columns contain a value for every observation"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(obs) = ctx.view.obs() else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        for column_name in REQUIRED_OBS_COLUMNS {
            let Some(column) = obs.column(column_name) else {
                continue; // absence reported by obs-required-columns
            };
            let data_type = column.data_type();
            if !is_string_like(data_type) && !is_categorical(data_type) {
                continue; // wrong type reported by field-dtypes
            }

            let mut blank = 0usize;
            let mut first_row = None;
            for row in 0..obs.num_rows() {
                let is_blank = string_at(column.as_ref(), row)
                    .map_or(true, |value| value.trim().is_empty());
                if is_blank {
                    blank += 1;
                    first_row.get_or_insert(row as u64);
                }
            }

            if let Some(first) = first_row {
                violations.push(
                    self.violation(format!(
                        "obs column '{}' has {} blank value(s), first at row {}",
                        column_name, blank, first
                    ))
                    .at(Location::section("obs").column(column_name).row(first)),
                );
            }
        }
        Ok(violations)
    }
}
