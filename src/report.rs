//! # Validation Report
//!
//! The final data product of a validation run: an ordered list of
//! [`Violation`]s plus the derived pass/fail verdict. A report is built by
//! the engine while rules execute and is frozen once returned; callers can
//! only read it, render it as text, or serialize it to JSON.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[cfg(feature = "colorized_output")]
use console::style;

/// Severity of a single violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the upload; the file is rejected
    Error,
    /// Worth fixing but does not block the upload
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Position of a violation within the dataset bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Bundle section ("matrix", "obs", "var", "uns")
    pub section: String,
    /// Column within the section, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Zero-based row index within the section, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
}

impl Location {
    /// Location naming a whole section.
    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            column: None,
            row: None,
        }
    }

    /// Narrow the location to one column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Narrow the location to one row.
    pub fn row(mut self, row: u64) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section)?;
        if let Some(column) = &self.column {
            write!(f, ".{}", column)?;
        }
        if let Some(row) = self.row {
            write!(f, "[{}]", row)?;
        }
        Ok(())
    }
}

/// A single detected deviation from the upload schema
///
/// Every violation is attributable to exactly one rule; the engine never
/// merges or rewrites violations after a rule returns them.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Name of the rule that produced this violation
    pub rule: String,
    /// Severity inherited from the rule
    pub severity: Severity,
    /// Human-readable description, naming the offending field/value
    pub message: String,
    /// Position within the file, when the rule can pin one down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Violation {
    /// Create a violation for the named rule.
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a location to the violation.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {})", location)?;
        }
        Ok(())
    }
}

/// Complete validation report for one dataset bundle
#[derive(Debug)]
pub struct ValidationReport {
    source: String,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub(crate) fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            violations: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub(crate) fn extend(&mut self, violations: Vec<Violation>) {
        self.violations.extend(violations);
    }

    /// Identifier of the validated file.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All violations, in rule execution order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True when no error-severity violation was recorded.
    pub fn is_valid(&self) -> bool {
        !self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    /// Number of error-severity violations.
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity violations.
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// Serialize the report to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format the report with colors (requires the console feature).
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();

            output.push_str(&format!("{}\n", style("CAP Upload Validation Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("============================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.source));

            if self.violations.is_empty() {
                output.push_str("No violations found.\n");
            }

            for violation in &self.violations {
                let line = match violation.severity {
                    Severity::Error => format!(
                        "[✗] {} - {}: {}",
                        style(&violation.rule).red(),
                        style("ERROR").red().bold(),
                        violation.message
                    ),
                    Severity::Warning => format!(
                        "[⚠] {} - {}: {}",
                        style(&violation.rule).yellow(),
                        style("WARNING").yellow().bold(),
                        violation.message
                    ),
                };
                output.push_str(&line);
                if let Some(location) = &violation.location {
                    output.push_str(&format!(" ({})", location));
                }
                output.push('\n');
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} errors, {} warnings\n\n",
                style("Summary").bold(),
                style(self.error_count()).red(),
                style(self.warning_count()).yellow(),
            ));

            if self.is_valid() {
                output.push_str(&format!("{}\n", style("Validation PASSED").green().bold()));
            } else {
                output.push_str(&format!("{}\n", style("Validation FAILED").red().bold()));
            }

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CAP Upload Validation Report")?;
        writeln!(f, "============================")?;
        writeln!(f, "File: {}", self.source)?;
        writeln!(f)?;

        if self.violations.is_empty() {
            writeln!(f, "No violations found.")?;
        }

        for violation in &self.violations {
            let symbol = match violation.severity {
                Severity::Error => "✗",
                Severity::Warning => "⚠",
            };
            write!(f, "[{}] {}", symbol, violation.rule)?;
            match violation.severity {
                Severity::Error => write!(f, " - ERROR: {}", violation.message)?,
                Severity::Warning => write!(f, " - WARNING: {}", violation.message)?,
            }
            if let Some(location) = &violation.location {
                write!(f, " ({})", location)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} errors, {} warnings",
            self.error_count(),
            self.warning_count()
        )?;

        writeln!(f)?;
        if self.is_valid() {
            writeln!(f, "Validation PASSED")?;
        } else {
            writeln!(f, "Validation FAILED")?;
        }

        Ok(())
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("is_valid", &self.is_valid())?;
        state.serialize_field("violations", &self.violations)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ValidationReport {
        let mut report = ValidationReport::new("test.capmat");
        report.push(
            Violation::new("var-genes-known", Severity::Error, "unknown gene 'FOO'")
                .at(Location::section("var").column("var_id").row(3)),
        );
        report.push(Violation::new(
            "var-gene-versions",
            Severity::Warning,
            "2 identifiers carry version suffixes",
        ));
        report
    }

    #[test]
    fn test_is_valid_ignores_warnings() {
        let mut report = ValidationReport::new("warn-only.capmat");
        report.push(Violation::new("some-rule", Severity::Warning, "minor"));
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_display_contains_symbols_and_summary() {
        let output = format!("{}", sample_report());
        assert!(output.contains("✗"));
        assert!(output.contains("⚠"));
        assert!(output.contains("1 errors, 1 warnings"));
        assert!(output.contains("Validation FAILED"));
        assert!(output.contains("var.var_id[3]"));
    }

    #[test]
    fn test_empty_report_passes() {
        let report = ValidationReport::new("clean.capmat");
        assert!(report.is_valid());
        let output = format!("{}", report);
        assert!(output.contains("No violations found."));
        assert!(output.contains("Validation PASSED"));
    }

    #[test]
    fn test_json_shape() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["is_valid"], serde_json::json!(false));
        assert_eq!(value["violations"][0]["rule"], "var-genes-known");
        assert_eq!(value["violations"][0]["severity"], "error");
        assert_eq!(value["violations"][0]["location"]["section"], "var");
        assert!(value["violations"][1]["location"].is_null());
    }
}
