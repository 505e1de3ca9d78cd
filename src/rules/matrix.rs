use crate::report::{Location, Severity, Violation};
use crate::schema::columns;
use crate::view::{string_at, AnnotationTable};

use super::{Rule, RuleContext};

fn axis_label(table: Option<&AnnotationTable>, row: usize) -> Option<String> {
    let table = table?;
    if row >= table.num_rows() {
        return None;
    }
    string_at(table.index()?.as_ref(), row).map(str::to_string)
}

/// The matrix holds raw counts: non-negative integers.
///
/// Like the upstream validator, only the first `count_check_rows` rows are
/// sampled; a full scan would re-read the matrix for a property that is
/// almost always violated uniformly.
pub struct MatrixCounts;

impl Rule for MatrixCounts {
    fn name(&self) -> &'static str {
        "matrix-counts"
    }

    fn description(&self) -> &'static str {
        "sampled expression values are non-negative integers (raw counts)"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(matrix) = ctx.view.matrix() else {
            return Ok(Vec::new());
        };
        if !matrix.has_expected_values_type() {
            return Ok(Vec::new()); // wrong dtype reported by field-dtypes
        }

        let sample_rows = ctx.config.count_check_rows.min(matrix.num_rows() as usize);
        if sample_rows == 0 {
            return Ok(Vec::new());
        }

        let mut seen = 0usize;
        for chunk in matrix.iter_chunks(ctx.config.chunk_rows)? {
            let chunk = chunk?;
            for i in 0..chunk.num_rows() {
                if seen >= sample_rows {
                    return Ok(Vec::new());
                }
                let absolute_row = chunk.row_offset() + i as u64;
                let Some(row) = chunk.row(i) else {
                    seen += 1;
                    continue; // null rows reported by matrix-empty-slices
                };
                for (j, value) in row.iter().enumerate() {
                    let Some(value) = value else { continue };
                    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                        return Ok(vec![self
                            .violation(format!(
                                "matrix does not hold raw counts: found {} at row {}, column {} (first {} row(s) sampled)",
                                value, absolute_row, j, sample_rows
                            ))
                            .at(Location::section("matrix")
                                .column(columns::VALUES)
                                .row(absolute_row))]);
                    }
                }
                seen += 1;
            }
            if seen >= sample_rows {
                break;
            }
        }

        Ok(Vec::new())
    }
}

/// No entirely-empty matrix rows or columns.
///
/// A single chunked pass over the matrix: per-row emptiness is decided
/// inside the chunk, per-column emptiness via one flag per column. Peak
/// memory is one chunk plus one bit per row/column, independent of the
/// matrix size. Ragged rows (width != n_var) are reported here as well
/// since only this scan observes actual row widths.
pub struct MatrixEmptySlices;

impl Rule for MatrixEmptySlices {
    fn name(&self) -> &'static str {
        "matrix-empty-slices"
    }

    fn description(&self) -> &'static str {
        "every matrix row and column holds at least one non-zero value"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let Some(matrix) = ctx.view.matrix() else {
            return Ok(Vec::new());
        };
        if !matrix.has_expected_values_type() {
            return Ok(Vec::new());
        }

        let n_var = ctx
            .view
            .declared_shape()
            .map(|(_, n_var)| n_var as usize)
            .or_else(|| ctx.view.var().map(AnnotationTable::num_rows));

        let mut column_nonempty = n_var.map(|n| vec![false; n]);
        let mut violations = Vec::new();

        for chunk in matrix.iter_chunks(ctx.config.chunk_rows)? {
            let chunk = chunk?;
            for i in 0..chunk.num_rows() {
                let absolute_row = chunk.row_offset() + i as u64;
                let Some(row) = chunk.row(i) else {
                    violations.push(self.empty_row(ctx, absolute_row));
                    continue;
                };

                if let Some(expected) = n_var {
                    if row.len() != expected {
                        violations.push(
                            self.violation(format!(
                                "matrix row {} has {} values, expected n_var = {}",
                                absolute_row,
                                row.len(),
                                expected
                            ))
                            .at(Location::section("matrix")
                                .column(columns::VALUES)
                                .row(absolute_row)),
                        );
                    }
                }

                let mut row_nonempty = false;
                for (j, value) in row.iter().enumerate() {
                    let nonzero = matches!(value, Some(v) if v != 0.0 && !v.is_nan());
                    if nonzero {
                        row_nonempty = true;
                        if let Some(flags) = column_nonempty.as_mut() {
                            if let Some(flag) = flags.get_mut(j) {
                                *flag = true;
                            }
                        }
                    }
                }
                if !row_nonempty {
                    violations.push(self.empty_row(ctx, absolute_row));
                }
            }
        }

        if let Some(flags) = column_nonempty {
            if matrix.num_rows() > 0 {
                for (j, nonempty) in flags.iter().enumerate() {
                    if !nonempty {
                        let label = axis_label(ctx.view.var(), j)
                            .map(|id| format!(" ('{}')", id))
                            .unwrap_or_default();
                        violations.push(
                            self.violation(format!(
                                "matrix column {}{} is entirely empty",
                                j, label
                            ))
                            .at(Location::section("matrix").column(columns::VALUES)),
                        );
                    }
                }
            }
        }

        Ok(violations)
    }
}

impl MatrixEmptySlices {
    fn empty_row(&self, ctx: &RuleContext<'_>, row: u64) -> Violation {
        let label = axis_label(ctx.view.obs(), row as usize)
            .map(|id| format!(" ('{}')", id))
            .unwrap_or_default();
        self.violation(format!("matrix row {}{} is entirely empty", row, label))
            .at(Location::section("matrix").column(columns::VALUES).row(row))
    }
}
