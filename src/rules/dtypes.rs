use arrow::datatypes::DataType;

use crate::report::{Location, Severity, Violation};
use crate::schema::{columns, REQUIRED_OBS_COLUMNS};
use crate::view::{is_categorical, is_string_like, Axis};

use super::{Rule, RuleContext};

/// Declared element types match the schema-required types per field.
///
/// Identifiers must be plain strings, required obs annotations must be
/// categorical (dictionary-encoded strings), and the matrix must hold
/// `List<Float64>` expression vectors.
pub struct FieldDtypes;

impl Rule for FieldDtypes {
    fn name(&self) -> &'static str {
        "field-dtypes"
    }

    fn description(&self) -> &'static str {
        "every schema field carries its required element type"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Violation>> {
        let mut violations = Vec::new();

        for axis in [Axis::Obs, Axis::Var] {
            let Some(table) = ctx.view.table(axis) else {
                continue;
            };
            let column_name = axis.index_column();
            if let Ok(field) = table.schema().field_with_name(column_name) {
                if !is_string_like(field.data_type()) {
                    violations.push(
                        self.violation(format!(
                            "{} index column '{}' must be string-typed, found {}",
                            axis.section(),
                            column_name,
                            field.data_type()
                        ))
                        .at(Location::section(axis.section()).column(column_name)),
                    );
                }
            }
        }

        if let Some(obs) = ctx.view.obs() {
            for column_name in REQUIRED_OBS_COLUMNS {
                let Ok(field) = obs.schema().field_with_name(column_name) else {
                    continue; // absence reported by obs-required-columns
                };
                if !is_categorical(field.data_type()) {
                    violations.push(
                        self.violation(format!(
                            "obs column '{}' must be categorical-typed, found {}",
                            column_name,
                            field.data_type()
                        ))
                        .at(Location::section("obs").column(column_name)),
                    );
                }
            }
        }

        if let Some(matrix) = ctx.view.matrix() {
            match matrix.values_type() {
                None => violations.push(
                    self.violation(format!("matrix table has no '{}' column", columns::VALUES))
                        .at(Location::section("matrix").column(columns::VALUES)),
                ),
                Some(DataType::List(item)) if item.data_type() == &DataType::Float64 => {}
                Some(found) => violations.push(
                    self.violation(format!(
                        "matrix column '{}' must be List<Float64>, found {}",
                        columns::VALUES,
                        found
                    ))
                    .at(Location::section("matrix").column(columns::VALUES)),
                ),
            }
        }

        Ok(violations)
    }
}
