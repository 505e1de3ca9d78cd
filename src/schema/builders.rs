use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};

use super::columns;

/// Arrow type of the four required categorical obs columns.
fn categorical() -> DataType {
    DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
}

/// Creates the Arrow schema of the expression matrix table.
///
/// Each row is one observation; the single `values` column holds that
/// observation's expression vector as a `List<Float64>` of length n_var.
/// Nullable items encode missing measurements.
///
/// # Example
///
/// ```
/// use capval::schema::create_matrix_schema;
///
/// let schema = create_matrix_schema();
/// assert_eq!(schema.fields().len(), 1);
/// ```
pub fn create_matrix_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(Field::new(
        columns::VALUES,
        DataType::List(Arc::new(Field::new_list_field(DataType::Float64, true))),
        false,
    ));
    builder.finish()
}

/// Creates the Arrow schema of the observation annotation table.
///
/// `obs_id` is the unique observation index; the four CAP-required
/// annotation columns are categorical (dictionary-encoded strings).
pub fn create_obs_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(Field::new(columns::OBS_ID, DataType::Utf8, false));
    builder.push(Field::new(columns::ASSAY, categorical(), false));
    builder.push(Field::new(columns::DISEASE, categorical(), false));
    builder.push(Field::new(columns::ORGANISM, categorical(), false));
    builder.push(Field::new(columns::TISSUE, categorical(), false));
    builder.finish()
}

/// Creates the Arrow schema of the feature annotation table.
///
/// `var_id` is the Ensembl gene identifier index.
pub fn create_var_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(Field::new(columns::VAR_ID, DataType::Utf8, false));
    builder.finish()
}
