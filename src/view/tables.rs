use arrow::array::{Array, ArrayRef, DictionaryArray, LargeStringArray, StringArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{
    ArrowDictionaryKeyType, ArrowNativeType, DataType, Int16Type, Int32Type, Int64Type, Int8Type,
    SchemaRef, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;

use crate::schema::columns;

use super::source::ParquetSource;
use super::ViewError;

/// Annotation axis of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Observations (matrix rows)
    Obs,
    /// Features (matrix columns)
    Var,
}

impl Axis {
    /// Section name used in violation locations.
    pub fn section(&self) -> &'static str {
        match self {
            Axis::Obs => "obs",
            Axis::Var => "var",
        }
    }

    /// Container entry holding this axis' annotation table.
    pub fn entry(&self) -> &'static str {
        match self {
            Axis::Obs => crate::schema::ENTRY_OBS,
            Axis::Var => crate::schema::ENTRY_VAR,
        }
    }

    /// Name of the index column on this axis.
    pub fn index_column(&self) -> &'static str {
        match self {
            Axis::Obs => columns::OBS_ID,
            Axis::Var => columns::VAR_ID,
        }
    }
}

/// Fully materialized annotation table (obs or var)
///
/// Annotation tables are bounded in size (one row per observation/feature,
/// a handful of columns), so unlike the matrix they are loaded whole.
#[derive(Debug)]
pub struct AnnotationTable {
    axis: Axis,
    schema: SchemaRef,
    batch: RecordBatch,
}

impl AnnotationTable {
    const LOAD_BATCH_ROWS: usize = 8192;

    pub(crate) fn load(axis: Axis, source: &ParquetSource) -> Result<Self, ViewError> {
        let mut batches = Vec::new();
        let mut schema = None;
        for batch in source.batch_reader(Self::LOAD_BATCH_ROWS)? {
            let batch = batch?;
            schema.get_or_insert_with(|| batch.schema());
            batches.push(batch);
        }

        let (schema, batch) = match schema {
            Some(schema) => {
                let batch = concat_batches(&schema, &batches)?;
                (schema, batch)
            }
            None => {
                let (schema, _) = source.footer()?;
                let batch = RecordBatch::new_empty(schema.clone());
                (schema, batch)
            }
        };

        Ok(Self { axis, schema, batch })
    }

    /// Which axis this table annotates.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of annotation rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Arrow schema of the table.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Column by name, if present.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// True when the table carries the named column.
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.field_with_name(name).is_ok()
    }

    /// The axis index column (`obs_id` / `var_id`), if present.
    pub fn index(&self) -> Option<&ArrayRef> {
        self.column(self.axis.index_column())
    }
}

/// True for plain string types (`Utf8`, `LargeUtf8`).
pub fn is_string_like(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Utf8 | DataType::LargeUtf8)
}

/// True for categorical types (dictionary-encoded strings).
pub fn is_categorical(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Dictionary(_, value) if is_string_like(value))
}

/// String value at `index`, decoding plain and dictionary-encoded columns.
///
/// Returns `None` for nulls and for columns that are not string-valued.
pub fn string_at(array: &dyn Array, index: usize) -> Option<&str> {
    if array.is_null(index) {
        return None;
    }
    match array.data_type() {
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(index)),
        DataType::LargeUtf8 => array
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(index)),
        DataType::Dictionary(key_type, _) => match key_type.as_ref() {
            DataType::Int8 => dict_string_at::<Int8Type>(array, index),
            DataType::Int16 => dict_string_at::<Int16Type>(array, index),
            DataType::Int32 => dict_string_at::<Int32Type>(array, index),
            DataType::Int64 => dict_string_at::<Int64Type>(array, index),
            DataType::UInt8 => dict_string_at::<UInt8Type>(array, index),
            DataType::UInt16 => dict_string_at::<UInt16Type>(array, index),
            DataType::UInt32 => dict_string_at::<UInt32Type>(array, index),
            DataType::UInt64 => dict_string_at::<UInt64Type>(array, index),
            _ => None,
        },
        _ => None,
    }
}

fn dict_string_at<K: ArrowDictionaryKeyType>(array: &dyn Array, index: usize) -> Option<&str> {
    let dict = array.as_any().downcast_ref::<DictionaryArray<K>>()?;
    let key = dict.keys().value(index).as_usize();
    let values = dict.values().as_any().downcast_ref::<StringArray>()?;
    values.is_valid(key).then(|| values.value(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringDictionaryBuilder;

    #[test]
    fn test_string_at_plain_and_dictionary() {
        let plain = StringArray::from(vec![Some("a"), None, Some("c")]);
        assert_eq!(string_at(&plain, 0), Some("a"));
        assert_eq!(string_at(&plain, 1), None);
        assert_eq!(string_at(&plain, 2), Some("c"));

        let mut builder = StringDictionaryBuilder::<Int32Type>::new();
        builder.append_value("x");
        builder.append_null();
        builder.append_value("x");
        let dict = builder.finish();
        assert_eq!(string_at(&dict, 0), Some("x"));
        assert_eq!(string_at(&dict, 1), None);
        assert_eq!(string_at(&dict, 2), Some("x"));
    }

    #[test]
    fn test_type_predicates() {
        assert!(is_string_like(&DataType::Utf8));
        assert!(!is_string_like(&DataType::Int64));

        let categorical =
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        assert!(is_categorical(&categorical));
        assert!(!is_categorical(&DataType::Utf8));

        let int_dict = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Int64));
        assert!(!is_categorical(&int_dict));
    }
}
