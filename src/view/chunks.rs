use arrow::array::{Array, Float64Array, ListArray};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::schema::columns;

use super::source::{BatchReader, ParquetSource};
use super::ViewError;

/// Expression matrix section, exposed footer-first
///
/// Only the Parquet footer (schema + row count) is read at open time; the
/// data itself is reachable exclusively through bounded chunk iteration.
#[derive(Debug)]
pub struct MatrixSection {
    source: ParquetSource,
    schema: SchemaRef,
    num_rows: u64,
}

impl MatrixSection {
    pub(crate) fn open(source: ParquetSource) -> Result<Self, ViewError> {
        let (schema, num_rows) = source.footer()?;
        Ok(Self {
            source,
            schema,
            num_rows,
        })
    }

    /// Number of matrix rows (observations) declared by the Parquet footer.
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Arrow schema of the matrix table.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Declared type of the `values` column, when the column exists.
    pub fn values_type(&self) -> Option<&DataType> {
        self.schema
            .field_with_name(columns::VALUES)
            .ok()
            .map(|f| f.data_type())
    }

    /// True when `values` has the schema-required `List<Float64>` shape.
    pub fn has_expected_values_type(&self) -> bool {
        matches!(
            self.values_type(),
            Some(DataType::List(item)) if item.data_type() == &DataType::Float64
        )
    }

    /// Lazily iterate the matrix in chunks of at most `chunk_rows` rows.
    ///
    /// Each call builds a fresh reader, so iteration is restartable; peak
    /// memory is bounded by one chunk regardless of total matrix size.
    pub fn iter_chunks(&self, chunk_rows: usize) -> Result<MatrixChunks, ViewError> {
        Ok(MatrixChunks {
            inner: self.source.batch_reader(chunk_rows.max(1))?,
            row_offset: 0,
        })
    }
}

/// Streaming iterator over bounded matrix chunks
///
/// Memory usage is bounded by `chunk_rows * row_width`; no chunk is
/// retained once the iterator moves past it.
pub struct MatrixChunks {
    inner: BatchReader,
    row_offset: u64,
}

impl Iterator for MatrixChunks {
    type Item = Result<MatrixChunk, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = match self.inner.next()? {
            Ok(batch) => batch,
            Err(e) => return Some(Err(ViewError::from(e))),
        };
        let offset = self.row_offset;
        self.row_offset += batch.num_rows() as u64;
        Some(MatrixChunk::try_new(batch, offset))
    }
}

/// One bounded slice of the expression matrix
#[derive(Debug)]
pub struct MatrixChunk {
    row_offset: u64,
    lists: ListArray,
}

impl MatrixChunk {
    fn try_new(batch: RecordBatch, row_offset: u64) -> Result<Self, ViewError> {
        let column = batch.column_by_name(columns::VALUES).ok_or_else(|| {
            ViewError::InvalidFormat(format!(
                "matrix table has no '{}' column",
                columns::VALUES
            ))
        })?;
        let lists = column
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or_else(|| {
                ViewError::InvalidFormat(format!(
                    "matrix '{}' column is not a List array",
                    columns::VALUES
                ))
            })?
            .clone();
        Ok(Self { row_offset, lists })
    }

    /// Absolute index of this chunk's first row within the matrix.
    pub fn row_offset(&self) -> u64 {
        self.row_offset
    }

    /// Number of rows in this chunk.
    pub fn num_rows(&self) -> usize {
        self.lists.len()
    }

    /// Expression vector of the chunk-local row `index`.
    ///
    /// Returns `None` when the row itself is null or its values are not
    /// `Float64` (a type mismatch reported by the dtype rule).
    pub fn row(&self, index: usize) -> Option<MatrixRow> {
        if self.lists.is_null(index) {
            return None;
        }
        let values = self.lists.value(index);
        let values = values.as_any().downcast_ref::<Float64Array>()?.clone();
        Some(MatrixRow { values })
    }
}

/// Expression vector of a single observation
#[derive(Debug)]
pub struct MatrixRow {
    values: Float64Array,
}

impl MatrixRow {
    /// Number of values (row width).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row holds no values at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` encodes a missing measurement.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.is_valid(index).then(|| self.values.value(index))
    }

    /// Iterate values in column order; `None` encodes missing.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.values.len()).map(|i| self.get(i))
    }
}
