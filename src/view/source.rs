use std::fs::File;
use std::path::PathBuf;

use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::zip_chunk_reader::ZipEntryChunkReader;
use super::ViewError;

/// Where a Parquet table lives (kept so readers can be rebuilt at will)
#[derive(Debug, Clone)]
pub(crate) enum ParquetSource {
    /// Plain file inside a directory bundle
    FilePath(PathBuf),
    /// Small table read fully out of a container entry
    InMemory(Bytes),
    /// Stored container entry, read in place without extraction
    ZipEntry(ZipEntryChunkReader),
}

/// Boxed record-batch iterator, one fresh reader per call
pub(crate) type BatchReader = Box<dyn Iterator<Item = Result<RecordBatch, ArrowError>> + Send>;

impl ParquetSource {
    /// Build a streaming record-batch reader over this source.
    ///
    /// Every call constructs a new Parquet reader, which is what makes
    /// chunk iteration restartable.
    pub(crate) fn batch_reader(&self, batch_size: usize) -> Result<BatchReader, ViewError> {
        match self {
            ParquetSource::FilePath(path) => {
                let file = File::open(path)?;
                let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
                    .with_batch_size(batch_size)
                    .build()?;
                Ok(Box::new(reader))
            }
            ParquetSource::InMemory(bytes) => {
                let reader = ParquetRecordBatchReaderBuilder::try_new(bytes.clone())?
                    .with_batch_size(batch_size)
                    .build()?;
                Ok(Box::new(reader))
            }
            ParquetSource::ZipEntry(chunk_reader) => {
                let reader = ParquetRecordBatchReaderBuilder::try_new(chunk_reader.clone())?
                    .with_batch_size(batch_size)
                    .build()?;
                Ok(Box::new(reader))
            }
        }
    }

    /// Read the Parquet footer: Arrow schema and declared row count.
    pub(crate) fn footer(&self) -> Result<(arrow::datatypes::SchemaRef, u64), ViewError> {
        let (schema, num_rows) = match self {
            ParquetSource::FilePath(path) => {
                let file = File::open(path)?;
                let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
                let rows = builder.metadata().file_metadata().num_rows();
                (builder.schema().clone(), rows)
            }
            ParquetSource::InMemory(bytes) => {
                let builder = ParquetRecordBatchReaderBuilder::try_new(bytes.clone())?;
                let rows = builder.metadata().file_metadata().num_rows();
                (builder.schema().clone(), rows)
            }
            ParquetSource::ZipEntry(chunk_reader) => {
                let builder = ParquetRecordBatchReaderBuilder::try_new(chunk_reader.clone())?;
                let rows = builder.metadata().file_metadata().num_rows();
                (builder.schema().clone(), rows)
            }
        };
        Ok((schema, num_rows.max(0) as u64))
    }
}
