//! # Bundle Writer
//!
//! Writes CAP dataset bundles (directory or single-file ZIP container)
//! from in-memory tables. This is not part of the validation core: it
//! exists so the test suite and the `demo` subcommand can fabricate real
//! bundles, and it is deliberately not streaming-scale (the validator must
//! handle files larger than RAM; the writer does not).
//!
//! Container layout rules honored here are the same ones the validator
//! checks: `mimetype` is the first entry and Stored, the matrix entry is
//! Stored so it stays seekable, everything else is Deflate compressed.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, ListBuilder, StringArray, StringDictionaryBuilder};
use arrow::datatypes::Int32Type;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::metadata::DatasetMetadata;
use crate::schema::{
    create_matrix_schema, create_obs_schema, create_var_schema, CAPMAT_MIMETYPE, ENTRY_MATRIX,
    ENTRY_METADATA, ENTRY_MIMETYPE, ENTRY_OBS, ENTRY_VAR,
};

/// Rows per record batch handed to the Parquet writer
const WRITE_BATCH_ROWS: usize = 1024;

/// Errors raised while writing a bundle
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// ZIP error
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// In-memory description of a bundle about to be written
///
/// Every section is optional so tests can fabricate incomplete bundles;
/// matrix rows may be ragged for the same reason.
#[derive(Debug, Default)]
pub struct DatasetBundle {
    /// Unstructured metadata block (`metadata.json`)
    pub metadata: Option<DatasetMetadata>,
    /// Observation annotation table
    pub obs: Option<RecordBatch>,
    /// Feature annotation table
    pub var: Option<RecordBatch>,
    /// Expression matrix rows; `None` values encode missing measurements
    pub matrix: Option<Vec<Vec<Option<f64>>>>,
}

impl DatasetBundle {
    /// Write the bundle as a directory.
    pub fn write_directory<P: AsRef<Path>>(&self, path: P) -> Result<(), BundleError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        if let Some(metadata) = &self.metadata {
            std::fs::write(path.join(ENTRY_METADATA), metadata.to_json()?)?;
        }
        if let Some(obs) = &self.obs {
            write_table_file(path.join(ENTRY_OBS), obs)?;
        }
        if let Some(var) = &self.var {
            write_table_file(path.join(ENTRY_VAR), var)?;
        }
        if let Some(rows) = &self.matrix {
            let parent = path.join(ENTRY_MATRIX);
            if let Some(dir) = parent.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = File::create(parent)?;
            write_matrix(file, rows)?;
        }
        Ok(())
    }

    /// Write the bundle as a single-file ZIP container.
    pub fn write_container<P: AsRef<Path>>(&self, path: P) -> Result<(), BundleError> {
        let file = File::create(path.as_ref())?;
        let mut zip = ZipWriter::new(file);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // mimetype first and uncompressed, so the container is identifiable
        // by reading its first bytes.
        zip.start_file(ENTRY_MIMETYPE, stored)?;
        zip.write_all(CAPMAT_MIMETYPE.as_bytes())?;

        if let Some(metadata) = &self.metadata {
            zip.start_file(ENTRY_METADATA, deflated)?;
            zip.write_all(metadata.to_json()?.as_bytes())?;
        }
        if let Some(obs) = &self.obs {
            zip.start_file(ENTRY_OBS, deflated)?;
            zip.write_all(&table_bytes(obs)?)?;
        }
        if let Some(var) = &self.var {
            zip.start_file(ENTRY_VAR, deflated)?;
            zip.write_all(&table_bytes(var)?)?;
        }
        if let Some(rows) = &self.matrix {
            // Stored, so the validator can seek row groups in place.
            zip.start_file(ENTRY_MATRIX, stored.large_file(true))?;
            let mut buf = Vec::new();
            write_matrix(&mut buf, rows)?;
            zip.write_all(&buf)?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn writer_properties() -> Result<WriterProperties, BundleError> {
    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
        .build())
}

fn table_bytes(batch: &RecordBatch) -> Result<Vec<u8>, BundleError> {
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(writer_properties()?))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(buf)
}

fn write_table_file(path: std::path::PathBuf, batch: &RecordBatch) -> Result<(), BundleError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties()?))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_matrix<W: Write + Send>(writer: W, rows: &[Vec<Option<f64>>]) -> Result<(), BundleError> {
    let schema = Arc::new(create_matrix_schema());
    let mut parquet = ArrowWriter::try_new(writer, schema.clone(), Some(writer_properties()?))?;

    for slab in rows.chunks(WRITE_BATCH_ROWS.max(1)) {
        let mut builder = ListBuilder::new(Float64Builder::new());
        for row in slab {
            for value in row {
                match value {
                    Some(v) => builder.values().append_value(*v),
                    None => builder.values().append_null(),
                }
            }
            builder.append(true);
        }
        let lists: ArrayRef = Arc::new(builder.finish());
        let batch = RecordBatch::try_new(schema.clone(), vec![lists])?;
        parquet.write(&batch)?;
    }

    parquet.close()?;
    Ok(())
}

/// Build an observation annotation batch in the schema-required layout.
///
/// All slices must share one length; the four required annotation columns
/// are dictionary-encoded as the schema demands.
pub fn obs_batch(
    ids: &[&str],
    assay: &[&str],
    disease: &[&str],
    organism: &[&str],
    tissue: &[&str],
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = Arc::new(create_obs_schema());
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids.to_vec())),
        categorical_array(assay),
        categorical_array(disease),
        categorical_array(organism),
        categorical_array(tissue),
    ];
    RecordBatch::try_new(schema, columns)
}

/// Build a feature annotation batch holding the given identifiers.
pub fn var_batch(ids: &[&str]) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = Arc::new(create_var_schema());
    let columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(ids.to_vec()))];
    RecordBatch::try_new(schema, columns)
}

fn categorical_array(values: &[&str]) -> ArrayRef {
    let mut builder = StringDictionaryBuilder::<Int32Type>::new();
    for value in values {
        builder.append_value(value);
    }
    Arc::new(builder.finish())
}
