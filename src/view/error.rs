/// Errors that make a dataset bundle unreadable
///
/// Every variant is a fatal open/read failure, reported separately from
/// schema violations: a run that hits one of these produces no report.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Container layout violates the format contract
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// `metadata.json` is present but structurally corrupt
    #[error("Metadata error: {0}")]
    MetadataError(String),
}
