//! # Dataset View
//!
//! Lazy accessor over one dataset bundle, bound to the bundle for the
//! lifetime of a single validation run.
//!
//! ## Access Discipline
//!
//! - **Small sections** (annotation tables, unstructured metadata) are
//!   bounded in size and fully materialized at open time.
//! - **The expression matrix** is never materialized: only its Parquet
//!   footer is read eagerly, and data access goes through
//!   [`MatrixSection::iter_chunks`], which yields bounded, restartable
//!   chunks. Peak memory is O(chunk size + metadata), independent of the
//!   matrix size.
//! - **Missing sections are not open failures.** A bundle without, say, a
//!   var table still opens; the absence is reported as a schema violation
//!   so every other check can still run. Only genuinely unreadable input
//!   (I/O errors, corrupt ZIP/Parquet/JSON, a compressed matrix entry)
//!   fails the open.
//!
//! File handles are released when the view drops; no chunk or handle
//! outlives the run that created it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use capval::view::DatasetView;
//!
//! let view = DatasetView::open("data.capmat")?;
//! if let Some(matrix) = view.matrix() {
//!     for chunk in matrix.iter_chunks(4096)? {
//!         let chunk = chunk?;
//!         println!("rows {}..{}", chunk.row_offset(), chunk.row_offset() + chunk.num_rows() as u64);
//!     }
//! }
//! # Ok::<(), capval::view::ViewError>(())
//! ```

mod chunks;
mod error;
mod open;
mod source;
mod tables;
pub mod zip_chunk_reader;


pub use chunks::{MatrixChunk, MatrixChunks, MatrixRow, MatrixSection};
pub use error::ViewError;
pub use tables::{is_categorical, is_string_like, string_at, AnnotationTable, Axis};
pub use zip_chunk_reader::ZipEntryChunkReader;

use std::collections::BTreeMap;

use arrow::datatypes::DataType;

use crate::metadata::DatasetMetadata;

/// Physical layout of the opened bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Directory bundle
    Directory,
    /// Single-file ZIP container (`.capmat`)
    Container,
}

/// Result of the container `mimetype` entry inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimetypeStatus {
    /// Entry present, first, Stored, with the expected content
    Valid,
    /// No `mimetype` entry in the container
    Missing,
    /// Entry content differs from the expected MIME type
    Mismatch(String),
    /// Entry is not the first entry of the archive
    NotFirst,
    /// Entry is compressed instead of Stored
    NotStored,
    /// Directory bundles carry no mimetype entry
    NotApplicable,
}

/// Read-only accessor over one dataset bundle
///
/// Owned by the validation engine for exactly one run and dropped when the
/// run ends, on every control path.
#[derive(Debug)]
pub struct DatasetView {
    source: String,
    kind: ContainerKind,
    mimetype: MimetypeStatus,
    metadata: Option<DatasetMetadata>,
    obs: Option<AnnotationTable>,
    var: Option<AnnotationTable>,
    matrix: Option<MatrixSection>,
}

impl DatasetView {
    /// Display identifier of the backing file.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the bundle is a directory or a ZIP container.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Mimetype entry status (containers only).
    pub fn mimetype(&self) -> &MimetypeStatus {
        &self.mimetype
    }

    /// Unstructured metadata block, when `metadata.json` is present.
    pub fn metadata(&self) -> Option<&DatasetMetadata> {
        self.metadata.as_ref()
    }

    /// Observation annotation table, when present.
    pub fn obs(&self) -> Option<&AnnotationTable> {
        self.obs.as_ref()
    }

    /// Feature annotation table, when present.
    pub fn var(&self) -> Option<&AnnotationTable> {
        self.var.as_ref()
    }

    /// Annotation table for either axis.
    pub fn table(&self, axis: Axis) -> Option<&AnnotationTable> {
        match axis {
            Axis::Obs => self.obs(),
            Axis::Var => self.var(),
        }
    }

    /// Expression matrix section, when present.
    pub fn matrix(&self) -> Option<&MatrixSection> {
        self.matrix.as_ref()
    }

    /// Shape `(n_obs, n_var)` declared by the metadata block.
    pub fn declared_shape(&self) -> Option<(u64, u64)> {
        self.metadata.as_ref()?.declared_shape()
    }

    /// Declared element type per field, keyed `section.column`.
    pub fn dtypes(&self) -> BTreeMap<String, DataType> {
        let mut dtypes = BTreeMap::new();
        if let Some(obs) = &self.obs {
            for field in obs.schema().fields() {
                dtypes.insert(format!("obs.{}", field.name()), field.data_type().clone());
            }
        }
        if let Some(var) = &self.var {
            for field in var.schema().fields() {
                dtypes.insert(format!("var.{}", field.name()), field.data_type().clone());
            }
        }
        if let Some(matrix) = &self.matrix {
            for field in matrix.schema().fields() {
                dtypes.insert(format!("matrix.{}", field.name()), field.data_type().clone());
            }
        }
        dtypes
    }
}
