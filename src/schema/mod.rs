//! # CAP Dataset Bundle Schema
//!
//! This module defines the on-disk layout of a CAP dataset bundle and the
//! Apache Arrow schemas of its Parquet tables.
//!
//! ## Bundle Layout
//!
//! A bundle is either a directory or a single-file ZIP container (`.capmat`):
//!
//! ```text
//! dataset.capmat/
//! ├── mimetype                 (ZIP only; first entry, Stored)
//! ├── metadata.json            unstructured key-value metadata block
//! ├── matrix/matrix.parquet    expression matrix, one row per observation
//! ├── obs/obs.parquet          observation (cell) annotation table
//! └── var/var.parquet          feature (gene) annotation table
//! ```
//!
//! ## Table Schemas
//!
//! | Table | Column | Type | Notes |
//! |-------|--------|------|-------|
//! | matrix | values | List\<Float64\> | one list per observation, length n_var |
//! | obs | obs_id | Utf8 | unique observation index |
//! | obs | assay, disease, organism, tissue | Dictionary(Int32, Utf8) | required categoricals |
//! | var | var_id | Utf8 | unique Ensembl gene identifier |
//!
//! ## Compression Strategy
//!
//! Inside a ZIP container the matrix entry MUST be Stored (uncompressed) so
//! that Parquet row groups stay seekable without extraction; Parquet's own
//! ZSTD column compression already keeps the entry small. `metadata.json` is
//! Deflate compressed.

mod builders;
/// Table column name constants.
pub mod columns;
mod constants;


pub use builders::{create_matrix_schema, create_obs_schema, create_var_schema};
pub use constants::*;
