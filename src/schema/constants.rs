/// CAP bundle format version - follows semantic versioning
pub const CAPMAT_FORMAT_VERSION: &str = "1.0.0";

/// File extension for single-file CAP dataset containers
pub const CAPMAT_EXTENSION: &str = "capmat";

/// MIME type recorded in the container's `mimetype` entry
pub const CAPMAT_MIMETYPE: &str = "application/vnd.cap.dataset";

/// Container entry holding the MIME type (ZIP only; must be first, Stored)
pub const ENTRY_MIMETYPE: &str = "mimetype";

/// Container entry holding the unstructured metadata block
pub const ENTRY_METADATA: &str = "metadata.json";

/// Container entry holding the expression matrix table
pub const ENTRY_MATRIX: &str = "matrix/matrix.parquet";

/// Container entry holding the observation annotation table
pub const ENTRY_OBS: &str = "obs/obs.parquet";

/// Container entry holding the feature annotation table
pub const ENTRY_VAR: &str = "var/var.parquet";

/// Observation annotation columns every upload must carry
pub const REQUIRED_OBS_COLUMNS: [&str; 4] = [
    super::columns::ASSAY,
    super::columns::DISEASE,
    super::columns::ORGANISM,
    super::columns::TISSUE,
];

/// Unstructured metadata keys every upload must carry
pub const REQUIRED_UNS_KEYS: [&str; 2] = ["title", super::columns::ORGANISM];
