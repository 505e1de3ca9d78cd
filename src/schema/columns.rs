/// Observation index column (unique cell identifier)
pub const OBS_ID: &str = "obs_id";
/// Feature index column (Ensembl gene identifier)
pub const VAR_ID: &str = "var_id";
/// Expression matrix list column (one list of length n_var per observation)
pub const VALUES: &str = "values";

/// Assay ontology label
pub const ASSAY: &str = "assay";
/// Disease ontology label
pub const DISEASE: &str = "disease";
/// Organism name ("Homo sapiens" or "Mus musculus")
pub const ORGANISM: &str = "organism";
/// Tissue ontology label
pub const TISSUE: &str = "tissue";
