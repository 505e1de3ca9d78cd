use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings loadable from a TOML file via `--config`.
///
/// Command-line flags always win over config file values.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateConfig {
    /// Matrix rows per streaming chunk
    pub chunk_rows: Option<usize>,
    /// Directory of gene catalog CSVs
    pub gene_data: Option<PathBuf>,
    /// Organism override ("Homo sapiens" / "Mus musculus")
    pub organism: Option<String>,
}

impl ValidateConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: ValidateConfig = toml::from_str(
            r#"
            chunk_rows = 1024
            gene_data = "/data/catalogs"
            organism = "Mus musculus"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunk_rows, Some(1024));
        assert_eq!(config.organism.as_deref(), Some("Mus musculus"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: Result<ValidateConfig, _> = toml::from_str("chunk_size = 5");
        assert!(result.is_err());
    }
}
