use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use capval::bundle::{obs_batch, var_batch, DatasetBundle};
use capval::catalog::{Organism, ReferenceCatalogs};
use capval::metadata::DatasetMetadata;

/// Generate a small valid demo bundle
pub fn run(output: PathBuf, rows: usize, cols: usize, directory: bool) -> Result<()> {
    info!("capval Demo Bundle Generator");
    info!("============================");
    info!("Output: {}", output.display());
    info!("Shape: {} x {}", rows, cols);

    let catalogs = ReferenceCatalogs::bundled()?;
    let catalog = catalogs.get(Organism::HomoSapiens);

    let mut gene_ids: Vec<&str> = catalog.ids().collect();
    gene_ids.sort_unstable();
    if cols > gene_ids.len() {
        anyhow::bail!(
            "demo supports at most {} columns (bundled catalog size), requested {}",
            gene_ids.len(),
            cols
        );
    }
    let gene_ids = &gene_ids[..cols];

    let obs_ids: Vec<String> = (0..rows).map(|i| format!("cell_{i}")).collect();
    let obs_refs: Vec<&str> = obs_ids.iter().map(String::as_str).collect();
    let assay = vec!["10x 3' v3"; rows];
    let disease = vec!["normal"; rows];
    let organism = vec![Organism::HomoSapiens.name(); rows];
    let tissue = vec!["blood"; rows];

    // Deterministic raw counts with every row and column kept non-empty.
    let mut matrix: Vec<Vec<Option<f64>>> = (0..rows)
        .map(|i| (0..cols).map(|j| Some(((i + 2 * j) % 5) as f64)).collect())
        .collect();
    for (i, row) in matrix.iter_mut().enumerate() {
        if cols > 0 {
            row[i % cols] = Some(1.0 + (i % 3) as f64);
        }
    }
    for j in 0..cols {
        if rows > 0 {
            matrix[j % rows][j] = Some(1.0 + (j % 4) as f64);
        }
    }

    let mut metadata = DatasetMetadata::new();
    metadata.title = Some("capval demo dataset".to_string());
    metadata.organism = Some(Organism::HomoSapiens.name().to_string());
    metadata.n_obs = Some(rows as u64);
    metadata.n_var = Some(cols as u64);
    metadata.extra.insert(
        "description".to_string(),
        serde_json::json!("synthetic raw counts generated by `capval demo`"),
    );

    let bundle = DatasetBundle {
        metadata: Some(metadata),
        obs: Some(obs_batch(&obs_refs, &assay, &disease, &organism, &tissue)?),
        var: Some(var_batch(gene_ids)?),
        matrix: Some(matrix),
    };

    if directory {
        bundle
            .write_directory(&output)
            .context("failed to write directory bundle")?;
        info!("Format: directory bundle");
    } else {
        bundle
            .write_container(&output)
            .context("failed to write container")?;
        info!("Format: ZIP container");
    }

    let size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    info!("Demo bundle written ({} bytes)", size);
    println!("Wrote demo bundle: {}", output.display());
    println!("Validate it with: capval validate {}", output.display());

    Ok(())
}
