use std::path::PathBuf;

use anyhow::{Context, Result};

use capval::view::{ContainerKind, DatasetView};

/// Display information about a dataset bundle
pub fn run(file: PathBuf) -> Result<()> {
    let view = DatasetView::open(&file)
        .with_context(|| format!("failed to open {}", file.display()))?;

    println!("CAP Dataset Bundle Information");
    println!("==============================");
    println!("File: {}", view.source());
    println!(
        "Format: {}",
        match view.kind() {
            ContainerKind::Directory => "Directory bundle",
            ContainerKind::Container => "ZIP container (.capmat)",
        }
    );
    println!();

    if let Some(metadata) = view.metadata() {
        println!("Metadata:");
        if let Some(title) = &metadata.title {
            println!("  Title: {}", title);
        }
        if let Some(organism) = &metadata.organism {
            println!("  Organism: {}", organism);
        }
        if let Some(version) = &metadata.format_version {
            println!("  Format version: {}", version);
        }
        if let Some((n_obs, n_var)) = metadata.declared_shape() {
            println!("  Declared shape: {} x {}", n_obs, n_var);
        }
        for (key, value) in &metadata.extra {
            println!("  {}: {}", key, value);
        }
        println!();
    } else {
        println!("Metadata: missing");
        println!();
    }

    println!("Sections:");
    match view.matrix() {
        Some(matrix) => println!("  matrix: {} rows", matrix.num_rows()),
        None => println!("  matrix: missing"),
    }
    match view.obs() {
        Some(obs) => println!("  obs: {} rows, {} columns", obs.num_rows(), obs.schema().fields().len()),
        None => println!("  obs: missing"),
    }
    match view.var() {
        Some(var) => println!("  var: {} rows, {} columns", var.num_rows(), var.schema().fields().len()),
        None => println!("  var: missing"),
    }
    println!();

    println!("Declared dtypes:");
    for (field, data_type) in view.dtypes() {
        println!("  {}: {}", field, data_type);
    }

    Ok(())
}
