use std::path::PathBuf;

use anyhow::Result;
use log::info;

use capval::catalog::{Organism, ReferenceCatalogs};
use capval::engine::{Validator, ValidatorConfig};

use super::config::ValidateConfig;

/// Exit code when the file was checked and found invalid
const EXIT_INVALID: i32 = 1;
/// Exit code when the file could not be checked at all
const EXIT_FATAL: i32 = 2;

/// Validate a dataset bundle against the upload schema
pub fn run(
    file: PathBuf,
    organism: Option<Organism>,
    gene_data: Option<PathBuf>,
    json: bool,
    config_path: Option<PathBuf>,
    chunk_rows: Option<usize>,
) -> Result<()> {
    info!("capval Validator");
    info!("================");
    info!("File: {}", file.display());

    let file_config = match config_path {
        Some(path) => match ValidateConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Fatal: {:#}", e);
                std::process::exit(EXIT_FATAL);
            }
        },
        None => ValidateConfig::default(),
    };

    // Flags win over config file values.
    let organism = match organism {
        Some(organism) => Some(organism),
        None => match &file_config.organism {
            Some(name) => match Organism::parse(name) {
                Some(organism) => Some(organism),
                None => {
                    eprintln!("Fatal: config file declares unsupported organism '{}'", name);
                    std::process::exit(EXIT_FATAL);
                }
            },
            None => None,
        },
    };
    let gene_data = gene_data.or(file_config.gene_data);

    let mut validator_config = ValidatorConfig::default();
    if let Some(chunk_rows) = chunk_rows.or(file_config.chunk_rows) {
        validator_config.chunk_rows = chunk_rows;
    }
    validator_config.organism = organism;

    // Catalog problems are fatal: the file was never checked.
    let loaded;
    let catalogs = match &gene_data {
        Some(dir) => match ReferenceCatalogs::load_dir(dir) {
            Ok(catalogs) => {
                loaded = catalogs;
                &loaded
            }
            Err(e) => {
                eprintln!("Fatal: {}", e);
                std::process::exit(EXIT_FATAL);
            }
        },
        None => match ReferenceCatalogs::bundled() {
            Ok(catalogs) => catalogs,
            Err(e) => {
                eprintln!("Fatal: {}", e);
                std::process::exit(EXIT_FATAL);
            }
        },
    };

    let validator = Validator::with_config(catalogs, validator_config);

    match validator.validate(&file) {
        Ok(report) => {
            if json {
                println!("{}", report.to_json()?);
            } else {
                #[cfg(feature = "colorized_output")]
                {
                    print!("{}", report.format_colored());
                }

                #[cfg(not(feature = "colorized_output"))]
                {
                    print!("{}", report);
                }
            }

            if !report.is_valid() {
                std::process::exit(EXIT_INVALID);
            }
            Ok(())
        }
        Err(e) => {
            // Could not even check the file: distinct message, distinct code.
            eprintln!("Fatal: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    }
}
