use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use capval::catalog::Organism;

mod config;
mod demo;
mod info;
mod validate;

/// capval - CAP Upload Validator
#[derive(Parser)]
#[command(name = "capval")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Organism override for the gene identifier check.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrganismArg {
    /// Homo sapiens
    HomoSapiens,
    /// Mus musculus
    MusMusculus,
}

impl From<OrganismArg> for Organism {
    fn from(arg: OrganismArg) -> Self {
        match arg {
            OrganismArg::HomoSapiens => Organism::HomoSapiens,
            OrganismArg::MusMusculus => Organism::MusMusculus,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a dataset bundle against the upload schema
    Validate {
        /// Input bundle (.capmat container or directory)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the declared organism
        #[arg(long, value_enum)]
        organism: Option<OrganismArg>,

        /// Directory of gene catalog CSVs (defaults to the bundled snapshot)
        #[arg(long, value_name = "DIR")]
        gene_data: Option<PathBuf>,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        // === Advanced tuning flags (hidden from --help) ===
        /// Matrix rows per streaming chunk
        #[arg(long, hide = true)]
        chunk_rows: Option<usize>,
    },

    /// Display information about a dataset bundle
    Info {
        /// Input bundle path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate a small valid demo bundle for testing
    Demo {
        /// Output bundle path
        #[arg(value_name = "OUTPUT", default_value = "demo_dataset.capmat")]
        output: PathBuf,

        /// Number of observations (cells)
        #[arg(long, default_value = "100")]
        rows: usize,

        /// Number of features (genes)
        #[arg(long, default_value = "40")]
        cols: usize,

        /// Write a directory bundle instead of a ZIP container
        #[arg(long)]
        directory: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate {
            file,
            organism,
            gene_data,
            json,
            config,
            chunk_rows,
        } => validate::run(
            file,
            organism.map(Organism::from),
            gene_data,
            json,
            config,
            chunk_rows,
        ),
        Commands::Info { file } => info::run(file),
        Commands::Demo {
            output,
            rows,
            cols,
            directory,
        } => demo::run(output, rows, cols, directory),
    }
}
