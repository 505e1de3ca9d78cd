//! # capval
//!
//! Command-line validator for CAP annotated expression matrix bundles.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a bundle before upload
//! capval validate dataset.capmat
//!
//! # Machine-readable report
//! capval validate dataset.capmat --json
//!
//! # Inspect a bundle
//! capval info dataset.capmat
//!
//! # Generate demo data
//! capval demo demo_dataset.capmat
//! ```
//!
//! Exit codes: 0 when the file is valid, 1 when schema violations were
//! found, 2 when the file could not even be checked (unreadable bundle or
//! unavailable reference catalog).

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
