//! # spikecat
//!
//! Command-line front end for curation archives and experiment catalogs.
//!
//! ## Usage
//!
//! ```bash
//! # Enrich a catalog, keeping recordings with at least 10 units
//! spikecat enrich --catalog catalog.csv --basepath /data/ephys --metrics --min-units 10 -o enriched.csv
//!
//! # Inspect one archive
//! spikecat info recording_params_params_low_ISI_acqm.zip
//!
//! # Phase windows of a drug recording
//! spikecat phases --archive drug_acqm.zip --stitch drug_stitch_inds.json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
