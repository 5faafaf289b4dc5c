use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod demo;
mod enrich;
mod info;
mod phases;

pub use config::Config;

/// spikecat - Spike-sorted recording catalog tools
#[derive(Parser)]
#[command(name = "spikecat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich an experiment catalog with unit counts and spike metrics
    Enrich {
        /// Catalog CSV with uuids and experiment_name columns
        #[arg(long, value_name = "CSV")]
        catalog: PathBuf,

        /// Directory holding one sub-directory per uuid
        #[arg(long, value_name = "DIR")]
        basepath: Option<PathBuf>,

        /// Compute firing rates and burstiness
        #[arg(long)]
        metrics: bool,

        /// Keep only recordings with at least this many units
        #[arg(long, value_name = "N")]
        min_units: Option<usize>,

        /// Archive file name suffix
        #[arg(long, value_name = "SUFFIX")]
        suffix: Option<String>,

        /// Infer the drug column from experiment names
        #[arg(long)]
        label_drugs: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the enriched catalog to this CSV file
        #[arg(short, long, value_name = "CSV")]
        output: Option<PathBuf>,
    },

    /// Show phase windows and per-phase spike counts of one archive
    Phases {
        /// Curation archive path
        #[arg(long, value_name = "ZIP")]
        archive: PathBuf,

        /// Stitch-point sidecar (default schedule when omitted or missing)
        #[arg(long, value_name = "JSON")]
        stitch: Option<PathBuf>,

        /// Sampling rate for stitch-point conversion
        #[arg(long, value_name = "HZ")]
        sampling_rate: Option<f64>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Display information about a curation archive
    Info {
        /// Curation archive path
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },

    /// Write a synthetic curation archive for testing
    Demo {
        /// Output archive path
        #[arg(value_name = "OUTPUT", default_value = "demo_params_params_low_ISI_acqm.zip")]
        output: PathBuf,

        /// Number of units
        #[arg(short = 'u', long, default_value = "16")]
        units: usize,

        /// Recording duration in seconds
        #[arg(short = 'd', long, default_value = "60")]
        duration: u64,

        /// Also write a stitch sidecar splitting the recording in three
        #[arg(long)]
        stitch: bool,
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
        Commands::Enrich {
            catalog,
            basepath,
            metrics,
            min_units,
            suffix,
            label_drugs,
            config,
            output,
        } => enrich::run(enrich::EnrichArgs {
            catalog,
            basepath,
            metrics,
            min_units,
            suffix,
            label_drugs,
            config,
            output,
        }),
        Commands::Phases {
            archive,
            stitch,
            sampling_rate,
            config,
        } => phases::run(archive, stitch, sampling_rate, config),
        Commands::Info { archive } => info::run(archive),
        Commands::Demo {
            output,
            units,
            duration,
            stitch,
        } => demo::run(output, units, duration, stitch),
    }
}
