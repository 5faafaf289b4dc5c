//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every run can live in a
//! config file; command-line flags take precedence over it:
//!
//! ```toml
//! # spikecat.toml
//! [enrichment]
//! basepath = "/data/ephys"
//! compute_metrics = true
//! min_units = 10
//!
//! [windows]
//! sampling_rate = 20000.0
//!
//! [[relabel]]
//! field_matched = "experiment_name"
//! pattern = { contains_ignore_case = "dmso" }
//! target_field = "drug"
//! value = "dmso"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use spikecat::relabel::RuleTable;
use std::path::{Path, PathBuf};

/// Root configuration structure for spikecat.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Enrichment pass settings.
    #[serde(default)]
    pub enrichment: EnrichmentSection,

    /// Phase window settings.
    #[serde(default)]
    pub windows: WindowsSection,

    /// Relabel rules applied to the catalog before enrichment.
    #[serde(default)]
    pub relabel: RuleTable,
}

/// Configuration for the enrich command.
#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentSection {
    /// Directory holding one sub-directory per storage identifier.
    pub basepath: Option<PathBuf>,

    /// Archive file name suffix.
    pub suffix: Option<String>,

    /// Compute firing rates and burstiness.
    pub compute_metrics: Option<bool>,

    /// Minimum unit count for admission.
    pub min_units: Option<usize>,

    /// Burstiness histogram bin width in milliseconds.
    pub bin_size_ms: Option<f64>,
}

/// Configuration for the phases command.
#[derive(Debug, Default, Deserialize)]
pub struct WindowsSection {
    /// Rate used to convert stitch points to milliseconds.
    pub sampling_rate: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
