//! # Catalog Enrichment Pipeline
//!
//! Visits every catalog row, loads the row's curation archive, applies the
//! unit-count admission filter and optionally computes firing-rate and
//! burstiness metrics. Per-row failures are recorded on the row and never
//! stop the pass.
//!
//! ## Example
//!
//! ```rust,no_run
//! use spikecat::catalog::Catalog;
//! use spikecat::pipeline::{EnrichmentConfig, EnrichmentPipeline};
//!
//! let catalog = Catalog::from_csv_path("catalog_baseline.csv")?;
//! let config = EnrichmentConfig::new("/data/ephys")
//!     .compute_metrics(true)
//!     .min_units(Some(10));
//!
//! let (catalog, report) = EnrichmentPipeline::new(config).enrich(catalog)?;
//! println!("{}", report.stats);
//! println!("{} recordings kept", catalog.len());
//! # Ok::<(), spikecat::catalog::CatalogError>(())
//! ```

mod report;


pub use report::{EnrichmentReport, EnrichmentStats, RowReport};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::archive;
use crate::catalog::{
    parse_age_days, Catalog, CatalogError, CatalogRow, Enrichment, RowFailure, RowStatus,
    DEFAULT_ARCHIVE_SUFFIX,
};
use crate::spikes::metrics::{mean, median, DEFAULT_BIN_SIZE_MS};
use crate::spikes::{BurstinessMetric, PopulationBurstiness, SpikeDataError, SpikeTrains};

/// Settings for one enrichment pass
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Directory holding one sub-directory per storage identifier
    pub basepath: PathBuf,
    /// Archive file name suffix
    pub suffix: String,
    /// Compute firing rates and burstiness for admitted rows
    pub compute_metrics: bool,
    /// Minimum unit count for admission; `None` admits every loaded row
    pub min_units: Option<usize>,
    /// Bin width of the default burstiness strategy
    pub bin_size_ms: f64,
}

impl EnrichmentConfig {
    /// Defaults: standard suffix, no metrics, no admission filter
    pub fn new<P: AsRef<Path>>(basepath: P) -> Self {
        Self {
            basepath: basepath.as_ref().to_path_buf(),
            suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
            compute_metrics: false,
            min_units: None,
            bin_size_ms: DEFAULT_BIN_SIZE_MS,
        }
    }

    /// Set the archive suffix
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Enable or disable metric computation
    pub fn compute_metrics(mut self, enabled: bool) -> Self {
        self.compute_metrics = enabled;
        self
    }

    /// Set the admission threshold
    pub fn min_units(mut self, min_units: Option<usize>) -> Self {
        self.min_units = min_units;
        self
    }
}

/// Outcome of evaluating one row, applied to the catalog in one step
#[derive(Debug, Clone)]
struct RowOutcome {
    org_age_days: Option<i64>,
    archive_path: PathBuf,
    enrichment: Enrichment,
    degenerate: bool,
}

/// Runs enrichment passes over catalogs
pub struct EnrichmentPipeline {
    config: EnrichmentConfig,
    metric: Box<dyn BurstinessMetric>,
}

impl EnrichmentPipeline {
    /// Pipeline using [`PopulationBurstiness`] with the configured bin width
    pub fn new(config: EnrichmentConfig) -> Self {
        let metric = Box::new(PopulationBurstiness::new(config.bin_size_ms));
        Self { config, metric }
    }

    /// Replace the burstiness strategy
    pub fn with_metric(mut self, metric: Box<dyn BurstinessMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Configuration of this pipeline
    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Enrich every row of `catalog`
    ///
    /// With an admission threshold set, only processed rows are returned.
    /// Fails only when a row lacks an identity field.
    pub fn enrich(&self, mut catalog: Catalog) -> Result<(Catalog, EnrichmentReport), CatalogError> {
        catalog.validate()?;
        debug!(
            "Enriching {} rows with {} burstiness (metrics: {}, min units: {:?})",
            catalog.len(),
            self.metric.name(),
            self.config.compute_metrics,
            self.config.min_units
        );

        let outcomes = self.evaluate_all(catalog.rows());

        let mut report = EnrichmentReport::default();
        for (row, outcome) in catalog.rows_mut().zip(outcomes) {
            report.record(row, &outcome.archive_path, &outcome.enrichment, outcome.degenerate);
            row.org_age_days = outcome.org_age_days;
            row.enrichment = outcome.enrichment;
        }

        if let Some(min_units) = self.config.min_units {
            let before = catalog.len();
            catalog.retain(|row| row.enrichment.processed());
            report.stats.dropped = before - catalog.len();
            info!(
                "Filtered from {} to {} recordings with at least {} units",
                before,
                catalog.len(),
                min_units
            );
        }

        Ok((catalog, report))
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, rows: &[CatalogRow]) -> Vec<RowOutcome> {
        rows.iter().map(|row| self.evaluate_row(row)).collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, rows: &[CatalogRow]) -> Vec<RowOutcome> {
        use rayon::prelude::*;
        rows.par_iter().map(|row| self.evaluate_row(row)).collect()
    }

    fn evaluate_row(&self, row: &CatalogRow) -> RowOutcome {
        let org_age_days = row.org_age.as_deref().and_then(parse_age_days);
        let archive_path = row.archive_path(&self.config.basepath, &self.config.suffix);

        let mut outcome = RowOutcome {
            org_age_days,
            archive_path,
            enrichment: Enrichment::default(),
            degenerate: false,
        };

        if !outcome.archive_path.exists() {
            warn!("File not found: {}", outcome.archive_path.display());
            outcome.enrichment = Enrichment::failed(RowFailure::FileNotFound);
            return outcome;
        }

        info!("Processing: {}", outcome.archive_path.display());
        let spikes = match load_spike_trains(&outcome.archive_path) {
            Ok(spikes) => spikes,
            Err(message) => {
                warn!("Error processing {}: {}", row.experiment_name, message);
                outcome.enrichment = Enrichment::failed(RowFailure::LoadFailed(message));
                return outcome;
            }
        };

        let num_units = spikes.unit_count();
        if let Some(minimum) = self.config.min_units {
            if num_units < minimum {
                debug!(
                    "{} rejected by admission filter ({} < {})",
                    row.experiment_name, num_units, minimum
                );
                // spike data is dropped here rather than retained on the row
                let mut enrichment = Enrichment::failed(RowFailure::InsufficientUnits {
                    found: num_units,
                    minimum,
                });
                enrichment.num_units = Some(num_units);
                outcome.enrichment = enrichment;
                return outcome;
            }
        }

        let mut enrichment = Enrichment {
            num_units: Some(num_units),
            ..Default::default()
        };
        if self.config.compute_metrics {
            outcome.degenerate = !self.compute_metrics(&row.experiment_name, &spikes, &mut enrichment);
        }
        enrichment.spike_trains = Some(Arc::new(spikes));
        enrichment.status = RowStatus::Processed;
        outcome.enrichment = enrichment;
        outcome
    }

    /// Returns false when firing rates were undefined
    fn compute_metrics(&self, name: &str, spikes: &SpikeTrains, enrichment: &mut Enrichment) -> bool {
        enrichment.burstiness = Some(self.metric.compute(spikes).to_json());

        match spikes.firing_rates() {
            Ok(rates) => {
                enrichment.mean_firing_rate = mean(&rates);
                enrichment.median_firing_rate = median(&rates);
                enrichment.firing_rates = Some(rates);
                true
            }
            Err(SpikeDataError::DegenerateRecording) => {
                warn!("{} has zero recording length; firing rates left empty", name);
                false
            }
            Err(e) => {
                warn!("{}: firing rates unavailable: {}", name, e);
                false
            }
        }
    }
}

// Any load failure becomes the row's error message.
fn load_spike_trains(path: &Path) -> Result<SpikeTrains, String> {
    let data = archive::load_curation(path).map_err(|e| e.to_string())?;
    data.into_spike_trains().map_err(|e| e.to_string())
}

/// Enrich `catalog` with default settings
///
/// Shorthand for building an [`EnrichmentPipeline`] from the arguments.
pub fn enrich<P: AsRef<Path>>(
    catalog: Catalog,
    basepath: P,
    compute_metrics: bool,
    min_units: Option<usize>,
) -> Result<(Catalog, EnrichmentReport), CatalogError> {
    let config = EnrichmentConfig::new(basepath)
        .compute_metrics(compute_metrics)
        .min_units(min_units);
    EnrichmentPipeline::new(config).enrich(catalog)
}
