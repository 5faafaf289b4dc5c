//! # spikecat - Spike-Sorted Recording Catalogs
//!
//! `spikecat` loads curated spike-sorting output from multi-electrode array
//! recordings and joins it onto an experiment catalog.
//!
//! ## Key Features
//!
//! - **Curation archives**: ZIP containers holding per-unit sample indices,
//!   the sampling rate and per-unit metadata, read with typed validation.
//!
//! - **Spike-train metrics**: firing rates and pluggable burstiness
//!   strategies over an immutable millisecond representation.
//!
//! - **Catalog enrichment**: a single pass over a CSV experiment table that
//!   records unit counts, metrics and per-row failures, with an optional
//!   unit-count admission filter.
//!
//! - **Phase windows**: baseline / initial / incubated windows for drug
//!   experiments from stitch-point sidecars or a fixed 10-minute schedule.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spikecat::catalog::{Catalog, CatalogAccessor};
//! use spikecat::pipeline::{EnrichmentConfig, EnrichmentPipeline};
//! use spikecat::windows::{extract_phase, WindowPartitioner};
//!
//! let catalog = Catalog::from_csv_path("catalog_baseline.csv")?;
//! let config = EnrichmentConfig::new("/data/ephys")
//!     .compute_metrics(true)
//!     .min_units(Some(10));
//! let (catalog, report) = EnrichmentPipeline::new(config).enrich(catalog)?;
//! println!("{}", report.stats);
//!
//! let accessor = CatalogAccessor::new(&catalog, "/data/ephys");
//! let spikes = accessor.spike_trains("Trace_20240510_day28_dmso")?;
//! let windows = WindowPartitioner::new().partition(None)?;
//! let baseline = extract_phase(&spikes, &windows, "baseline")?;
//! println!("{} baseline spikes", baseline.total_spikes());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`archive`]: curation archive reader and writer
//! - [`spikes`]: spike-train collection and burstiness strategies
//! - [`catalog`]: experiment table, CSV persistence and name lookups
//! - [`pipeline`]: enrichment pass and its report
//! - [`windows`]: phase windows and stitch-point sidecars
//! - [`relabel`]: declarative catalog relabel rules

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod catalog;
pub mod pipeline;
pub mod relabel;
pub mod spikes;
pub mod windows;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{load_curation, ArchiveError, CurationArchive, CurationData};
    pub use crate::catalog::{
        Catalog, CatalogAccessor, CatalogError, CatalogRow, Enrichment, RowFailure, RowStatus,
    };
    pub use crate::pipeline::{enrich, EnrichmentConfig, EnrichmentPipeline, EnrichmentReport};
    pub use crate::relabel::{Match, RelabelRule, RuleTable};
    pub use crate::spikes::{
        Burstiness, BurstinessMetric, IsiCv, PopulationBurstiness, SpikeDataError, SpikeTrains,
    };
    pub use crate::windows::{
        extract_phase, split_phases, PhaseWindows, WindowError, WindowPartitioner,
    };
}
