use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use spikecat::catalog::{Catalog, DEFAULT_ARCHIVE_SUFFIX};
use spikecat::pipeline::{EnrichmentConfig, EnrichmentPipeline};
use spikecat::relabel::RuleTable;
use spikecat::spikes::metrics::DEFAULT_BIN_SIZE_MS;

use super::Config;

pub struct EnrichArgs {
    pub catalog: PathBuf,
    pub basepath: Option<PathBuf>,
    pub metrics: bool,
    pub min_units: Option<usize>,
    pub suffix: Option<String>,
    pub label_drugs: bool,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Enrich a catalog CSV and optionally write the result
pub fn run(args: EnrichArgs) -> Result<()> {
    let file_config = Config::load(args.config.as_deref())?;
    let settings = file_config.enrichment;

    let basepath = args
        .basepath
        .or(settings.basepath)
        .context("No basepath given (use --basepath or [enrichment] basepath)")?;

    let config = EnrichmentConfig {
        basepath,
        suffix: args
            .suffix
            .or(settings.suffix)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_SUFFIX.to_string()),
        compute_metrics: args.metrics || settings.compute_metrics.unwrap_or(false),
        min_units: args.min_units.or(settings.min_units),
        bin_size_ms: settings.bin_size_ms.unwrap_or(DEFAULT_BIN_SIZE_MS),
    };

    let mut catalog = Catalog::from_csv_path(&args.catalog)
        .with_context(|| format!("Failed to read catalog: {}", args.catalog.display()))?;
    info!("Loaded {} rows from {}", catalog.len(), args.catalog.display());

    let mut rules = RuleTable::default();
    if args.label_drugs {
        rules = RuleTable::drug_from_experiment_name();
    }
    for rule in file_config.relabel.rules() {
        rules.push(rule.clone());
    }
    if !rules.is_empty() {
        let writes = rules
            .apply(&mut catalog)
            .context("Failed to apply relabel rules")?;
        info!("Applied {} relabel rules ({} fields written)", rules.len(), writes);
    }

    info!("Archives: {}/<uuid>/<experiment>{}", config.basepath.display(), config.suffix);
    let (catalog, report) = EnrichmentPipeline::new(config)
        .enrich(catalog)
        .context("Enrichment failed")?;

    println!("{}", report.format_colored());

    if let Some(output) = args.output {
        catalog
            .write_csv_path(&output)
            .with_context(|| format!("Failed to write catalog: {}", output.display()))?;
        info!("Wrote {} rows to {}", catalog.len(), output.display());
    }

    Ok(())
}
