use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "colorized_output")]
use console::style;

use crate::catalog::{CatalogRow, Enrichment, RowFailure, RowStatus};

/// Counts from a completed enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    /// Rows visited
    pub attempted: usize,
    /// Rows admitted
    pub processed: usize,
    /// Rows whose archive path did not exist
    pub not_found: usize,
    /// Rows whose archive could not be decoded
    pub load_failed: usize,
    /// Rows rejected by the admission filter
    pub insufficient_units: usize,
    /// Admitted rows whose firing rates were undefined
    pub degenerate: usize,
    /// Rows removed from the returned catalog
    pub dropped: usize,
}

impl fmt::Display for EnrichmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Enrichment: {} rows, {} processed, {} not found, {} failed to load, {} below unit minimum, {} dropped",
            self.attempted,
            self.processed,
            self.not_found,
            self.load_failed,
            self.insufficient_units,
            self.dropped
        )
    }
}

/// Outcome of one row
#[derive(Debug, Clone)]
pub struct RowReport {
    /// Experiment name
    pub experiment_name: String,
    /// Archive path that was attempted
    pub archive_path: PathBuf,
    /// Units found, if the archive was read
    pub num_units: Option<usize>,
    /// Final status
    pub status: RowStatus,
}

/// Per-row outcomes and totals of an enrichment pass
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Rows in catalog order, including rows later filtered out
    pub rows: Vec<RowReport>,
    /// Totals
    pub stats: EnrichmentStats,
}

impl EnrichmentReport {
    pub(crate) fn record(
        &mut self,
        row: &CatalogRow,
        archive_path: &Path,
        enrichment: &Enrichment,
        degenerate: bool,
    ) {
        self.stats.attempted += 1;
        match &enrichment.status {
            RowStatus::Processed => self.stats.processed += 1,
            RowStatus::Failed(RowFailure::FileNotFound) => self.stats.not_found += 1,
            RowStatus::Failed(RowFailure::LoadFailed(_)) => self.stats.load_failed += 1,
            RowStatus::Failed(RowFailure::InsufficientUnits { .. }) => {
                self.stats.insufficient_units += 1
            }
            RowStatus::Unprocessed => {}
        }
        if degenerate {
            self.stats.degenerate += 1;
        }

        self.rows.push(RowReport {
            experiment_name: row.experiment_name.clone(),
            archive_path: archive_path.to_path_buf(),
            num_units: enrichment.num_units,
            status: enrichment.status.clone(),
        });
    }

    /// Row outcome by experiment name
    pub fn row(&self, experiment_name: &str) -> Option<&RowReport> {
        self.rows.iter().find(|r| r.experiment_name == experiment_name)
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static SKIP: Emoji<'_, '_> = Emoji("⚠", "[SKIP]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Catalog Enrichment Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("=========================").cyan()));

            for row in &self.rows {
                match &row.status {
                    RowStatus::Processed => output.push_str(&format!(
                        "[{}] {} ({} units)\n",
                        OK,
                        style(&row.experiment_name).green(),
                        row.num_units.unwrap_or_default()
                    )),
                    RowStatus::Failed(failure @ RowFailure::InsufficientUnits { .. }) => {
                        output.push_str(&format!(
                            "[{}] {} - {}\n",
                            SKIP,
                            style(&row.experiment_name).yellow(),
                            failure
                        ))
                    }
                    RowStatus::Failed(failure) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        FAIL,
                        style(&row.experiment_name).red(),
                        style("FAILED").red().bold(),
                        failure
                    )),
                    RowStatus::Unprocessed => {
                        output.push_str(&format!("[ ] {}\n", row.experiment_name))
                    }
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} processed, {} skipped, {} failed, {} dropped\n",
                style("Summary").bold(),
                style(self.stats.processed).green(),
                style(self.stats.insufficient_units).yellow(),
                style(self.stats.not_found + self.stats.load_failed).red(),
                self.stats.dropped
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for EnrichmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog Enrichment Report")?;
        writeln!(f, "=========================")?;

        for row in &self.rows {
            match &row.status {
                RowStatus::Processed => writeln!(
                    f,
                    "[✓] {} ({} units)",
                    row.experiment_name,
                    row.num_units.unwrap_or_default()
                )?,
                RowStatus::Failed(failure @ RowFailure::InsufficientUnits { .. }) => {
                    writeln!(f, "[⚠] {} - {}", row.experiment_name, failure)?
                }
                RowStatus::Failed(failure) => {
                    writeln!(f, "[✗] {} - FAILED: {}", row.experiment_name, failure)?
                }
                RowStatus::Unprocessed => writeln!(f, "[ ] {}", row.experiment_name)?,
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.stats)
    }
}
