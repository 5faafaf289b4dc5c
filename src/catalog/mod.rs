//! # Experiment Catalog
//!
//! The catalog is the table of experiments the enrichment pipeline works on.
//! Rows are held in an arena keyed by experiment name; the storage
//! identifier (`uuids` column) together with the experiment name resolves
//! a row to its curation archive:
//!
//! ```text
//! {basepath}/{uuid}/{experiment_name}_params_params_low_ISI_acqm.zip
//! ```
//!
//! Any other columns of the source table are kept verbatim as string
//! attributes, in their original order.

pub mod accessor;
pub mod age;
mod csv_io;
mod error;

#[cfg(test)]
mod tests;

pub use accessor::CatalogAccessor;
pub use age::parse_age_days;
pub use error::CatalogError;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::spikes::SpikeTrains;

/// Storage identifier column
pub const UUID_COLUMN: &str = "uuids";
/// Experiment name column
pub const EXPERIMENT_COLUMN: &str = "experiment_name";
/// Free-text organoid age column
pub const AGE_COLUMN: &str = "org_age";

/// Archive file name suffix appended to the experiment name
pub const DEFAULT_ARCHIVE_SUFFIX: &str = "_params_params_low_ISI_acqm.zip";

/// Resolve the archive path of an experiment
pub fn archive_path(basepath: &Path, uuid: &str, experiment_name: &str, suffix: &str) -> PathBuf {
    basepath
        .join(uuid)
        .join(format!("{}{}", experiment_name, suffix))
}

/// Why a row was not processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFailure {
    /// Resolved archive path does not exist
    FileNotFound,
    /// Archive could not be read or decoded
    LoadFailed(String),
    /// Recording was excluded by the unit-count admission filter
    InsufficientUnits {
        /// Units in the recording
        found: usize,
        /// Configured minimum
        minimum: usize,
    },
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFailure::FileNotFound => write!(f, "File not found"),
            RowFailure::LoadFailed(message) => write!(f, "{}", message),
            RowFailure::InsufficientUnits { found, minimum } => {
                write!(f, "Insufficient units: {} (minimum: {})", found, minimum)
            }
        }
    }
}

impl FromStr for RowFailure {
    type Err = std::convert::Infallible;

    /// Recover a failure from its stored message
    fn from_str(message: &str) -> Result<Self, Self::Err> {
        if message == "File not found" {
            return Ok(RowFailure::FileNotFound);
        }
        if let Some(rest) = message.strip_prefix("Insufficient units: ") {
            let parsed = rest.strip_suffix(')').and_then(|rest| {
                let (found, minimum) = rest.split_once(" (minimum: ")?;
                Some((found.parse().ok()?, minimum.parse().ok()?))
            });
            if let Some((found, minimum)) = parsed {
                return Ok(RowFailure::InsufficientUnits { found, minimum });
            }
        }
        Ok(RowFailure::LoadFailed(message.to_string()))
    }
}

/// Processing state of a row after an enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowStatus {
    /// Not yet visited by a pipeline pass
    #[default]
    Unprocessed,
    /// Loaded and admitted
    Processed,
    /// Visited but not admitted
    Failed(RowFailure),
}

/// Enrichment fields written by the pipeline
///
/// A pass replaces the whole record at once, so readers never observe a mix
/// of fields from two passes.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Units in the recording, once the archive has been read
    pub num_units: Option<usize>,
    /// Processing state
    pub status: RowStatus,
    /// JSON-serialized burstiness value
    pub burstiness: Option<String>,
    /// Per-unit firing rates in Hz
    pub firing_rates: Option<Vec<f64>>,
    /// Mean of `firing_rates`
    pub mean_firing_rate: Option<f64>,
    /// Median of `firing_rates`
    pub median_firing_rate: Option<f64>,
    /// Loaded spike trains; only kept for admitted rows
    pub spike_trains: Option<Arc<SpikeTrains>>,
}

impl Enrichment {
    /// Record for a row that was not admitted
    pub fn failed(failure: RowFailure) -> Self {
        Self {
            status: RowStatus::Failed(failure),
            ..Default::default()
        }
    }

    /// True only for admitted rows
    pub fn processed(&self) -> bool {
        self.status == RowStatus::Processed
    }

    /// Error message of a failed row
    pub fn error(&self) -> Option<String> {
        match &self.status {
            RowStatus::Failed(failure) => Some(failure.to_string()),
            _ => None,
        }
    }
}

/// One experiment
#[derive(Debug, Clone)]
pub struct CatalogRow {
    /// Storage identifier
    pub uuid: String,
    /// Experiment name, unique within the catalog
    pub experiment_name: String,
    /// Age as written in the source table
    pub org_age: Option<String>,
    /// Age normalized to whole days
    pub org_age_days: Option<i64>,
    attributes: HashMap<String, String>,
    /// Pipeline output
    pub enrichment: Enrichment,
}

impl CatalogRow {
    /// Row with identity fields only
    pub fn new(uuid: impl Into<String>, experiment_name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            experiment_name: experiment_name.into(),
            org_age: None,
            org_age_days: None,
            attributes: HashMap::new(),
            enrichment: Enrichment::default(),
        }
    }

    /// Set the raw age text
    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.org_age = Some(age.into());
        self
    }

    /// Set an attribute column
    pub fn with_attribute(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    /// Value of any text column, identity columns included
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            UUID_COLUMN => Some(&self.uuid),
            EXPERIMENT_COLUMN => Some(&self.experiment_name),
            AGE_COLUMN => self.org_age.as_deref(),
            _ => self.attributes.get(column).map(String::as_str),
        }
    }

    /// Overwrite a non-identity text column
    pub fn set_field(&mut self, column: &str, value: impl Into<String>) -> Result<(), CatalogError> {
        match column {
            UUID_COLUMN | EXPERIMENT_COLUMN => Err(CatalogError::ImmutableField(column.to_string())),
            AGE_COLUMN => {
                self.org_age = Some(value.into());
                Ok(())
            }
            _ => {
                self.attributes.insert(column.to_string(), value.into());
                Ok(())
            }
        }
    }

    /// Archive path under `basepath`
    pub fn archive_path(&self, basepath: &Path, suffix: &str) -> PathBuf {
        archive_path(basepath, &self.uuid, &self.experiment_name, suffix)
    }
}

/// Row arena keyed by experiment name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    columns: Vec<String>,
    rows: Vec<CatalogRow>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog from rows, rejecting duplicate experiment names
    pub fn from_rows(rows: Vec<CatalogRow>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for row in rows {
            catalog.push(row)?;
        }
        Ok(catalog)
    }

    /// Append a row
    pub fn push(&mut self, row: CatalogRow) -> Result<(), CatalogError> {
        if self.index.contains_key(&row.experiment_name) {
            return Err(CatalogError::DuplicateExperiment(row.experiment_name));
        }
        for column in row.attributes.keys() {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.index.insert(row.experiment_name.clone(), self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// Attribute columns in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Register an attribute column so it is written even if no row sets it
    pub fn ensure_column(&mut self, column: &str) {
        let reserved = [UUID_COLUMN, EXPERIMENT_COLUMN, AGE_COLUMN];
        if !reserved.contains(&column) && !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the catalog has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in catalog order
    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    /// Mutable rows in catalog order. Identity fields must not be changed
    /// through this; use [`CatalogRow::set_field`] for text columns.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut CatalogRow> {
        self.rows.iter_mut()
    }

    /// Row by experiment name
    pub fn get(&self, experiment_name: &str) -> Option<&CatalogRow> {
        self.index.get(experiment_name).map(|&i| &self.rows[i])
    }

    /// Mutable row by experiment name
    pub fn get_mut(&mut self, experiment_name: &str) -> Option<&mut CatalogRow> {
        match self.index.get(experiment_name) {
            Some(&i) => self.rows.get_mut(i),
            None => None,
        }
    }

    /// Keep only rows matching `keep`, preserving order
    pub fn retain<F: FnMut(&CatalogRow) -> bool>(&mut self, keep: F) {
        self.rows.retain(keep);
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.experiment_name.clone(), i))
            .collect();
    }

    /// Check that every row has both identity fields
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.uuid.trim().is_empty() {
                return Err(CatalogError::MissingIdentity {
                    row: i,
                    column: UUID_COLUMN,
                });
            }
            if row.experiment_name.trim().is_empty() {
                return Err(CatalogError::MissingIdentity {
                    row: i,
                    column: EXPERIMENT_COLUMN,
                });
            }
        }
        Ok(())
    }

    /// Fill `org_age` from two date columns for rows where both parse.
    /// Returns the number of rows updated.
    pub fn derive_org_age(&mut self, experiment_date_column: &str, agg_date_column: &str) -> usize {
        let mut updated = 0;
        for row in &mut self.rows {
            let age = match (
                row.attributes.get(experiment_date_column),
                row.attributes.get(agg_date_column),
            ) {
                (Some(recorded), Some(aggregated)) => age::age_between(recorded, aggregated),
                _ => None,
            };
            if let Some(age) = age {
                row.org_age = Some(age);
                updated += 1;
            }
        }
        updated
    }
}
