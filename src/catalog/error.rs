use crate::archive::ArchiveError;

/// Errors that can occur while building, persisting or querying a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error reading or writing a catalog file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Required identity column is absent
    #[error("Missing required catalog column: {0}")]
    MissingColumn(String),

    /// Row has an empty identity field
    #[error("Row {row} has an empty {column}")]
    MissingIdentity {
        /// Zero-based row position
        row: usize,
        /// Column that is empty
        column: &'static str,
    },

    /// Two rows share an experiment name
    #[error("Duplicate experiment name: {0}")]
    DuplicateExperiment(String),

    /// No row with this experiment name
    #[error("Experiment {0} not found in catalog")]
    ExperimentNotFound(String),

    /// Row exists but has no loaded spike data
    #[error("Experiment {0} has no spike data loaded")]
    NotLoaded(String),

    /// Attempt to overwrite an identity column
    #[error("Field {0} cannot be modified")]
    ImmutableField(String),

    /// Enrichment column holds a value that cannot be parsed
    #[error("Invalid value {value:?} in column {column}")]
    InvalidValue {
        /// Column name
        column: String,
        /// Offending text
        value: String,
    },

    /// Error loading an archive through the catalog
    #[error("Archive error: {0}")]
    ArchiveError(#[from] ArchiveError),
}
