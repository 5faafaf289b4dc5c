use crate::spikes::SpikeDataError;

/// Errors that can occur while computing or applying phase windows
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// Requested phase is not part of the window set
    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    /// Fewer stitch points than phases to derive
    #[error("Expected at least {expected} stitch points, got {found}")]
    InsufficientStitchPoints {
        /// Markers needed
        expected: usize,
        /// Markers supplied
        found: usize,
    },

    /// Stitch points go backwards
    #[error("Stitch points must be non-decreasing: {0:?}")]
    UnorderedStitchPoints(Vec<u64>),

    /// Sampling rate is not a positive finite number
    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),

    /// Sidecar exists but is not a list of `[label, sample_index]` pairs
    #[error("Invalid stitch sidecar: {0}")]
    InvalidSidecar(String),

    /// I/O error reading the sidecar
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error slicing the spike trains
    #[error("Spike data error: {0}")]
    SpikeDataError(#[from] SpikeDataError),
}
