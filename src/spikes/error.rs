/// Errors raised by spike-train construction and queries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpikeDataError {
    /// Recording length is zero, so rates are undefined
    #[error("Degenerate recording: length is zero, firing rates are undefined")]
    DegenerateRecording,

    /// A spike time is NaN or infinite
    #[error("Non-finite spike time in unit {unit}")]
    NonFiniteSpikeTime {
        /// Unit id holding the bad value
        unit: String,
    },

    /// Unit index past the end of the collection
    #[error("Unit index {index} out of range ({count} units)")]
    UnitOutOfRange {
        /// Requested index
        index: usize,
        /// Number of units in the collection
        count: usize,
    },

    /// Time range bounds are not finite or start after end
    #[error("Invalid time range: [{start}, {end})")]
    InvalidRange {
        /// Range start in milliseconds
        start: f64,
        /// Range end in milliseconds
        end: f64,
    },
}
