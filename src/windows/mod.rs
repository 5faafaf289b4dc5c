//! # Phase Windows
//!
//! Drug experiments are recorded as one continuous trace that is later cut
//! into analysis phases. Phase boundaries come from stitch points (sample
//! indices where recording blocks were joined) or, when no stitch data is
//! available, from a fixed schedule of 10-minute phases.
//!
//! | Phase | From stitch points | Default schedule |
//! |-------|--------------------|------------------|
//! | `baseline` | `[0, p0)` | `[0, 600000)` ms |
//! | `initial` | `[p0, p1)` | `[600000, 1200000)` ms |
//! | `incubated` | `[p1, p2)` | `[1200000, 1800000)` ms |
//!
//! Stitch points are converted with a fixed 20 kHz rate by default, which is
//! not read from the archive's `fs`. [`WindowPartitioner::with_sampling_rate`]
//! makes the rate explicit when the two differ.
//!
//! ## Example
//!
//! ```rust
//! use spikecat::windows::WindowPartitioner;
//!
//! let windows = WindowPartitioner::new().partition(Some(&[1000, 5000, 9000]))?;
//! assert_eq!(windows.get("initial"), Some((50.0, 250.0)));
//! # Ok::<(), spikecat::windows::WindowError>(())
//! ```

mod error;
pub mod sidecar;


pub use error::WindowError;
pub use sidecar::{load_stitch_points, load_stitch_points_flat, parse_stitch_points, read_stitch_points};

use log::debug;

use crate::spikes::SpikeTrains;

/// Sampling rate assumed for stitch-point conversion
pub const DEFAULT_SAMPLING_RATE: f64 = 20_000.0;

/// Length of each phase in the default schedule (10 minutes)
pub const DEFAULT_PHASE_MS: f64 = 10.0 * 60.0 * 1000.0;

/// Phase names in recording order
pub const PHASES: [&str; 3] = ["baseline", "initial", "incubated"];

/// A named `[start_ms, end_ms)` interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseWindow {
    /// Phase name
    pub name: &'static str,
    /// Inclusive start in milliseconds
    pub start_ms: f64,
    /// Exclusive end in milliseconds
    pub end_ms: f64,
}

impl PhaseWindow {
    /// Window duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

/// Ordered, contiguous set of phase windows
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseWindows {
    windows: Vec<PhaseWindow>,
    from_stitch_points: bool,
}

impl PhaseWindows {
    /// Bounds of a phase
    pub fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.window(name).map(|w| (w.start_ms, w.end_ms))
    }

    /// Full window record of a phase
    pub fn window(&self, name: &str) -> Option<&PhaseWindow> {
        self.windows.iter().find(|w| w.name == name)
    }

    /// Windows in phase order
    pub fn iter(&self) -> impl Iterator<Item = &PhaseWindow> {
        self.windows.iter()
    }

    /// Phase names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.windows.iter().map(|w| w.name).collect()
    }

    /// Number of phases
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when no phases are defined
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// True when bounds came from stitch points rather than the default schedule
    pub fn from_stitch_points(&self) -> bool {
        self.from_stitch_points
    }
}

/// Computes phase windows for a recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPartitioner {
    sampling_rate: f64,
}

impl Default for WindowPartitioner {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
        }
    }
}

impl WindowPartitioner {
    /// Partitioner using [`DEFAULT_SAMPLING_RATE`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitioner converting stitch points at a different rate
    pub fn with_sampling_rate(sampling_rate: f64) -> Result<Self, WindowError> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(WindowError::InvalidSamplingRate(sampling_rate));
        }
        Ok(Self { sampling_rate })
    }

    /// Sampling rate used for conversion
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Compute windows from stitch points, or the default schedule when
    /// there are none
    pub fn partition(&self, stitch_points: Option<&[u64]>) -> Result<PhaseWindows, WindowError> {
        let points = match stitch_points {
            Some(points) if !points.is_empty() => points,
            _ => return Ok(self.default_windows()),
        };

        if points.len() < PHASES.len() {
            return Err(WindowError::InsufficientStitchPoints {
                expected: PHASES.len(),
                found: points.len(),
            });
        }
        if points.windows(2).any(|w| w[0] > w[1]) {
            return Err(WindowError::UnorderedStitchPoints(points.to_vec()));
        }
        if points.len() > PHASES.len() {
            debug!(
                "Ignoring {} stitch points past the last phase",
                points.len() - PHASES.len()
            );
        }

        let mut start = 0.0;
        let windows = PHASES
            .iter()
            .zip(points)
            .map(|(&name, &marker)| {
                let end = self.samples_to_ms(marker);
                let window = PhaseWindow {
                    name,
                    start_ms: start,
                    end_ms: end,
                };
                start = end;
                window
            })
            .collect();

        Ok(PhaseWindows {
            windows,
            from_stitch_points: true,
        })
    }

    /// The fixed 10-minute schedule
    pub fn default_windows(&self) -> PhaseWindows {
        let windows = PHASES
            .iter()
            .enumerate()
            .map(|(i, &name)| PhaseWindow {
                name,
                start_ms: i as f64 * DEFAULT_PHASE_MS,
                end_ms: (i + 1) as f64 * DEFAULT_PHASE_MS,
            })
            .collect();

        PhaseWindows {
            windows,
            from_stitch_points: false,
        }
    }

    fn samples_to_ms(&self, marker: u64) -> f64 {
        marker as f64 / self.sampling_rate * 1000.0
    }
}

/// Spikes of one phase, on the original recording clock
pub fn extract_phase(
    spikes: &SpikeTrains,
    windows: &PhaseWindows,
    phase: &str,
) -> Result<SpikeTrains, WindowError> {
    let (start, end) = windows
        .get(phase)
        .ok_or_else(|| WindowError::UnknownPhase(phase.to_string()))?;
    Ok(spikes.subtime(start, end)?)
}

/// Every phase in order
pub fn split_phases(
    spikes: &SpikeTrains,
    windows: &PhaseWindows,
) -> Result<Vec<(&'static str, SpikeTrains)>, WindowError> {
    windows
        .iter()
        .map(|w| Ok((w.name, spikes.subtime(w.start_ms, w.end_ms)?)))
        .collect()
}
