//! Burstiness strategies and summary statistics over spike trains.

use std::collections::HashMap;

use serde_json::Value;

use super::SpikeTrains;

/// Value reported when burstiness cannot be computed from the spikes present
pub const UNDEFINED_BURSTINESS: f64 = -1.0;

/// Default population histogram bin width in milliseconds
pub const DEFAULT_BIN_SIZE_MS: f64 = 40.0;

/// Result of a burstiness computation
#[derive(Debug, Clone, PartialEq)]
pub enum Burstiness {
    /// One value for the whole recording
    Scalar(f64),
    /// One value per unit, indexed like the collection's units
    PerUnit(Vec<f64>),
}

impl Burstiness {
    /// JSON text stored in the catalog's `burstiness` column
    pub fn to_json(&self) -> String {
        match self {
            Burstiness::Scalar(v) => Value::from(*v).to_string(),
            Burstiness::PerUnit(values) => Value::from(values.clone()).to_string(),
        }
    }
}

/// A pluggable burstiness computation
///
/// Implementations must be deterministic and must not return NaN for
/// recordings with fewer than two spikes per unit.
pub trait BurstinessMetric: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Compute the metric
    fn compute(&self, spikes: &SpikeTrains) -> Burstiness;
}

/// Share of population spikes falling in the busiest 15% of time bins,
/// rescaled so that a flat rate gives 0 and fully clustered activity gives 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationBurstiness {
    /// Histogram bin width in milliseconds
    pub bin_size_ms: f64,
}

impl PopulationBurstiness {
    /// Strategy with a custom bin width
    pub fn new(bin_size_ms: f64) -> Self {
        Self { bin_size_ms }
    }
}

impl Default for PopulationBurstiness {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_SIZE_MS)
    }
}

impl BurstinessMetric for PopulationBurstiness {
    fn name(&self) -> &'static str {
        "population"
    }

    fn compute(&self, spikes: &SpikeTrains) -> Burstiness {
        let total = spikes.total_spikes();
        if total == 0 || !self.bin_size_ms.is_finite() || self.bin_size_ms <= 0.0 {
            return Burstiness::Scalar(UNDEFINED_BURSTINESS);
        }

        // Only occupied bins are stored; empty bins never reach the top 15%
        // ahead of an occupied one.
        let n_bins = (spikes.recording_length() / self.bin_size_ms).floor() + 1.0;
        let last_bin = (n_bins - 1.0) as u64;
        let mut counts: HashMap<u64, u64> = HashMap::new();
        for &t in spikes.trains().iter().flatten() {
            // float-to-int casts saturate, so negative (rebased) times land in bin 0
            let bin = ((t / self.bin_size_ms).floor() as u64).min(last_bin);
            *counts.entry(bin).or_insert(0) += 1;
        }

        let n_top = n_bins - (n_bins * 0.85).round();
        if n_top <= 0.0 {
            return Burstiness::Scalar(1.0);
        }

        let mut occupied: Vec<u64> = counts.into_values().collect();
        occupied.sort_unstable_by(|a, b| b.cmp(a));
        let top: u64 = occupied.iter().take(n_top as usize).sum();
        let f15 = top as f64 / total as f64;
        Burstiness::Scalar((f15 - 0.15) / 0.85)
    }
}

/// Coefficient of variation of each unit's inter-spike intervals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsiCv;

impl BurstinessMetric for IsiCv {
    fn name(&self) -> &'static str {
        "isi_cv"
    }

    fn compute(&self, spikes: &SpikeTrains) -> Burstiness {
        let values = spikes
            .trains()
            .iter()
            .map(|train| {
                let intervals: Vec<f64> = train.windows(2).map(|w| w[1] - w[0]).collect();
                match (mean(&intervals), std_dev(&intervals)) {
                    (Some(m), Some(sd)) if m > 0.0 => sd / m,
                    _ => UNDEFINED_BURSTINESS,
                }
            })
            .collect();
        Burstiness::PerUnit(values)
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (mean of the two middle values for even lengths), `None` for an empty slice
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}
