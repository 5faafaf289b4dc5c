//! # Spike Trains
//!
//! [`SpikeTrains`] is the canonical in-memory form of one recording: one
//! ascending sequence of spike times per unit, in milliseconds.
//!
//! Times taken from [`SpikeTrains::subtime`] stay on the parent recording's
//! clock. Use [`SpikeTrains::rebased`] when phase-relative times are needed.

mod error;
pub mod metrics;


pub use error::SpikeDataError;
pub use metrics::{Burstiness, BurstinessMetric, IsiCv, PopulationBurstiness, UNDEFINED_BURSTINESS};

use log::debug;
use serde_json::Value;

use crate::archive::NeuronData;

/// Spike times per unit with the metadata they were loaded with
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeTrains {
    unit_ids: Vec<String>,
    trains: Vec<Vec<f64>>,
    length: f64,
    neuron_data: NeuronData,
    config: Option<Value>,
}

impl SpikeTrains {
    /// Build from unit id / millisecond time pairs
    ///
    /// Trains that are not already ascending are sorted. Non-finite times are
    /// rejected.
    pub fn new(
        units: Vec<(String, Vec<f64>)>,
        neuron_data: NeuronData,
        config: Option<Value>,
    ) -> Result<Self, SpikeDataError> {
        let mut unit_ids = Vec::with_capacity(units.len());
        let mut trains = Vec::with_capacity(units.len());

        for (unit, mut times) in units {
            if times.iter().any(|t| !t.is_finite()) {
                return Err(SpikeDataError::NonFiniteSpikeTime { unit });
            }
            if !is_ascending(&times) {
                debug!("Sorting out-of-order spike train for unit {}", unit);
                times.sort_by(f64::total_cmp);
            }
            unit_ids.push(unit);
            trains.push(times);
        }

        Ok(Self::from_parts(unit_ids, trains, neuron_data, config))
    }

    /// Build from plain trains, numbering units from zero
    pub fn from_trains(trains: Vec<Vec<f64>>) -> Result<Self, SpikeDataError> {
        let units = trains
            .into_iter()
            .enumerate()
            .map(|(i, t)| (i.to_string(), t))
            .collect();
        Self::new(units, NeuronData::new(), None)
    }

    /// Build from spike times in seconds, rescaling to milliseconds
    pub fn from_seconds(
        units: Vec<(String, Vec<f64>)>,
        neuron_data: NeuronData,
        config: Option<Value>,
    ) -> Result<Self, SpikeDataError> {
        let units = units
            .into_iter()
            .map(|(unit, times)| (unit, times.into_iter().map(|t| t * 1000.0).collect()))
            .collect();
        Self::new(units, neuron_data, config)
    }

    // Trains must already be ascending and finite.
    fn from_parts(
        unit_ids: Vec<String>,
        trains: Vec<Vec<f64>>,
        neuron_data: NeuronData,
        config: Option<Value>,
    ) -> Self {
        let length = trains
            .iter()
            .filter_map(|t| t.last().copied())
            .fold(0.0, f64::max);

        Self {
            unit_ids,
            trains,
            length,
            neuron_data,
            config,
        }
    }

    /// Number of units
    pub fn unit_count(&self) -> usize {
        self.trains.len()
    }

    /// Unit ids in load order
    pub fn unit_ids(&self) -> &[String] {
        &self.unit_ids
    }

    /// All trains, indexed like [`unit_ids`](Self::unit_ids)
    pub fn trains(&self) -> &[Vec<f64>] {
        &self.trains
    }

    /// Train of one unit
    pub fn train(&self, index: usize) -> Option<&[f64]> {
        self.trains.get(index).map(Vec::as_slice)
    }

    /// Per-unit metadata
    pub fn neuron_data(&self) -> &NeuronData {
        &self.neuron_data
    }

    /// Run configuration carried over from the archive
    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// Total number of spikes over all units
    pub fn total_spikes(&self) -> usize {
        self.trains.iter().map(Vec::len).sum()
    }

    /// Latest spike time in milliseconds, 0 when there are no spikes
    pub fn recording_length(&self) -> f64 {
        self.length
    }

    /// Spikes per second for one unit
    pub fn firing_rate(&self, index: usize) -> Result<f64, SpikeDataError> {
        let train = self.trains.get(index).ok_or(SpikeDataError::UnitOutOfRange {
            index,
            count: self.trains.len(),
        })?;
        if self.length <= 0.0 {
            return Err(SpikeDataError::DegenerateRecording);
        }
        if train.is_empty() {
            return Ok(0.0);
        }
        Ok(train.len() as f64 / (self.length / 1000.0))
    }

    /// Spikes per second for every unit
    pub fn firing_rates(&self) -> Result<Vec<f64>, SpikeDataError> {
        (0..self.trains.len()).map(|i| self.firing_rate(i)).collect()
    }

    /// Burstiness with the default [`PopulationBurstiness`] strategy
    pub fn burstiness_index(&self) -> Burstiness {
        PopulationBurstiness::default().compute(self)
    }

    /// Burstiness with a caller-supplied strategy
    pub fn burstiness_with(&self, metric: &dyn BurstinessMetric) -> Burstiness {
        metric.compute(self)
    }

    /// Spikes with `start_ms <= t < end_ms`, on the original clock
    ///
    /// Every unit is kept, with an empty train if it has no spikes in range.
    pub fn subtime(&self, start_ms: f64, end_ms: f64) -> Result<Self, SpikeDataError> {
        if !start_ms.is_finite() || !end_ms.is_finite() || start_ms > end_ms {
            return Err(SpikeDataError::InvalidRange {
                start: start_ms,
                end: end_ms,
            });
        }

        let trains = self
            .trains
            .iter()
            .map(|train| {
                let lo = train.partition_point(|&t| t < start_ms);
                let hi = train.partition_point(|&t| t < end_ms);
                train[lo..hi].to_vec()
            })
            .collect();

        Ok(Self::from_parts(
            self.unit_ids.clone(),
            trains,
            self.neuron_data.clone(),
            self.config.clone(),
        ))
    }

    /// Copy with every time shifted by `-origin_ms`
    pub fn rebased(&self, origin_ms: f64) -> Result<Self, SpikeDataError> {
        if !origin_ms.is_finite() {
            return Err(SpikeDataError::InvalidRange {
                start: origin_ms,
                end: origin_ms,
            });
        }

        let trains = self
            .trains
            .iter()
            .map(|train| train.iter().map(|t| t - origin_ms).collect())
            .collect();

        Ok(Self::from_parts(
            self.unit_ids.clone(),
            trains,
            self.neuron_data.clone(),
            self.config.clone(),
        ))
    }
}

fn is_ascending(times: &[f64]) -> bool {
    times.windows(2).all(|w| w[0] <= w[1])
}
