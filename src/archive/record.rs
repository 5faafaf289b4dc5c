use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ArchiveError, NeuronData};

/// Untyped view of the `qm` entry; every key is optional here so that
/// absence can be reported by name instead of as a generic serde error.
#[derive(Debug, Deserialize)]
struct RawRecord {
    train: Option<Map<String, Value>>,
    fs: Option<Value>,
    config: Option<Value>,
    neuron_data: Option<Value>,
}

/// Validated contents of the `qm` record entry
#[derive(Debug, Clone, PartialEq)]
pub struct QmRecord {
    /// Unit id and sample indices, in archive order
    pub train: Vec<(String, Vec<u64>)>,
    /// Sampling rate in samples per second
    pub fs: f64,
    /// Free-form run configuration, if recorded
    pub config: Option<Value>,
    /// Per-unit metadata with the wrapper entry removed
    pub neuron_data: NeuronData,
}

impl QmRecord {
    /// Decode and validate a record from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let raw: RawRecord = serde_json::from_slice(bytes)?;

        let train = decode_train(raw.train.ok_or(ArchiveError::MissingKey("train"))?)?;
        let fs = decode_fs(raw.fs.ok_or(ArchiveError::MissingKey("fs"))?)?;
        let neuron_data =
            unwrap_neuron_data(raw.neuron_data.ok_or(ArchiveError::MissingKey("neuron_data"))?)?;

        Ok(Self {
            train,
            fs,
            config: raw.config.filter(|c| !c.is_null()),
            neuron_data,
        })
    }

    /// Serialize back to the on-disk JSON layout (wrapper entry included)
    pub fn to_value(&self) -> Value {
        let mut train = Map::new();
        for (unit, indices) in &self.train {
            train.insert(unit.clone(), Value::from(indices.clone()));
        }

        let mut wrapper = Map::new();
        wrapper.insert("0".to_string(), Value::Object(self.neuron_data.clone()));

        let mut record = Map::new();
        record.insert("train".to_string(), Value::Object(train));
        record.insert("fs".to_string(), Value::from(self.fs));
        if let Some(config) = &self.config {
            record.insert("config".to_string(), config.clone());
        }
        record.insert("neuron_data".to_string(), Value::Object(wrapper));
        Value::Object(record)
    }
}

fn decode_train(train: Map<String, Value>) -> Result<Vec<(String, Vec<u64>)>, ArchiveError> {
    let mut units = Vec::with_capacity(train.len());

    for (unit, value) in train {
        let samples = value.as_array().ok_or_else(|| {
            ArchiveError::InvalidFormat(format!("train[{}] is not an array", unit))
        })?;

        let indices = samples
            .iter()
            .map(|s| {
                s.as_u64().ok_or_else(|| {
                    ArchiveError::InvalidFormat(format!(
                        "train[{}] contains {} (expected a non-negative integer sample index)",
                        unit, s
                    ))
                })
            })
            .collect::<Result<Vec<u64>, _>>()?;

        units.push((unit, indices));
    }

    Ok(units)
}

fn decode_fs(fs: Value) -> Result<f64, ArchiveError> {
    match fs.as_f64() {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(ArchiveError::InvalidFormat(format!(
            "fs must be a positive number, got {}",
            fs
        ))),
    }
}

/// `neuron_data` is stored as `{"<group>": {unit: metadata, ...}}`
fn unwrap_neuron_data(value: Value) -> Result<NeuronData, ArchiveError> {
    let Value::Object(wrapper) = value else {
        return Err(ArchiveError::InvalidFormat(
            "neuron_data is not an object".to_string(),
        ));
    };

    if wrapper.len() != 1 {
        return Err(ArchiveError::InvalidFormat(format!(
            "neuron_data wrapper must hold exactly one entry, found {}",
            wrapper.len()
        )));
    }

    match wrapper.into_iter().next() {
        Some((_, Value::Object(units))) => Ok(units),
        Some((key, _)) => Err(ArchiveError::InvalidFormat(format!(
            "neuron_data[{}] is not a unit mapping",
            key
        ))),
        None => Err(ArchiveError::InvalidFormat("neuron_data is empty".to_string())),
    }
}
