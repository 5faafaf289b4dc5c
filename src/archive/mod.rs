//! # Curation Archive Module
//!
//! Reads the ZIP containers produced by spike-sorting curation. Each archive
//! holds a single record entry ([`QM_ENTRY`]) with the keys:
//!
//! | Key | Required | Contents |
//! |-----|----------|----------|
//! | `train` | Yes | unit id -> array of sample indices |
//! | `fs` | Yes | sampling rate (samples/second) |
//! | `neuron_data` | Yes | single-entry wrapper around unit id -> metadata |
//! | `config` | No | free-form run configuration |
//!
//! ## Example
//!
//! ```rust,no_run
//! use spikecat::archive::load_curation;
//!
//! let data = load_curation("exp_params_params_low_ISI_acqm.zip")?;
//! println!("{} units at {} Hz", data.unit_count(), data.fs);
//! # Ok::<(), spikecat::archive::ArchiveError>(())
//! ```

mod error;
mod record;


pub use error::ArchiveError;
pub use record::QmRecord;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::spikes::{SpikeDataError, SpikeTrains};

/// Name of the record entry inside a curation archive
pub const QM_ENTRY: &str = "qm.json";

/// Per-unit metadata keyed by unit id
pub type NeuronData = Map<String, Value>;

/// Decoded contents of one curation archive
#[derive(Debug, Clone)]
pub struct CurationData {
    /// Spike times in seconds per unit, in archive order
    pub trains: Vec<(String, Vec<f64>)>,
    /// Per-unit metadata
    pub neuron_data: NeuronData,
    /// Run configuration, if the archive carries one
    pub config: Option<Value>,
    /// Sampling rate in samples per second
    pub fs: f64,
}

impl CurationData {
    /// Convert a validated record, dividing sample indices by `fs`
    pub fn from_record(record: QmRecord) -> Self {
        let fs = record.fs;
        let trains = record
            .train
            .into_iter()
            .map(|(unit, indices)| {
                let times = indices.into_iter().map(|i| i as f64 / fs).collect();
                (unit, times)
            })
            .collect();

        Self {
            trains,
            neuron_data: record.neuron_data,
            config: record.config,
            fs,
        }
    }

    /// Number of units in the archive
    pub fn unit_count(&self) -> usize {
        self.trains.len()
    }

    /// Build the canonical millisecond representation
    pub fn into_spike_trains(self) -> Result<SpikeTrains, SpikeDataError> {
        SpikeTrains::from_seconds(self.trains, self.neuron_data, self.config)
    }
}

/// Load a curation archive from disk
pub fn load_curation<P: AsRef<Path>>(path: P) -> Result<CurationData, ArchiveError> {
    let record = read_record(path)?;
    Ok(CurationData::from_record(record))
}

/// Alias of [`load_curation`] for callers holding a full path
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<CurationData, ArchiveError> {
    load_curation(path)
}

/// Read and validate the record entry without converting sample indices
pub fn read_record<P: AsRef<Path>>(path: P) -> Result<QmRecord, ArchiveError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ArchiveError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut bytes = Vec::new();
    {
        let mut entry = archive.by_name(QM_ENTRY).map_err(|_| {
            ArchiveError::InvalidFormat(format!("archive missing {}", QM_ENTRY))
        })?;
        entry.read_to_end(&mut bytes)?;
    }

    debug!("Read {} bytes of {} from {}", bytes.len(), QM_ENTRY, path.display());
    QmRecord::from_slice(&bytes)
}

/// Builder for writing curation archives in the layout [`load_curation`] reads
#[derive(Debug, Clone)]
pub struct CurationArchive {
    record: QmRecord,
}

impl CurationArchive {
    /// Start an archive with the given sampling rate and no units
    pub fn new(fs: f64) -> Self {
        Self {
            record: QmRecord {
                train: Vec::new(),
                fs,
                config: None,
                neuron_data: NeuronData::new(),
            },
        }
    }

    /// Add a unit with its sample indices and metadata
    pub fn add_unit(mut self, unit: impl Into<String>, indices: Vec<u64>, metadata: Value) -> Self {
        let unit = unit.into();
        self.record.neuron_data.insert(unit.clone(), metadata);
        self.record.train.push((unit, indices));
        self
    }

    /// Attach a run configuration
    pub fn config(mut self, config: Value) -> Self {
        self.record.config = Some(config);
        self
    }

    /// Record that will be written
    pub fn record(&self) -> &QmRecord {
        &self.record
    }

    /// Write the archive, creating parent directories as needed
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ArchiveError> {
        write_record(path, &self.record.to_value())
    }
}

/// Write an arbitrary JSON value as the record entry of a new archive
///
/// No validation is applied, so this can also produce archives that
/// [`load_curation`] rejects.
pub fn write_record<P: AsRef<Path>>(path: P, record: &Value) -> Result<(), ArchiveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut zip_writer = ZipWriter::new(BufWriter::new(file));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    zip_writer.start_file(QM_ENTRY, options)?;
    zip_writer.write_all(&serde_json::to_vec(record)?)?;

    let mut inner = zip_writer.finish()?;
    inner.flush()?;
    Ok(())
}
