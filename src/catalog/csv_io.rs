//! CSV persistence of the catalog table.
//!
//! The loaded spike-train handle is never written; reading an enriched table
//! back restores every other enrichment column.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use super::{
    parse_age_days, Catalog, CatalogError, CatalogRow, Enrichment, RowFailure, RowStatus,
    AGE_COLUMN, EXPERIMENT_COLUMN, UUID_COLUMN,
};

const NUM_UNITS: &str = "num_units";
const PROCESSED: &str = "processed";
const ERROR: &str = "error";
const BURSTINESS: &str = "burstiness";
const FIRING_RATES: &str = "firing_rates";
const MEAN_FIRING_RATE: &str = "mean_firing_rate";
const MEDIAN_FIRING_RATE: &str = "median_firing_rate";
// In-memory handle column of enriched tables; never persisted.
const DATA_OBJ: &str = "data_obj";

const ENRICHMENT_COLUMNS: [&str; 8] = [
    NUM_UNITS,
    PROCESSED,
    ERROR,
    BURSTINESS,
    FIRING_RATES,
    MEAN_FIRING_RATE,
    MEDIAN_FIRING_RATE,
    DATA_OBJ,
];

impl Catalog {
    /// Read a catalog from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Read a catalog from CSV text with a header row
    ///
    /// `uuids` and `experiment_name` are required. Unnamed columns (a
    /// written row index) are skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        for required in [UUID_COLUMN, EXPERIMENT_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(CatalogError::MissingColumn(required.to_string()));
            }
        }

        let mut catalog = Catalog::new();
        for header in &headers {
            if !is_index_column(header) && !ENRICHMENT_COLUMNS.contains(&header.as_str()) {
                catalog.ensure_column(header);
            }
        }

        for record in csv_reader.records() {
            let record = record?;
            let mut row = CatalogRow::new("", "");
            let mut processed = None;
            let mut error = None;

            for (header, value) in headers.iter().zip(record.iter()) {
                if is_index_column(header) || value.is_empty() {
                    continue;
                }
                match header.as_str() {
                    UUID_COLUMN => row.uuid = value.to_string(),
                    EXPERIMENT_COLUMN => row.experiment_name = value.to_string(),
                    AGE_COLUMN => {
                        row.org_age_days = parse_age_days(value);
                        row.org_age = Some(value.to_string());
                    }
                    NUM_UNITS => row.enrichment.num_units = Some(parse_count(header, value)?),
                    PROCESSED => processed = Some(parse_bool(header, value)?),
                    ERROR => error = Some(value.to_string()),
                    BURSTINESS => row.enrichment.burstiness = Some(value.to_string()),
                    FIRING_RATES => {
                        let rates = serde_json::from_str(value).map_err(|_| invalid(header, value))?;
                        row.enrichment.firing_rates = Some(rates);
                    }
                    MEAN_FIRING_RATE => {
                        row.enrichment.mean_firing_rate = Some(parse_float(header, value)?)
                    }
                    MEDIAN_FIRING_RATE => {
                        row.enrichment.median_firing_rate = Some(parse_float(header, value)?)
                    }
                    DATA_OBJ => {}
                    _ => {
                        row.set_field(header, value)?;
                    }
                }
            }

            row.enrichment.status = match (processed, error) {
                (Some(true), _) => RowStatus::Processed,
                (_, Some(message)) => RowStatus::Failed(
                    message.parse().unwrap_or(RowFailure::LoadFailed(message)),
                ),
                _ => RowStatus::Unprocessed,
            };
            catalog.push(row)?;
        }

        debug!("Loaded catalog with {} rows", catalog.len());
        catalog.validate()?;
        Ok(catalog)
    }

    /// Write the catalog as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CatalogError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = vec![UUID_COLUMN, EXPERIMENT_COLUMN, AGE_COLUMN];
        header.extend(self.columns().iter().map(String::as_str));
        header.extend(ENRICHMENT_COLUMNS.iter().filter(|c| **c != DATA_OBJ));
        csv_writer.write_record(&header)?;

        for row in self.rows() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            record.push(row.uuid.clone());
            record.push(row.experiment_name.clone());
            record.push(match (row.org_age_days, &row.org_age) {
                (Some(days), _) => days.to_string(),
                (None, Some(raw)) => raw.clone(),
                (None, None) => String::new(),
            });
            for column in self.columns() {
                record.push(row.field(column).unwrap_or_default().to_string());
            }
            record.extend(enrichment_fields(&row.enrichment));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write the catalog to `path`, replacing it only once fully written
    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_csv(temp.as_file_mut())?;
        temp.persist(path).map_err(|e| CatalogError::IoError(e.error))?;
        Ok(())
    }
}

fn enrichment_fields(enrichment: &Enrichment) -> [String; 7] {
    let processed = match enrichment.status {
        RowStatus::Unprocessed => String::new(),
        RowStatus::Processed => "True".to_string(),
        RowStatus::Failed(_) => "False".to_string(),
    };
    [
        enrichment.num_units.map(|n| n.to_string()).unwrap_or_default(),
        processed,
        enrichment.error().unwrap_or_default(),
        enrichment.burstiness.clone().unwrap_or_default(),
        enrichment
            .firing_rates
            .as_ref()
            .map(|rates| serde_json::Value::from(rates.clone()).to_string())
            .unwrap_or_default(),
        enrichment.mean_firing_rate.map(|v| v.to_string()).unwrap_or_default(),
        enrichment.median_firing_rate.map(|v| v.to_string()).unwrap_or_default(),
    ]
}

fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:")
}

fn invalid(column: &str, value: &str) -> CatalogError {
    CatalogError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}

// Pandas writes integer columns holding nulls as floats ("12.0").
fn parse_count(column: &str, value: &str) -> Result<usize, CatalogError> {
    value
        .parse::<usize>()
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as usize)
        })
        .ok_or_else(|| invalid(column, value))
}

fn parse_float(column: &str, value: &str) -> Result<f64, CatalogError> {
    value.parse().map_err(|_| invalid(column, value))
}

fn parse_bool(column: &str, value: &str) -> Result<bool, CatalogError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(column, value)),
    }
}
