//! Stitch-point sidecar files.
//!
//! A sidecar is a JSON array of `[label, sample_index]` pairs stored next to
//! the recording as `{name}_stitch_inds.json`. Only the sample indices are
//! used, in file order.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::Value;

use super::WindowError;

/// File name suffix of stitch sidecars
pub const SIDECAR_SUFFIX: &str = "_stitch_inds.json";

/// Sidecar path for a recording inside `dir`
pub fn sidecar_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{}", name, SIDECAR_SUFFIX))
}

/// Parse sidecar JSON into sample indices
pub fn parse_stitch_points(json: &str) -> Result<Vec<u64>, WindowError> {
    let entries: Vec<(Value, Value)> = serde_json::from_str(json)
        .map_err(|e| WindowError::InvalidSidecar(e.to_string()))?;

    entries
        .into_iter()
        .map(|(label, index)| {
            as_sample_index(&index).ok_or_else(|| {
                WindowError::InvalidSidecar(format!(
                    "entry {} has sample index {} (expected a non-negative integer)",
                    label, index
                ))
            })
        })
        .collect()
}

// Integral floats are accepted; sidecars written from float arrays store "1200000.0".
fn as_sample_index(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

/// Read a sidecar file
///
/// A missing file is not an error: it yields `Ok(None)` and a warning, and
/// callers fall back to the default window schedule.
pub fn read_stitch_points<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u64>>, WindowError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(json) => parse_stitch_points(&json).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "No stitch points found at {}; using default windows",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Read `{basepath}/{uuid}/{name}_stitch_inds.json`
pub fn load_stitch_points<P: AsRef<Path>>(
    basepath: P,
    uuid: &str,
    name: &str,
) -> Result<Option<Vec<u64>>, WindowError> {
    read_stitch_points(sidecar_path(&basepath.as_ref().join(uuid), name))
}

/// Read `{basepath}/{name}_stitch_inds.json`, for drug recordings kept
/// outside the per-uuid layout
pub fn load_stitch_points_flat<P: AsRef<Path>>(
    basepath: P,
    name: &str,
) -> Result<Option<Vec<u64>>, WindowError> {
    read_stitch_points(sidecar_path(basepath.as_ref(), name))
}
