use anyhow::{Context, Result};
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};

use spikecat::archive::CurationArchive;
use spikecat::spikes::SpikeTrains;
use spikecat::windows::sidecar::SIDECAR_SUFFIX;

const DEMO_FS: f64 = 20_000.0;

/// Seconds between population bursts
const BURST_PERIOD_S: f64 = 10.0;

/// Spikes each unit contributes to a burst
const BURST_SPIKES: u64 = 5;

/// Generate a synthetic curation archive
pub fn run(output: PathBuf, units: usize, duration: u64, stitch: bool) -> Result<()> {
    if units == 0 || duration == 0 {
        anyhow::bail!("Demo needs at least one unit and a non-zero duration");
    }

    info!("spikecat - Synthetic Curation Archive");
    info!("=====================================");
    info!("Generating {} units over {} s at {} Hz", units, duration, DEMO_FS);

    let mut archive = CurationArchive::new(DEMO_FS).config(json!({
        "sorter": "demo",
        "fs": DEMO_FS,
        "duration_s": duration,
    }));

    let mut total_spikes = 0;
    for unit in 0..units {
        let indices = generate_unit(unit, duration as f64);
        total_spikes += indices.len();
        archive = archive.add_unit(unit.to_string(), indices, unit_metadata(unit));
    }

    archive
        .write(&output)
        .with_context(|| format!("Failed to write archive: {}", output.display()))?;

    info!("Demo archive written!");
    info!("  Output file: {}", output.display());
    info!("  Units: {}", units);
    info!("  Spikes: {}", total_spikes);

    if stitch {
        let sidecar = write_sidecar(&output, duration)?;
        info!("  Stitch sidecar: {}", sidecar.display());
    }

    // Read back through the library so the file is known to be loadable
    let spikes: SpikeTrains = spikecat::archive::load_curation(&output)
        .context("Failed to read back demo archive")?
        .into_spike_trains()?;
    info!("  Burstiness: {}", spikes.burstiness_index().to_json());

    Ok(())
}

/// Tonic firing with a unit-specific rate plus synchronized bursts
fn generate_unit(unit: usize, duration_s: f64) -> Vec<u64> {
    let rate_hz = 1.0 + (unit % 7) as f64;
    let phase = unit as f64 * 0.37;
    let mut times = Vec::new();

    let mut k = 0u64;
    loop {
        let jitter = 0.3 * (k as f64 * 1.7 + phase).sin() / rate_hz;
        let t = (k as f64 + 0.5) / rate_hz + jitter;
        if t >= duration_s {
            break;
        }
        times.push(t);
        k += 1;
    }

    let mut burst_start = BURST_PERIOD_S / 2.0;
    while burst_start < duration_s {
        for s in 0..BURST_SPIKES {
            let t = burst_start + 0.008 * s as f64 + 0.001 * (unit % 4) as f64;
            if t < duration_s {
                times.push(t);
            }
        }
        burst_start += BURST_PERIOD_S;
    }

    let mut indices: Vec<u64> = times
        .into_iter()
        .filter(|t| *t >= 0.0)
        .map(|t| (t * DEMO_FS).round() as u64)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

fn unit_metadata(unit: usize) -> serde_json::Value {
    let column = (unit % 8) as f64;
    let row = (unit / 8) as f64;
    json!({
        "cluster_id": unit,
        "channel": unit * 4,
        "position": [column * 17.5, row * 17.5],
        "amplitude": 40.0 + 5.0 * (unit % 6) as f64,
    })
}

/// Stitch points splitting the recording into three equal phases
fn write_sidecar(output: &Path, duration: u64) -> Result<PathBuf> {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".zip").unwrap_or(&file_name);
    let path = output.with_file_name(format!("{}{}", stem, SIDECAR_SUFFIX));

    let total = duration * DEMO_FS as u64;
    let points = json!([
        ["block_0", total / 3],
        ["block_1", 2 * total / 3],
        ["block_2", total],
    ]);
    std::fs::write(&path, serde_json::to_string_pretty(&points)?)
        .with_context(|| format!("Failed to write sidecar: {}", path.display()))?;
    Ok(path)
}
