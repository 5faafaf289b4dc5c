use anyhow::{Context, Result};
use std::path::PathBuf;

use spikecat::archive::load_curation;
use spikecat::windows::{read_stitch_points, split_phases, WindowPartitioner};

use super::Config;

/// Print the phase windows of an archive and the spikes in each
pub fn run(
    archive: PathBuf,
    stitch: Option<PathBuf>,
    sampling_rate: Option<f64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let file_config = Config::load(config.as_deref())?;

    let partitioner = match sampling_rate.or(file_config.windows.sampling_rate) {
        Some(rate) => WindowPartitioner::with_sampling_rate(rate)?,
        None => WindowPartitioner::new(),
    };

    let spikes = load_curation(&archive)
        .with_context(|| format!("Failed to load archive: {}", archive.display()))?
        .into_spike_trains()?;

    let stitch_points = match &stitch {
        Some(path) => read_stitch_points(path)
            .with_context(|| format!("Failed to read stitch points: {}", path.display()))?,
        None => None,
    };
    let windows = partitioner.partition(stitch_points.as_deref())?;

    println!("Phase Windows");
    println!("=============");
    println!("Archive: {}", archive.display());
    println!(
        "Source: {}",
        if windows.from_stitch_points() {
            format!("stitch points at {} Hz", partitioner.sampling_rate())
        } else {
            "default 10-minute schedule".to_string()
        }
    );
    println!();

    for (name, phase) in split_phases(&spikes, &windows)? {
        let (start, end) = windows.get(name).unwrap_or_default();
        println!(
            "  {:<10} [{:>10.1}, {:>10.1}) ms  {:>8} spikes",
            name,
            start,
            end,
            phase.total_spikes()
        );
    }

    Ok(())
}
