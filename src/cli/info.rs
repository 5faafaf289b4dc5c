use anyhow::{Context, Result};
use std::path::PathBuf;

use spikecat::archive::load_curation;
use spikecat::spikes::metrics::{mean, median};

/// Display information about a curation archive
pub fn run(archive: PathBuf) -> Result<()> {
    if !archive.exists() {
        anyhow::bail!("File does not exist: {}", archive.display());
    }

    let data = load_curation(&archive).context("Failed to read curation archive")?;
    let fs = data.fs;
    let has_config = data.config.is_some();
    let spikes = data
        .into_spike_trains()
        .context("Archive holds invalid spike times")?;

    println!("Curation Archive Information");
    println!("============================");
    println!("File: {}", archive.display());
    println!();

    println!("Recording:");
    println!("  Units: {}", spikes.unit_count());
    println!("  Sampling rate: {} Hz", fs);
    println!("  Length: {:.3} s", spikes.recording_length() / 1000.0);
    println!("  Total spikes: {}", spikes.total_spikes());
    println!("  Run config: {}", if has_config { "present" } else { "absent" });
    println!("  Burstiness: {}", spikes.burstiness_index().to_json());
    println!();

    match spikes.firing_rates() {
        Ok(rates) => {
            println!("Firing Rates (Hz):");
            if let (Some(m), Some(med)) = (mean(&rates), median(&rates)) {
                println!("  Mean: {:.3}  Median: {:.3}", m, med);
            }
            for (unit, rate) in spikes.unit_ids().iter().zip(&rates) {
                println!("  {:>6}: {:.3}", unit, rate);
            }
        }
        Err(e) => println!("Firing Rates: unavailable ({})", e),
    }

    Ok(())
}
