#![no_main]

use libfuzzer_sys::fuzz_target;
use spikecat::archive::{CurationData, QmRecord};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic
    if let Ok(record) = QmRecord::from_slice(data) {
        // Accepted records must also survive conversion to spike trains
        let curation = CurationData::from_record(record);
        if let Ok(spikes) = curation.into_spike_trains() {
            let _ = spikes.firing_rates();
            let _ = spikes.burstiness_index();
        }
    }
});
