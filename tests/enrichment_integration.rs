//! Integration tests for spikecat
//!
//! These tests run the full flow from a catalog CSV and archives on disk to
//! an enriched catalog, phase extraction and a persisted table.

use serde_json::json;
use spikecat::archive::{write_record, CurationArchive};
use spikecat::catalog::{
    archive_path, Catalog, CatalogAccessor, RowStatus, DEFAULT_ARCHIVE_SUFFIX,
};
use spikecat::pipeline::{EnrichmentConfig, EnrichmentPipeline};
use spikecat::relabel::RuleTable;
use spikecat::windows::{extract_phase, load_stitch_points, split_phases, WindowPartitioner};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const UUID: &str = "2024-05-10-e-dorsal";

const CATALOG_CSV: &str = "\
,uuids,experiment_name,org_age,cell_line
0,2024-05-10-e-dorsal,Trace_day28_baseline,28 days 00:00:00,KH2
1,2024-05-10-e-dorsal,Trace_day28_DMSO,28 days 00:00:00,KH2
2,2024-05-10-e-dorsal,Trace_day28_sparse,28 days 00:00:00,E14
3,2024-05-10-e-dorsal,Trace_day28_missing,28 days 00:00:00,E14
4,2024-05-10-e-dorsal,Trace_day28_corrupt,,E14
";

/// Units firing once per second for `seconds`
fn write_regular(base: &Path, name: &str, units: usize, seconds: u64) {
    let fs = 20000.0;
    let mut archive = CurationArchive::new(fs).config(json!({"sorter": "test"}));
    for unit in 0..units {
        let indices = (0..seconds).map(|s| s * 20000 + unit as u64 * 10).collect();
        archive = archive.add_unit(unit.to_string(), indices, json!({"channel": unit}));
    }
    archive
        .write(archive_path(base, UUID, name, DEFAULT_ARCHIVE_SUFFIX))
        .unwrap();
}

fn fixture(base: &Path) -> Catalog {
    write_regular(base, "Trace_day28_baseline", 12, 40);
    write_regular(base, "Trace_day28_DMSO", 16, 40);
    write_regular(base, "Trace_day28_sparse", 4, 40);
    fs::write(
        archive_path(base, UUID, "Trace_day28_corrupt", DEFAULT_ARCHIVE_SUFFIX),
        b"not a zip archive",
    )
    .unwrap();

    let catalog_path = base.join("catalog.csv");
    fs::write(&catalog_path, CATALOG_CSV).unwrap();
    Catalog::from_csv_path(&catalog_path).unwrap()
}

#[test]
fn test_full_enrichment_flow() {
    let dir = tempdir().unwrap();
    let mut catalog = fixture(dir.path());
    assert_eq!(catalog.len(), 5);

    RuleTable::drug_from_experiment_name()
        .apply(&mut catalog)
        .unwrap();

    let config = EnrichmentConfig::new(dir.path())
        .compute_metrics(true)
        .min_units(Some(10));
    let (catalog, report) = EnrichmentPipeline::new(config).enrich(catalog).unwrap();

    assert_eq!(report.stats.attempted, 5);
    assert_eq!(report.stats.processed, 2);
    assert_eq!(report.stats.not_found, 1);
    assert_eq!(report.stats.load_failed, 1);
    assert_eq!(report.stats.insufficient_units, 1);
    assert_eq!(report.stats.dropped, 3);

    // only admitted rows remain, each meeting the minimum
    assert_eq!(catalog.len(), 2);
    for row in catalog.rows() {
        assert!(row.enrichment.processed());
        assert!(row.enrichment.num_units.unwrap() >= 10);
        assert_eq!(row.org_age_days, Some(28));
        assert!(row.enrichment.spike_trains.is_some());
    }

    let dmso = catalog.get("Trace_day28_DMSO").unwrap();
    assert_eq!(dmso.field("drug"), Some("dmso"));
    assert_eq!(dmso.enrichment.num_units, Some(16));
    assert_eq!(dmso.enrichment.firing_rates.as_ref().unwrap().len(), 16);

    let sparse = report.row("Trace_day28_sparse").unwrap();
    assert_eq!(
        sparse.status,
        RowStatus::Failed("Insufficient units: 4 (minimum: 10)".parse().unwrap())
    );
}

#[test]
fn test_accessor_and_phases() {
    let dir = tempdir().unwrap();
    let catalog = fixture(dir.path());
    let (catalog, _) = spikecat::pipeline::enrich(catalog, dir.path(), false, None).unwrap();

    let accessor = CatalogAccessor::new(&catalog, dir.path());
    let spikes = accessor.spike_trains("Trace_day28_baseline").unwrap();
    assert_eq!(spikes.unit_count(), 12);

    // sidecar splits the 40 s recording at 10 s, 20 s and 30 s
    let sidecar = dir
        .path()
        .join(UUID)
        .join("Trace_day28_baseline_stitch_inds.json");
    fs::write(
        &sidecar,
        r#"[["block_0", 200000], ["block_1", 400000], ["block_2", 600000]]"#,
    )
    .unwrap();

    let points = load_stitch_points(dir.path(), UUID, "Trace_day28_baseline")
        .unwrap()
        .unwrap();
    let windows = WindowPartitioner::new().partition(Some(&points)).unwrap();
    assert_eq!(windows.get("initial"), Some((10000.0, 20000.0)));

    let initial = extract_phase(&spikes, &windows, "initial").unwrap();
    assert_eq!(initial.unit_count(), 12);
    // one spike per unit per second
    assert_eq!(initial.total_spikes(), 12 * 10);
    assert!(initial.trains().iter().flatten().all(|t| (10000.0..20000.0).contains(t)));

    let phases = split_phases(&spikes, &windows).unwrap();
    let total: usize = phases.iter().map(|(_, p)| p.total_spikes()).sum();
    assert_eq!(total, 12 * 30);

    // no sidecar for this recording: default schedule
    let points = load_stitch_points(dir.path(), UUID, "Trace_day28_DMSO").unwrap();
    assert!(points.is_none());
    let windows = WindowPartitioner::new().partition(points.as_deref()).unwrap();
    assert!(!windows.from_stitch_points());
    assert_eq!(windows.get("baseline"), Some((0.0, 600000.0)));
}

#[test]
fn test_enriched_catalog_persists() {
    let dir = tempdir().unwrap();
    let catalog = fixture(dir.path());
    let (catalog, _) = spikecat::pipeline::enrich(catalog, dir.path(), true, None).unwrap();

    let out = dir.path().join("enriched.csv");
    catalog.write_csv_path(&out).unwrap();
    let restored = Catalog::from_csv_path(&out).unwrap();

    assert_eq!(restored.len(), catalog.len());
    for (before, after) in catalog.rows().iter().zip(restored.rows()) {
        assert_eq!(before.uuid, after.uuid);
        assert_eq!(before.experiment_name, after.experiment_name);
        assert_eq!(before.org_age_days, after.org_age_days);
        assert_eq!(before.field("cell_line"), after.field("cell_line"));
        assert_eq!(before.enrichment.status, after.enrichment.status);
        assert_eq!(before.enrichment.num_units, after.enrichment.num_units);
        assert_eq!(before.enrichment.burstiness, after.enrichment.burstiness);
        assert_eq!(before.enrichment.firing_rates, after.enrichment.firing_rates);
        assert!(after.enrichment.spike_trains.is_none());
    }

    let missing = restored.get("Trace_day28_missing").unwrap();
    assert_eq!(missing.enrichment.error().as_deref(), Some("File not found"));
}

#[test]
fn test_archive_without_config_loads() {
    let dir = tempdir().unwrap();
    let path = archive_path(dir.path(), UUID, "Trace_plain", DEFAULT_ARCHIVE_SUFFIX);
    write_record(
        &path,
        &json!({
            "train": {"7": [100, 200], "3": [50]},
            "fs": 1000.0,
            "neuron_data": {"0": {"7": {"channel": 1}, "3": {"channel": 2}}}
        }),
    )
    .unwrap();

    let data = spikecat::archive::load_curation(&path).unwrap();
    assert!(data.config.is_none());
    assert_eq!(data.trains[0], ("7".to_string(), vec![0.1, 0.2]));
    assert_eq!(data.trains[1], ("3".to_string(), vec![0.05]));
    assert_eq!(data.neuron_data["3"]["channel"], 2);
}
