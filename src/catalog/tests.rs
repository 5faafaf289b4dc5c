use super::*;
use crate::archive::CurationArchive;
use serde_json::json;
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
,uuids,experiment_name,org_age,cell_line
0,2024-05-10-e-dorsal,Trace_A,28 days 00:00:00,kh2
1,2024-05-10-e-dorsal,Trace_B,,e14
2,2024-05-17-e-dorsal,Trace_C,35 days,
";

#[test]
fn test_parse_age_days() {
    assert_eq!(parse_age_days("28 days"), Some(28));
    assert_eq!(parse_age_days("28 days 00:00:00"), Some(28));
    assert_eq!(parse_age_days(" 41 "), Some(41));
    assert_eq!(parse_age_days("-2 days"), Some(-2));
    assert_eq!(parse_age_days(""), None);
    assert_eq!(parse_age_days("NaT"), None);
    assert_eq!(parse_age_days("about a month"), None);
}

#[test]
fn test_age_between_dates() {
    assert_eq!(
        age::age_between("2024-05-10T11:55:52", "2024-04-09").as_deref(),
        Some("31 days")
    );
    assert_eq!(
        age::age_between("2024-05-10 11:55:52.123", "2024-04-09 00:00:00").as_deref(),
        Some("31 days")
    );
    assert_eq!(age::age_between("not a date", "2024-04-09"), None);
}

#[test]
fn test_derive_org_age() {
    let mut catalog = Catalog::from_rows(vec![
        CatalogRow::new("u", "a")
            .with_attribute("experiment_date", "2024-05-10T11:55:52")
            .with_attribute("agg_date", "2024-04-09"),
        CatalogRow::new("u", "b").with_attribute("experiment_date", "2024-05-10"),
    ])
    .unwrap();

    assert_eq!(catalog.derive_org_age("experiment_date", "agg_date"), 1);
    assert_eq!(catalog.get("a").unwrap().org_age.as_deref(), Some("31 days"));
    assert_eq!(catalog.get("b").unwrap().org_age, None);
}

#[test]
fn test_archive_path_convention() {
    let row = CatalogRow::new("2024-05-10-e-dorsal", "Trace_A");
    assert_eq!(
        row.archive_path(Path::new("/data"), DEFAULT_ARCHIVE_SUFFIX),
        PathBuf::from("/data/2024-05-10-e-dorsal/Trace_A_params_params_low_ISI_acqm.zip")
    );
}

#[test]
fn test_duplicate_experiment_rejected() {
    let err = Catalog::from_rows(vec![CatalogRow::new("u1", "a"), CatalogRow::new("u2", "a")])
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateExperiment(ref n) if n == "a"));
}

#[test]
fn test_identity_fields_are_immutable() {
    let mut row = CatalogRow::new("u1", "a");
    assert!(matches!(
        row.set_field(UUID_COLUMN, "u2"),
        Err(CatalogError::ImmutableField(_))
    ));
    row.set_field("species", "organoid").unwrap();
    row.set_field(AGE_COLUMN, "26 days").unwrap();
    assert_eq!(row.field("species"), Some("organoid"));
    assert_eq!(row.field(AGE_COLUMN), Some("26 days"));
}

#[test]
fn test_retain_rebuilds_index() {
    let mut catalog = Catalog::from_rows(vec![
        CatalogRow::new("u", "a"),
        CatalogRow::new("u", "b"),
        CatalogRow::new("u", "c"),
    ])
    .unwrap();
    catalog.retain(|row| row.experiment_name != "a");

    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("a").is_none());
    assert_eq!(catalog.get("c").unwrap().experiment_name, "c");
}

#[test]
fn test_validate_rejects_empty_identity() {
    let catalog = Catalog::from_rows(vec![CatalogRow::new("", "a")]).unwrap();
    assert!(matches!(
        catalog.validate(),
        Err(CatalogError::MissingIdentity { row: 0, column: UUID_COLUMN })
    ));
}

#[test]
fn test_row_failure_messages() {
    assert_eq!(RowFailure::FileNotFound.to_string(), "File not found");
    let insufficient = RowFailure::InsufficientUnits {
        found: 3,
        minimum: 10,
    };
    assert_eq!(insufficient.to_string(), "Insufficient units: 3 (minimum: 10)");

    assert_eq!("File not found".parse::<RowFailure>().unwrap(), RowFailure::FileNotFound);
    assert_eq!(
        "Insufficient units: 3 (minimum: 10)".parse::<RowFailure>().unwrap(),
        insufficient
    );
    assert_eq!(
        "Missing required key: fs".parse::<RowFailure>().unwrap(),
        RowFailure::LoadFailed("Missing required key: fs".to_string())
    );
}

#[test]
fn test_csv_parsing() {
    let catalog = Catalog::from_csv_reader(SAMPLE_CSV.as_bytes()).unwrap();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.columns(), &["cell_line".to_string()]);

    let a = catalog.get("Trace_A").unwrap();
    assert_eq!(a.uuid, "2024-05-10-e-dorsal");
    assert_eq!(a.org_age_days, Some(28));
    assert_eq!(a.field("cell_line"), Some("kh2"));
    assert_eq!(a.enrichment.status, RowStatus::Unprocessed);

    let b = catalog.get("Trace_B").unwrap();
    assert_eq!(b.org_age, None);
    assert_eq!(b.org_age_days, None);

    let c = catalog.get("Trace_C").unwrap();
    assert_eq!(c.field("cell_line"), None);
}

#[test]
fn test_csv_missing_identity_column() {
    let err = Catalog::from_csv_reader("uuids,org_age\nu,28 days\n".as_bytes()).unwrap_err();
    assert!(matches!(err, CatalogError::MissingColumn(ref c) if c == EXPERIMENT_COLUMN));
}

#[test]
fn test_csv_roundtrip_keeps_enrichment() {
    let mut catalog = Catalog::from_csv_reader(SAMPLE_CSV.as_bytes()).unwrap();
    {
        let a = catalog.get_mut("Trace_A").unwrap();
        a.enrichment = Enrichment {
            num_units: Some(12),
            status: RowStatus::Processed,
            burstiness: Some("0.42".to_string()),
            firing_rates: Some(vec![1.5, 2.5]),
            mean_firing_rate: Some(2.0),
            median_firing_rate: Some(2.0),
            spike_trains: None,
        };
        let b = catalog.get_mut("Trace_B").unwrap();
        b.enrichment = Enrichment::failed(RowFailure::InsufficientUnits {
            found: 2,
            minimum: 5,
        });
        b.enrichment.num_units = Some(2);
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.csv");
    catalog.write_csv_path(&path).unwrap();
    let restored = Catalog::from_csv_path(&path).unwrap();

    let a = restored.get("Trace_A").unwrap();
    assert!(a.enrichment.processed());
    assert_eq!(a.enrichment.num_units, Some(12));
    assert_eq!(a.enrichment.burstiness.as_deref(), Some("0.42"));
    assert_eq!(a.enrichment.firing_rates, Some(vec![1.5, 2.5]));
    assert_eq!(a.enrichment.mean_firing_rate, Some(2.0));
    assert_eq!(a.org_age_days, Some(28));
    assert_eq!(a.field("cell_line"), Some("kh2"));

    let b = restored.get("Trace_B").unwrap();
    assert!(!b.enrichment.processed());
    assert_eq!(
        b.enrichment.status,
        RowStatus::Failed(RowFailure::InsufficientUnits {
            found: 2,
            minimum: 5
        })
    );

    let c = restored.get("Trace_C").unwrap();
    assert_eq!(c.enrichment.status, RowStatus::Unprocessed);
}

#[test]
fn test_accessor_lookups() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::from_rows(vec![
        CatalogRow::new("uuid-1", "loaded"),
        CatalogRow::new("uuid-1", "not_loaded"),
    ])
    .unwrap();

    let spikes = SpikeTrains::from_trains(vec![vec![1.0, 2.0]]).unwrap();
    catalog.get_mut("loaded").unwrap().enrichment.spike_trains = Some(Arc::new(spikes));

    let accessor = CatalogAccessor::new(&catalog, dir.path());
    assert_eq!(accessor.spike_trains("loaded").unwrap().unit_count(), 1);
    assert!(matches!(
        accessor.spike_trains("not_loaded"),
        Err(CatalogError::NotLoaded(_))
    ));
    assert!(matches!(
        accessor.spike_trains("missing"),
        Err(CatalogError::ExperimentNotFound(_))
    ));
    assert_eq!(
        accessor.archive_path("loaded").unwrap(),
        dir.path()
            .join("uuid-1")
            .join("loaded_params_params_low_ISI_acqm.zip")
    );
}

#[test]
fn test_accessor_loads_archive() {
    let dir = tempdir().unwrap();
    let catalog = Catalog::from_rows(vec![CatalogRow::new("uuid-1", "Trace_A")]).unwrap();
    let accessor = CatalogAccessor::new(&catalog, dir.path()).with_suffix("_acqm.zip");

    CurationArchive::new(10000.0)
        .add_unit("0", vec![10000], json!({}))
        .write(accessor.archive_path("Trace_A").unwrap())
        .unwrap();

    let data = accessor.load_curation("Trace_A").unwrap();
    assert_eq!(data.trains[0].1, vec![1.0]);
}
