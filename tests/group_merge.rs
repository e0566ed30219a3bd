mod common;

use common::{TestWorkspace, n, s};
use ducksheet::{cell::Cell, config::Config, events::ConsoleSink, ingest, store::Store};

fn config_for(ws: &TestWorkspace) -> Config {
    Config {
        store_dir: ws.path().join("stores"),
        ..Config::default()
    }
}

const HEADERS: [&str; 3] = ["waybill", "weight", "amount"];

#[test]
fn group_merges_matching_sources_into_one_table() {
    let ws = TestWorkspace::new();
    let jan = ws.write_workbook(
        "jan.xlsx",
        &HEADERS,
        &[
            vec![s("SF001"), n(10.5), n(100.0)],
            vec![s("SF002"), n(5.5), n(50.0)],
        ],
    );
    let feb = ws.write_workbook("feb.xlsx", &HEADERS, &[vec![s("SF003"), n(2.0), n(20.0)]]);
    let config = config_for(&ws);

    let report = ingest::ingest_group(
        &config,
        "7550000001",
        &[jan, feb],
        "billing",
        &ConsoleSink,
    )
    .expect("ingest group")
    .expect("group produced data");

    assert_eq!(report.merged_files, 2);
    assert_eq!(report.skipped_files, 0);
    assert_eq!(report.rows, 3);
    assert_eq!(
        report.store_path,
        config.store_dir.join("7550000001.duckdb")
    );

    let store = Store::open(&report.store_path).expect("open store");
    assert_eq!(store.table_names().unwrap(), vec!["billing".to_string()]);
    assert_eq!(store.count_rows("billing").unwrap(), 3);
}

#[test]
fn header_mismatch_skips_the_offending_source_only() {
    let ws = TestWorkspace::new();
    let good = ws.write_workbook(
        "good.xlsx",
        &HEADERS,
        &[vec![s("SF001"), n(1.0), n(10.0)]],
    );
    let other = ws.write_workbook(
        "other.xlsx",
        &["waybill", "fee"],
        &[vec![s("SF002"), n(9.0)]],
    );
    let trailing = ws.write_workbook(
        "trailing.xlsx",
        &HEADERS,
        &[vec![s("SF003"), n(3.0), n(30.0)]],
    );
    let config = config_for(&ws);

    let report = ingest::ingest_group(
        &config,
        "7550000002",
        &[good, other, trailing],
        "billing",
        &ConsoleSink,
    )
    .expect("ingest group")
    .expect("group produced data");

    assert_eq!(report.merged_files, 2);
    assert_eq!(report.skipped_files, 1);
    assert_eq!(report.rows, 2);

    let store = Store::open(&report.store_path).expect("open store");
    let rows = store.fetch_rows("billing", None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], Cell::Text("SF001".to_string()));
    assert_eq!(rows[1][0], Cell::Text("SF003".to_string()));
}

#[test]
fn missing_and_foreign_files_are_skipped_not_fatal() {
    let ws = TestWorkspace::new();
    let good = ws.write_workbook(
        "good.xlsx",
        &HEADERS,
        &[vec![s("SF001"), n(1.0), n(10.0)]],
    );
    let config = config_for(&ws);

    let report = ingest::ingest_group(
        &config,
        "7550000003",
        &[
            good,
            ws.path().join("ghost.xlsx"),
            ws.path().join("notes.txt"),
        ],
        "billing",
        &ConsoleSink,
    )
    .expect("ingest group")
    .expect("group produced data");

    assert_eq!(report.merged_files, 1);
    assert_eq!(report.skipped_files, 2);
    assert_eq!(report.rows, 1);
}

#[test]
fn group_with_no_readable_data_yields_none() {
    let ws = TestWorkspace::new();
    let config = config_for(&ws);
    let outcome = ingest::ingest_group(
        &config,
        "7550000004",
        &[ws.path().join("ghost.xlsx")],
        "billing",
        &ConsoleSink,
    )
    .expect("ingest group");
    assert!(outcome.is_none());
    assert!(!config.store_dir.join("7550000004.duckdb").exists());
}
