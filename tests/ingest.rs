mod common;

use std::fs::File;

use common::{TestWorkspace, n, s};
use ducksheet::{
    cell::Cell,
    config::Config,
    errors::IngestError,
    events::ConsoleSink,
    ingest,
    stage::StagingPolicy,
    store::Store,
    workbook::{self, SheetSelector},
};

fn config_for(ws: &TestWorkspace) -> Config {
    Config {
        store_dir: ws.path().join("stores"),
        ..Config::default()
    }
}

#[test]
fn ingestion_preserves_row_and_column_counts() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook(
        "orders.xlsx",
        &["waybill", "weight", "amount"],
        &[
            vec![s("SF001"), n(10.5), n(100.0)],
            vec![s("SF002"), n(5.5), n(50.0)],
            vec![s("SF003"), n(2.0), n(20.0)],
        ],
    );
    let config = config_for(&ws);

    let report = ingest::ingest_file(&config, &input, &ConsoleSink).expect("ingest");
    assert_eq!(report.rows, 3);
    assert_eq!(report.columns, 3);
    assert_eq!(report.table, "orders");

    let store = Store::open(&report.store_path).expect("open store");
    assert_eq!(store.count_rows("orders").unwrap(), 3);
    assert_eq!(
        store.column_names("orders").unwrap(),
        vec!["waybill", "weight", "amount"]
    );
}

#[test]
fn reingesting_the_same_identifier_replaces_the_table() {
    let ws = TestWorkspace::new();
    let config = config_for(&ws);
    let headers = ["waybill", "weight", "amount"];

    let input = ws.write_workbook(
        "bill.xlsx",
        &headers,
        &[
            vec![s("SF001"), n(1.0), n(10.0)],
            vec![s("SF002"), n(2.0), n(20.0)],
        ],
    );
    let first = ingest::ingest_file(&config, &input, &ConsoleSink).expect("first ingest");
    assert_eq!(first.rows, 2);

    // Overwrite the fixture with a single row and ingest again.
    ws.write_workbook("bill.xlsx", &headers, &[vec![s("SF009"), n(9.0), n(90.0)]]);
    let second = ingest::ingest_file(&config, &input, &ConsoleSink).expect("second ingest");
    assert_eq!(second.rows, 1);

    let store = Store::open(&second.store_path).expect("open store");
    assert_eq!(store.count_rows("bill").unwrap(), 1);
    let rows = store.fetch_rows("bill", None).unwrap();
    assert_eq!(rows[0][0], Cell::Text("SF009".to_string()));
}

#[test]
fn digit_leading_file_names_get_a_prefixed_table() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook(
        "2024 账单.xlsx",
        &["waybill"],
        &[vec![s("SF001")]],
    );
    let config = config_for(&ws);

    let report = ingest::ingest_file(&config, &input, &ConsoleSink).expect("ingest");
    assert_eq!(report.table, "t_2024_账单");
    let store = Store::open(&report.store_path).expect("open store");
    assert_eq!(store.table_names().unwrap(), vec!["t_2024_账单".to_string()]);
}

#[test]
fn missing_source_is_reported_without_creating_a_store() {
    let ws = TestWorkspace::new();
    let config = config_for(&ws);
    let err = ingest::ingest_file(&config, &ws.path().join("ghost.xlsx"), &ConsoleSink)
        .expect_err("must fail");
    assert!(matches!(err, IngestError::SourceNotFound { .. }));
    assert!(!config.store_dir.exists());
}

#[test]
fn workbook_without_rows_is_an_empty_workbook_error() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook("hollow.xlsx", &[], &[]);
    let config = config_for(&ws);
    let err = ingest::ingest_file(&config, &input, &ConsoleSink).expect_err("must fail");
    assert!(matches!(err, IngestError::EmptyWorkbook { .. }));
}

#[test]
fn pre_opened_streams_read_the_same_table() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook(
        "stream.xlsx",
        &["waybill", "weight"],
        &[vec![s("SF001"), n(1.5)], vec![s("SF002"), n(2.5)]],
    );

    let file = File::open(&input).expect("open fixture");
    let raw = workbook::read_workbook_from(file, &SheetSelector::Index(0), &input)
        .expect("read from stream");
    assert_eq!(raw.row_count(), 2);
    assert_eq!(raw.column_count(), 2);

    let by_path = workbook::read_workbook(&input, &SheetSelector::Name("Sheet1".to_string()))
        .expect("read by sheet name");
    assert_eq!(by_path.row_count(), 2);
}

#[test]
fn inferred_staging_falls_back_to_all_text_when_the_sample_lied() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook(
        "mixed.xlsx",
        &["value"],
        &[vec![n(1.0)], vec![s("abc")], vec![n(2.5)]],
    );
    let config = Config {
        sample_rows: 1,
        ..config_for(&ws)
    };

    let report = ingest::ingest_file(&config, &input, &ConsoleSink).expect("fallback ingest");
    assert_eq!(report.rows, 3);

    let store = Store::open(&report.store_path).expect("open store");
    let rows = store.fetch_rows("mixed", None).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Cell::Text("1".to_string())],
            vec![Cell::Text("abc".to_string())],
            vec![Cell::Text("2.5".to_string())],
        ]
    );
}

#[test]
fn explicit_all_text_policy_stores_varchar_columns() {
    let ws = TestWorkspace::new();
    let input = ws.write_workbook(
        "text.xlsx",
        &["qty"],
        &[vec![n(1.0)], vec![n(2.0)]],
    );
    let config = Config {
        policy: StagingPolicy::AllText,
        ..config_for(&ws)
    };

    let report = ingest::ingest_file(&config, &input, &ConsoleSink).expect("ingest");
    let store = Store::open(&report.store_path).expect("open store");
    let rows = store.fetch_rows("text", None).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Cell::Text("1".to_string())],
            vec![Cell::Text("2".to_string())],
        ]
    );
}
