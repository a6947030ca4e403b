use httpmock::Method::GET;
use quotefeed_rs::fields::CsvField;
use quotefeed_rs::snapshot::{parse_csv, select_fields};
use quotefeed_rs::{FieldValue, QfError, SnapshotBuilder, SnapshotSource};

use crate::common::{client_for, fixture, setup_server};

fn syms(s: &[&str]) -> Vec<String> {
    s.iter().map(|s| s.to_string()).collect()
}

#[test]
fn unsupported_fields_are_removed() {
    let sel = select_fields(&["price", "bogus"]).unwrap();
    assert_eq!(sel.fields(), &[CsvField::Price]);
    assert_eq!(sel.rejected(), &["bogus".to_string()]);
    assert_eq!(sel.columns(), vec![CsvField::Price, CsvField::Status]);
    assert_eq!(sel.format_tags(), "l1e1");
}

#[test]
fn nothing_supported_is_fatal() {
    match select_fields(&["bogus"]) {
        Err(QfError::EmptyFieldSet { rejected }) => assert_eq!(rejected, vec!["bogus"]),
        other => panic!("expected EmptyFieldSet, got {other:?}"),
    }
    assert!(matches!(
        select_fields(&["status"]),
        Err(QfError::EmptyFieldSet { .. })
    ));
}

#[test]
fn duplicates_and_explicit_status_fold_away() {
    let sel = select_fields(&["PRICE", "price", "status", "change_pct"]).unwrap();
    assert_eq!(sel.fields(), &[CsvField::Price, CsvField::ChangePct]);
    assert!(sel.rejected().is_empty());
    assert_eq!(sel.format_tags(), "l1p2e1");
}

#[test]
fn csv_lines_map_positionally() {
    let sel = select_fields(&["name", "price", "change_pct"]).unwrap();
    let body = fixture("snapshot_fields", "MULTI", "csv");
    let recs = parse_csv(body.as_bytes(), &syms(&["AAPL", "GOOG"]), &sel).unwrap();

    assert_eq!(recs[0].get("name"), Some(&FieldValue::Text("Apple Inc.".into())));
    assert_eq!(recs[0].get("price"), Some(&FieldValue::Float(449.73)));
    assert_eq!(recs[0].get("change_pct"), Some(&FieldValue::Float(-0.38)));
    assert!(recs[0].get("status").unwrap().is_missing());

    assert_eq!(
        recs[1].get("name").and_then(FieldValue::as_str),
        Some("Google, Inc."),
        "quoted commas stay inside the value"
    );
    assert_eq!(recs[1].get("change_pct"), Some(&FieldValue::Float(0.45)));
}

#[test]
fn short_lines_leave_trailing_fields_missing() {
    let sel = select_fields(&["price", "change_pct"]).unwrap();
    let recs = parse_csv(b"449.73\n", &syms(&["AAPL"]), &sel).unwrap();
    assert_eq!(recs[0].get("price"), Some(&FieldValue::Float(449.73)));
    assert!(recs[0].get("change_pct").unwrap().is_missing());
    assert!(recs[0].get("status").unwrap().is_missing());
}

#[test]
fn line_count_must_match_symbols() {
    let sel = select_fields(&["price"]).unwrap();
    let err = parse_csv(b"1.0,\"N/A\"\n", &syms(&["AAPL", "GOOG"]), &sel).unwrap_err();
    assert!(matches!(err, QfError::ProtocolMismatch(_)));
}

#[tokio::test]
async fn offline_field_query_drops_unknown_fields() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/d/quotes.csv")
            .query_param("f", "nl1p2e1");
        then.status(200)
            .header("content-type", "text/csv")
            .body(fixture("snapshot_fields", "MULTI", "csv"));
    });

    let client = client_for(&server);
    let snap = SnapshotBuilder::new(&client)
        .symbols(["AAPL", "GOOG"])
        .fields(["name", "price", "bogus", "change_pct"])
        .fetch()
        .await
        .unwrap()
        .expect("snapshot");

    mock.assert();
    assert_eq!(snap.source(), SnapshotSource::FieldQuery);
    let aapl = snap.get("AAPL").unwrap();
    assert!(!aapl.contains("bogus"));
    assert_eq!(aapl.len(), 4);
}

#[tokio::test]
async fn default_fields_when_none_requested() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/d/quotes.csv")
            .query_param("f", "sl1p2rt1s7e1");
        then.status(200)
            .body("\"AAPL\",449.73,\"-0.38%\",11.1,\"4:00pm\",1.2,\"N/A\"\n");
    });

    let client = client_for(&server);
    let snap = SnapshotBuilder::new(&client)
        .add_symbol("AAPL")
        .fetch()
        .await
        .unwrap()
        .unwrap();

    mock.assert();
    let rec = snap.get("AAPL").unwrap();
    assert_eq!(rec.get("pe"), Some(&FieldValue::Float(11.1)));
    assert_eq!(rec.get("short_ratio"), Some(&FieldValue::Float(1.2)));
}

#[tokio::test]
async fn empty_field_set_fails_before_any_request() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/d/quotes.csv");
        then.status(200).body("");
    });

    let client = client_for(&server);
    let err = SnapshotBuilder::new(&client)
        .symbols(["AAPL"])
        .fields(["bogus"])
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, QfError::EmptyFieldSet { .. }));
    assert!(err.is_fatal());
    mock.assert_hits(0);
}
