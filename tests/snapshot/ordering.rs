use std::sync::Arc;

use quotefeed_rs::{FieldValue, QfError, SnapshotBuilder};

use crate::common::{FakeTransport, client_with, heavy_doc, light_doc};

const ORDER: [&str; 3] = ["MSFT", "AAPL", "GOOG"];

#[tokio::test]
async fn every_level_keeps_caller_order() {
    let fake = Arc::new(
        FakeTransport::new()
            .ok(
                "/d/quotes.csv",
                "\"MSFT\",35.1,\"N/A\"\n\"AAPL\",449.73,\"N/A\"\n\"GOOG\",871.22,\"N/A\"\n",
            )
            .ok(
                "/finance/info",
                light_doc(&[("MSFT", "35.1"), ("AAPL", "449.73"), ("GOOG", "871.22")]),
            )
            .ok(
                "/ig/api",
                heavy_doc(&[("MSFT", "35.1"), ("AAPL", "449.73"), ("GOOG", "871.22")]),
            ),
    );
    let client = client_with(fake.clone());

    for level in 0..=2u8 {
        let snap = SnapshotBuilder::new(&client)
            .symbols(ORDER)
            .level(level)
            .fields(["symbol", "price"])
            .fetch()
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("level {level} returned no data"));

        assert_eq!(snap.symbols().collect::<Vec<_>>(), ORDER, "level {level}");
        for (sym, rec) in snap.iter() {
            assert_eq!(
                rec.get("symbol").and_then(FieldValue::as_str),
                Some(sym),
                "level {level}"
            );
        }
    }
    assert_eq!(fake.calls().len(), 3);
}

#[tokio::test]
async fn out_of_range_level_is_rejected_without_io() {
    let fake = Arc::new(FakeTransport::new());
    let client = client_with(fake.clone());

    let err = SnapshotBuilder::new(&client)
        .symbols(["AAPL"])
        .level(3)
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, QfError::InvalidDetailLevel(3)));
    assert!(err.is_fatal());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn no_symbols_is_invalid() {
    let fake = Arc::new(FakeTransport::new());
    let client = client_with(fake.clone());

    let err = SnapshotBuilder::new(&client).level(1).fetch().await.unwrap_err();
    assert!(matches!(err, QfError::InvalidParams(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn mismatched_record_count_is_no_data() {
    let fake = Arc::new(FakeTransport::new().ok("/finance/info", light_doc(&[("AAPL", "1")])));
    let client = client_with(fake);

    let snap = SnapshotBuilder::new(&client)
        .symbols(["AAPL", "GOOG"])
        .level(1)
        .fetch()
        .await
        .unwrap();
    assert!(snap.is_none());
}
