use chrono::{NaiveTime, TimeZone, Utc};
use httpmock::Method::GET;
use quotefeed_rs::{Frequency, HistoryBuilder, SampleIndex};

use crate::common::{builder_for, client_for, fixture, setup_server};

fn january_index(freq: Frequency) -> SampleIndex {
    SampleIndex::date_range(
        Utc.with_ymd_and_hms(2013, 1, 2, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2013, 1, 4, 0, 0, 0).unwrap(),
        freq,
    )
    .unwrap()
}

#[tokio::test]
async fn offline_history_uses_recorded_fixture() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/table.csv")
            .query_param("s", "AAPL")
            .query_param("a", "0")
            .query_param("b", "2")
            .query_param("c", "2013")
            .query_param("d", "0")
            .query_param("e", "4")
            .query_param("f", "2013")
            .query_param("g", "d");
        then.status(200)
            .header("content-type", "text/csv")
            .body(fixture("history", "AAPL", "csv"));
    });

    let client = client_for(&server);
    let index = january_index(Frequency::business_daily());
    let frame = HistoryBuilder::new(&client, "AAPL", &index)
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert_eq!(frame.len(), 3, "null row is dropped");
    assert!(frame.bars.windows(2).all(|w| w[0].ts < w[1].ts));
    assert_eq!(frame.bars[0].close, 549.03);
    assert_eq!(frame.bars[0].volume, 20_018_500);
    assert_eq!(frame.column("adj_close").unwrap()[2], Some(521.37));
}

#[tokio::test]
async fn bars_sit_at_local_midnight() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/table.csv");
        then.status(200).body(fixture("history", "AAPL", "csv"));
    });

    let client = builder_for(&server)
        .timezone(chrono_tz::Europe::Paris)
        .build()
        .unwrap();
    let index = january_index(Frequency::daily());
    let frame = HistoryBuilder::new(&client, "AAPL", &index)
        .fetch()
        .await
        .unwrap();

    for bar in &frame.bars {
        assert_eq!(bar.ts.timezone(), chrono_tz::Europe::Paris);
        assert_eq!(bar.ts.time(), NaiveTime::MIN);
    }

    let ny = HistoryBuilder::new(&client, "AAPL", &index)
        .timezone(chrono_tz::America::New_York)
        .fetch()
        .await
        .unwrap();
    assert_eq!(ny.bars[0].ts.timezone(), chrono_tz::America::New_York);
}

#[tokio::test]
async fn intraday_index_reindexes_daily_bars() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/table.csv");
        then.status(200).body(fixture("history", "AAPL", "csv"));
    });

    let client = client_for(&server);
    let index = january_index(Frequency::hours(12));
    let frame = HistoryBuilder::new(&client, "AAPL", &index)
        .fetch()
        .await
        .unwrap();

    assert_eq!(frame.len(), index.len());
    let closes: Vec<f64> = frame.bars.iter().map(|b| b.close).collect();
    assert_eq!(closes, vec![549.03, 549.03, 542.10, 542.10, 527.00]);
}

#[tokio::test]
async fn http_error_gives_empty_frame() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/table.csv");
        then.status(404);
    });

    let client = client_for(&server);
    let index = january_index(Frequency::business_daily());
    let frame = HistoryBuilder::new(&client, "ZZZZ", &index)
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert!(frame.is_empty());
    assert_eq!(frame.symbol, "ZZZZ");
}
