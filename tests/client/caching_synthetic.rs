use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use quotefeed_rs::{CacheMode, QfClient, SnapshotBuilder};

use crate::common::{FakeTransport, builder_for, light_doc, setup_server};

#[tokio::test]
async fn repeated_snapshot_hits_cache() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/finance/info");
        then.status(200).body(light_doc(&[("AAPL", "449.73")]));
    });

    let client = builder_for(&server)
        .cache_ttl(Duration::from_secs(60))
        .build()
        .unwrap();

    for _ in 0..2 {
        let snap = SnapshotBuilder::new(&client)
            .symbols(["AAPL"])
            .level(1)
            .fetch()
            .await
            .unwrap();
        assert_eq!(snap.map(|s| s.len()), Some(1));
    }

    mock.assert_hits(1);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/finance/info");
        then.status(500);
    });

    let client = builder_for(&server)
        .cache_ttl(Duration::from_secs(60))
        .build()
        .unwrap();

    for _ in 0..2 {
        let snap = SnapshotBuilder::new(&client)
            .symbols(["AAPL"])
            .level(1)
            .fetch()
            .await
            .unwrap();
        assert!(snap.is_none());
    }

    mock.assert_hits(2);
}

#[tokio::test]
async fn clones_share_the_cache() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/finance/info");
        then.status(200).body(light_doc(&[("AAPL", "449.73")]));
    });

    let client = builder_for(&server)
        .cache_ttl(Duration::from_secs(60))
        .build()
        .unwrap();
    let twin = client.clone();

    SnapshotBuilder::new(&client)
        .symbols(["AAPL"])
        .level(1)
        .fetch()
        .await
        .unwrap();
    SnapshotBuilder::new(&twin)
        .symbols(["AAPL"])
        .level(1)
        .fetch()
        .await
        .unwrap();

    mock.assert_hits(1);
}

#[tokio::test]
async fn cache_modes_per_call() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/finance/info");
        then.status(200).body(light_doc(&[("AAPL", "449.73")]));
    });

    let client = builder_for(&server)
        .cache_ttl(Duration::from_secs(60))
        .build()
        .unwrap();
    assert!(client.cache_enabled());

    let client = &client;
    let fetch = move |mode: CacheMode| {
        SnapshotBuilder::new(client)
            .symbols(["AAPL"])
            .level(1)
            .cache_mode(mode)
            .fetch()
    };

    // Bypass neither reads nor writes
    fetch(CacheMode::Bypass).await.unwrap();
    fetch(CacheMode::Use).await.unwrap();
    mock.assert_hits(2);

    // Refresh skips the read but writes
    fetch(CacheMode::Refresh).await.unwrap();
    fetch(CacheMode::Use).await.unwrap();
    mock.assert_hits(3);

    client.clear_cache().await;
    fetch(CacheMode::Use).await.unwrap();
    mock.assert_hits(4);
}

#[tokio::test]
async fn cache_applies_to_custom_transports() {
    let fake = Arc::new(FakeTransport::new().ok("/finance/info", light_doc(&[("AAPL", "1")])));
    let client = QfClient::builder()
        .transport(fake.clone())
        .cache_ttl(Duration::from_secs(60))
        .build()
        .unwrap();

    for _ in 0..3 {
        SnapshotBuilder::new(&client)
            .symbols(["AAPL"])
            .level(1)
            .fetch()
            .await
            .unwrap();
    }
    assert_eq!(fake.calls().len(), 1);
}
