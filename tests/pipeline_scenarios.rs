//! End-to-end scenarios over in-memory backends: submit through the
//! newsroom, read back through the feed.

use ledgerfeed::identity::MockIdentity;
use ledgerfeed::ledger::{LedgerClient, LedgerClientConfig, MockLedger};
use ledgerfeed::model::{Address, ContentPayload, ContentRef, NEUTRAL_SCORE};
use ledgerfeed::pipeline::{FeedFilter, Stage, Submission};
use ledgerfeed::retry::RetryPolicy;
use ledgerfeed::scorer::{MockScoringBackend, ScoringError};
use ledgerfeed::store::{ContentStore, MockContentStore};
use ledgerfeed::{Backends, Newsroom, NewsroomSettings};
use std::sync::Arc;
use std::time::Duration;

struct World {
    ledger: MockLedger,
    store: MockContentStore,
    scorer: MockScoringBackend,
    newsroom: Newsroom,
}

fn settings() -> NewsroomSettings {
    NewsroomSettings {
        ledger: LedgerClientConfig {
            request_timeout: Duration::from_millis(500),
            finalization_timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(5),
            fanout_limit: 4,
        },
        store_timeout: Duration::from_millis(500),
        scorer_timeout: Duration::from_millis(100),
        retry: RetryPolicy::none(),
    }
}

fn world(scorer: MockScoringBackend) -> World {
    let ledger = MockLedger::new();
    let store = MockContentStore::new();
    let newsroom = Newsroom::new(
        Backends {
            identity: Arc::new(MockIdentity::bound("0xabc")),
            ledger: Arc::new(ledger.clone()),
            store: Arc::new(store.clone()),
            scorer: Arc::new(scorer.clone()),
        },
        settings(),
    );
    World {
        ledger,
        store,
        scorer,
        newsroom,
    }
}

#[tokio::test]
async fn test_submission_appears_in_feed_with_its_score() {
    let w = world(MockScoringBackend::replying("0.9"));

    let receipt = w
        .newsroom
        .submit(&Submission::text("A", "B"))
        .await
        .unwrap();

    assert_eq!(w.store.put_calls(), 1);
    assert_eq!(
        w.ledger.submitted_writes(),
        vec![(receipt.content_ref.clone(), "A".to_string())]
    );
    assert_eq!(w.scorer.calls(), vec![("A".to_string(), "B".to_string())]);

    let feed = w.newsroom.list_feed(&FeedFilter::default()).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "A");
    assert_eq!(feed[0].body, "B");
    assert_eq!(feed[0].author, Address::new("0xabc"));
    assert_eq!(feed[0].content_ref, receipt.content_ref);
    assert_eq!(feed[0].credibility_score.value(), 0.9);
}

#[tokio::test]
async fn test_unreachable_scorer_still_publishes_neutral_score() {
    let w = world(MockScoringBackend::failing(ScoringError::Transport(
        "connection refused".to_string(),
    )));

    let receipt = w
        .newsroom
        .submit(&Submission::text("A", "B"))
        .await
        .unwrap();
    assert_eq!(receipt.credibility_score.value(), NEUTRAL_SCORE);

    let feed = w.newsroom.list_feed(&FeedFilter::default()).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].credibility_score.value(), NEUTRAL_SCORE);
}

#[tokio::test]
async fn test_commit_failure_leaves_no_visible_entry() {
    let w = world(MockScoringBackend::replying("0.9"));
    w.ledger.set_unavailable(true);

    let err = w
        .newsroom
        .submit(&Submission::text("A", "B"))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Committing));

    assert!(w.newsroom.list_feed(&FeedFilter::default()).await.is_err());
    w.ledger.set_unavailable(false);

    // The payload was stored but nothing indexes it
    assert_eq!(w.store.len(), 1);
    let feed = w.newsroom.list_feed(&FeedFilter::default()).await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_same_millisecond_orders_by_sequence_index() {
    let w = world(MockScoringBackend::replying("0.7"));
    for i in 0..4u64 {
        w.ledger.push_record(
            ContentRef::new(format!("sha256://seed{}", i)),
            &format!("seed {}", i),
            "0xdef",
            100 + i,
        );
    }

    w.ledger.set_timestamp(Some(5_000));
    let fourth = w
        .newsroom
        .submit(&Submission::text("four", "x"))
        .await
        .unwrap();
    let fifth = w
        .newsroom
        .submit(&Submission::text("five", "y"))
        .await
        .unwrap();
    assert_eq!(fourth.sequence_index, 4);
    assert_eq!(fifth.sequence_index, 5);

    let feed = w.newsroom.list_feed(&FeedFilter::default()).await.unwrap();
    assert_eq!(feed.len(), 6);
    assert_eq!(feed[0].sequence_index, 5);
    assert_eq!(feed[1].sequence_index, 4);
    assert_eq!(feed[0].timestamp, feed[1].timestamp);
}

#[tokio::test]
async fn test_one_failed_fetch_does_not_shrink_feed() {
    let w = world(MockScoringBackend::replying("0.9"));
    let mut refs = Vec::new();
    for i in 0..5 {
        let receipt = w
            .newsroom
            .submit(&Submission::text(format!("title {}", i), format!("body {}", i)))
            .await
            .unwrap();
        refs.push(receipt.content_ref);
    }
    w.store.fail_get_for(&refs[2]);

    let feed = w.newsroom.list_feed(&FeedFilter::default()).await.unwrap();
    assert_eq!(feed.len(), 5);

    let degraded: Vec<_> = feed.iter().filter(|e| e.is_degraded()).collect();
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].content_ref, refs[2]);
    assert_eq!(degraded[0].title, "title 2");
    assert_eq!(degraded[0].body, "");
    assert_eq!(degraded[0].credibility_score.value(), NEUTRAL_SCORE);
}

#[tokio::test]
async fn test_identical_payloads_share_a_reference() {
    let store = MockContentStore::new();
    let payload = ContentPayload {
        title: "A".to_string(),
        body: "B".to_string(),
        author: Address::new("0xabc"),
        timestamp: 42,
        credibility_score: 0.9,
    };

    let first = store.put(&payload).await.unwrap();
    let bytes = store.raw_bytes(&first).unwrap();
    let second = store.put(&payload).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&second).await.unwrap(), payload);
    assert_eq!(store.raw_bytes(&second).unwrap(), bytes);
}

#[tokio::test]
async fn test_list_all_order_ignores_fetch_latency() {
    let ledger = MockLedger::new();
    for i in 0..8u64 {
        ledger.push_record(
            ContentRef::new(format!("sha256://r{}", i)),
            &format!("r{}", i),
            "0xabc",
            i,
        );
    }
    // Later indexes answer first
    ledger.set_read_delays(vec![40, 35, 30, 25, 20, 15, 10, 5]);

    let client = LedgerClient::new(
        Arc::new(ledger.clone()),
        Arc::new(MockIdentity::bound("0xabc")),
        LedgerClientConfig {
            fanout_limit: 8,
            ..LedgerClientConfig::default()
        },
    );

    let records = client.list_all().await.unwrap();
    let indexes: Vec<u64> = records.iter().map(|r| r.sequence_index).collect();
    assert_eq!(indexes, (0..8).collect::<Vec<u64>>());
}
