//! Redis Integration Tests
//!
//! These tests require Redis at localhost:6379.
//! They are marked with #[ignore] by default for CI environments.
//!
//! To run these tests:
//! 1. Start Redis: `docker run -d -p 6379:6379 redis:alpine`
//! 2. Run tests: `cargo test --test redis_integration -- --ignored`

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};

use common::*;
use mempool_sentinel::publisher::{EventSink, PublishError, RedisPublisher};
use mempool_sentinel::{Sentinel, SentinelConfig};

const REDIS_URL: &str = "redis://127.0.0.1:6379";

fn config() -> SentinelConfig {
    SentinelConfig {
        endpoint: REDIS_URL.to_string(),
        ..Default::default()
    }
}

// ==================== Connection Tests ====================

#[tokio::test]
#[ignore = "Requires running Redis at localhost:6379"]
async fn test_publisher_connects() {
    let result = RedisPublisher::connect(&config()).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
async fn test_unreachable_broker_gives_up() {
    let config = SentinelConfig {
        endpoint: "redis://127.0.0.1:1".to_string(),
        max_connect_attempts: 2,
        initial_backoff_ms: 1,
        ..Default::default()
    };
    let result = RedisPublisher::connect(&config).await;
    assert!(matches!(
        result,
        Err(PublishError::MaxConnectAttemptsExceeded(2))
    ));
}

// ==================== Publish Tests ====================

#[tokio::test]
#[ignore = "Requires running Redis at localhost:6379"]
async fn test_subscriber_receives_topic_and_payload() {
    let client = redis::Client::open(REDIS_URL).unwrap();
    let mut pubsub = client.get_async_pubsub().await.unwrap();
    pubsub.subscribe("mirrorSwapStart").await.unwrap();

    let (publisher, _writer) = RedisPublisher::connect(&config()).await.unwrap();
    let chain = FakeChain::new().with_bank(TRADER, "uusd", 1_000);
    let sentinel = Sentinel::new(classifier(registry(), chain), Arc::new(publisher.clone()));

    let raw = tx(vec![execute(
        TRADER,
        MIR_PAIR,
        json!({ "swap": { "belief_price": "1.0", "max_spread": "0.01" } }),
        coins("uusd", 1_000),
    )]);
    assert_eq!(sentinel.check_tx(&raw), 1);

    let mut messages = pubsub.on_message();
    let message = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .expect("timed out waiting for event")
        .unwrap();

    assert_eq!(message.get_channel_name(), "mirrorSwapStart");
    let payload: Vec<u8> = message.get_payload().unwrap();
    let value: Value = rmp_serde::from_slice(&payload).unwrap();
    assert_eq!(value["data"]["pairName"], "MIR-UST");
    assert_eq!(value["data"]["amount"], 1_000);
    assert_eq!(publisher.dropped(), 0);
}

#[tokio::test]
#[ignore = "Requires running Redis at localhost:6379"]
async fn test_publish_without_subscribers_does_not_block() {
    let (publisher, _writer) = RedisPublisher::connect(&config()).await.unwrap();
    let classifier = classifier(registry(), FakeChain::new());
    let raw = tx(vec![execute(TRADER, TERRA_FACTORY, json!({}), json!([]))]);

    for _ in 0..1_000 {
        for event in classifier.classify(&raw) {
            publisher.publish(&event);
        }
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(publisher.dropped(), 0);
}

#[tokio::test]
#[ignore = "Requires running Redis at localhost:6379"]
async fn test_launch_with_empty_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = SentinelConfig {
        config_dir: dir.path().to_string_lossy().into_owned(),
        ..config()
    };

    let (sentinel, _writer) = Sentinel::launch(
        &config,
        Arc::new(mempool_sentinel::JsonTxDecoder),
        Arc::new(FakeChain::new()),
    )
    .await
    .unwrap();

    // empty catalogs: nothing is tracked
    assert!(sentinel.classifier().registry().mirror_pairs.is_empty());
    let raw = tx(vec![execute(TRADER, MIR_PAIR, json!({ "swap": {} }), coins("uusd", 1))]);
    assert_eq!(sentinel.check_tx(&raw), 0);
}
