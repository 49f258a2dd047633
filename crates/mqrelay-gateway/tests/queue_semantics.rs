//! Channel engine semantics: at-least-once, visibility timeout, explicit
//! ack, dead-letter threshold, long-poll behavior.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use mqrelay_core::envelope::MessageAttributes;
use mqrelay_core::routing::ChannelKind;
use mqrelay_gateway::queue::{Channel, ChannelConfig};

fn attrs() -> MessageAttributes {
    MessageAttributes {
        message_type: "player_event".into(),
        source: "test".into(),
        server: None,
        event_type: None,
        timestamp: "2026-08-23T00:00:00Z".into(),
    }
}

fn channel(visibility_ms: u64, max_receive_count: u32) -> Channel {
    Channel::new(
        ChannelKind::Discord,
        ChannelConfig {
            visibility_timeout: Duration::from_millis(visibility_ms),
            max_receive_count,
            max_depth: 100,
        },
    )
}

#[tokio::test]
async fn deleted_message_is_gone() {
    let ch = channel(30_000, 5);
    let id = ch.enqueue(r#"{"n":1}"#.into(), attrs()).unwrap();

    let batch = ch.receive(10, Duration::from_millis(100)).await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].message.message_id, id);
    assert_eq!(batch[0].receive_count, 1);
    assert!(ch.delete(&batch[0].receipt));

    let again = ch.receive(10, Duration::from_millis(100)).await;
    assert!(again.is_empty());
    assert_eq!(ch.approximate_depth(), 0);
}

#[tokio::test]
async fn stale_receipt_is_noop() {
    let ch = channel(30_000, 5);
    ch.enqueue(r#"{"n":1}"#.into(), attrs()).unwrap();
    let batch = ch.receive(10, Duration::from_millis(100)).await;
    let receipt = batch[0].receipt.clone();
    assert!(ch.delete(&receipt));
    assert!(!ch.delete(&receipt));
}

#[tokio::test]
async fn undeleted_message_reappears_after_visibility_timeout() {
    let ch = channel(150, 5);
    let id = ch.enqueue(r#"{"n":1}"#.into(), attrs()).unwrap();

    let first = ch.receive(10, Duration::from_millis(100)).await;
    assert_eq!(first.len(), 1);
    // not deleted: invisible for now
    let hidden = ch.receive(10, Duration::from_millis(50)).await;
    assert!(hidden.is_empty());

    let second = ch.receive(10, Duration::from_millis(500)).await;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].message.message_id, id);
    assert_eq!(second[0].receive_count, 2);
    // a fresh receipt is issued per delivery; the stale one no longer acks
    assert!(!ch.delete(&first[0].receipt));
    assert!(ch.delete(&second[0].receipt));
}

#[tokio::test]
async fn receive_budget_exhaustion_dead_letters() {
    let ch = channel(50, 1);
    ch.enqueue(r#"{"n":1}"#.into(), attrs()).unwrap();

    let batch = ch.receive(10, Duration::from_millis(100)).await;
    assert_eq!(batch.len(), 1);
    // never deleted; the only allowed delivery is spent
    tokio::time::sleep(Duration::from_millis(120)).await;

    let after = ch.receive(10, Duration::from_millis(100)).await;
    assert!(after.is_empty());
    assert_eq!(ch.dead_letter_depth(), 1);
    assert_eq!(ch.approximate_depth(), 0);
}

#[tokio::test]
async fn explicit_dead_letter_quarantines() {
    let ch = channel(30_000, 5);
    ch.enqueue("not json".into(), attrs()).unwrap();
    let batch = ch.receive(10, Duration::from_millis(100)).await;
    assert!(ch.dead_letter(&batch[0].receipt));
    assert_eq!(ch.dead_letter_depth(), 1);
    let after = ch.receive(10, Duration::from_millis(100)).await;
    assert!(after.is_empty());
}

#[tokio::test]
async fn empty_receive_returns_after_wait_not_before() {
    let ch = channel(30_000, 5);
    let started = std::time::Instant::now();
    let batch = ch.receive(10, Duration::from_millis(200)).await;
    let elapsed = started.elapsed();
    assert!(batch.is_empty());
    assert!(elapsed >= Duration::from_millis(180), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "never unblocked: {elapsed:?}");
}

#[tokio::test]
async fn long_poll_wakes_on_enqueue() {
    let ch = Arc::new(channel(30_000, 5));
    let producer = {
        let ch = Arc::clone(&ch);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            ch.enqueue(r#"{"n":1}"#.into(), attrs()).unwrap();
        })
    };

    let started = std::time::Instant::now();
    let batch = ch.receive(10, Duration::from_secs(5)).await;
    assert_eq!(batch.len(), 1);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "long poll did not wake on enqueue"
    );
    producer.await.unwrap();
}

#[tokio::test]
async fn batch_is_capped_at_ten() {
    let ch = channel(30_000, 5);
    for n in 0..15 {
        ch.enqueue(format!(r#"{{"n":{n}}}"#), attrs()).unwrap();
    }
    let batch = ch.receive(50, Duration::from_millis(100)).await;
    assert_eq!(batch.len(), 10);
    assert_eq!(ch.approximate_depth(), 15); // 10 in flight + 5 ready
}

#[tokio::test]
async fn concurrent_producers_need_no_coordination() {
    let ch = Arc::new(channel(30_000, 5));
    let spawn_producer = |tag: &'static str| {
        let ch = Arc::clone(&ch);
        tokio::spawn(async move { ch.enqueue(format!(r#"{{"tag":"{tag}"}}"#), attrs()).unwrap() })
    };

    let (a, b, c) = tokio::join!(
        spawn_producer("a"),
        spawn_producer("b"),
        spawn_producer("c")
    );
    let ids = [a.unwrap(), b.unwrap(), c.unwrap()];
    assert_eq!(ch.approximate_depth(), 3);
    // distinct message ids
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[tokio::test]
async fn full_channel_rejects_enqueue() {
    let ch = Channel::new(
        ChannelKind::WebToMc,
        ChannelConfig {
            visibility_timeout: Duration::from_secs(30),
            max_receive_count: 5,
            max_depth: 2,
        },
    );
    ch.enqueue("{}".into(), attrs()).unwrap();
    ch.enqueue("{}".into(), attrs()).unwrap();
    let err = ch.enqueue("{}".into(), attrs()).expect_err("must be full");
    assert_eq!(err.client_code().as_str(), "UNAVAILABLE");
}
