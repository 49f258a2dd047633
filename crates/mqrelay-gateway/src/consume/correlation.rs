//! Correlation-keyed receive helpers.
//!
//! `wait_for_specific` is a destructive peek: every message examined during
//! the search — matching or not, parseable or not — is deleted. The channel
//! is treated as single-consumer-exclusive for the duration of the wait,
//! which is only appropriate for an isolated, single-tenant channel. A
//! multi-tenant deployment should filter server-side on attributes instead
//! of consume-and-discard.

use std::time::Duration;

use tokio::time::Instant;

use mqrelay_core::envelope::{Envelope, MessageAttributes};

use crate::queue::{Channel, ReceiptToken, ReceivedMessage, MAX_RECEIVE_BATCH};

/// Upper bound on one receive pass inside a correlation wait.
const SEARCH_POLL_WAIT: Duration = Duration::from_secs(2);

/// A received message with its parsed envelope.
#[derive(Debug, Clone)]
pub struct ReceivedEnvelope {
    pub envelope: Envelope,
    pub message_id: String,
    pub attributes: MessageAttributes,
    pub receipt: ReceiptToken,
}

impl ReceivedEnvelope {
    fn from_received(msg: &ReceivedMessage, envelope: Envelope) -> Self {
        Self {
            envelope,
            message_id: msg.message.message_id.clone(),
            attributes: msg.message.attributes.clone(),
            receipt: msg.receipt.clone(),
        }
    }
}

/// Wait until the channel yields a message whose correlation key equals
/// `key`, or until `timeout` elapses. The match is deleted before being
/// returned, so a second wait for the same key yields `None`. Non-matching
/// and unparseable messages encountered during the search are deleted as
/// cleanup. Returns `None` on timeout; never blocks past the deadline.
pub async fn wait_for_specific(
    channel: &Channel,
    key: &str,
    timeout: Duration,
) -> Option<ReceivedEnvelope> {
    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        let wait = SEARCH_POLL_WAIT.min(deadline - now);
        let batch = channel.receive(MAX_RECEIVE_BATCH, wait).await;
        for msg in batch {
            match Envelope::from_json(&msg.message.body) {
                Ok(env) if env.correlation_key() == Some(key) => {
                    channel.delete(&msg.receipt);
                    return Some(ReceivedEnvelope::from_received(&msg, env));
                }
                Ok(env) => {
                    tracing::warn!(
                        channel = %channel.kind(),
                        expected = key,
                        actual = env.correlation_key().unwrap_or("<none>"),
                        "skipping message with wrong correlation key, deleting"
                    );
                    channel.delete(&msg.receipt);
                }
                Err(e) => {
                    tracing::warn!(
                        channel = %channel.kind(),
                        error = %e,
                        "unparseable message during correlation search, deleting"
                    );
                    channel.delete(&msg.receipt);
                }
            }
        }
    }
}

/// Non-destructive bulk read: returns whatever is visible within `wait`,
/// parsed where possible, without deleting anything. Received messages stay
/// in-flight and reappear after the visibility timeout.
pub async fn receive_batch(
    channel: &Channel,
    max: usize,
    wait: Duration,
) -> Vec<ReceivedEnvelope> {
    channel
        .receive(max, wait)
        .await
        .iter()
        .filter_map(|msg| match Envelope::from_json(&msg.message.body) {
            Ok(env) => Some(ReceivedEnvelope::from_received(msg, env)),
            Err(e) => {
                tracing::warn!(
                    channel = %channel.kind(),
                    message_id = %msg.message.message_id,
                    error = %e,
                    "skipping unparseable message in batch read"
                );
                None
            }
        })
        .collect()
}
