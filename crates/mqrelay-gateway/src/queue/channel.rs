//! A single durable channel.
//!
//! Delivery contract:
//! - at-least-once: a received-but-undeleted message reappears after the
//!   visibility timeout, with its receive count incremented;
//! - no FIFO guarantee: redelivered messages re-enter at the back;
//! - a message whose receive count reaches `max_receive_count` moves to the
//!   dead-letter buffer instead of becoming visible again;
//! - `receive` long-polls up to the caller's wait, waking early on enqueue
//!   or on the next visibility expiry.
//!
//! The channel is the sole shared mutable resource between producers and
//! consumers; every primitive is atomic at the channel boundary.

use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

use mqrelay_core::envelope::MessageAttributes;
use mqrelay_core::error::{RelayError, Result};
use mqrelay_core::routing::ChannelKind;

/// Hard cap on a single receive batch.
pub const MAX_RECEIVE_BATCH: usize = 10;

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub visibility_timeout: Duration,
    pub max_receive_count: u32,
    pub max_depth: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(30),
            max_receive_count: 5,
            max_depth: 10_000,
        }
    }
}

/// An enqueued message: JSON body plus side-channel attributes.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub message_id: String,
    pub body: String,
    pub attributes: MessageAttributes,
}

/// Opaque per-delivery acknowledgment token. A fresh token is issued on
/// every delivery; tokens from earlier deliveries of the same message are
/// stale and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptToken(String);

/// One delivery of a message.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub message: QueuedMessage,
    pub receipt: ReceiptToken,
    pub receive_count: u32,
}

struct Slot {
    msg: QueuedMessage,
    receive_count: u32,
}

struct Inflight {
    slot: Slot,
    expires_at: Instant,
}

#[derive(Default)]
struct Inner {
    ready: VecDeque<Slot>,
    inflight: HashMap<String, Inflight>,
    dead: Vec<QueuedMessage>,
}

pub struct Channel {
    kind: ChannelKind,
    cfg: ChannelConfig,
    inner: Mutex<Inner>,
    notify: Notify,
}

impl Channel {
    pub fn new(kind: ChannelKind, cfg: ChannelConfig) -> Self {
        Self {
            kind,
            cfg,
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move expired in-flight messages back to ready, or to the dead-letter
    /// buffer once they exhausted their receive budget.
    fn reap_expired(&self, inner: &mut Inner, now: Instant) {
        let expired: Vec<String> = inner
            .inflight
            .iter()
            .filter(|(_, f)| f.expires_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();
        for receipt in expired {
            let Some(f) = inner.inflight.remove(&receipt) else {
                continue;
            };
            if f.slot.receive_count >= self.cfg.max_receive_count {
                tracing::warn!(
                    channel = %self.kind,
                    message_id = %f.slot.msg.message_id,
                    receive_count = f.slot.receive_count,
                    "receive budget exhausted, dead-lettering"
                );
                inner.dead.push(f.slot.msg);
            } else {
                inner.ready.push_back(f.slot);
            }
        }
    }

    /// Enqueue a message. Safe under concurrent producers; fails only when
    /// the channel backlog is full.
    pub fn enqueue(&self, body: String, attributes: MessageAttributes) -> Result<String> {
        let message_id = Uuid::new_v4().to_string();
        {
            let mut inner = self.lock();
            if inner.ready.len() + inner.inflight.len() >= self.cfg.max_depth {
                return Err(RelayError::Unavailable(format!(
                    "channel {} is full",
                    self.kind
                )));
            }
            inner.ready.push_back(Slot {
                msg: QueuedMessage {
                    message_id: message_id.clone(),
                    body,
                    attributes,
                },
                receive_count: 0,
            });
        }
        self.notify.notify_waiters();
        tracing::debug!(channel = %self.kind, %message_id, "enqueued");
        Ok(message_id)
    }

    /// Long-poll receive: returns up to `max` (capped at 10) messages,
    /// blocking up to `wait` until something becomes visible. Received
    /// messages go in-flight until deleted or their visibility expires.
    pub async fn receive(&self, max: usize, wait: Duration) -> Vec<ReceivedMessage> {
        let max = max.clamp(1, MAX_RECEIVE_BATCH);
        let deadline = Instant::now() + wait;

        loop {
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            let next_expiry = {
                let mut inner = self.lock();
                let now = Instant::now();
                self.reap_expired(&mut inner, now);

                if !inner.ready.is_empty() {
                    let mut batch = Vec::new();
                    while batch.len() < max {
                        let Some(mut slot) = inner.ready.pop_front() else {
                            break;
                        };
                        slot.receive_count += 1;
                        let receipt = Uuid::new_v4().to_string();
                        let received = ReceivedMessage {
                            message: slot.msg.clone(),
                            receipt: ReceiptToken(receipt.clone()),
                            receive_count: slot.receive_count,
                        };
                        inner.inflight.insert(
                            receipt,
                            Inflight {
                                slot,
                                expires_at: now + self.cfg.visibility_timeout,
                            },
                        );
                        batch.push(received);
                    }
                    return batch;
                }

                inner.inflight.values().map(|f| f.expires_at).min()
            };

            let now = Instant::now();
            if now >= deadline {
                return Vec::new();
            }
            let wake_at = next_expiry.map_or(deadline, |e| e.min(deadline));
            tokio::select! {
                _ = notified.as_mut() => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    /// Explicit acknowledgment: destroys the message. Stale or unknown
    /// receipts are a no-op and return false.
    pub fn delete(&self, receipt: &ReceiptToken) -> bool {
        self.lock().inflight.remove(&receipt.0).is_some()
    }

    /// Quarantine a received message immediately, skipping redelivery.
    pub fn dead_letter(&self, receipt: &ReceiptToken) -> bool {
        let mut inner = self.lock();
        match inner.inflight.remove(&receipt.0) {
            Some(f) => {
                tracing::warn!(
                    channel = %self.kind,
                    message_id = %f.slot.msg.message_id,
                    "dead-lettered by consumer"
                );
                inner.dead.push(f.slot.msg);
                true
            }
            None => false,
        }
    }

    /// Visible + in-flight count. Approximate by design: concurrent
    /// receives and expiries move messages while the caller looks.
    pub fn approximate_depth(&self) -> usize {
        let mut inner = self.lock();
        self.reap_expired(&mut inner, Instant::now());
        inner.ready.len() + inner.inflight.len()
    }

    pub fn dead_letter_depth(&self) -> usize {
        self.lock().dead.len()
    }
}
