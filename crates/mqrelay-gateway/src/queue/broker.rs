//! Broker: the three named channels plus the publish path.
//!
//! `publish` is the router's write side: it resolves the destination channel
//! from the envelope's type, synthesizes the side-channel attributes, and
//! enqueues the serialized body. It is public API — the MC plugin side
//! enqueues replies directly without going through HTTP.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use mqrelay_core::envelope::{Envelope, MessageAttributes};
use mqrelay_core::error::{RelayError, Result};
use mqrelay_core::routing::{route, ChannelKind};

use crate::config::QueueSection;
use crate::queue::channel::{Channel, ChannelConfig, MAX_RECEIVE_BATCH};

/// Confirmation of an accepted publish.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub message_id: String,
    pub channel: ChannelKind,
}

pub struct Broker {
    channels: HashMap<ChannelKind, Arc<Channel>>,
}

impl Broker {
    pub fn new(queue: &QueueSection) -> Self {
        let cfg = ChannelConfig {
            visibility_timeout: Duration::from_millis(queue.visibility_timeout_ms),
            max_receive_count: queue.max_receive_count,
            max_depth: queue.max_depth,
        };
        let channels = ChannelKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::new(Channel::new(kind, cfg.clone()))))
            .collect();
        Self { channels }
    }

    pub fn channel(&self, kind: ChannelKind) -> Arc<Channel> {
        // all three channels exist from construction
        match self.channels.get(&kind) {
            Some(ch) => Arc::clone(ch),
            None => unreachable!("channel map is total over ChannelKind"),
        }
    }

    /// Route an envelope to its channel and enqueue it with synthesized
    /// attributes. `source` is the producing ingress identity.
    pub fn publish(&self, env: &Envelope, source: &str) -> Result<PublishReceipt> {
        let kind = route(env.message_type());
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| RelayError::Internal(format!("timestamp format failed: {e}")))?;
        let attributes = MessageAttributes::synthesize(env, source, timestamp);
        let body = env.to_json()?;
        let message_id = self.channel(kind).enqueue(body, attributes)?;
        tracing::info!(
            channel = %kind,
            %message_id,
            message_type = env.message_type().as_str(),
            source,
            "published"
        );
        Ok(PublishReceipt {
            message_id,
            channel: kind,
        })
    }

    /// Receive-and-delete until the channel is empty. Returns how many
    /// messages were discarded.
    pub async fn cleanup(&self, kind: ChannelKind) -> usize {
        let channel = self.channel(kind);
        let mut discarded = 0;
        loop {
            let batch = channel
                .receive(MAX_RECEIVE_BATCH, Duration::from_millis(100))
                .await;
            if batch.is_empty() {
                return discarded;
            }
            for m in batch {
                if channel.delete(&m.receipt) {
                    discarded += 1;
                }
            }
        }
    }
}
