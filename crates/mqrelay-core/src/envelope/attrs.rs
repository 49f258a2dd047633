//! Side-channel message attributes, distinct from the envelope body.
//!
//! Attribute/body duplication is deliberate: `messageType` and `eventType`
//! mirror the body so infrastructure can filter on attributes alone.

use serde::{Deserialize, Serialize};

use super::Envelope;

/// String key/value metadata attached to every enqueued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttributes {
    /// Mirrors the envelope's `type` tag.
    #[serde(rename = "messageType")]
    pub message_type: String,
    /// Configured identity of the producing ingress.
    pub source: String,
    /// Copied from the body's `serverName` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Copied from the body's `eventType` when present.
    #[serde(rename = "eventType", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// RFC3339 routing time, stamped by the router.
    pub timestamp: String,
}

impl MessageAttributes {
    /// Synthesize attributes for an envelope about to be enqueued.
    /// `timestamp` is injected by the caller so this stays clock-free.
    pub fn synthesize(env: &Envelope, source: &str, timestamp: String) -> Self {
        Self {
            message_type: env.message_type().as_str().to_string(),
            source: source.to_string(),
            server: env.payload.server_name().map(str::to_string),
            event_type: env.payload.event_type().map(str::to_string),
            timestamp,
        }
    }

    /// Flat key/value view, the shape attribute-only filters consume.
    pub fn as_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("messageType", self.message_type.as_str()),
            ("source", self.source.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ];
        if let Some(server) = &self.server {
            pairs.push(("server", server));
        }
        if let Some(event_type) = &self.event_type {
            pairs.push(("eventType", event_type));
        }
        pairs
    }
}
