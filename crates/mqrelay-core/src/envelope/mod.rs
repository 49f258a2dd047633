//! Envelope model (routed JSON messages).
//!
//! This module hosts the wire contract for all three relay directions:
//! - a tagged [`Payload`] union keyed on the `type` field, one variant per
//!   known message type carrying only its relevant fields;
//! - envelope-level correlation fields (`testId`, `sessionId`, `timestamp`)
//!   shared by every type;
//! - side-channel [`MessageAttributes`] mirroring `type`/`eventType` so
//!   downstream infrastructure can filter without full-body parsing.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`
//! instead of panicking, keeping pollers resilient to hostile traffic.

pub mod attrs;
pub mod payload;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

pub use attrs::MessageAttributes;
pub use payload::{
    AuthConfirm, AuthResponse, CommandRequest, Location, MessageType, Payload, PlayerEvent,
    PlayerRequest, PlayerStatus, ServerStatus,
};

/// Producer-side emission time. Producers disagree on the representation
/// (ISO strings vs epoch millis), so both are accepted and round-tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    Millis(u64),
}

/// A single routed message: a typed payload plus correlation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub payload: Payload,

    /// Correlation key used to match a reply among concurrent traffic.
    /// Absent in production traffic.
    #[serde(rename = "testId", default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,

    /// Session-scoped correlation key (web auth flows).
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Envelope {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            test_id: None,
            session_id: None,
            timestamp: None,
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// Correlation key: `testId` wins, `sessionId` is the fallback.
    pub fn correlation_key(&self) -> Option<&str> {
        self.test_id.as_deref().or(self.session_id.as_deref())
    }

    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| RelayError::BadRequest(format!("invalid envelope: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// Result of a cheap `type`-tag probe, done before full deserialization so
/// consumers can tell unknown-type traffic apart from poison bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Known(MessageType),
    Unknown(String),
    MissingType,
}

#[derive(Debug, Deserialize)]
struct TypeProbe {
    #[serde(rename = "type", default)]
    msg_type: Option<String>,
}

/// Extract the `type` tag without parsing the whole body.
/// Errors only on non-JSON input.
pub fn probe(body: &str) -> Result<Probe> {
    let p: TypeProbe = serde_json::from_str(body)
        .map_err(|e| RelayError::BadRequest(format!("invalid json: {e}")))?;
    Ok(match p.msg_type {
        None => Probe::MissingType,
        Some(t) => match MessageType::parse(&t) {
            Some(known) => Probe::Known(known),
            None => Probe::Unknown(t),
        },
    })
}
