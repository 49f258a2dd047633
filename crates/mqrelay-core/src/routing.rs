//! The routing table: message type -> destination channel.
//!
//! Routing is pure and stateless; redelivering the same envelope always
//! yields the same channel.

use serde::{Deserialize, Serialize};

use crate::envelope::MessageType;

/// The three relay directions, each backed by one durable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// MC / web events bound for the Discord bot.
    Discord,
    /// Web app -> Minecraft plugin.
    WebToMc,
    /// Minecraft plugin -> web app.
    McToWeb,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::Discord,
        ChannelKind::WebToMc,
        ChannelKind::McToWeb,
    ];

    /// Name used in ingress paths and channel identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Discord => "discord",
            ChannelKind::WebToMc => "web-to-mc",
            ChannelKind::McToWeb => "mc-to-web",
        }
    }

    /// Resolve an ingress path segment.
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == segment)
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a message type to its destination channel.
pub fn route(msg_type: MessageType) -> ChannelKind {
    match msg_type {
        MessageType::PlayerEvent | MessageType::ServerStatus => ChannelKind::Discord,
        MessageType::WebMcAuthConfirm
        | MessageType::WebMcCommand
        | MessageType::WebMcPlayerRequest => ChannelKind::WebToMc,
        MessageType::McWebAuthResponse | MessageType::McWebPlayerStatus => ChannelKind::McToWeb,
    }
}
