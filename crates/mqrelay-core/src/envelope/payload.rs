//! Typed payload variants, one per known message type.
//!
//! The `type` discriminator is a closed but extensible set; an unknown tag is
//! a deserialization error here and must be handled by the caller (ingress
//! rejects it, pollers log-and-acknowledge). Extra fields inside a known
//! variant are tolerated: producers attach ad-hoc context we do not model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type discriminator. Drives routing and handler dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    PlayerEvent,
    ServerStatus,
    WebMcAuthConfirm,
    WebMcCommand,
    WebMcPlayerRequest,
    McWebAuthResponse,
    McWebPlayerStatus,
}

impl MessageType {
    pub const ALL: [MessageType; 7] = [
        MessageType::PlayerEvent,
        MessageType::ServerStatus,
        MessageType::WebMcAuthConfirm,
        MessageType::WebMcCommand,
        MessageType::WebMcPlayerRequest,
        MessageType::McWebAuthResponse,
        MessageType::McWebPlayerStatus,
    ];

    /// Wire tag as it appears in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::PlayerEvent => "player_event",
            MessageType::ServerStatus => "server_status",
            MessageType::WebMcAuthConfirm => "web_mc_auth_confirm",
            MessageType::WebMcCommand => "web_mc_command",
            MessageType::WebMcPlayerRequest => "web_mc_player_request",
            MessageType::McWebAuthResponse => "mc_web_auth_response",
            MessageType::McWebPlayerStatus => "mc_web_player_status",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }
}

/// Tagged payload union. Field names mirror the wire contract (camelCase,
/// except `channel_id` which producers send snake_case).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Payload {
    #[serde(rename = "player_event")]
    PlayerEvent(PlayerEvent),
    #[serde(rename = "server_status")]
    ServerStatus(ServerStatus),
    #[serde(rename = "web_mc_auth_confirm")]
    AuthConfirm(AuthConfirm),
    #[serde(rename = "web_mc_command")]
    Command(CommandRequest),
    #[serde(rename = "web_mc_player_request")]
    PlayerRequest(PlayerRequest),
    #[serde(rename = "mc_web_auth_response")]
    AuthResponse(AuthResponse),
    #[serde(rename = "mc_web_player_status")]
    PlayerStatus(PlayerStatus),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::PlayerEvent(_) => MessageType::PlayerEvent,
            Payload::ServerStatus(_) => MessageType::ServerStatus,
            Payload::AuthConfirm(_) => MessageType::WebMcAuthConfirm,
            Payload::Command(_) => MessageType::WebMcCommand,
            Payload::PlayerRequest(_) => MessageType::WebMcPlayerRequest,
            Payload::AuthResponse(_) => MessageType::McWebAuthResponse,
            Payload::PlayerStatus(_) => MessageType::McWebPlayerStatus,
        }
    }

    /// `serverName` when the variant carries one (mirrored into attributes).
    pub fn server_name(&self) -> Option<&str> {
        match self {
            Payload::PlayerEvent(p) => p.server_name.as_deref(),
            Payload::ServerStatus(p) => p.server_name.as_deref(),
            Payload::AuthResponse(p) => p.server_name.as_deref(),
            Payload::PlayerStatus(p) => p.server_name.as_deref(),
            _ => None,
        }
    }

    /// `eventType` when the variant carries one (mirrored into attributes).
    pub fn event_type(&self) -> Option<&str> {
        match self {
            Payload::PlayerEvent(p) => Some(&p.event_type),
            _ => None,
        }
    }
}

/// `player_event` — join/leave notifications bound for Discord.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEvent {
    pub event_type: String,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(rename = "channel_id", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

/// `server_status` — server heartbeat bound for Discord.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_count: Option<u32>,
    #[serde(rename = "channel_id", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

/// `web_mc_auth_confirm` — web-side decision on an account-link request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfirm {
    pub player_name: String,
    pub player_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

/// `web_mc_command` — command to execute against a player context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_type: Option<String>,
    /// Free-form command arguments (e.g. a teleport location).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `web_mc_player_request` — ask the MC side for a player's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_uuid: Option<String>,
}

/// `mc_web_auth_response` — MC-side outcome of an auth flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Legacy producers send `authStatus: "success"` instead of `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn succeeded(&self) -> bool {
        self.success
            .unwrap_or_else(|| self.auth_status.as_deref() == Some("success"))
    }
}

/// `mc_web_player_status` — online/offline + location snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// In-world position, tolerant of partially-filled producer payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}
