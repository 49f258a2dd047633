//! Player directory: cached online/offline + location state.

use dashmap::DashMap;

use mqrelay_core::envelope::{Location, PlayerStatus};

/// Last known state for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub player_name: Option<String>,
    pub player_uuid: Option<String>,
    pub server_name: Option<String>,
    pub online: bool,
    pub location: Option<Location>,
}

/// Keyed by `playerUuid` when present, falling back to `playerName`.
/// UUIDs are opaque strings here; producers do not guarantee valid UUIDs.
#[derive(Default)]
pub struct PlayerDirectory {
    players: DashMap<String, PlayerState>,
}

fn key_of(uuid: Option<&str>, name: Option<&str>) -> Option<String> {
    uuid.or(name).map(str::to_string)
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert from an `mc_web_player_status` payload. Returns false when the
    /// payload identifies no player.
    pub fn apply_status(&self, status: &PlayerStatus) -> bool {
        let Some(key) = key_of(status.player_uuid.as_deref(), status.player_name.as_deref())
        else {
            return false;
        };
        let state = PlayerState {
            player_name: status.player_name.clone(),
            player_uuid: status.player_uuid.clone(),
            server_name: status.server_name.clone(),
            online: status.status.as_deref() == Some("online"),
            location: status.location.clone(),
        };
        self.players.insert(key, state);
        true
    }

    pub fn lookup(&self, uuid: Option<&str>, name: Option<&str>) -> Option<PlayerState> {
        let key = key_of(uuid, name)?;
        self.players.get(&key).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
