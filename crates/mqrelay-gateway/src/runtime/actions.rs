//! Relay action log: effects the MC side applied on behalf of the web app.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// An effect applied by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    AccountLinked {
        player_name: String,
        player_uuid: String,
    },
    CommandExecuted {
        player_name: String,
        command: String,
        data: Option<Value>,
    },
}

#[derive(Default)]
pub struct ActionLog {
    actions: Mutex<Vec<RelayAction>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RelayAction>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, action: RelayAction) {
        self.lock().push(action);
    }

    pub fn drain(&self) -> Vec<RelayAction> {
        self.lock().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<RelayAction> {
        self.lock().clone()
    }
}
