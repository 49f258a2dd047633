//! Consumer-side runtime state shared by handlers.
//!
//! Holds the notification sink, the player directory, the web session board,
//! and the relay action log, bundled into the per-message [`HandlerCtx`].

pub mod actions;
pub mod board;
pub mod directory;
pub mod notify;

use std::sync::Arc;

use mqrelay_core::envelope::Envelope;
use mqrelay_core::error::Result;

use crate::queue::{Broker, PublishReceipt};

pub use actions::{ActionLog, RelayAction};
pub use board::{AuthOutcome, SessionBoard};
pub use directory::{PlayerDirectory, PlayerState};
pub use notify::NotifySink;

/// Per-message context passed to handlers (borrow tools instead of owning).
#[derive(Clone)]
pub struct HandlerCtx {
    broker: Arc<Broker>,
    notify: Arc<NotifySink>,
    directory: Arc<PlayerDirectory>,
    board: Arc<SessionBoard>,
    actions: Arc<ActionLog>,
    reply_source: Arc<str>,
}

impl HandlerCtx {
    pub fn new(
        broker: Arc<Broker>,
        notify: Arc<NotifySink>,
        directory: Arc<PlayerDirectory>,
        board: Arc<SessionBoard>,
        actions: Arc<ActionLog>,
        reply_source: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            broker,
            notify,
            directory,
            board,
            actions,
            reply_source: reply_source.into(),
        }
    }

    pub fn notify(&self) -> &NotifySink {
        &self.notify
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn board(&self) -> &SessionBoard {
        &self.board
    }

    pub fn actions(&self) -> &ActionLog {
        &self.actions
    }

    /// Enqueue a reply through the same pipeline, on the channel its type
    /// routes to, stamped with the MC-side producer identity.
    pub fn reply(&self, env: &Envelope) -> Result<PublishReceipt> {
        self.broker.publish(env, &self.reply_source)
    }
}
