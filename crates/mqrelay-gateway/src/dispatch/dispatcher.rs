use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use mqrelay_core::envelope::{Envelope, MessageType};
use mqrelay_core::error::{RelayError, Result};

use crate::runtime::HandlerCtx;

/// Post-receive business logic, keyed by message type. One-shot: handlers
/// hold no state across invocations beyond what `HandlerCtx` exposes.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Message types this handler serves.
    fn kinds(&self) -> &'static [MessageType];
    async fn handle(&self, ctx: HandlerCtx, env: Envelope) -> Result<()>;
}

/// Registry and dispatcher for consumer-side handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<MessageType, Arc<dyn MessageHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn MessageHandler>) {
        for kind in handler.kinds() {
            self.handlers.insert(*kind, Arc::clone(&handler));
        }
    }

    pub fn has(&self, kind: MessageType) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn registered_kinds(&self) -> Vec<MessageType> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub async fn dispatch(&self, ctx: HandlerCtx, env: Envelope) -> Result<()> {
        let kind = env.message_type();
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| RelayError::BadRequest(format!("no handler for type: {}", kind.as_str())))?
            .value()
            .clone();
        handler.handle(ctx, env).await
    }
}
