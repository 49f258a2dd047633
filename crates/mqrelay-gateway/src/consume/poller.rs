//! Per-channel consumer loop.
//!
//! Receives batches, dispatches each message to its handler, and deletes on
//! success (explicit acknowledgment). Failure policy:
//! - poison body (not JSON, or a known type that fails full parse) ->
//!   dead-letter immediately;
//! - unknown or unhandled type -> log and acknowledge, never fatal;
//! - handler error -> leave undeleted; the visibility timeout redelivers
//!   and the receive budget eventually dead-letters.
//!
//! Consumption errors are local to the poller and never propagate back to
//! producers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use mqrelay_core::envelope::{self, Envelope, Probe};

use crate::dispatch::Dispatcher;
use crate::queue::{Channel, ReceivedMessage, MAX_RECEIVE_BATCH};
use crate::runtime::HandlerCtx;

pub struct Poller {
    channel: Arc<Channel>,
    dispatcher: Arc<Dispatcher>,
    ctx: HandlerCtx,
    poll_wait: Duration,
}

impl Poller {
    pub fn new(
        channel: Arc<Channel>,
        dispatcher: Arc<Dispatcher>,
        ctx: HandlerCtx,
        poll_wait: Duration,
    ) -> Self {
        Self {
            channel,
            dispatcher,
            ctx,
            poll_wait,
        }
    }

    /// Run the loop on its own task until `shutdown` flips to true.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(channel = %self.channel.kind(), "poller started");
            loop {
                if *shutdown.borrow() {
                    break;
                }
                let batch = tokio::select! {
                    _ = shutdown.changed() => break,
                    batch = self.channel.receive(MAX_RECEIVE_BATCH, self.poll_wait) => batch,
                };
                for msg in batch {
                    self.process(msg).await;
                }
            }
            tracing::info!(channel = %self.channel.kind(), "poller stopped");
        })
    }

    async fn process(&self, msg: ReceivedMessage) {
        let body = &msg.message.body;
        match envelope::probe(body) {
            Err(e) => {
                tracing::warn!(
                    channel = %self.channel.kind(),
                    message_id = %msg.message.message_id,
                    error = %e,
                    "poison body"
                );
                self.channel.dead_letter(&msg.receipt);
            }
            Ok(Probe::MissingType) => {
                tracing::warn!(
                    channel = %self.channel.kind(),
                    message_id = %msg.message.message_id,
                    "message without type, acknowledging"
                );
                self.channel.delete(&msg.receipt);
            }
            Ok(Probe::Unknown(tag)) => {
                tracing::warn!(
                    channel = %self.channel.kind(),
                    message_id = %msg.message.message_id,
                    msg_type = %tag,
                    "unknown type, acknowledging"
                );
                self.channel.delete(&msg.receipt);
            }
            Ok(Probe::Known(kind)) => {
                if !self.dispatcher.has(kind) {
                    tracing::warn!(
                        channel = %self.channel.kind(),
                        msg_type = kind.as_str(),
                        "no handler registered, acknowledging"
                    );
                    self.channel.delete(&msg.receipt);
                    return;
                }
                match Envelope::from_json(body) {
                    Err(e) => {
                        tracing::warn!(
                            channel = %self.channel.kind(),
                            message_id = %msg.message.message_id,
                            error = %e,
                            "known type failed full parse, dead-lettering"
                        );
                        self.channel.dead_letter(&msg.receipt);
                    }
                    Ok(env) => {
                        match self.dispatcher.dispatch(self.ctx.clone(), env).await {
                            Ok(()) => {
                                self.channel.delete(&msg.receipt);
                            }
                            Err(e) => {
                                tracing::warn!(
                                    channel = %self.channel.kind(),
                                    message_id = %msg.message.message_id,
                                    receive_count = msg.receive_count,
                                    error = %e,
                                    "handler failed, leaving for redelivery"
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}
