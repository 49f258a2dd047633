//! Discord-bound consumer: turns MC events into notification lines.

use async_trait::async_trait;

use mqrelay_core::envelope::{Envelope, MessageType, Payload};
use mqrelay_core::error::Result;

use crate::dispatch::MessageHandler;
use crate::runtime::HandlerCtx;

#[derive(Default)]
pub struct DiscordNotifyService;

impl DiscordNotifyService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageHandler for DiscordNotifyService {
    fn kinds(&self) -> &'static [MessageType] {
        &[MessageType::PlayerEvent, MessageType::ServerStatus]
    }

    async fn handle(&self, ctx: HandlerCtx, env: Envelope) -> Result<()> {
        match &env.payload {
            Payload::PlayerEvent(ev) => {
                let server = ev.server_name.as_deref().unwrap_or("the server");
                match ev.event_type.as_str() {
                    "join" => ctx
                        .notify()
                        .push(format!("{} joined {}", ev.player_name, server)),
                    "leave" => ctx
                        .notify()
                        .push(format!("{} left {}", ev.player_name, server)),
                    other => {
                        // forward-compat: new event kinds are not an error
                        tracing::warn!(event_type = other, "unrecognized player event");
                    }
                }
            }
            Payload::ServerStatus(st) => {
                let server = st.server_name.as_deref().unwrap_or("server");
                let status = st.status.as_deref().unwrap_or("unknown");
                let line = match st.player_count {
                    Some(n) => format!("{server} is {status} ({n} players online)"),
                    None => format!("{server} is {status}"),
                };
                ctx.notify().push(line);
            }
            _ => {
                tracing::warn!(
                    message_type = env.message_type().as_str(),
                    "discord service received unrelated type"
                );
            }
        }
        Ok(())
    }
}
