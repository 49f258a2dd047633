//! MC->Web consumer: auth outcomes and player state updates.

use async_trait::async_trait;

use mqrelay_core::envelope::{Envelope, MessageType, Payload};
use mqrelay_core::error::Result;

use crate::dispatch::MessageHandler;
use crate::runtime::{AuthOutcome, HandlerCtx};

#[derive(Default)]
pub struct WebSessionService;

impl WebSessionService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageHandler for WebSessionService {
    fn kinds(&self) -> &'static [MessageType] {
        &[
            MessageType::McWebAuthResponse,
            MessageType::McWebPlayerStatus,
        ]
    }

    async fn handle(&self, ctx: HandlerCtx, env: Envelope) -> Result<()> {
        match &env.payload {
            Payload::AuthResponse(resp) => {
                // sessionId names the waiting web session; testId is the
                // fallback used by correlation-tagged traffic
                let Some(key) = env.session_id.as_deref().or(env.test_id.as_deref()) else {
                    tracing::warn!("mc_web_auth_response without session key, dropping outcome");
                    return Ok(());
                };
                ctx.board().post(
                    key,
                    AuthOutcome {
                        success: resp.succeeded(),
                        message: resp.message.clone(),
                    },
                );
            }
            Payload::PlayerStatus(status) => {
                if !ctx.directory().apply_status(status) {
                    tracing::warn!("mc_web_player_status identifies no player, skipping");
                }
            }
            _ => {
                tracing::warn!(
                    message_type = env.message_type().as_str(),
                    "web service received unrelated type"
                );
            }
        }
        Ok(())
    }
}
