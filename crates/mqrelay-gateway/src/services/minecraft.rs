//! Web->MC consumer: account links, remote commands, player state requests.

use async_trait::async_trait;

use mqrelay_core::envelope::{Envelope, MessageType, Payload, PlayerStatus};
use mqrelay_core::error::{RelayError, Result};

use crate::dispatch::MessageHandler;
use crate::runtime::{HandlerCtx, RelayAction};

#[derive(Default)]
pub struct McBridgeService;

impl McBridgeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageHandler for McBridgeService {
    fn kinds(&self) -> &'static [MessageType] {
        &[
            MessageType::WebMcAuthConfirm,
            MessageType::WebMcCommand,
            MessageType::WebMcPlayerRequest,
        ]
    }

    async fn handle(&self, ctx: HandlerCtx, env: Envelope) -> Result<()> {
        match &env.payload {
            Payload::AuthConfirm(confirm) => {
                if confirm.confirmed == Some(true) {
                    ctx.actions().push(RelayAction::AccountLinked {
                        player_name: confirm.player_name.clone(),
                        player_uuid: confirm.player_uuid.clone(),
                    });
                    ctx.notify()
                        .push(format!("account link approved for {}", confirm.player_name));
                } else {
                    ctx.notify()
                        .push(format!("account link denied for {}", confirm.player_name));
                }
                Ok(())
            }
            Payload::Command(cmd) => {
                let command = cmd
                    .command
                    .as_deref()
                    .or(cmd.command_type.as_deref())
                    .ok_or_else(|| {
                        RelayError::BadRequest("web_mc_command without command".into())
                    })?;
                ctx.actions().push(RelayAction::CommandExecuted {
                    player_name: cmd.player_name.clone(),
                    command: command.to_string(),
                    data: cmd.data.clone(),
                });
                Ok(())
            }
            Payload::PlayerRequest(req) => {
                if req.player_uuid.is_none() && req.player_name.is_none() {
                    return Err(RelayError::BadRequest(
                        "web_mc_player_request identifies no player".into(),
                    ));
                }
                let state = ctx
                    .directory()
                    .lookup(req.player_uuid.as_deref(), req.player_name.as_deref());

                // reply on the MC->Web channel, carrying the same correlation key
                let status = match state {
                    Some(s) => PlayerStatus {
                        player_name: s.player_name,
                        player_uuid: s.player_uuid,
                        server_name: s.server_name,
                        status: Some(if s.online { "online" } else { "offline" }.into()),
                        location: s.location,
                    },
                    None => PlayerStatus {
                        player_name: req.player_name.clone(),
                        player_uuid: req.player_uuid.clone(),
                        server_name: None,
                        status: Some("offline".into()),
                        location: None,
                    },
                };
                let mut reply = Envelope::new(Payload::PlayerStatus(status));
                reply.test_id = env.test_id.clone();
                reply.session_id = env.session_id.clone();
                ctx.reply(&reply)?;
                Ok(())
            }
            _ => {
                tracing::warn!(
                    message_type = env.message_type().as_str(),
                    "mc bridge received unrelated type"
                );
                Ok(())
            }
        }
    }
}
