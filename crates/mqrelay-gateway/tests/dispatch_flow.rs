//! End-to-end consumer flows: poller -> dispatcher -> services, including
//! the request/reply hop back through the broker.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tokio::sync::watch;

use mqrelay_core::envelope::{
    AuthConfirm, AuthResponse, CommandRequest, Envelope, Location, Payload, PlayerEvent,
    PlayerRequest, PlayerStatus, ServerStatus,
};
use mqrelay_core::routing::ChannelKind;
use mqrelay_gateway::app_state::AppState;
use mqrelay_gateway::config;
use mqrelay_gateway::consume::wait_for_specific;
use mqrelay_gateway::runtime::RelayAction;

fn test_state() -> AppState {
    let yaml = r#"
version: 1
queue:
  visibility_timeout_ms: 200
  max_receive_count: 2
  max_wait_ms: 100
auth:
  region: "ap-northeast-1"
  keys:
    - id: "mc-plugin"
      secret: "s3cret"
"#;
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

async fn eventually(mut probe: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if probe() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    probe()
}

#[tokio::test]
async fn player_join_becomes_notification() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::Discord, rx);

    let mut env = Envelope::new(Payload::PlayerEvent(PlayerEvent {
        event_type: "join".into(),
        player_name: "TestPlayerJoin".into(),
        player_uuid: Some("test-uuid-join-12345".into()),
        server_name: Some("test-server".into()),
        channel_id: None,
    }));
    env.test_id = Some("flow-join".into());
    state.broker().publish(&env, "velocity-plugin").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx
                .notify()
                .snapshot()
                .iter()
                .any(|l| l == "TestPlayerJoin joined test-server"),
            Duration::from_secs(5)
        )
        .await
    );
    // processed messages are acknowledged
    assert!(
        eventually(
            || state.broker().channel(ChannelKind::Discord).approximate_depth() == 0,
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn server_status_reports_player_count() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::Discord, rx);

    let env = Envelope::new(Payload::ServerStatus(ServerStatus {
        server_name: Some("lobby".into()),
        status: Some("online".into()),
        player_count: Some(7),
        channel_id: None,
    }));
    state.broker().publish(&env, "velocity-plugin").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx
                .notify()
                .snapshot()
                .iter()
                .any(|l| l == "lobby is online (7 players online)"),
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn confirmed_auth_links_account_denied_notifies() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::WebToMc, rx);

    let confirmed = Envelope::new(Payload::AuthConfirm(AuthConfirm {
        player_name: "LinkedPlayer".into(),
        player_uuid: "uuid-linked".into(),
        confirmed: Some(true),
    }));
    let denied = Envelope::new(Payload::AuthConfirm(AuthConfirm {
        player_name: "DeniedPlayer".into(),
        player_uuid: "uuid-denied".into(),
        confirmed: Some(false),
    }));
    state.broker().publish(&confirmed, "kishax-web").unwrap();
    state.broker().publish(&denied, "kishax-web").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx.actions().snapshot().contains(&RelayAction::AccountLinked {
                player_name: "LinkedPlayer".into(),
                player_uuid: "uuid-linked".into(),
            }),
            Duration::from_secs(5)
        )
        .await
    );
    assert!(
        eventually(
            || ctx
                .notify()
                .snapshot()
                .iter()
                .any(|l| l == "account link denied for DeniedPlayer"),
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn command_is_recorded_with_its_data() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::WebToMc, rx);

    let env = Envelope::new(Payload::Command(CommandRequest {
        player_name: "commandTestPlayer".into(),
        command: None,
        command_type: Some("teleport".into()),
        data: Some(serde_json::json!({ "location": "100,64,200" })),
    }));
    state.broker().publish(&env, "kishax-web").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx.actions().snapshot().iter().any(|a| matches!(
                a,
                RelayAction::CommandExecuted { player_name, command, data }
                    if player_name == "commandTestPlayer"
                        && command == "teleport"
                        && data.as_ref().map(|d| d["location"] == "100,64,200") == Some(true)
            )),
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn player_request_replies_on_mc_to_web_with_same_correlation_key() {
    let state = test_state();

    // stage 1: let the web-side consumer cache the player's state
    let (status_tx, status_rx) = watch::channel(false);
    let status_poller = state.spawn_poller(ChannelKind::McToWeb, status_rx);

    let status = Envelope::new(Payload::PlayerStatus(PlayerStatus {
        player_name: Some("TestPlayerStatus".into()),
        player_uuid: Some("uuid-status-1".into()),
        server_name: Some("test-server".into()),
        status: Some("online".into()),
        location: Some(Location {
            world: Some("world".into()),
            x: Some(100.0),
            y: Some(64.0),
            z: Some(-200.0),
        }),
    }));
    state.broker().publish(&status, "mc-plugins").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx
                .directory()
                .lookup(Some("uuid-status-1"), None)
                .map(|s| s.online)
                == Some(true),
            Duration::from_secs(5)
        )
        .await
    );

    // stop consuming mc-to-web so the reply stays observable
    status_tx.send(true).unwrap();
    status_poller.await.unwrap();

    // stage 2: the web app asks for the player's state
    let (_req_tx, req_rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::WebToMc, req_rx);

    let mut request = Envelope::new(Payload::PlayerRequest(PlayerRequest {
        player_name: None,
        player_uuid: Some("uuid-status-1".into()),
    }));
    request.test_id = Some("player-req-1".into());
    state.broker().publish(&request, "kishax-web").unwrap();

    let mc_to_web = state.broker().channel(ChannelKind::McToWeb);
    let reply = wait_for_specific(&mc_to_web, "player-req-1", Duration::from_secs(10))
        .await
        .expect("reply must arrive with the request's correlation key");
    assert_eq!(reply.attributes.source, "mc-plugins");
    let Payload::PlayerStatus(st) = &reply.envelope.payload else {
        panic!("reply must be a player status");
    };
    assert_eq!(st.status.as_deref(), Some("online"));
    assert_eq!(st.player_uuid.as_deref(), Some("uuid-status-1"));
    assert_eq!(
        st.location.as_ref().and_then(|l| l.world.as_deref()),
        Some("world")
    );
}

#[tokio::test]
async fn auth_response_reaches_the_session_board() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::McToWeb, rx);

    let mut env = Envelope::new(Payload::AuthResponse(AuthResponse {
        player_name: Some("TestAuthPlayer".into()),
        player_uuid: Some("uuid-auth-1".into()),
        server_name: None,
        success: Some(true),
        auth_status: None,
        message: Some("auth completed".into()),
    }));
    env.session_id = Some("session-abc".into());
    state.broker().publish(&env, "mc-plugins").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx
                .board()
                .peek("session-abc")
                .map(|o| o.success && o.message.as_deref() == Some("auth completed"))
                == Some(true),
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn unknown_type_is_acknowledged_and_never_fatal() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::Discord, rx);

    let channel = state.broker().channel(ChannelKind::Discord);
    channel
        .enqueue(
            r#"{"type":"mystery_event","payload":"???"}"#.into(),
            mqrelay_core::envelope::MessageAttributes {
                message_type: "mystery_event".into(),
                source: "velocity-plugin".into(),
                server: None,
                event_type: None,
                timestamp: "2026-08-23T00:00:00Z".into(),
            },
        )
        .unwrap();

    // a valid event behind it must still be processed
    let env = Envelope::new(Payload::PlayerEvent(PlayerEvent {
        event_type: "leave".into(),
        player_name: "TestPlayerLeave".into(),
        player_uuid: None,
        server_name: Some("test-server".into()),
        channel_id: None,
    }));
    state.broker().publish(&env, "velocity-plugin").unwrap();

    let ctx = state.handler_ctx().clone();
    assert!(
        eventually(
            || ctx
                .notify()
                .snapshot()
                .iter()
                .any(|l| l == "TestPlayerLeave left test-server"),
            Duration::from_secs(5)
        )
        .await
    );
    // the unknown-type message was acknowledged, not dead-lettered
    assert!(
        eventually(|| channel.approximate_depth() == 0, Duration::from_secs(5)).await
    );
    assert_eq!(channel.dead_letter_depth(), 0);
}

#[tokio::test]
async fn poison_body_is_dead_lettered() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::Discord, rx);

    let channel = state.broker().channel(ChannelKind::Discord);
    channel
        .enqueue(
            "definitely not json".into(),
            mqrelay_core::envelope::MessageAttributes {
                message_type: "player_event".into(),
                source: "velocity-plugin".into(),
                server: None,
                event_type: None,
                timestamp: "2026-08-23T00:00:00Z".into(),
            },
        )
        .unwrap();

    assert!(
        eventually(|| channel.dead_letter_depth() == 1, Duration::from_secs(5)).await
    );
    assert_eq!(channel.approximate_depth(), 0);
}

#[tokio::test]
async fn failing_handler_leads_to_redelivery_then_dead_letter() {
    let state = test_state();
    let (_tx, rx) = watch::channel(false);
    state.spawn_poller(ChannelKind::WebToMc, rx);

    // a command with neither `command` nor `commandType` makes the handler fail
    let env = Envelope::new(Payload::Command(CommandRequest {
        player_name: "BrokenCommand".into(),
        command: None,
        command_type: None,
        data: None,
    }));
    state.broker().publish(&env, "kishax-web").unwrap();

    // visibility 200ms, receive budget 2: quarantined after the second try
    let channel = state.broker().channel(ChannelKind::WebToMc);
    assert!(
        eventually(|| channel.dead_letter_depth() == 1, Duration::from_secs(10)).await
    );
    assert_eq!(channel.approximate_depth(), 0);
}
