//! mqrelay Gateway
//!
//! Signed HTTP ingress -> router -> durable channels -> consumer pollers.
//! - Ingress endpoints: POST /v1/{discord|web-to-mc|mc-to-web}
//! - Strict YAML config (mqrelay.yaml)
//! - One poller task per channel, explicit-ack consumption

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use tokio::sync::watch;

use mqrelay_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("mqrelay.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("state init failed");

    // pollers run until the process exits; the sender is held for lifetime
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let _pollers = state.spawn_pollers(shutdown_rx);

    let app = router::build_router(state);

    tracing::info!(%listen, "mqrelay-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
