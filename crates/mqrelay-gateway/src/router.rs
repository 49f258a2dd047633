//! Axum router wiring (HTTP ingress).
//!
//! Exposes one `POST /v1/:channel` route covering the three ingress paths.

use axum::{routing::post, Router};

use crate::{app_state::AppState, ingress};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/:channel", post(ingress::ingest))
        .with_state(state)
}
