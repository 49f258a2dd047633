//! Signed HTTP ingress.
//!
//! `POST /v1/{discord|web-to-mc|mc-to-web}` with a JSON envelope body and an
//! HMAC `Authorization` header. Errors detected here surface synchronously
//! to the producer: 401 for signature failures, 400 for malformed bodies or
//! misrouted types, 5xx only for downstream enqueue failure.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use mqrelay_core::envelope::{self, Envelope, Probe};
use mqrelay_core::error::{ClientCode, RelayError};
use mqrelay_core::routing::{route, ChannelKind};

use crate::app_state::AppState;

fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::AuthFailed => StatusCode::UNAUTHORIZED,
        ClientCode::NotAllowed => StatusCode::FORBIDDEN,
        ClientCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &RelayError) -> Response {
    let code = err.client_code();
    (
        status_for(code),
        axum::Json(json!({
            "success": false,
            "error": code.as_str(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

pub async fn ingest(
    State(app): State<AppState>,
    Path(channel): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(ingress_kind) = ChannelKind::from_path(&channel) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "success": false, "error": "NOT_FOUND" })),
        )
            .into_response();
    };
    let path = format!("/v1/{channel}");

    // signature first; nothing about the body is trusted before this
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let verified = match authorization {
        Some(value) => app.verifier().verify("POST", &path, &body, value),
        None => Err(RelayError::AuthFailed),
    };
    if let Err(e) = verified {
        tracing::warn!(%path, "rejected unsigned or badly signed request");
        return error_response(&e);
    }

    // classify by declared type
    let env = match classify(&body) {
        Ok(env) => env,
        Err(e) => return error_response(&e),
    };

    // the declared type must route to the channel this ingress serves
    let routed = route(env.message_type());
    if routed != ingress_kind {
        return error_response(&RelayError::BadRequest(format!(
            "type {} routes to {}, not {}",
            env.message_type().as_str(),
            routed,
            ingress_kind
        )));
    }

    match app.broker().publish(&env, app.source_for(ingress_kind)) {
        Ok(receipt) => (
            StatusCode::OK,
            axum::Json(json!({
                "success": true,
                "messageId": receipt.message_id,
                "message": "Message queued successfully",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(channel = %ingress_kind, error = %e, "enqueue failed");
            error_response(&e)
        }
    }
}

fn classify(body: &str) -> mqrelay_core::Result<Envelope> {
    match envelope::probe(body)? {
        Probe::MissingType => Err(RelayError::BadRequest("missing type field".into())),
        Probe::Unknown(tag) => Err(RelayError::BadRequest(format!("unknown type: {tag}"))),
        Probe::Known(_) => Envelope::from_json(body),
    }
}
