//! LINE webhook endpoint.
//!
//! POST /callback: verifies `x-line-signature` over the raw body, then
//! answers every text message event through the dispatcher.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use tracing::{debug, info, warn};

use cinfo_mod_line::webhook::{EventSource, SIGNATURE_HEADER};
use cinfo_mod_line::{parse_payload, verify_signature};

use crate::state::AppState;

pub const REJECTED: &str = "Webhooks are accepted exclusively from the LINE Platform.";
pub const ACCEPTED: &str = "Success!";

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/callback", post(callback))
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<&'static str>) {
    debug!(body = %String::from_utf8_lossy(&body), "webhook received");

    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("webhook without signature rejected");
        return (StatusCode::BAD_REQUEST, Json(REJECTED));
    };

    if let Err(e) = verify_signature(&state.channel_secret, &body, signature) {
        warn!(error = %e, "webhook signature rejected");
        return (StatusCode::BAD_REQUEST, Json(REJECTED));
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unreadable webhook body");
            return (StatusCode::OK, Json(ACCEPTED));
        }
    };

    info!(events = payload.events.len(), "webhook verified");
    for event in &payload.events {
        match event.text_message() {
            Some((reply_token, text)) => {
                let source = event.source.as_ref().and_then(EventSource::target_id);
                debug!(source = source.unwrap_or("unknown"), "text message");
                state.dispatcher.handle_text(reply_token, text).await;
            }
            None => debug!(kind = %event.kind, "event ignored"),
        }
    }

    (StatusCode::OK, Json(ACCEPTED))
}
