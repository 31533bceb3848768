//! Webhook signature verification and event parsing.
//!
//! LINE signs every webhook body with the channel secret:
//! `x-line-signature = base64(HMAC-SHA256(channel_secret, raw_body))`.
//! Verification must run on the raw bytes, before any JSON parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use cinfo_common::error::{CinfoError, CinfoResult};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Check `signature` against the body. Comparison is constant-time.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> CinfoResult<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| CinfoError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| CinfoError::Config(format!("invalid channel secret: {e}")))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| CinfoError::InvalidSignature)
}

/// Signature LINE would send for `body`.
pub fn sign_body(channel_secret: &str, body: &[u8]) -> CinfoResult<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| CinfoError::Config(format!("invalid channel secret: {e}")))?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookEvent {
    /// `(reply_token, text)` for a text message event, `None` for
    /// anything else (follows, stickers, redeliveries without a token).
    pub fn text_message(&self) -> Option<(&str, &str)> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref().filter(|m| m.kind == "text")?;
        Some((self.reply_token.as_deref()?, message.text.as_deref()?))
    }
}

impl EventSource {
    /// Push target for this conversation: group, then room, then user.
    pub fn target_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.room_id.as_deref())
            .or(self.user_id.as_deref())
    }
}

pub fn parse_payload(body: &[u8]) -> CinfoResult<WebhookPayload> {
    serde_json::from_slice(body).map_err(|e| CinfoError::Parse(format!("webhook body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel-secret";

    const TEXT_EVENT: &str = r#"{
        "destination": "Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
        "events": [{
            "type": "message",
            "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
            "source": {"type": "group", "groupId": "Ca56f94637c", "userId": "U4af4980629"},
            "timestamp": 1462629479859,
            "mode": "active",
            "message": {"type": "text", "id": "325708", "text": "残高"}
        }]
    }"#;

    #[test]
    fn test_sign_then_verify() {
        let body = TEXT_EVENT.as_bytes();
        let signature = sign_body(SECRET, body).unwrap();
        assert!(verify_signature(SECRET, body, &signature).is_ok());
    }

    #[test]
    fn test_known_signature() {
        // base64(HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog"))
        let sig = "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=";
        assert!(verify_signature("key", b"The quick brown fox jumps over the lazy dog", sig).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = sign_body(SECRET, b"{\"events\":[]}").unwrap();
        let err = verify_signature(SECRET, b"{\"events\":[1]}", &signature).unwrap_err();
        assert!(matches!(err, CinfoError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign_body("other", b"{}").unwrap();
        assert!(verify_signature(SECRET, b"{}", &signature).is_err());
    }

    #[test]
    fn test_garbage_signature_rejected() {
        assert!(verify_signature(SECRET, b"{}", "not base64!!").is_err());
        assert!(verify_signature(SECRET, b"{}", "").is_err());
    }

    #[test]
    fn test_parse_text_event() {
        let payload = parse_payload(TEXT_EVENT.as_bytes()).unwrap();
        assert_eq!(payload.events.len(), 1);
        let event = &payload.events[0];
        assert_eq!(
            event.text_message(),
            Some(("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA", "残高"))
        );
        let source = event.source.as_ref().unwrap();
        assert_eq!(source.target_id(), Some("Ca56f94637c"));
    }

    #[test]
    fn test_non_text_events_ignored() {
        let body = r#"{"events": [
            {"type": "follow", "replyToken": "r1", "source": {"type": "user", "userId": "U1"}},
            {"type": "message", "replyToken": "r2", "message": {"type": "sticker", "id": "1"}},
            {"type": "message", "message": {"type": "text", "id": "2", "text": "rate"}}
        ]}"#;
        let payload = parse_payload(body.as_bytes()).unwrap();
        assert!(payload.events.iter().all(|e| e.text_message().is_none()));
    }

    #[test]
    fn test_empty_events_verification_ping() {
        let payload = parse_payload(br#"{"destination": "U1", "events": []}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_payload(b"not json").is_err());
    }
}
