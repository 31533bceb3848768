//! LINE Messaging API: reply/push transport and webhook handling.

pub mod client;
pub mod webhook;

pub use client::LineClient;
pub use webhook::{parse_payload, verify_signature, WebhookEvent, WebhookPayload};
