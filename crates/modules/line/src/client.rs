//! LINE Messaging API client: text reply and push.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use cinfo_common::constants::{CHANNEL_LINE, HTTP_TIMEOUT_SECS, LINE_API_BASE};
use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::traits::Messenger;

/// Platform limit for one text message, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;
/// Platform limit for messages in one reply or push request.
pub const MAX_MESSAGES_PER_REQUEST: usize = 5;

#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

/// `{"message": "...", "details": [{"property": "...", "message": "..."}]}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    property: String,
    #[serde(default)]
    message: String,
}

impl LineClient {
    pub fn new(access_token: &str) -> CinfoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CinfoError::Config(format!("Failed to build HTTP client: {e}")))?;

        info!(channel = CHANNEL_LINE, "LINE client initialized");

        Ok(Self {
            http,
            base_url: LINE_API_BASE.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn post(&self, path: &str, body: Value) -> CinfoResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CinfoError::Network(format!("LINE request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            debug!(channel = CHANNEL_LINE, path, "message delivered");
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        Err(delivery_error(status.as_u16(), &text))
    }
}

fn text_messages(chunks: &[String]) -> Vec<Value> {
    chunks
        .iter()
        .map(|c| json!({ "type": "text", "text": c }))
        .collect()
}

/// Map a LINE error response onto [`CinfoError::Delivery`], keeping every
/// `details` entry as `property: message`.
pub fn delivery_error(status: u16, body: &str) -> CinfoError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        message: body.to_string(),
        details: Vec::new(),
    });
    CinfoError::Delivery {
        status,
        message: parsed.message,
        details: parsed
            .details
            .into_iter()
            .map(|d| format!("{}: {}", d.property, d.message))
            .collect(),
    }
}

/// Split text into chunks of at most `max_chars` characters, breaking at
/// line boundaries where possible. Lines longer than the limit are cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= max_chars {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut pieces = chars.chunks(max_chars.max(1)).peekable();
        while let Some(piece) = pieces.next() {
            let s: String = piece.iter().collect();
            if pieces.peek().is_some() {
                chunks.push(s);
            } else {
                current_len = piece.len();
                current = s;
            }
        }
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl Messenger for LineClient {
    fn channel(&self) -> &str {
        CHANNEL_LINE
    }

    /// A reply token is single-use, so anything past the per-request
    /// message limit is dropped.
    async fn reply(&self, reply_token: &str, text: &str) -> CinfoResult<()> {
        let mut chunks = split_text(text, MAX_TEXT_CHARS);
        chunks.truncate(MAX_MESSAGES_PER_REQUEST);
        self.post(
            "/v2/bot/message/reply",
            json!({ "replyToken": reply_token, "messages": text_messages(&chunks) }),
        )
        .await
    }

    async fn push(&self, to: &str, text: &str) -> CinfoResult<()> {
        let chunks = split_text(text, MAX_TEXT_CHARS);
        for batch in chunks.chunks(MAX_MESSAGES_PER_REQUEST) {
            self.post(
                "/v2/bot/message/push",
                json!({ "to": to, "messages": text_messages(batch) }),
            )
            .await?;
        }
        Ok(())
    }
}
