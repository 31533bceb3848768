//! Chat command vocabulary.
//!
//! Matching is exact after trimming surrounding whitespace; every command
//! has an English and a Japanese spelling.

/// Reply to `test`/`テスト`: a plain liveness greeting.
pub const TEST_REPLY: &str = "こんにちは！！！！！！";

/// Reply to unknown input when `server.reply_unrecognized` is on.
pub const UNRECOGNIZED_REPLY: &str = "command not found. Send \"help\" for the command list.";

/// Sent once when a report could not be built or delivered.
pub const GENERIC_ERROR_REPLY: &str = "Sorry, something went wrong. Please try again later.";

pub const HELP_TEXT: &str = "\
【Commands】
  balance / 残高: balances and JPY totals
  history / 履歴: executed trades
  rate / レート: current JPY rates
  help / ヘルプ: this list
  test / テスト: check that the bot is alive";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Balance,
    History,
    Rate,
    Help,
    Test,
    /// Anything outside the vocabulary, trimmed.
    Unrecognized(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "balance" | "残高" => Command::Balance,
            "history" | "履歴" => Command::History,
            "rate" | "レート" => Command::Rate,
            "help" | "ヘルプ" => Command::Help,
            "test" | "テスト" => Command::Test,
            other => Command::Unrecognized(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Balance => "balance",
            Command::History => "history",
            Command::Rate => "rate",
            Command::Help => "help",
            Command::Test => "test",
            Command::Unrecognized(_) => "unrecognized",
        }
    }
}
