//! Formatting utilities: money, signed deltas, timestamps, reports.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use cinfo_types::report::{Report, ReportLine};

/// UTC+9. Reports are read in Japan.
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Insert `,` every three digits of the integer part.
/// `"-1234567.891"` → `"-1,234,567.891"`.
pub fn group_thousands(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Yen amount for display: floored to an integer, thousands-separated.
pub fn format_jpy(amount: Decimal) -> String {
    group_thousands(&amount.floor().to_string())
}

/// Price for display: truncated to `dp` decimals, thousands-separated,
/// trailing zeros dropped. `5000000.00` → `5,000,000`, `312.4567` → `312.45`.
pub fn format_price(price: Decimal, dp: u32) -> String {
    let truncated = price
        .round_dp_with_strategy(dp, RoundingStrategy::ToZero)
        .normalize();
    group_thousands(&truncated.to_string())
}

/// Plain amount without trailing zeros. `0.10000000` → `0.1`.
pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Sign-prefixed amount: `+` for zero and above, `-` below.
pub fn format_signed(amount: Decimal) -> String {
    let sign = if amount >= Decimal::ZERO { '+' } else { '-' };
    format!("{sign}{}", format_amount(amount.abs()))
}

/// RFC 3339 timestamp rendered as JST `YYYY/MM/DD HH:MM`.
/// Unparseable input is returned unchanged.
pub fn format_timestamp_jst(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => format_datetime_jst(dt.with_timezone(&Utc)),
        Err(_) => raw.to_string(),
    }
}

pub fn format_datetime_jst(dt: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => dt.with_timezone(&jst).format("%Y/%m/%d %H:%M").to_string(),
        None => dt.format("%Y/%m/%d %H:%M UTC").to_string(),
    }
}

/// `btc_jpy` → `BTC/JPY`.
pub fn format_pair(pair: &str) -> String {
    pair.to_uppercase().replace('_', "/")
}

/// Render a report as plain, line-delimited text.
pub fn render_report(report: &Report) -> String {
    let rendered: Vec<String> = report
        .lines()
        .iter()
        .map(|line| match line {
            ReportLine::Title(t) => format!("【{t}】"),
            ReportLine::Section(s) => format!("■ {s}"),
            ReportLine::Entry { label, value } => format!("  {label}: {value}"),
            ReportLine::Text(t) => format!("  {t}"),
            ReportLine::Blank => String::new(),
        })
        .collect();
    rendered.join("\n").trim_end().to_string()
}
