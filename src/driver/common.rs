//! Common utilities shared by the session driver and the scenario steps
//!
//! Quoting for selector strings, URL joining, and the date helpers the
//! event forms need.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Timelike};

/// Format accepted by `<input type="datetime-local">`
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ============================================================================
// Quoting
// ============================================================================

/// Render `text` as an XPath 1.0 string literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds is
/// split on `'` and reassembled with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }

    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Render `value` as a double-quoted CSS string
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// URLs
// ============================================================================

/// Join a relative path onto the base URL. Absolute URLs pass through.
pub fn resolve_url(base: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") || target == "about:blank"
    {
        return target.to_string();
    }
    let base = base.trim_end_matches('/');
    if target.is_empty() || target == "/" {
        return format!("{}/", base);
    }
    if target.starts_with('/') {
        format!("{}{}", base, target)
    } else {
        format!("{}/{}", base, target)
    }
}

/// Compare two URLs ignoring a trailing slash
pub fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

// ============================================================================
// Text
// ============================================================================

/// First `max_chars` characters of `text`, whitespace collapsed
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Case-insensitive containment of any needle
pub fn contains_any_ignore_case<'a>(haystack: &str, needles: &'a [String]) -> Option<&'a str> {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .find(|n| haystack.contains(&n.to_lowercase()))
        .map(|n| n.as_str())
}

// ============================================================================
// Dates
// ============================================================================

/// Local time `minutes` from now, truncated to the minute
pub fn future_datetime(minutes: i64) -> NaiveDateTime {
    let dt = Local::now().naive_local() + ChronoDuration::minutes(minutes);
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

pub fn format_datetime_local(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_LOCAL_FORMAT).to_string()
}

/// Keep `value` when it is a well-formed `datetime-local` value in the future,
/// otherwise substitute one `fallback_minutes` from now.
pub fn normalize_future_datetime(value: &str, now: NaiveDateTime, fallback_minutes: i64) -> String {
    match NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT) {
        Ok(parsed) if parsed > now => format_datetime_local(&parsed),
        _ => {
            let fallback = now + ChronoDuration::minutes(fallback_minutes);
            let fallback = fallback
                .with_second(0)
                .and_then(|d| d.with_nanosecond(0))
                .unwrap_or(fallback);
            format_datetime_local(&fallback)
        }
    }
}
