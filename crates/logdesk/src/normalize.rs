//! Line normalization.
//!
//! Turns one raw line into a [`LogRecord`]. Structured (JSON object) lines
//! have their level, timestamp, message and request fields resolved from a
//! handful of common key spellings; anything else is kept as a best-effort
//! INFO record. Normalization never fails.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::Zone;
use crate::types::{LogLevel, LogRecord};

/// Keys holding the level, in priority order.
const LEVEL_KEYS: [&str; 3] = ["level", "severity", "lvl"];

/// Keys holding the timestamp, in priority order.
const TIME_KEYS: [&str; 3] = ["time", "ts", "timestamp"];

/// Keys holding a numeric timestamp, in priority order.
const NUMERIC_TIME_KEYS: [&str; 3] = ["ts", "time", "timestamp"];

/// Keys holding the message, in priority order.
const MESSAGE_KEYS: [&str; 2] = ["msg", "message"];

/// Fields lifted to top level: canonical name and the aliases it is read from.
const PROMOTED_FIELDS: &[(&str, &[&str])] = &[
    ("method", &["method"]),
    ("path", &["path"]),
    ("status", &["status", "status_code"]),
    ("url", &["url"]),
    ("client_ip", &["client_ip", "ip", "remote_addr"]),
    ("user_id", &["user_id", "uid"]),
    ("request_id", &["request_id", "req_id", "trace_id"]),
    ("latency", &["latency", "duration"]),
    ("caller", &["caller"]),
    ("stack", &["stack", "stacktrace"]),
    ("error", &["error", "err"]),
];

/// Numeric timestamps at or above this magnitude are milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Digits kept in a fractional second.
const FRACTION_DIGITS: usize = 9;

/// Layouts that carry an explicit offset.
const OFFSET_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Layouts interpreted in the configured zone.
const NAIVE_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

static ISO_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?")
        .unwrap_or_else(|_| unreachable!())
});

static FRACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?\d{2}:\d{2}:\d{2})[.,](\d+)(.*)$").unwrap_or_else(|_| unreachable!())
});

/// Result of reading level text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelName {
    /// One of the six canonical levels.
    Canonical(LogLevel),
    /// Text that matched no level or alias, uppercased.
    Other(String),
}

/// Resolves level text through the alias table.
///
/// Numeric text is bucketed like a numeric level.
#[must_use]
pub fn level_from_text(text: &str) -> LevelName {
    let trimmed = text.trim();
    if let Ok(number) = trimmed.parse::<f64>() {
        return LevelName::Canonical(level_from_number(number));
    }

    let upper = trimmed.to_ascii_uppercase();
    let level = match upper.as_str() {
        "DEBUG" | "TRACE" => LogLevel::Debug,
        "INFO" => LogLevel::Info,
        "WARN" | "WARNING" => LogLevel::Warn,
        "ERROR" | "ERR" => LogLevel::Error,
        "PANIC" => LogLevel::Panic,
        "FATAL" | "CRITICAL" => LogLevel::Fatal,
        _ => return LevelName::Other(upper),
    };
    LevelName::Canonical(level)
}

/// Buckets a numeric level into the canonical levels.
#[must_use]
pub fn level_from_number(value: f64) -> LogLevel {
    match value {
        v if v <= 10.0 => LogLevel::Debug,
        v if v <= 20.0 => LogLevel::Info,
        v if v <= 30.0 => LogLevel::Warn,
        v if v <= 40.0 => LogLevel::Error,
        v if v <= 50.0 => LogLevel::Panic,
        _ => LogLevel::Fatal,
    }
}

/// Pads or truncates the fractional seconds of a timestamp to nine digits.
///
/// A comma separator is rewritten to a dot. Text without a fraction is
/// returned unchanged.
#[must_use]
pub fn normalize_fraction(text: &str) -> String {
    let Some(caps) = FRACTION.captures(text) else {
        return text.to_string();
    };
    let digits = &caps[2];
    let mut fraction: String = digits.chars().take(FRACTION_DIGITS).collect();
    while fraction.len() < FRACTION_DIGITS {
        fraction.push('0');
    }
    format!("{}.{}{}", &caps[1], fraction, &caps[3])
}

/// Builds [`LogRecord`]s from raw lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    zone: Zone,
}

impl RecordNormalizer {
    /// Creates a normalizer that reads naive timestamps in `zone`.
    #[must_use]
    pub const fn new(zone: Zone) -> Self {
        Self { zone }
    }

    /// Normalizes one raw line.
    #[must_use]
    pub fn normalize(&self, raw: &[u8]) -> LogRecord {
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(obj)) => self.normalize_object(raw, obj),
            _ => self.normalize_text(raw),
        }
    }

    /// Parses a timestamp string with the supported layouts.
    #[must_use]
    pub fn parse_time(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        let normalized = normalize_fraction(text.trim());

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Some(dt);
        }
        for layout in OFFSET_LAYOUTS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, layout) {
                return Some(dt);
            }
        }
        for layout in NAIVE_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, layout) {
                return self.zone.from_naive(&naive);
            }
        }
        None
    }

    /// Interprets a Unix timestamp, telling seconds from milliseconds by size.
    #[must_use]
    pub fn from_epoch(&self, value: f64) -> Option<DateTime<FixedOffset>> {
        if !value.is_finite() {
            return None;
        }
        let millis = if value.abs() >= MILLIS_THRESHOLD {
            value
        } else {
            value * 1000.0
        };
        self.zone.from_unix_millis(millis.round() as i64)
    }

    /// Finds an ISO-8601-shaped timestamp anywhere in `text`.
    #[must_use]
    pub fn scan_time(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        ISO_IN_TEXT
            .find_iter(text)
            .find_map(|m| self.parse_time(m.as_str()))
    }

    fn normalize_text(&self, raw: &[u8]) -> LogRecord {
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim();
        LogRecord {
            timestamp: self.scan_time(trimmed),
            level: LogLevel::Info,
            raw_level: None,
            message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            promoted: Map::new(),
            fields: Map::new(),
        }
    }

    fn normalize_object(&self, raw: &[u8], mut obj: Map<String, Value>) -> LogRecord {
        let (level, raw_level) = resolve_level(&mut obj);
        let timestamp = self
            .resolve_time(&mut obj)
            .or_else(|| self.scan_time(&String::from_utf8_lossy(raw)));
        let message = take_first(&mut obj, &MESSAGE_KEYS, |v| {
            v.as_str().map(str::to_string)
        });

        let mut promoted = Map::new();
        for (name, aliases) in PROMOTED_FIELDS {
            if let Some(alias) = aliases.iter().find(|alias| obj.contains_key(**alias)) {
                if let Some(value) = obj.shift_remove(*alias) {
                    promoted.insert((*name).to_string(), value);
                }
            }
        }

        LogRecord {
            timestamp,
            level,
            raw_level,
            message,
            promoted,
            fields: obj,
        }
    }

    fn resolve_time(&self, obj: &mut Map<String, Value>) -> Option<DateTime<FixedOffset>> {
        let from_string = take_first(obj, &TIME_KEYS, |v| {
            let text = v.as_str()?;
            if text.bytes().all(|b| b.is_ascii_digit()) && !text.is_empty() {
                return text.parse::<f64>().ok().and_then(|n| self.from_epoch(n));
            }
            self.parse_time(text)
        });
        from_string.or_else(|| {
            take_first(obj, &NUMERIC_TIME_KEYS, |v| {
                v.as_f64().and_then(|n| self.from_epoch(n))
            })
        })
    }
}

/// Reads the level from the first level key holding a string or number.
///
/// Returns the resolved level and, when the text was not recognized, the
/// uppercased text itself.
fn resolve_level(obj: &mut Map<String, Value>) -> (LogLevel, Option<String>) {
    let resolved = take_first(obj, &LEVEL_KEYS, |v| match v {
        Value::String(text) if !text.trim().is_empty() => Some(level_from_text(text)),
        Value::Number(n) => n.as_f64().map(|n| LevelName::Canonical(level_from_number(n))),
        _ => None,
    });
    match resolved {
        Some(LevelName::Canonical(level)) => (level, None),
        Some(LevelName::Other(text)) => (LogLevel::Info, Some(text)),
        None => (LogLevel::Info, None),
    }
}

/// Returns the first key whose value `read` accepts, removing that key.
fn take_first<T>(
    obj: &mut Map<String, Value>,
    keys: &[&str],
    mut read: impl FnMut(&Value) -> Option<T>,
) -> Option<T> {
    for key in keys {
        if let Some(found) = obj.get(*key).and_then(&mut read) {
            obj.shift_remove(*key);
            return Some(found);
        }
    }
    None
}
