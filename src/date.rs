//! Best-effort meeting date normalization.
//!
//! Numbers are epoch seconds, strings go through a [`DateParser`], and
//! whatever cannot be understood is handed back as text. Nothing here fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

use crate::record::UNKNOWN;

const NAIVE_ISO: &str = "%Y-%m-%dT%H:%M:%S%.f";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
];

fn ordinal_re() -> &'static Regex {
    static ORDINAL_RE: OnceLock<Regex> = OnceLock::new();
    ORDINAL_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal regex")
    })
}

/// String → normalized timestamp, or `None` when the string is not a date.
pub trait DateParser: Send + Sync {
    fn parse(&self, raw: &str) -> Option<String>;
}

/// Format-list parser on top of chrono.
///
/// Zoned inputs keep their offset (`2023-03-01T10:00:00+00:00`); naive inputs
/// and bare dates are rendered without one, dates at midnight.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChronoDateParser;

impl DateParser for ChronoDateParser {
    fn parse(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
            return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
        }

        let cleaned = ordinal_re().replace_all(trimmed, "$1");
        let cleaned = cleaned.as_ref();

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(cleaned, fmt) {
                return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
            }
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
                return Some(dt.format(NAIVE_ISO).to_string());
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
                return date
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.format(NAIVE_ISO).to_string());
            }
        }
        None
    }
}

pub struct DateNormalizer {
    parser: Box<dyn DateParser>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(ChronoDateParser)
    }
}

impl std::fmt::Debug for DateNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateNormalizer").finish_non_exhaustive()
    }
}

impl DateNormalizer {
    pub fn new(parser: impl DateParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
        }
    }

    pub fn normalize(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => UNKNOWN.to_string(),
            Some(Value::Number(n)) => from_epoch_seconds(n).unwrap_or_else(|| n.to_string()),
            Some(Value::String(s)) => self.parser.parse(s).unwrap_or_else(|| s.clone()),
            Some(other) => other.to_string(),
        }
    }
}

/// Epoch seconds (integer or fractional) as a naive UTC ISO-8601 string.
fn from_epoch_seconds(n: &Number) -> Option<String> {
    let dt = if let Some(secs) = n.as_i64() {
        DateTime::from_timestamp(secs, 0)?
    } else {
        let secs = n.as_f64()?;
        if !secs.is_finite() || secs.abs() >= i64::MAX as f64 {
            return None;
        }
        let whole = secs.floor();
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::from_timestamp(whole as i64, nanos)?
    };
    Some(dt.naive_utc().format(NAIVE_ISO).to_string())
}
