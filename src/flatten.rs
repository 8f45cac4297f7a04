//! Turns an arbitrarily shaped transcript value into ordered text lines.
//!
//! Shapes seen in the wild:
//! - a plain string
//! - a list of utterances, `{"speaker": "A", "text": "..."}` or similar
//! - ASR word grids, `{"items": [{"content": "the"}, ...]}`
//! - nested `results` / `alternatives` / `segments` wrappers around any of the above
//!
//! Every branch either returns or recurses into a strict sub-tree of its
//! input, so flattening terminates on any finite document.

use serde_json::{Map, Value};

use crate::config::{DEFAULT_PROSE_MIN_CHARS, IngestConfig};
use crate::resolver::{
    NESTED_TRANSCRIPT_KEYS, SPEAKER_KEYS, TEXT_KEYS, WORD_KEYS, resolve, resolve_entry, value_text,
};

const WORD_GRID_KEY: &str = "items";

#[derive(Debug, Clone, Copy)]
pub struct TranscriptFlattener {
    prose_min_chars: usize,
}

impl Default for TranscriptFlattener {
    fn default() -> Self {
        Self {
            prose_min_chars: DEFAULT_PROSE_MIN_CHARS,
        }
    }
}

impl TranscriptFlattener {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            prose_min_chars: config.prose_min_chars,
        }
    }

    pub fn flatten(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.trim().to_string(),
            Value::Array(items) => self.flatten_list(items),
            Value::Object(map) => self.flatten_map(value, map),
            Value::Null => String::new(),
            scalar => scalar.to_string(),
        }
    }

    /// Flatten a value found under `key`. A token list under `items` is
    /// read as one run of speech rather than one line per token.
    pub fn flatten_keyed(&self, key: &str, value: &Value) -> String {
        if key == WORD_GRID_KEY {
            if let Value::Array(items) = value {
                if is_token_grid(items) {
                    return grid_words(items).join(" ");
                }
            }
        }
        self.flatten(value)
    }

    fn flatten_list(&self, items: &[Value]) -> String {
        join_lines(items.iter().map(|item| match item {
            Value::Object(map) => self.flatten_entry(item, map),
            other => self.flatten(other),
        }))
    }

    /// One utterance-like element of a list.
    fn flatten_entry(&self, entry: &Value, map: &Map<String, Value>) -> String {
        match resolve(entry, TEXT_KEYS) {
            Some(nested @ (Value::Array(_) | Value::Object(_))) => self.flatten(nested),
            Some(text) => {
                let text = value_text(text);
                let text = text.trim();
                if text.is_empty() {
                    return String::new();
                }
                match resolve(entry, SPEAKER_KEYS).map(value_text) {
                    Some(speaker) if !speaker.trim().is_empty() => {
                        format!("{}: {}", speaker.trim(), text)
                    }
                    _ => text.to_string(),
                }
            }
            None => {
                if let Some(Value::Array(items)) = map.get(WORD_GRID_KEY) {
                    let words = grid_words(items);
                    if !words.is_empty() {
                        return words.join(" ");
                    }
                }
                let joined = string_members(map);
                if joined.is_empty() {
                    self.flatten_map(entry, map)
                } else {
                    joined
                }
            }
        }
    }

    fn flatten_map(&self, value: &Value, map: &Map<String, Value>) -> String {
        // first hit only; aliased keys often repeat the same text
        if let Some((key, nested)) = resolve_entry(value, NESTED_TRANSCRIPT_KEYS) {
            return self.flatten_keyed(key, nested);
        }
        join_lines(map.values().filter_map(|member| match member {
            Value::String(s) if s.chars().count() > self.prose_min_chars => {
                Some(s.trim().to_string())
            }
            Value::Array(_) | Value::Object(_) => Some(self.flatten(member)),
            _ => None,
        }))
    }
}

/// Word of one grid token. AWS-style tokens keep it in `alternatives[0]`.
fn token_word(token: &Value) -> Option<String> {
    let word = resolve(token, WORD_KEYS).or_else(|| {
        token
            .get("alternatives")
            .and_then(Value::as_array)
            .and_then(|alts| alts.first())
            .and_then(|alt| resolve(alt, WORD_KEYS))
    })?;
    let word = value_text(word);
    let trimmed = word.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn grid_words(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(token_word).collect()
}

/// Every element is an object carrying a single whitespace-free word and
/// no speaker. Attributed elements are utterances, however short.
fn is_token_grid(items: &[Value]) -> bool {
    !items.is_empty()
        && items.iter().all(|token| {
            token.is_object()
                && resolve(token, SPEAKER_KEYS).is_none()
                && token_word(token).is_some_and(|w| !w.contains(char::is_whitespace))
        })
}

fn string_members(map: &Map<String, Value>) -> String {
    map.values()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
