//! Priority-ordered key lookup over a single JSON object.

use serde_json::Value;

/// Keys carrying utterance text inside a list element.
pub const TEXT_KEYS: &[&str] = &[
    "text",
    "content",
    "transcript",
    "utterance",
    "utteranceText",
    "utterances",
];
pub const SPEAKER_KEYS: &[&str] = &["speaker", "spk", "participant", "speaker_id", "speakerName"];
/// Keys of a single token in an ASR word-timing grid.
pub const WORD_KEYS: &[&str] = &["content", "text", "word"];
/// Keys under which a nested object keeps its transcript.
pub const NESTED_TRANSCRIPT_KEYS: &[&str] = &[
    "transcript",
    "Transcript",
    "Utterances",
    "utterances",
    "results",
    "items",
    "segments",
    "alternatives",
];

pub const ID_KEYS: &[&str] = &["id", "meeting_id", "file", "filename", "meetingName"];
pub const TYPE_KEYS: &[&str] = &["meeting_type", "type", "category", "meetingName", "title"];
pub const DATE_KEYS: &[&str] = &[
    "meeting_date",
    "date",
    "meetingDate",
    "recorded_on",
    "start_time",
    "startTime",
    "meeting_start",
];
/// Top-level document keys tried before flattening the whole document.
pub const DOCUMENT_TRANSCRIPT_KEYS: &[&str] = &[
    "transcript",
    "Transcript",
    "utterances",
    "Utterances",
    "content",
    "results",
    "items",
    "segments",
    "alternatives",
];

/// Null, `""`, `[]` and `{}` carry nothing and never win a lookup.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Value of the first candidate key present on `node` with a non-empty
/// value. Anything other than an object resolves to `None`.
pub fn resolve<'a>(node: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    resolve_entry(node, candidates).map(|(_, value)| value)
}

/// Like [`resolve`], also reporting which candidate matched.
pub fn resolve_entry<'a, 'k>(
    node: &'a Value,
    candidates: &[&'k str],
) -> Option<(&'k str, &'a Value)> {
    let map = node.as_object()?;
    candidates
        .iter()
        .filter_map(|key| map.get(*key).map(|value| (*key, value)))
        .find(|(_, value)| !is_empty(value))
}

/// Text form of a scalar-ish value: strings verbatim, null as nothing,
/// everything else as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
