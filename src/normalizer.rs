use serde_json::Value;
use std::path::{Component, Path};

use crate::config::IngestConfig;
use crate::date::DateNormalizer;
use crate::error::DocumentError;
use crate::flatten::TranscriptFlattener;
use crate::record::{MeetingRecord, UNKNOWN};
use crate::resolver::{
    DATE_KEYS, DOCUMENT_TRANSCRIPT_KEYS, ID_KEYS, TYPE_KEYS, resolve, resolve_entry, value_text,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Per-document orchestrator. Field absence always resolves to a fallback;
/// only reading or parsing the file can fail.
#[derive(Debug)]
pub struct DocumentNormalizer {
    flattener: TranscriptFlattener,
    dates: DateNormalizer,
    fragment_min_chars: usize,
    max_recovered_chars: usize,
}

impl Default for DocumentNormalizer {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

impl DocumentNormalizer {
    pub fn new(config: &IngestConfig) -> Self {
        Self::with_dates(config, DateNormalizer::default())
    }

    pub fn with_dates(config: &IngestConfig, dates: DateNormalizer) -> Self {
        Self {
            flattener: TranscriptFlattener::from_config(config),
            dates,
            fragment_min_chars: config.fragment_min_chars,
            max_recovered_chars: config.max_recovered_chars,
        }
    }

    /// Read, parse and normalize one file. `root` is the archive root the
    /// region is derived from.
    pub fn normalize_file(&self, root: &Path, path: &Path) -> Result<MeetingRecord, DocumentError> {
        let doc = read_document(path)?;
        Ok(self.normalize_document(root, path, &doc))
    }

    pub fn normalize_document(&self, root: &Path, path: &Path, doc: &Value) -> MeetingRecord {
        let meeting_id = resolve_text(doc, ID_KEYS).unwrap_or_else(|| file_stem(path));
        let meeting_type = resolve_text(doc, TYPE_KEYS).unwrap_or_else(|| UNKNOWN.to_string());
        let meeting_date = match resolve(doc, DATE_KEYS) {
            Some(raw) => non_blank(self.dates.normalize(Some(raw))),
            None => UNKNOWN.to_string(),
        };

        MeetingRecord {
            region: region_of(root, path),
            meeting_id,
            meeting_type,
            meeting_date,
            transcript_text: self.transcript_text(doc),
            source_path: path.to_string_lossy().into_owned(),
        }
    }

    fn transcript_text(&self, doc: &Value) -> String {
        let flattened = match resolve_entry(doc, DOCUMENT_TRANSCRIPT_KEYS) {
            Some((key, candidate)) => self.flattener.flatten_keyed(key, candidate),
            None => self.flattener.flatten(doc),
        };
        let flattened = flattened.trim();
        if !flattened.is_empty() {
            return flattened.to_string();
        }
        non_blank(recover_fragments(
            doc,
            self.fragment_min_chars,
            self.max_recovered_chars,
        ))
    }
}

pub fn read_document(path: &Path) -> Result<Value, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());
    serde_json::from_slice(body).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Last resort: every string in the document longer than `min_chars`, one
/// per line, capped at `max_chars` characters.
pub fn recover_fragments(doc: &Value, min_chars: usize, max_chars: usize) -> String {
    fn collect<'a>(value: &'a Value, min_chars: usize, out: &mut Vec<&'a str>) {
        match value {
            Value::String(s) => {
                let s = s.trim();
                if s.chars().count() > min_chars {
                    out.push(s);
                }
            }
            Value::Array(items) => items.iter().for_each(|v| collect(v, min_chars, out)),
            Value::Object(map) => map.values().for_each(|v| collect(v, min_chars, out)),
            _ => {}
        }
    }

    let mut fragments = Vec::new();
    collect(doc, min_chars, &mut fragments);
    let mut text = fragments.join("\n");
    if let Some((cut, _)) = text.char_indices().nth(max_chars) {
        text.truncate(cut);
    }
    text
}

/// First path component under `root`, when the file sits in a subfolder.
fn region_of(root: &Path, path: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return UNKNOWN.to_string();
    };
    let mut components = rel.components().filter(|c| matches!(c, Component::Normal(_)));
    match (components.next(), components.next()) {
        (Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
        _ => UNKNOWN.to_string(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn resolve_text(doc: &Value, candidates: &[&str]) -> Option<String> {
    resolve(doc, candidates)
        .map(value_text)
        .filter(|text| !text.trim().is_empty())
}

fn non_blank(text: String) -> String {
    if text.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateParser;
    use serde_json::json;
    use std::path::PathBuf;

    const ROOT: &str = "/archive";

    fn normalize(doc: Value) -> MeetingRecord {
        let path = PathBuf::from(ROOT).join("Denver").join("meeting_17.json");
        DocumentNormalizer::new(&IngestConfig::default()).normalize_document(
            Path::new(ROOT),
            &path,
            &doc,
        )
    }

    #[test]
    fn speaker_transcript_document() {
        let rec = normalize(json!({
            "id": "m1",
            "transcript": [
                {"speaker": "Alice", "text": "Hello"},
                {"speaker": "Bob", "text": "Hi there"}
            ]
        }));
        assert_eq!(rec.meeting_id, "m1");
        assert_eq!(rec.transcript_text, "Alice: Hello\nBob: Hi there");
        assert_eq!(rec.region, "Denver");
        assert_eq!(rec.source_path, "/archive/Denver/meeting_17.json");
    }

    #[test]
    fn top_level_word_grid() {
        let rec = normalize(json!({
            "items": [{"content": "the"}, {"content": "budget"}, {"content": "passed"}]
        }));
        assert_eq!(rec.transcript_text, "the budget passed");
    }

    #[test]
    fn dates() {
        assert_eq!(
            normalize(json!({"date": "2023-03-01T10:00:00Z"})).meeting_date,
            "2023-03-01T10:00:00+00:00"
        );
        assert_eq!(normalize(json!({"date": "not-a-date"})).meeting_date, "not-a-date");
        assert_eq!(
            normalize(json!({"start_time": 1677664800})).meeting_date,
            "2023-03-01T10:00:00"
        );
    }

    #[test]
    fn empty_document_is_all_unknown() {
        let rec = normalize(json!({}));
        assert_eq!(rec.transcript_text, "unknown");
        assert_eq!(rec.meeting_type, "unknown");
        assert_eq!(rec.meeting_date, "unknown");
        assert_eq!(rec.meeting_id, "meeting_17");
        assert_eq!(rec.region, "Denver");
    }

    #[test]
    fn transcript_beats_results() {
        let rec = normalize(json!({"results": "results text", "transcript": "transcript text"}));
        assert_eq!(rec.transcript_text, "transcript text");
    }

    #[test]
    fn metadata_candidates_and_stringification() {
        let rec = normalize(json!({
            "meeting_id": 4521,
            "title": "City Council Regular Meeting",
            "category": "Regular",
            "transcript": "Call to order."
        }));
        assert_eq!(rec.meeting_id, "4521");
        assert_eq!(rec.meeting_type, "Regular");
    }

    #[test]
    fn blank_metadata_falls_back() {
        let rec = normalize(json!({"id": "   ", "type": " ", "date": "  ", "transcript": "x"}));
        assert_eq!(rec.meeting_id, "meeting_17");
        assert_eq!(rec.meeting_type, "unknown");
        assert_eq!(rec.meeting_date, "unknown");
    }

    #[test]
    fn whole_document_flattened_without_transcript_keys() {
        let rec = normalize(json!({
            "meta": {"venue": "Held in the Council Chambers downtown"},
            "body": "Councilmember Lopez moved to approve the minutes."
        }));
        assert_eq!(
            rec.transcript_text,
            "Held in the Council Chambers downtown\nCouncilmember Lopez moved to approve the minutes."
        );
    }

    #[test]
    fn last_resort_recovers_long_strings() {
        // "transcript" resolves but flattens to nothing
        let rec = normalize(json!({
            "transcript": [{"text": "   "}],
            "label": "short",
            "notes": {"deep": ["A public hearing was scheduled."]}
        }));
        assert_eq!(rec.transcript_text, "A public hearing was scheduled.");
    }

    #[test]
    fn recovery_is_truncated_on_char_boundary() {
        let doc = json!(["é".repeat(15), "ç".repeat(15)]);
        let text = recover_fragments(&doc, 10, 20);
        assert_eq!(text.chars().count(), 20);
        assert!(text.starts_with(&format!("{}\n", "é".repeat(15))));
    }

    #[test]
    fn region_rules() {
        let root = Path::new("/archive");
        assert_eq!(region_of(root, Path::new("/archive/Boston/a.json")), "Boston");
        assert_eq!(region_of(root, Path::new("/archive/Boston/2023/a.json")), "Boston");
        assert_eq!(region_of(root, Path::new("/archive/a.json")), "unknown");
        assert_eq!(region_of(root, Path::new("/elsewhere/Boston/a.json")), "unknown");
    }

    #[test]
    fn injected_date_parser() {
        struct Fixed;
        impl DateParser for Fixed {
            fn parse(&self, _raw: &str) -> Option<String> {
                Some("2000-01-01T00:00:00".to_string())
            }
        }
        let normalizer =
            DocumentNormalizer::with_dates(&IngestConfig::default(), DateNormalizer::new(Fixed));
        let rec = normalizer.normalize_document(
            Path::new(ROOT),
            Path::new("/archive/x.json"),
            &json!({"date": "whenever"}),
        );
        assert_eq!(rec.meeting_date, "2000-01-01T00:00:00");
    }

    #[test]
    fn read_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let missing = dir.path().join("missing.json");

        let normalizer = DocumentNormalizer::new(&IngestConfig::default());
        assert!(matches!(
            normalizer.normalize_file(dir.path(), &bad),
            Err(DocumentError::Parse { .. })
        ));
        assert!(matches!(
            normalizer.normalize_file(dir.path(), &missing),
            Err(DocumentError::Read { .. })
        ));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.json");
        std::fs::write(&path, b"\xEF\xBB\xBF{\"transcript\": \"Opening remarks.\"}").unwrap();

        let rec = DocumentNormalizer::new(&IngestConfig::default())
            .normalize_file(dir.path(), &path)
            .unwrap();
        assert_eq!(rec.transcript_text, "Opening remarks.");
        assert_eq!(rec.meeting_id, "bom");
    }
}
