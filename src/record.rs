use serde::{Deserialize, Serialize};

/// Written wherever a field could not be determined.
pub const UNKNOWN: &str = "unknown";

/// One normalized meeting. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub region: String,
    pub meeting_id: String,
    pub meeting_type: String,
    pub meeting_date: String,
    pub transcript_text: String,
    pub source_path: String,
}

/// Records in file-discovery order.
pub type RecordTable = Vec<MeetingRecord>;

impl MeetingRecord {
    /// Column order of every tabular output.
    pub const COLUMNS: [&'static str; 6] = [
        "region",
        "meeting_id",
        "meeting_type",
        "meeting_date",
        "transcript_text",
        "source_path",
    ];

    pub fn fields(&self) -> [&str; 6] {
        [
            &self.region,
            &self.meeting_id,
            &self.meeting_type,
            &self.meeting_date,
            &self.transcript_text,
            &self.source_path,
        ]
    }
}
