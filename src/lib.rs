//! Normalizes archives of heterogeneous meeting-transcript JSON documents
//! into one uniform record per meeting.
//!
//! ```no_run
//! use meetnorm::{ArchiveScanner, IngestConfig};
//!
//! let report = ArchiveScanner::new("data/MeetingBank", IngestConfig::default()).scan()?;
//! println!("{} loaded, {} skipped", report.loaded(), report.failed());
//! # Ok::<(), meetnorm::ScanError>(())
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod flatten;
pub mod normalizer;
pub mod output;
pub mod record;
pub mod resolver;
pub mod scanner;

pub use config::IngestConfig;
pub use date::{ChronoDateParser, DateNormalizer, DateParser};
pub use error::{DocumentError, ScanError};
pub use flatten::TranscriptFlattener;
pub use normalizer::DocumentNormalizer;
pub use record::{MeetingRecord, RecordTable, UNKNOWN};
pub use scanner::{ArchiveScanner, ScanReport, SkippedFile};
