use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::IngestConfig;
use crate::error::{DocumentError, ScanError};
use crate::normalizer::DocumentNormalizer;
use crate::record::{MeetingRecord, RecordTable};

/// A document that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub records: RecordTable,
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    pub fn loaded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.skipped.len()
    }
}

/// Walks an archive root and normalizes every matching document under it.
/// A bad document is skipped and reported; it never aborts the scan.
#[derive(Debug)]
pub struct ArchiveScanner {
    root: PathBuf,
    config: IngestConfig,
    normalizer: DocumentNormalizer,
}

impl ArchiveScanner {
    pub fn new(root: impl Into<PathBuf>, config: IngestConfig) -> Self {
        let normalizer = DocumentNormalizer::new(&config);
        Self::with_normalizer(root, config, normalizer)
    }

    pub fn with_normalizer(
        root: impl Into<PathBuf>,
        config: IngestConfig,
        normalizer: DocumentNormalizer,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            normalizer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matching files under the root, sorted by name at every level.
    pub fn discover(&self) -> Result<Vec<PathBuf>, ScanError> {
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.config.matches_extension(entry.path()) {
                        paths.push(entry.into_path());
                    }
                }
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => warn!(error = %err, "skipping unreadable archive entry"),
            }
        }
        debug!(root = %self.root.display(), files = paths.len(), "discovered documents");
        Ok(paths)
    }

    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        self.scan_with(|_| {})
    }

    /// Like [`scan`](Self::scan), calling `on_failure` for every skipped
    /// document as it happens.
    pub fn scan_with<F>(&self, on_failure: F) -> Result<ScanReport, ScanError>
    where
        F: FnMut(&DocumentError),
    {
        info!(root = %self.root.display(), "scanning transcript archive");
        let paths = self.discover()?;
        let results = paths
            .iter()
            .map(|path| self.normalizer.normalize_file(&self.root, path));
        Ok(self.collect(results, on_failure))
    }

    /// Normalizes documents on the rayon pool, then merges in discovery order.
    #[cfg(feature = "parallel")]
    pub fn scan_parallel(&self) -> Result<ScanReport, ScanError> {
        info!(root = %self.root.display(), "scanning transcript archive in parallel");
        let paths = self.discover()?;
        let results: Vec<_> = paths
            .par_iter()
            .map(|path| self.normalizer.normalize_file(&self.root, path))
            .collect();
        Ok(self.collect(results, |_| {}))
    }

    fn collect<I, F>(&self, results: I, mut on_failure: F) -> ScanReport
    where
        I: IntoIterator<Item = Result<MeetingRecord, DocumentError>>,
        F: FnMut(&DocumentError),
    {
        let mut report = ScanReport::default();
        for result in results {
            match result {
                Ok(record) => report.records.push(record),
                Err(err) => {
                    warn!(path = %err.path().display(), error = %err, "skipping document");
                    on_failure(&err);
                    report.skipped.push(SkippedFile {
                        path: err.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            loaded = report.loaded(),
            failed = report.failed(),
            "loaded transcripts"
        );
        report
    }
}
