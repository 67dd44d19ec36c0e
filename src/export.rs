//! Sequential batch export with per-document failure isolation.
//!
//! Documents are exported one at a time, in scan order. Exports never
//! interleave and share nothing but the output directory, so a decode or
//! encode failure on one photo cannot corrupt or abort the rest of the
//! batch — it is recorded and the iteration moves on.

use crate::document::{Document, ExportError, ExportOptions, ExportOutcome};
use crate::imaging::ImageCodec;
use std::path::{Path, PathBuf};

/// One document that failed to export.
#[derive(Debug)]
pub struct ExportFailure {
    pub source: PathBuf,
    pub error: ExportError,
}

/// Results of a batch run: successful outcomes and isolated failures,
/// each in scan order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<ExportOutcome>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }
}

/// Export every document into `out_dir`, isolating per-document failures.
pub fn export_all(
    documents: &[Document],
    codec: &impl ImageCodec,
    out_dir: &Path,
    options: &ExportOptions,
) -> ExportReport {
    let mut report = ExportReport::default();
    for document in documents {
        match document.export(codec, out_dir, options) {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(error) => {
                log::error!("export failed for {}: {}", document.source().display(), error);
                report.failures.push(ExportFailure {
                    source: document.source().to_path_buf(),
                    error,
                });
            }
        }
    }
    report
}
