//! CLI output formatting.
//!
//! Output is information-centric: the primary display for every image is
//! its position and file name, with details (regions, written size, failure
//! cause) as indented context lines underneath.
//!
//! ```text
//! Images
//! 001 IMG_0042.jpg (2 regions)
//!     640 x 220 at (120, 80)
//!     90 x 90 at (1480, 960)
//! 002 IMG_0043.jpg (no regions)
//!
//! 2 images, 1 with regions
//! ```
//!
//! ```text
//! 001 IMG_0042.jpg -> 3812044 bytes at quality 77
//! 002 IMG_0043.jpg -> FAILED: decode failed: ...
//!
//! Exported 1 of 2 images (1 failed)
//! ```
//!
//! Formatting functions return lines instead of printing so tests can
//! assert on them; `main` does the actual printing.

use crate::document::Document;
use crate::export::ExportReport;
use crate::region::Region;

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn region_line(region: &Region) -> String {
    format!(
        "    {:.0} x {:.0} at ({:.0}, {:.0})",
        region.width, region.height, region.x, region.y
    )
}

/// Scan listing: every image with its regions.
pub fn format_scan(documents: &[Document]) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    for (index, document) in documents.iter().enumerate() {
        let count = document.regions().len();
        let detail = match count {
            0 => "no regions".to_string(),
            1 => "1 region".to_string(),
            n => format!("{n} regions"),
        };
        lines.push(format!(
            "{:03} {} ({})",
            index + 1,
            file_name(document.source()),
            detail
        ));
        for region in document.regions() {
            lines.push(region_line(region));
        }
    }
    let with_regions = documents.iter().filter(|d| !d.regions().is_empty()).count();
    lines.push(String::new());
    lines.push(format!(
        "{} images, {} with regions",
        documents.len(),
        with_regions
    ));
    lines
}

/// Batch export report: one line per image, summary at the end.
pub fn format_report(report: &ExportReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, outcome) in report.outcomes.iter().enumerate() {
        let note = if outcome.within_limit {
            String::new()
        } else {
            " (over size limit at floor quality)".to_string()
        };
        lines.push(format!(
            "{:03} {} -> {} bytes at quality {}{}",
            index + 1,
            file_name(&outcome.path),
            outcome.bytes_written,
            outcome.quality,
            note
        ));
    }
    for failure in &report.failures {
        lines.push(format!(
            "    {} -> FAILED: {}",
            file_name(&failure.source),
            failure.error
        ));
    }
    lines.push(String::new());
    let summary = if report.all_succeeded() {
        format!("Exported {} of {} images", report.outcomes.len(), report.total())
    } else {
        format!(
            "Exported {} of {} images ({} failed)",
            report.outcomes.len(),
            report.total(),
            report.failures.len()
        )
    };
    lines.push(summary);
    lines
}
