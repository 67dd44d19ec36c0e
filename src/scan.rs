//! Input-directory scanning and region sidecar files.
//!
//! The filesystem is the data source: every `*.jpg` directly inside the
//! input directory becomes a [`Document`], sorted by file name. Blackout
//! regions persist in a sidecar next to each image:
//!
//! ```text
//! photos/
//! ├── redact.toml                  # Export config (optional)
//! ├── IMG_0042.jpg
//! ├── IMG_0042.regions.json        # Regions for IMG_0042.jpg
//! └── IMG_0043.jpg                 # No sidecar = nothing to black out
//! ```
//!
//! A sidecar is a JSON array of regions in full-resolution pixel
//! coordinates:
//!
//! ```json
//! [
//!   { "x": 120.0, "y": 80.0, "width": 640.0, "height": 220.0 }
//! ]
//! ```
//!
//! The scan is non-recursive: one directory of photos in, one directory of
//! redacted copies out.
//!
//! ## Malformed sidecars are fatal
//!
//! A sidecar that fails to parse aborts the scan instead of being skipped.
//! Every other metadata problem in this crate degrades gracefully, but a
//! dropped sidecar would export the image with nothing blacked out.

use crate::document::Document;
use crate::imaging::rust_codec;
use crate::region::Region;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("malformed region sidecar {path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Sidecar path for an image: `IMG_0042.jpg` → `IMG_0042.regions.json`.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("regions.json")
}

/// Load an image's regions from its sidecar. No sidecar means no regions.
pub fn load_regions(image: &Path) -> Result<Vec<Region>, ScanError> {
    let sidecar = sidecar_path(image);
    let contents = match std::fs::read_to_string(&sidecar) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&contents).map_err(|source| ScanError::Sidecar {
        path: sidecar,
        source,
    })
}

/// Persist an image's regions. An empty list deletes the sidecar so the
/// directory holds no stale empty files.
pub fn save_regions(image: &Path, regions: &[Region]) -> Result<(), ScanError> {
    let sidecar = sidecar_path(image);
    if regions.is_empty() {
        match std::fs::remove_file(&sidecar) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }
    let json = serde_json::to_string_pretty(regions)?;
    std::fs::write(&sidecar, json)?;
    Ok(())
}

/// Scan the input directory into one [`Document`] per JPEG, file-name order.
pub fn scan(input_dir: &Path) -> Result<Vec<Document>, ScanError> {
    if !input_dir.is_dir() {
        return Err(ScanError::NotADirectory(input_dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !rust_codec::is_supported(path) {
            continue;
        }
        let regions = load_regions(path)?;
        documents.push(Document::with_regions(path, regions));
    }
    Ok(documents)
}
