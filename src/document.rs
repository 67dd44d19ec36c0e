//! One source image, its blackout regions, and the export procedure.
//!
//! A [`Document`] is created per image at scan time and mutated through
//! exactly two operations — [`add_region`](Document::add_region) and
//! [`remove_intersecting`](Document::remove_intersecting) — by whatever
//! front end translates user gestures (or sidecar files) into regions. It
//! knows nothing about displays, widgets, or scaling: regions arrive already
//! expressed in full-resolution image coordinates.
//!
//! ## Export
//!
//! Export decodes the source fresh, blacks out every region, strips the
//! orientation tag, redacts the embedded thumbnail at its own resolution,
//! and writes a JPEG copy into the output directory. With a size limit set,
//! the encode quality descends linearly (`start`, `start - step`, ...) until
//! the output fits or the floor quality is reached.
//!
//! The descent is deliberately linear, not a binary search: JPEG output
//! size is not monotonic enough in quality to trust skipping intermediate
//! samples, and the floor bounds the worst case at
//! `(start - floor) / step + 1` encodes.

use crate::exif::{self, ExifData, Ifd, tag};
use crate::imaging::{CodecError, Dimensions, ImageCodec, Quality, apply_region, apply_regions};
use crate::region::Region;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Embedded thumbnails are small; they never participate in the size-limit
/// search and always re-encode at this quality.
const THUMBNAIL_QUALITY: u32 = 85;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("source path has no file name: {0}")]
    SourcePath(PathBuf),
}

/// Knobs for the export encode, normally built by
/// [`config`](crate::config) from defaults + `redact.toml` + CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Quality of the first encode attempt.
    pub start_quality: u32,
    /// Output size ceiling in bytes; `None` disables the descent entirely.
    pub size_limit: Option<u64>,
    /// Lowest quality the descent may reach (inclusive).
    pub quality_floor: u32,
    /// Quality decrement per descent step.
    pub quality_step: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            start_quality: 80,
            size_limit: None,
            quality_floor: 70,
            quality_step: 3,
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Quality of the accepted encode.
    pub quality: u32,
    /// False when the descent hit the floor with the size limit still
    /// exceeded — the file was written anyway, at floor quality.
    pub within_limit: bool,
}

/// A source image plus its ordered list of blackout regions.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    source: PathBuf,
    regions: Vec<Region>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            regions: Vec::new(),
        }
    }

    pub fn with_regions(source: impl Into<PathBuf>, regions: Vec<Region>) -> Self {
        Self {
            source: source.into(),
            regions,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Append a region. Zero-area regions are accepted — a click without a
    /// drag has always produced one and it still redacts a pixel.
    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Remove every region intersecting the query rectangle (corners in any
    /// order, touching edges count). Returns how many were removed.
    pub fn remove_intersecting(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> usize {
        let before = self.regions.len();
        self.regions.retain(|r| !r.intersects(x1, y1, x2, y2));
        before - self.regions.len()
    }

    /// Export a redacted copy of the source into `out_dir`.
    ///
    /// The source file is decoded fresh on every call; the document itself
    /// is read-only here. See the module docs for the pipeline.
    pub fn export(
        &self,
        codec: &impl ImageCodec,
        out_dir: &Path,
        options: &ExportOptions,
    ) -> Result<ExportOutcome, ExportError> {
        let file_name = self
            .source
            .file_name()
            .ok_or_else(|| ExportError::SourcePath(self.source.clone()))?;
        let out_path = out_dir.join(file_name);

        let mut image = codec.decode(&self.source)?;
        let full_extent = Dimensions::of(&image);
        apply_regions(&mut image, &self.regions);

        let mut metadata = exif::read_exif(&self.source);
        // The buffer above is redacted in stored orientation; a surviving
        // orientation tag would make viewers rotate an already-correct image.
        if metadata.remove(Ifd::Primary, tag::ORIENTATION) {
            log::debug!("stripped orientation tag from {}", self.source.display());
        }
        self.redact_thumbnail(codec, &mut metadata, full_extent)?;

        let mut quality = options.start_quality;
        loop {
            let encoded = codec.encode(&image, Quality::new(quality))?;
            let bytes = exif::splice_into_jpeg(&encoded, &metadata);
            let size = bytes.len() as u64;

            let within_limit = options.size_limit.is_none_or(|limit| size <= limit);
            let next_quality = quality
                .checked_sub(options.quality_step.max(1))
                .filter(|&q| q >= options.quality_floor);

            match next_quality {
                Some(next) if !within_limit => {
                    log::debug!(
                        "{}: {} bytes at quality {} exceeds limit, trying {}",
                        self.source.display(),
                        size,
                        quality,
                        next
                    );
                    quality = next;
                }
                _ => {
                    std::fs::write(&out_path, &bytes)?;
                    return Ok(ExportOutcome {
                        path: out_path,
                        bytes_written: size,
                        quality,
                        within_limit,
                    });
                }
            }
        }
    }

    /// Redact the embedded thumbnail in its own coordinate space.
    ///
    /// Regions are defined against the full-resolution image; each one is
    /// rescaled by the independent axis ratios onto the thumbnail extent
    /// before applying. A thumbnail that fails to decode is dropped from
    /// the output metadata — exporting an unredacted preview is the one
    /// thing this function must never do.
    fn redact_thumbnail(
        &self,
        codec: &impl ImageCodec,
        metadata: &mut ExifData,
        full_extent: Dimensions,
    ) -> Result<(), ExportError> {
        let Some(blob) = metadata.thumbnail.take() else {
            return Ok(());
        };
        let mut thumb = match codec.decode_bytes(&blob) {
            Ok(thumb) => thumb,
            Err(e) => {
                log::warn!(
                    "dropping undecodable thumbnail in {}: {}",
                    self.source.display(),
                    e
                );
                return Ok(());
            }
        };
        let thumb_extent = Dimensions::of(&thumb);
        for region in &self.regions {
            apply_region(&mut thumb, &region.rescaled(full_extent, thumb_extent));
        }
        metadata.thumbnail = Some(codec.encode(&thumb, Quality::new(THUMBNAIL_QUALITY))?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::tests::MockCodec;

    fn mock_dims() -> Dimensions {
        Dimensions {
            width: 100,
            height: 100,
        }
    }

    fn options(limit: Option<u64>) -> ExportOptions {
        ExportOptions {
            start_quality: 80,
            size_limit: limit,
            quality_floor: 70,
            quality_step: 3,
        }
    }

    // =========================================================================
    // Region bookkeeping
    // =========================================================================

    #[test]
    fn add_and_remove_intersecting() {
        let mut doc = Document::new("/photos/a.jpg");
        doc.add_region(Region::from_corners(0.0, 0.0, 10.0, 10.0));
        doc.add_region(Region::from_corners(50.0, 50.0, 60.0, 60.0));
        doc.add_region(Region::from_corners(5.0, 5.0, 20.0, 20.0));
        assert_eq!(doc.regions().len(), 3);

        // Query overlaps the first and third, corners deliberately swapped
        let removed = doc.remove_intersecting(8.0, 8.0, 2.0, 2.0);
        assert_eq!(removed, 2);
        assert_eq!(doc.regions().len(), 1);
        assert_eq!(doc.regions()[0], Region::from_corners(50.0, 50.0, 60.0, 60.0));
    }

    #[test]
    fn remove_missing_is_zero() {
        let mut doc = Document::new("/photos/a.jpg");
        doc.add_region(Region::from_corners(0.0, 0.0, 10.0, 10.0));
        assert_eq!(doc.remove_intersecting(90.0, 90.0, 95.0, 95.0), 0);
        assert_eq!(doc.regions().len(), 1);
    }

    #[test]
    fn accepts_degenerate_region() {
        let mut doc = Document::new("/photos/a.jpg");
        doc.add_region(Region::from_corners(5.0, 5.0, 5.0, 5.0));
        assert_eq!(doc.regions().len(), 1);
    }

    // =========================================================================
    // Quality descent (scripted sizes, no real JPEG curves involved)
    // =========================================================================

    #[test]
    fn no_limit_encodes_once_at_start_quality() {
        let tmp = tempfile::TempDir::new().unwrap();
        let codec = MockCodec::new(mock_dims(), vec![(80, 900_000)]);
        let doc = Document::new("/photos/a.jpg");

        let outcome = doc.export(&codec, tmp.path(), &options(None)).unwrap();
        assert_eq!(codec.qualities_tried(), vec![80]);
        assert_eq!(outcome.quality, 80);
        assert_eq!(outcome.bytes_written, 900_000);
        assert!(outcome.within_limit);
        assert_eq!(std::fs::metadata(&outcome.path).unwrap().len(), 900_000);
    }

    #[test]
    fn descends_until_size_fits() {
        let tmp = tempfile::TempDir::new().unwrap();
        // 80 and 77 exceed the limit, 74 fits; 71 must never be tried
        let codec = MockCodec::new(
            mock_dims(),
            vec![(80, 700_000), (77, 600_000), (74, 480_000), (71, 100)],
        );
        let doc = Document::new("/photos/a.jpg");

        let outcome = doc
            .export(&codec, tmp.path(), &options(Some(500_000)))
            .unwrap();
        assert_eq!(codec.qualities_tried(), vec![80, 77, 74]);
        assert_eq!(outcome.quality, 74);
        assert_eq!(outcome.bytes_written, 480_000);
        assert!(outcome.within_limit);
    }

    #[test]
    fn full_ladder_stops_at_floor() {
        let tmp = tempfile::TempDir::new().unwrap();
        // Nothing fits: the ladder is exactly 80, 77, 74, 71 and the
        // quality-71 result is written regardless
        let codec = MockCodec::new(
            mock_dims(),
            vec![(80, 700_000), (77, 650_000), (74, 620_000), (71, 610_000)],
        );
        let doc = Document::new("/photos/a.jpg");

        let outcome = doc
            .export(&codec, tmp.path(), &options(Some(500_000)))
            .unwrap();
        assert_eq!(codec.qualities_tried(), vec![80, 77, 74, 71]);
        assert_eq!(outcome.quality, 71);
        assert_eq!(outcome.bytes_written, 610_000);
        assert!(!outcome.within_limit);
        assert_eq!(std::fs::metadata(&outcome.path).unwrap().len(), 610_000);
    }

    #[test]
    fn descent_lands_exactly_on_floor() {
        let tmp = tempfile::TempDir::new().unwrap();
        let codec = MockCodec::new(mock_dims(), vec![(76, 600_000), (73, 590_000), (70, 580_000)]);
        let doc = Document::new("/photos/a.jpg");
        let opts = ExportOptions {
            start_quality: 76,
            ..options(Some(100))
        };

        let outcome = doc.export(&codec, tmp.path(), &opts).unwrap();
        assert_eq!(codec.qualities_tried(), vec![76, 73, 70]);
        assert_eq!(outcome.quality, 70);
    }

    #[test]
    fn start_quality_below_floor_still_exports() {
        let tmp = tempfile::TempDir::new().unwrap();
        let codec = MockCodec::new(mock_dims(), vec![(60, 999_999)]);
        let doc = Document::new("/photos/a.jpg");
        let opts = ExportOptions {
            start_quality: 60,
            ..options(Some(100))
        };

        let outcome = doc.export(&codec, tmp.path(), &opts).unwrap();
        assert_eq!(codec.qualities_tried(), vec![60]);
        assert!(!outcome.within_limit);
    }

    #[test]
    fn zero_step_cannot_loop_forever() {
        let tmp = tempfile::TempDir::new().unwrap();
        // A step of 0 is treated as 1 so the descent always terminates
        let codec = MockCodec::new(mock_dims(), vec![(80, 999_999), (79, 50)]);
        let doc = Document::new("/photos/a.jpg");
        let opts = ExportOptions {
            quality_step: 0,
            ..options(Some(100))
        };

        let outcome = doc.export(&codec, tmp.path(), &opts).unwrap();
        assert_eq!(codec.qualities_tried(), vec![80, 79]);
        assert_eq!(outcome.quality, 79);
        assert!(outcome.within_limit);
    }

    #[test]
    fn exports_under_original_file_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let codec = MockCodec::new(mock_dims(), vec![(80, 100)]);
        let doc = Document::new("/photos/vacation/IMG_0042.jpg");

        let outcome = doc.export(&codec, tmp.path(), &options(None)).unwrap();
        assert_eq!(outcome.path, tmp.path().join("IMG_0042.jpg"));
    }

    #[test]
    fn source_without_file_name_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let codec = MockCodec::new(mock_dims(), vec![(80, 100)]);
        let doc = Document::new("/");
        let result = doc.export(&codec, tmp.path(), &options(None));
        assert!(matches!(result, Err(ExportError::SourcePath(_))));
    }
}
