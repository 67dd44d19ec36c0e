//! # Photo Redact
//!
//! Batch redaction for photo directories. Draw rectangular blackout regions
//! over sensitive content, then export redacted JPEG copies with metadata
//! preserved (minus orientation), the embedded thumbnail redacted at its own
//! resolution, and an optional output size cap.
//!
//! # Architecture: UI-Free Core
//!
//! The crate is a geometry + export engine with no knowledge of any event
//! system. A front end (the bundled CLI, or a windowing shell) translates
//! user gestures into three calls:
//!
//! ```text
//! Document::add_region(Region::from_corners(x1, y1, x2, y2))
//! Document::remove_intersecting(x1, y1, x2, y2)
//! Document::export(&codec, out_dir, &options)
//! ```
//!
//! All regions are expressed in full-resolution source-image coordinates.
//! Display scaling is entirely the front end's problem; the core only
//! rescales regions once, onto the embedded thumbnail's pixel grid.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`region`] | Axis-aligned blackout rectangles: corner normalization, hit tests, rescaling |
//! | [`document`] | One image + its regions, and the export pipeline with the quality-descent size search |
//! | [`imaging`] | JPEG codec seam ([`imaging::ImageCodec`]) and the pixel-zeroing redaction pass |
//! | [`exif`] | Hand-rolled EXIF reader/writer: orientation strip, thumbnail blob, APP1 splicing |
//! | [`scan`] | Input-directory enumeration and region sidecar files |
//! | [`export`] | Sequential batch export with per-document failure isolation |
//! | [`config`] | Defaults + `redact.toml` + CLI flag merging, startup validation |
//! | [`output`] | CLI output formatting — indented per-image listings and reports |
//!
//! # Design Decisions
//!
//! ## Linear Quality Descent, Not Binary Search
//!
//! The size-capped export re-encodes at `start`, `start - step`, ... down to
//! a floor quality, taking the first result under the limit. JPEG output
//! size is not monotonic enough in quality for a bisection to be trusted —
//! it can skip a level that would have qualified — and the floor already
//! bounds the worst case to `(start - floor) / step + 1` encodes.
//!
//! ## Orientation Is Always Stripped
//!
//! Regions are applied to the decoded buffer in its *stored* orientation.
//! If the EXIF orientation tag survived export, viewers would rotate the
//! already-correct pixels a second time, so the tag is removed from every
//! output unconditionally.
//!
//! ## Hand-Rolled EXIF (No Metadata Crate)
//!
//! The metadata layer needs an unusual combination: read every tag, delete
//! one, re-encode the embedded thumbnail, and write the result onto a
//! freshly encoded JPEG. That is a few hundred lines of byte-level TIFF
//! walking — small enough to own outright, with no dependency surface, and
//! forgiving in exactly the way this tool needs (a malformed tag is dropped
//! with a warning; it never aborts an export).
//!
//! ## Sequential By Design
//!
//! Batch export is a plain loop: decode, redact, encode, next. Exports
//! share nothing but the output directory, and a failed document is
//! reported and skipped — one corrupt photo never sinks the shoot.

pub mod config;
pub mod document;
pub mod exif;
pub mod export;
pub mod imaging;
pub mod output;
pub mod region;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
