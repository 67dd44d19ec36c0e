//! Minimal EXIF reader/writer for JPEG files.
//!
//! Reads the APP1 `Exif` segment (TIFF IFD structure, either endianness),
//! exposes it as a flat list of tag entries plus the embedded thumbnail
//! blob, and re-serializes the whole thing into a fresh APP1 segment that
//! can be spliced into an encoded JPEG.
//!
//! The reader is deliberately forgiving: a file with no EXIF, a truncated
//! segment, or a corrupt TIFF header yields empty [`ExifData`]. An
//! *individual* entry that cannot be decoded (unknown value type, value
//! pointing past the end of the segment, non-UTF-8 text) is logged and
//! dropped; its siblings survive. Export never aborts over a bad tag.
//!
//! The writer always emits little-endian TIFF with regenerated offsets —
//! pointer tags from the source (IFD offsets, thumbnail position) are
//! meaningless after a rewrite and are never carried over as data.
//!
//! Zero external dependencies — pure Rust over the raw bytes.

pub mod parse;
pub mod write;

use std::path::Path;

pub use parse::parse_jpeg;
pub use write::splice_into_jpeg;

/// Well-known TIFF/EXIF tag numbers used by name in this crate.
pub mod tag {
    /// Image orientation (IFD0). Stripped on every export.
    pub const ORIENTATION: u16 = 0x0112;
    /// Pointer from IFD0 to the Exif sub-IFD.
    pub const EXIF_IFD_POINTER: u16 = 0x8769;
    /// Pointer from IFD0 to the GPS sub-IFD.
    pub const GPS_IFD_POINTER: u16 = 0x8825;
    /// Pointer from the Exif IFD to the Interoperability IFD.
    pub const INTEROP_IFD_POINTER: u16 = 0xA005;
    /// Thumbnail compression scheme (IFD1); 6 = JPEG.
    pub const COMPRESSION: u16 = 0x0103;
    /// Offset of the thumbnail JPEG stream (IFD1).
    pub const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
    /// Length of the thumbnail JPEG stream (IFD1).
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;
    /// Camera manufacturer (IFD0).
    pub const MAKE: u16 = 0x010F;
    /// Camera model (IFD0).
    pub const MODEL: u16 = 0x0110;
    /// Capture timestamp (Exif IFD).
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
}

/// Which IFD an entry belongs to.
///
/// IFD1 (the thumbnail directory) is not represented: its pointer entries
/// are regenerated on write and its payload is [`ExifData::thumbnail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ifd {
    Primary,
    Exif,
    Gps,
}

/// A decoded TIFF value. One variant per TIFF type we round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(Vec<u8>),
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
}

impl Value {
    /// First element as u32, for tags that may be SHORT or LONG
    /// (the thumbnail offset/length tags in the wild are either).
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Short(v) => v.first().map(|&s| s as u32),
            Value::Long(v) => v.first().copied(),
            _ => None,
        }
    }
}

/// One metadata entry: which IFD it lives in, its tag, its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub ifd: Ifd,
    pub tag: u16,
    pub value: Value,
}

/// Parsed EXIF metadata: entries in source order plus the thumbnail blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    pub entries: Vec<Entry>,
    /// Embedded JPEG preview from IFD1, if present.
    pub thumbnail: Option<Vec<u8>>,
}

impl ExifData {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.thumbnail.is_none()
    }

    pub fn get(&self, ifd: Ifd, tag: u16) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.ifd == ifd && e.tag == tag)
            .map(|e| &e.value)
    }

    /// Delete an entry. Returns whether anything was removed.
    pub fn remove(&mut self, ifd: Ifd, tag: u16) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !(e.ifd == ifd && e.tag == tag));
        self.entries.len() != before
    }

    /// Insert or replace an entry.
    pub fn set(&mut self, ifd: Ifd, tag: u16, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.ifd == ifd && e.tag == tag) {
            entry.value = value;
        } else {
            self.entries.push(Entry { ifd, tag, value });
        }
    }
}

/// Read EXIF metadata from a JPEG file.
///
/// Returns empty data on any whole-file failure (missing file, no APP1
/// segment, corrupt TIFF header) — metadata is best-effort; the export
/// pipeline proceeds with whatever decoded.
pub fn read_exif(path: &Path) -> ExifData {
    match std::fs::read(path) {
        Ok(bytes) => parse_jpeg(&bytes),
        Err(e) => {
            log::debug!("no metadata read from {}: {}", path.display(), e);
            ExifData::default()
        }
    }
}
