//! EXIF serialization: fresh TIFF block + APP1 splice.
//!
//! The block is always little-endian with offsets laid out from scratch:
//! IFD0, then the Exif/GPS sub-IFD tables, then IFD1 (when a thumbnail is
//! present), then the value data area, then the thumbnail JPEG stream.
//! Pointer tags (sub-IFD offsets, thumbnail position/length) are generated
//! here — source offsets never survive.

use super::{Entry, ExifData, Ifd, Value, tag};

/// APP1 segment length is a u16 that includes its own two bytes.
const MAX_APP1_PAYLOAD: usize = 0xFFFF - 2;

/// Insert metadata into an encoded JPEG, directly after SOI.
///
/// EXIF wants its APP1 first in the file; encoders emit SOI + APP0 + ...,
/// and viewers accept APP1 before APP0, so splicing at offset 2 works for
/// both. Metadata that cannot fit in one APP1 segment first sheds the
/// thumbnail, then gives up and returns the JPEG unchanged (logged) —
/// emitting a corrupt segment is never an option.
pub fn splice_into_jpeg(jpeg: &[u8], data: &ExifData) -> Vec<u8> {
    if data.is_empty() || !jpeg.starts_with(&[0xFF, 0xD8]) {
        return jpeg.to_vec();
    }

    let mut payload = app1_payload(data);
    if payload.len() > MAX_APP1_PAYLOAD && data.thumbnail.is_some() {
        log::warn!("metadata exceeds the APP1 segment limit, dropping embedded thumbnail");
        let mut without_thumb = data.clone();
        without_thumb.thumbnail = None;
        payload = app1_payload(&without_thumb);
    }
    if payload.len() > MAX_APP1_PAYLOAD {
        log::warn!("metadata exceeds the APP1 segment limit, writing without metadata");
        return jpeg.to_vec();
    }

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// The full APP1 payload: `Exif\0\0` header + TIFF block.
pub fn app1_payload(data: &ExifData) -> Vec<u8> {
    let mut v = b"Exif\0\0".to_vec();
    v.extend_from_slice(&tiff_block(data));
    v
}

/// An entry with its value already encoded to little-endian bytes.
struct RawEntry {
    tag: u16,
    type_code: u16,
    count: u32,
    payload: Vec<u8>,
}

impl RawEntry {
    fn from_entry(entry: &Entry) -> Self {
        let (type_code, count, payload) = encode_value(&entry.value);
        Self {
            tag: entry.tag,
            type_code,
            count,
            payload,
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            type_code: 4,
            count: 1,
            payload: value.to_le_bytes().to_vec(),
        }
    }
}

fn encode_value(value: &Value) -> (u16, u32, Vec<u8>) {
    match value {
        Value::Byte(v) => (1, v.len() as u32, v.clone()),
        Value::Ascii(s) => {
            let mut b = s.as_bytes().to_vec();
            b.push(0);
            (2, b.len() as u32, b)
        }
        Value::Short(v) => (
            3,
            v.len() as u32,
            v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        ),
        Value::Long(v) => (
            4,
            v.len() as u32,
            v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        ),
        Value::Rational(v) => (
            5,
            v.len() as u32,
            v.iter()
                .flat_map(|(n, d)| [n.to_le_bytes(), d.to_le_bytes()])
                .flatten()
                .collect(),
        ),
        Value::SByte(v) => (6, v.len() as u32, v.iter().map(|&x| x as u8).collect()),
        Value::Undefined(v) => (7, v.len() as u32, v.clone()),
        Value::SShort(v) => (
            8,
            v.len() as u32,
            v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        ),
        Value::SLong(v) => (
            9,
            v.len() as u32,
            v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        ),
        Value::SRational(v) => (
            10,
            v.len() as u32,
            v.iter()
                .flat_map(|(n, d)| [n.to_le_bytes(), d.to_le_bytes()])
                .flatten()
                .collect(),
        ),
    }
}

/// Assign data-area offsets to every payload wider than the 4-byte inline
/// field, advancing `cursor`. Payloads are padded to even length so every
/// value starts word-aligned.
fn assign_offsets(entries: &[RawEntry], cursor: &mut usize) -> Vec<Option<u32>> {
    entries
        .iter()
        .map(|e| {
            if e.payload.len() > 4 {
                let offset = *cursor;
                *cursor += e.payload.len() + (e.payload.len() % 2);
                Some(offset as u32)
            } else {
                None
            }
        })
        .collect()
}

fn write_table(
    out: &mut Vec<u8>,
    entries: &[RawEntry],
    value_offsets: &[Option<u32>],
    next_ifd: u32,
) {
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (entry, offset) in entries.iter().zip(value_offsets) {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.type_code.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        match offset {
            Some(o) => out.extend_from_slice(&o.to_le_bytes()),
            None => {
                let mut field = [0u8; 4];
                field[..entry.payload.len()].copy_from_slice(&entry.payload);
                out.extend_from_slice(&field);
            }
        }
    }
    out.extend_from_slice(&next_ifd.to_le_bytes());
}

fn write_data_area(out: &mut Vec<u8>, entries: &[RawEntry], value_offsets: &[Option<u32>]) {
    for (entry, offset) in entries.iter().zip(value_offsets) {
        if offset.is_some() {
            out.extend_from_slice(&entry.payload);
            if entry.payload.len() % 2 == 1 {
                out.push(0);
            }
        }
    }
}

/// Serialize an [`ExifData`] as a little-endian TIFF block.
fn tiff_block(data: &ExifData) -> Vec<u8> {
    let encode_ifd = |ifd: Ifd| -> Vec<RawEntry> {
        let mut entries: Vec<RawEntry> = data
            .entries
            .iter()
            .filter(|e| e.ifd == ifd)
            .map(RawEntry::from_entry)
            .collect();
        // TIFF requires ascending tag order within a table
        entries.sort_by_key(|e| e.tag);
        entries
    };

    let mut ifd0 = encode_ifd(Ifd::Primary);
    let exif = encode_ifd(Ifd::Exif);
    let gps = encode_ifd(Ifd::Gps);
    let thumbnail = data.thumbnail.as_deref();

    // Table offsets depend only on entry counts
    let table_len = |n: usize| 2 + n * 12 + 4;
    let n0 = ifd0.len() + usize::from(!exif.is_empty()) + usize::from(!gps.is_empty());
    let mut cursor = 8 + table_len(n0);
    let exif_offset = (!exif.is_empty()).then(|| {
        let o = cursor;
        cursor += table_len(exif.len());
        o
    });
    let gps_offset = (!gps.is_empty()).then(|| {
        let o = cursor;
        cursor += table_len(gps.len());
        o
    });
    let ifd1_offset = thumbnail.map(|_| {
        let o = cursor;
        cursor += table_len(3);
        o
    });

    if let Some(o) = exif_offset {
        ifd0.push(RawEntry::long(tag::EXIF_IFD_POINTER, o as u32));
    }
    if let Some(o) = gps_offset {
        ifd0.push(RawEntry::long(tag::GPS_IFD_POINTER, o as u32));
    }
    ifd0.sort_by_key(|e| e.tag);

    let mut data_cursor = cursor;
    let ifd0_offsets = assign_offsets(&ifd0, &mut data_cursor);
    let exif_offsets = assign_offsets(&exif, &mut data_cursor);
    let gps_offsets = assign_offsets(&gps, &mut data_cursor);
    let thumb_offset = data_cursor;

    let mut out = Vec::with_capacity(thumb_offset + thumbnail.map_or(0, <[u8]>::len));
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    write_table(&mut out, &ifd0, &ifd0_offsets, ifd1_offset.unwrap_or(0) as u32);
    if let Some(o) = exif_offset {
        debug_assert_eq!(out.len(), o);
        write_table(&mut out, &exif, &exif_offsets, 0);
    }
    if let Some(o) = gps_offset {
        debug_assert_eq!(out.len(), o);
        write_table(&mut out, &gps, &gps_offsets, 0);
    }
    if let (Some(thumb), Some(o)) = (thumbnail, ifd1_offset) {
        debug_assert_eq!(out.len(), o);
        let entries = [
            RawEntry {
                tag: tag::COMPRESSION,
                type_code: 3,
                count: 1,
                payload: 6u16.to_le_bytes().to_vec(), // 6 = JPEG-compressed thumbnail
            },
            RawEntry::long(tag::JPEG_INTERCHANGE_FORMAT, thumb_offset as u32),
            RawEntry::long(tag::JPEG_INTERCHANGE_FORMAT_LENGTH, thumb.len() as u32),
        ];
        write_table(&mut out, &entries, &[None, None, None], 0);
    }

    write_data_area(&mut out, &ifd0, &ifd0_offsets);
    write_data_area(&mut out, &exif, &exif_offsets);
    write_data_area(&mut out, &gps, &gps_offsets);
    debug_assert_eq!(out.len(), thumb_offset);
    if let Some(thumb) = thumbnail {
        out.extend_from_slice(thumb);
    }
    out
}
