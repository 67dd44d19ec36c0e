//! EXIF extraction: JPEG segment walk + TIFF IFD decoding.
//!
//! Structure: the APP1 marker (0xFFE1) carries an `Exif\0\0` header followed
//! by a self-contained TIFF block — byte-order mark, IFD0 with the primary
//! image tags, optional Exif/GPS sub-IFDs reached through pointer tags, and
//! an optional IFD1 describing the embedded thumbnail JPEG.

use super::{Entry, ExifData, Ifd, Value, tag};

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Parse EXIF metadata out of raw JPEG bytes.
pub fn parse_jpeg(data: &[u8]) -> ExifData {
    match find_app1_exif(data) {
        Some(payload) => parse_tiff(payload),
        None => ExifData::default(),
    }
}

/// Find the TIFF payload of the first APP1 `Exif` segment.
///
/// Walks the JPEG segment chain from SOI until SOS/EOI. Other APP1 payloads
/// (XMP lives in APP1 too) are skipped by the header check.
fn find_app1_exif(data: &[u8]) -> Option<&[u8]> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte before a marker
            0xFF => pos += 1,
            // SOS means entropy-coded data follows; EOI ends the file
            0xDA | 0xD9 => return None,
            // TEM / RSTn carry no length field
            0x01 | 0xD0..=0xD7 => pos += 2,
            _ => {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                if len < 2 || pos + 2 + len > data.len() {
                    return None;
                }
                let segment = &data[pos + 4..pos + 2 + len];
                if marker == 0xE1 && segment.starts_with(EXIF_HEADER) {
                    return Some(&segment[EXIF_HEADER.len()..]);
                }
                pos += 2 + len;
            }
        }
    }
    None
}

/// Endian-aware reads over the TIFF block. All offsets are relative to the
/// start of the block (the byte-order mark), as the TIFF format defines.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl TiffReader<'_> {
    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b = self.data.get(offset..offset + 2)?;
        Some(if self.big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b = self.data.get(offset..offset + 4)?;
        Some(if self.big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    }

    fn bytes_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }
}

/// Parse a raw TIFF block (the bytes after `Exif\0\0`).
pub fn parse_tiff(data: &[u8]) -> ExifData {
    let mut result = ExifData::default();
    if data.len() < 8 {
        return result;
    }
    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return result,
    };
    let r = TiffReader { data, big_endian };
    if r.u16_at(2) != Some(42) {
        return result;
    }
    let Some(ifd0_offset) = r.u32_at(4) else {
        return result;
    };

    let next = parse_ifd(&r, ifd0_offset as usize, Ifd::Primary, &mut result);

    // IFD0's next-IFD link points at IFD1, the thumbnail directory
    if let Some(ifd1_offset) = next.filter(|&o| o != 0) {
        result.thumbnail = parse_thumbnail_ifd(&r, ifd1_offset as usize);
    }
    result
}

/// Parse one IFD's entries into `out`, following Exif/GPS pointers.
///
/// Returns the next-IFD offset, or `None` if the table itself is truncated.
/// Entries that fail to decode are dropped with a warning; the rest of the
/// table still parses.
fn parse_ifd(r: &TiffReader, offset: usize, ifd: Ifd, out: &mut ExifData) -> Option<u32> {
    let count = r.u16_at(offset)? as usize;
    let entries_start = offset + 2;

    for i in 0..count {
        let entry_offset = entries_start + i * 12;
        let tag_id = r.u16_at(entry_offset)?;

        // Pointer tags link sub-IFDs; descend instead of storing the offset
        if ifd == Ifd::Primary
            && (tag_id == tag::EXIF_IFD_POINTER || tag_id == tag::GPS_IFD_POINTER)
        {
            if let Some(sub_offset) = r.u32_at(entry_offset + 8) {
                let sub_ifd = if tag_id == tag::EXIF_IFD_POINTER {
                    Ifd::Exif
                } else {
                    Ifd::Gps
                };
                parse_ifd(r, sub_offset as usize, sub_ifd, out);
            }
            continue;
        }
        // Interop offsets are meaningless after a rewrite
        if tag_id == tag::INTEROP_IFD_POINTER {
            continue;
        }

        match decode_entry(r, entry_offset) {
            Some(value) => out.entries.push(Entry {
                ifd,
                tag: tag_id,
                value,
            }),
            None => log::warn!("dropping undecodable metadata entry {tag_id:#06x} in {ifd:?}"),
        }
    }

    r.u32_at(entries_start + count * 12)
}

/// Byte width of one element of a TIFF type we decode. Unknown types
/// (FLOAT, DOUBLE, vendor extensions) return `None` and the entry is dropped.
fn type_size(type_code: u16) -> Option<usize> {
    match type_code {
        1 | 2 | 6 | 7 => Some(1), // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => Some(2),         // SHORT, SSHORT
        4 | 9 => Some(4),         // LONG, SLONG
        5 | 10 => Some(8),        // RATIONAL, SRATIONAL
        _ => None,
    }
}

/// Decode a single 12-byte IFD entry into a [`Value`].
fn decode_entry(r: &TiffReader, entry_offset: usize) -> Option<Value> {
    let type_code = r.u16_at(entry_offset + 2)?;
    let count = r.u32_at(entry_offset + 4)? as usize;
    let byte_len = count.checked_mul(type_size(type_code)?)?;
    if byte_len > r.data.len() {
        return None; // corrupt count
    }

    // Values up to 4 bytes are stored inline; larger ones live at an offset
    let bytes = if byte_len <= 4 {
        r.bytes_at(entry_offset + 8, byte_len)?
    } else {
        let value_offset = r.u32_at(entry_offset + 8)? as usize;
        r.bytes_at(value_offset, byte_len)?
    };

    decode_value(type_code, bytes, r.big_endian)
}

fn decode_value(type_code: u16, bytes: &[u8], big_endian: bool) -> Option<Value> {
    let u16s = |b: &[u8]| -> Vec<u16> {
        b.chunks_exact(2)
            .map(|c| {
                if big_endian {
                    u16::from_be_bytes([c[0], c[1]])
                } else {
                    u16::from_le_bytes([c[0], c[1]])
                }
            })
            .collect()
    };
    let u32s = |b: &[u8]| -> Vec<u32> {
        b.chunks_exact(4)
            .map(|c| {
                if big_endian {
                    u32::from_be_bytes([c[0], c[1], c[2], c[3]])
                } else {
                    u32::from_le_bytes([c[0], c[1], c[2], c[3]])
                }
            })
            .collect()
    };

    match type_code {
        1 => Some(Value::Byte(bytes.to_vec())),
        2 => {
            // NUL-terminated text; invalid UTF-8 makes the entry undecodable
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            std::str::from_utf8(&bytes[..end])
                .ok()
                .map(|s| Value::Ascii(s.to_string()))
        }
        3 => Some(Value::Short(u16s(bytes))),
        4 => Some(Value::Long(u32s(bytes))),
        5 => {
            let words = u32s(bytes);
            Some(Value::Rational(
                words.chunks_exact(2).map(|p| (p[0], p[1])).collect(),
            ))
        }
        6 => Some(Value::SByte(bytes.iter().map(|&b| b as i8).collect())),
        7 => Some(Value::Undefined(bytes.to_vec())),
        8 => Some(Value::SShort(u16s(bytes).into_iter().map(|v| v as i16).collect())),
        9 => Some(Value::SLong(u32s(bytes).into_iter().map(|v| v as i32).collect())),
        10 => {
            let words = u32s(bytes);
            Some(Value::SRational(
                words
                    .chunks_exact(2)
                    .map(|p| (p[0] as i32, p[1] as i32))
                    .collect(),
            ))
        }
        _ => None,
    }
}

/// Pull the thumbnail JPEG stream out of IFD1.
fn parse_thumbnail_ifd(r: &TiffReader, offset: usize) -> Option<Vec<u8>> {
    let count = r.u16_at(offset)? as usize;
    let mut thumb_offset = None;
    let mut thumb_len = None;

    for i in 0..count {
        let entry_offset = offset + 2 + i * 12;
        let tag_id = r.u16_at(entry_offset)?;
        if tag_id != tag::JPEG_INTERCHANGE_FORMAT && tag_id != tag::JPEG_INTERCHANGE_FORMAT_LENGTH
        {
            continue;
        }
        let Some(value) = decode_entry(r, entry_offset).as_ref().and_then(Value::as_u32) else {
            continue;
        };
        if tag_id == tag::JPEG_INTERCHANGE_FORMAT {
            thumb_offset = Some(value as usize);
        } else {
            thumb_len = Some(value as usize);
        }
    }

    r.bytes_at(thumb_offset?, thumb_len?).map(<[u8]>::to_vec)
}
