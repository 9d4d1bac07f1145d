//! JPEG marker segment handling for the Exif APP1 block

use crate::error::{Error, Result};

const MARKER_SOI: u8 = 0xD8;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;
const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;

/// Identifier that opens an Exif APP1 payload
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// A marker segment in the header part of a JPEG file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    marker: u8,
    /// Offset of the 0xFF that starts the marker
    start: usize,
    /// Offset just past the segment
    end: usize,
}

impl Segment {
    fn is_exif(&self, data: &[u8]) -> bool {
        self.marker == MARKER_APP1 && data[self.start + 4..self.end].starts_with(EXIF_HEADER)
    }
}

fn malformed(message: impl Into<String>) -> Error {
    Error::Jpeg(message.into())
}

/// Split the header of a JPEG into segments, stopping at start-of-scan
///
/// Returns the segments and the offset where entropy-coded data (or
/// whatever follows the last header segment) begins.
fn header_segments(data: &[u8]) -> Result<(Vec<Segment>, usize)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != MARKER_SOI {
        return Err(malformed("missing start-of-image marker"));
    }

    let mut segments = Vec::new();
    let mut pos = 2;
    loop {
        if pos >= data.len() {
            return Ok((segments, pos));
        }
        if data[pos] != 0xFF {
            return Err(malformed(format!("expected marker at offset {}", pos)));
        }

        // Any number of 0xFF fill bytes may precede the marker code
        let mut code_at = pos + 1;
        while code_at < data.len() && data[code_at] == 0xFF {
            code_at += 1;
        }
        let Some(&marker) = data.get(code_at) else {
            return Err(malformed("truncated marker"));
        };

        match marker {
            MARKER_SOS | MARKER_EOI => return Ok((segments, pos)),
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos = code_at + 1;
                continue;
            }
            _ => {}
        }

        let length_bytes = data
            .get(code_at + 1..code_at + 3)
            .ok_or_else(|| malformed("truncated segment length"))?;
        let length = usize::from(u16::from_be_bytes([length_bytes[0], length_bytes[1]]));
        if length < 2 {
            return Err(malformed(format!("invalid segment length {}", length)));
        }
        let end = code_at + 1 + length;
        if end > data.len() {
            return Err(malformed("segment runs past end of file"));
        }

        segments.push(Segment {
            marker,
            start: code_at - 1,
            end,
        });
        pos = end;
    }
}

/// Raw TIFF block of the first Exif APP1 segment, if any
pub fn exif_payload(data: &[u8]) -> Result<Option<&[u8]>> {
    let (segments, _) = header_segments(data)?;
    Ok(segments
        .iter()
        .find(|segment| segment.is_exif(data))
        .map(|segment| &data[segment.start + 4 + EXIF_HEADER.len()..segment.end]))
}

/// Build a copy of `data` whose Exif APP1 segment holds `tiff`
///
/// An existing Exif segment is replaced in place and any duplicates are
/// dropped. Without one, the new segment goes after a leading JFIF APP0,
/// or directly after the start-of-image marker.
pub fn replace_exif(data: &[u8], tiff: &[u8]) -> Result<Vec<u8>> {
    let length = 2 + EXIF_HEADER.len() + tiff.len();
    let length = u16::try_from(length)
        .map_err(|_| malformed(format!("Exif block of {} bytes does not fit in one segment", length)))?;

    let mut app1 = Vec::with_capacity(usize::from(length) + 2);
    app1.extend_from_slice(&[0xFF, MARKER_APP1]);
    app1.extend_from_slice(&length.to_be_bytes());
    app1.extend_from_slice(EXIF_HEADER);
    app1.extend_from_slice(tiff);

    let (segments, _) = header_segments(data)?;
    let mut out = Vec::with_capacity(data.len() + app1.len());
    out.extend_from_slice(&data[..2]);

    let mut written = false;
    let mut copied_to = 2;
    if !segments.iter().any(|segment| segment.is_exif(data)) {
        match segments.first() {
            Some(first) if first.marker == MARKER_APP0 => {
                out.extend_from_slice(&data[first.start..first.end]);
                copied_to = first.end;
            }
            _ => {}
        }
        out.extend_from_slice(&app1);
        written = true;
    }

    let start_at = copied_to;
    for segment in segments.iter().filter(|segment| segment.start >= start_at) {
        // Bytes between segments (stray fill) are kept as they were
        out.extend_from_slice(&data[copied_to..segment.start]);
        if segment.is_exif(data) {
            if !written {
                out.extend_from_slice(&app1);
                written = true;
            }
        } else {
            out.extend_from_slice(&data[segment.start..segment.end]);
        }
        copied_to = segment.end;
    }

    out.extend_from_slice(&data[copied_to..]);
    Ok(out)
}
