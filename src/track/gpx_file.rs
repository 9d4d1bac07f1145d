//! GPX track log reading

use super::{TrackPoint, typed_decimal_places};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Read every timestamped point of a GPX file, in document order
///
/// All `<trk>` elements are concatenated into a single sequence. The first
/// timed point of each `<trkseg>` is marked as a segment start. Precision is
/// taken from the digits written in the file, trailing zeros included.
pub fn read_gpx(path: &Path) -> Result<Vec<TrackPoint>> {
    let data = fs::read(path)?;
    let points = parse_gpx(&data).map_err(|e| Error::TrackParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if points.is_empty() {
        return Err(Error::EmptyTrack {
            source_info: path.display().to_string(),
        });
    }

    info!(path = %path.display(), points = points.len(), "Read GPS track");
    Ok(points)
}

fn parse_gpx(data: &[u8]) -> std::result::Result<Vec<TrackPoint>, ::gpx::errors::GpxError> {
    let document = ::gpx::read(data)?;

    let total: usize = document
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .map(|segment| segment.points.len())
        .sum();
    let written = written_precision(&String::from_utf8_lossy(data));
    let written = if written.len() == total {
        written
    } else {
        debug!(
            scanned = written.len(),
            parsed = total,
            "Track point text does not line up, deriving precision from values"
        );
        Vec::new()
    };

    let mut points = Vec::new();
    let mut untimed = 0usize;
    let mut index = 0usize;

    for track in &document.tracks {
        for segment in &track.segments {
            let mut segment_open = false;
            for waypoint in &segment.points {
                let precision = written.get(index).copied().unwrap_or_default();
                index += 1;

                let Some(time) = waypoint.time.clone().and_then(to_utc) else {
                    untimed += 1;
                    continue;
                };

                let position = waypoint.point();
                let mut point = TrackPoint::new(time, position.y(), position.x());
                if let Some(elevation) = waypoint.elevation {
                    point = point.with_elevation(elevation);
                }
                precision.apply(&mut point);
                if !segment_open {
                    point = point.starting_segment();
                    segment_open = true;
                }
                points.push(point);
            }
        }
    }

    if untimed > 0 {
        debug!(untimed, "Skipped track points without a timestamp");
    }

    Ok(points)
}

/// Decimal places as written in one `<trkpt>` element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct WrittenPrecision {
    lat: Option<u8>,
    lon: Option<u8>,
    elevation: Option<u8>,
}

impl WrittenPrecision {
    fn apply(self, point: &mut TrackPoint) {
        if let Some(decimals) = self.lat {
            point.lat_decimals = decimals;
        }
        if let Some(decimals) = self.lon {
            point.lon_decimals = decimals;
        }
        if let (Some(decimals), Some(_)) = (self.elevation, point.elevation) {
            point.elevation_decimals = decimals;
        }
    }
}

/// Scan the raw document for every `<trkpt>` in order
///
/// The parsed values lose trailing zeros, so the digit counts come from
/// the attribute and `<ele>` text instead.
fn written_precision(text: &str) -> Vec<WrittenPrecision> {
    let mut found = Vec::new();
    let mut rest = text;

    while let Some(at) = rest.find("<trkpt") {
        rest = &rest[at + "<trkpt".len()..];
        if !rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/') {
            continue;
        }
        let Some(tag_end) = rest.find('>') else {
            break;
        };
        let tag = &rest[..tag_end];
        let self_closing = tag.ends_with('/');

        let body = if self_closing {
            ""
        } else {
            let after = &rest[tag_end + 1..];
            &after[..after.find("</trkpt").unwrap_or(after.len())]
        };
        let elevation = body
            .find("<ele>")
            .map(|start| &body[start + "<ele>".len()..])
            .and_then(|ele| ele.find('<').map(|end| &ele[..end]))
            .map(typed_decimal_places);

        found.push(WrittenPrecision {
            lat: attribute(tag, "lat").map(typed_decimal_places),
            lon: attribute(tag, "lon").map(typed_decimal_places),
            elevation,
        });
        rest = &rest[tag_end + 1..];
    }

    found
}

/// Value of `name="..."` (or single-quoted) inside an element's tag text
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    tag.match_indices(name).find_map(|(at, _)| {
        let preceded = tag[..at].ends_with(|c: char| c.is_ascii_whitespace());
        if !preceded {
            return None;
        }
        let value = tag[at + name.len()..].trim_start().strip_prefix('=')?.trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        value.find(quote).map(|end| &value[..end])
    })
}

fn to_utc(time: ::gpx::Time) -> Option<DateTime<Utc>> {
    let instant = OffsetDateTime::from(time);
    DateTime::<Utc>::from_timestamp(instant.unix_timestamp(), instant.nanosecond())
}
