//! Listing of locations already stored in photos

use crate::error::{Error, Result};
use crate::metadata::{PhotoMetadata, PhotoTags, StoredLocation};
use crate::time::TimeNormalizer;
use chrono::{DateTime, Utc};
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;
use tracing::warn;

/// Output layout for show mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowFormat {
    /// `file: time, Lat .., Long .., Elevation ..`
    #[default]
    Text,
    /// `"file","time",lat,long,ele`
    Csv,
    /// One GPX track segment through the photo positions
    Gpx,
}

/// Writes one record per photo in the chosen [`ShowFormat`]
///
/// GPX output is buffered and only emitted by [`ShowWriter::finish`].
pub struct ShowWriter<W: Write> {
    out: W,
    format: ShowFormat,
    normalizer: TimeNormalizer,
    segment: TrackSegment,
    last_time: Option<DateTime<Utc>>,
}

impl<W: Write> ShowWriter<W> {
    /// `normalizer` converts capture times to UTC for GPX output
    pub fn new(out: W, format: ShowFormat, normalizer: TimeNormalizer) -> Self {
        Self {
            out,
            format,
            normalizer,
            segment: TrackSegment::default(),
            last_time: None,
        }
    }

    /// Read a photo's tags and write its record
    ///
    /// Returns `false` when the photo has no usable metadata at all.
    pub fn show_photo(&mut self, metadata: &dyn PhotoMetadata, path: &Path) -> Result<bool> {
        let (tags, location) = match metadata
            .read_tags(path)
            .and_then(|tags| Ok((tags, metadata.read_location(path)?)))
        {
            Ok(read) => read,
            Err(e) => {
                warn!(?path, error = %e, "Could not read photo metadata");
                (PhotoTags::default(), None)
            }
        };
        self.write_entry(path, &tags, location.as_ref())
    }

    /// Write the record for one photo
    pub fn write_entry(
        &mut self,
        path: &Path,
        tags: &PhotoTags,
        location: Option<&StoredLocation>,
    ) -> Result<bool> {
        let file = path.display().to_string();
        let Some(time) = tags.capture_time.as_deref() else {
            if self.format == ShowFormat::Text {
                writeln!(self.out, "{}: No EXIF data.", file)?;
            }
            return Ok(false);
        };

        let Some(location) = location else {
            if self.format == ShowFormat::Text {
                writeln!(self.out, "{}: {}, No GPS Data.", file, time)?;
            }
            return Ok(true);
        };

        match self.format {
            ShowFormat::Text => {
                let elevation = location
                    .elevation
                    .map(|e| format!("{:.3}", e))
                    .unwrap_or_else(|| "(unknown)".to_string());
                writeln!(
                    self.out,
                    "{}: {}, Lat {:.6}, Long {:.6}, Elevation {}.",
                    file, time, location.lat, location.lon, elevation
                )?;
            }
            ShowFormat::Csv => {
                let elevation = location.elevation.map(|e| format!("{:.3}", e)).unwrap_or_default();
                writeln!(
                    self.out,
                    "\"{}\",\"{}\",{:.6},{:.6},{}",
                    csv_escape(&file),
                    csv_escape(time),
                    location.lat,
                    location.lon,
                    elevation
                )?;
            }
            ShowFormat::Gpx => self.push_waypoint(file, time, location),
        }
        Ok(true)
    }

    fn push_waypoint(&mut self, file: String, capture_time: &str, location: &StoredLocation) {
        let mut waypoint = Waypoint::new(geo_types::Point::new(location.lon, location.lat));
        waypoint.elevation = location.elevation;
        waypoint.name = Some(file);

        if let Some(time) = self.normalizer.normalize(capture_time) {
            if self.last_time.is_some_and(|last| time < last) {
                warn!("Image files are not ordered by time");
            }
            self.last_time = Some(time);
            waypoint.time = OffsetDateTime::from_unix_timestamp(time.timestamp())
                .ok()
                .map(Into::into);
        }

        self.segment.points.push(waypoint);
    }

    /// Flush buffered output and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        if self.format == ShowFormat::Gpx {
            let mut track = Track::default();
            track.segments.push(self.segment);

            let document = Gpx {
                version: GpxVersion::Gpx11,
                creator: Some(format!("gps-correlate {}", env!("CARGO_PKG_VERSION"))),
                tracks: vec![track],
                ..Default::default()
            };
            gpx::write(&document, &mut self.out).map_err(|e| Error::GpxWrite(e.to_string()))?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Double embedded quotes for a quoted CSV field
fn csv_escape(text: &str) -> String {
    text.replace('"', "\"\"")
}
