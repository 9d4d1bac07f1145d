//! GPS track storage
//!
//! This module holds the time-ordered view of every loaded track log and
//! answers "which points surround this instant" queries for the matcher.
//! Track sources:
//! - GPX files
//! - A fixed `LAT,LONG[,ELE]` location

pub mod gpx_file;
pub mod latlong;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// A single timestamped position fix
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    /// Instant of the fix
    pub time: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Elevation in meters, if the logger recorded one
    pub elevation: Option<f64>,
    /// Whether this point opens a new track segment
    pub segment_start: bool,
    /// Decimal places recorded for latitude
    pub lat_decimals: u8,
    /// Decimal places recorded for longitude
    pub lon_decimals: u8,
    /// Decimal places recorded for elevation
    pub elevation_decimals: u8,
    /// Position holds at any time; `time` only orders the point
    pub stationary: bool,
}

impl TrackPoint {
    /// Create a point, deriving the recorded precision from the values
    pub fn new(time: DateTime<Utc>, lat: f64, lon: f64) -> Self {
        Self {
            time,
            lat,
            lon,
            elevation: None,
            segment_start: false,
            lat_decimals: decimal_places(lat),
            lon_decimals: decimal_places(lon),
            elevation_decimals: 0,
            stationary: false,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self.elevation_decimals = decimal_places(elevation);
        self
    }

    pub fn starting_segment(mut self) -> Self {
        self.segment_start = true;
        self
    }

    pub fn stationary(mut self) -> Self {
        self.stationary = true;
        self
    }
}

/// Number of digits after the decimal point in the shortest round-trip
/// representation of `value`
pub fn decimal_places(value: f64) -> u8 {
    typed_decimal_places(&value.to_string())
}

/// Number of digits written after the decimal point of a number as text
///
/// Trailing zeros count: `"47.644540"` has six.
pub fn typed_decimal_places(text: &str) -> u8 {
    text.trim()
        .split_once('.')
        .map(|(_, frac)| frac.chars().take_while(char::is_ascii_digit).count().min(u8::MAX as usize) as u8)
        .unwrap_or(0)
}

/// One loaded track log: non-empty and sorted ascending by time
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<TrackPoint>,
    source: String,
}

impl Track {
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Label of the file (or location string) this track came from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    fn contains(&self, time: DateTime<Utc>) -> bool {
        self.first().time <= time && time <= self.last().time
    }
}

/// Points surrounding a query instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket<'a> {
    /// Nothing has been loaded
    NoData,
    /// A point carries exactly the query timestamp
    Exact(&'a TrackPoint),
    /// The query lies strictly between two neighbouring points of one track
    Between {
        prev: &'a TrackPoint,
        next: &'a TrackPoint,
        /// `next` opens a new segment
        crosses_segment: bool,
    },
    /// Earlier than every loaded point; carries the earliest point
    BeforeAll(&'a TrackPoint),
    /// Later than every loaded point; carries the latest point
    AfterAll(&'a TrackPoint),
    /// Inside the overall span but in a hole between two tracks
    BetweenTracks {
        before: &'a TrackPoint,
        after: &'a TrackPoint,
    },
}

/// All loaded tracks, read-only once a batch starts
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parsed point sequence as one logical track
    ///
    /// With `mark_segment_boundaries` off, every segment marker except the
    /// track's first is cleared so the whole track behaves as one segment.
    pub fn load(
        &mut self,
        source: impl Into<String>,
        mut points: Vec<TrackPoint>,
        mark_segment_boundaries: bool,
    ) -> Result<()> {
        let source = source.into();
        if points.is_empty() {
            return Err(Error::EmptyTrack {
                source_info: source,
            });
        }

        if !points.windows(2).all(|w| w[0].time <= w[1].time) {
            warn!(%source, "Track points are not in time order, sorting");
            points.sort_by_key(|p| p.time);
        }

        for (i, point) in points.iter_mut().enumerate() {
            if i == 0 {
                point.segment_start = true;
            } else if !mark_segment_boundaries {
                point.segment_start = false;
            }
        }

        debug!(
            %source,
            points = points.len(),
            start = %points[0].time,
            end = %points[points.len() - 1].time,
            "Loaded track"
        );

        self.tracks.push(Track { points, source });
        Ok(())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of points across all tracks
    pub fn total_points(&self) -> usize {
        self.tracks.iter().map(|t| t.points.len()).sum()
    }

    /// Earliest and latest instants covered by any track
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.tracks.iter().map(|t| t.first().time).min()?;
        let end = self.tracks.iter().map(|t| t.last().time).max()?;
        Some((start, end))
    }

    /// Locate the point(s) surrounding `time`
    pub fn find_bracket(&self, time: DateTime<Utc>) -> Bracket<'_> {
        if self.tracks.is_empty() {
            return Bracket::NoData;
        }

        if let Some(track) = self.tracks.iter().find(|t| t.contains(time)) {
            return bracket_in(track, time);
        }

        let earliest = self
            .tracks
            .iter()
            .map(Track::first)
            .min_by_key(|p| p.time);
        let latest = self.tracks.iter().map(Track::last).max_by_key(|p| p.time);

        match (earliest, latest) {
            (Some(first), _) if time < first.time => Bracket::BeforeAll(first),
            (_, Some(last)) if time > last.time => Bracket::AfterAll(last),
            _ => {
                // Inside the overall span, but no single track covers it
                let before = self
                    .tracks
                    .iter()
                    .map(Track::last)
                    .filter(|p| p.time < time)
                    .max_by_key(|p| p.time);
                let after = self
                    .tracks
                    .iter()
                    .map(Track::first)
                    .filter(|p| p.time > time)
                    .min_by_key(|p| p.time);
                match (before, after) {
                    (Some(before), Some(after)) => Bracket::BetweenTracks { before, after },
                    _ => Bracket::NoData,
                }
            }
        }
    }
}

/// Binary search inside one track whose span contains `time`
fn bracket_in(track: &Track, time: DateTime<Utc>) -> Bracket<'_> {
    let points = track.points();
    let idx = points.partition_point(|p| p.time < time);

    if let Some(point) = points.get(idx)
        && point.time == time
    {
        return Bracket::Exact(point);
    }

    let prev = &points[idx - 1];
    let next = &points[idx];
    Bracket::Between {
        prev,
        next,
        crosses_segment: next.segment_start,
    }
}
