//! Correlation of a UTC instant with the loaded tracks
//!
//! The matcher decides, for one photo time, whether a position can be
//! assigned and how it was obtained:
//! - Exact: a fix carries the same timestamp
//! - Interpolated: linear blend of the two surrounding fixes
//! - Rounded: snapped to a single nearby fix
//!
//! Everything else is a miss, either `Unmatched` or `TooFar`.

use crate::config::{CorrelationOptions, SegmentGapPolicy};
use crate::track::{Bracket, TrackPoint, TrackStore};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

/// Upper bound on decimal digits carried into the rational encoding
pub const MAX_DECIMALS: u8 = 9;

/// Elevation beyond millimeters exceeds what consumer GPS can measure
pub const MAX_ELEVATION_DECIMALS: u8 = 3;

/// Position assigned to a photo
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub lat_decimals: u8,
    pub lon_decimals: u8,
    pub elevation_decimals: u8,
    /// UTC instant the position belongs to
    pub time: DateTime<Utc>,
}

impl GeoFix {
    fn from_point(point: &TrackPoint, time: DateTime<Utc>) -> Self {
        Self {
            lat: point.lat,
            lon: point.lon,
            elevation: point.elevation,
            lat_decimals: point.lat_decimals.min(MAX_DECIMALS),
            lon_decimals: point.lon_decimals.min(MAX_DECIMALS),
            elevation_decimals: point.elevation_decimals.min(MAX_ELEVATION_DECIMALS),
            time,
        }
    }

    fn interpolated(prev: &TrackPoint, next: &TrackPoint, time: DateTime<Utc>) -> Self {
        let span = (next.time - prev.time).num_milliseconds() as f64;
        let fraction = (time - prev.time).num_milliseconds() as f64 / span;
        let blend = |a: f64, b: f64| a + fraction * (b - a);

        let elevation = match (prev.elevation, next.elevation) {
            (Some(a), Some(b)) => Some(blend(a, b)),
            _ => None,
        };

        Self {
            lat: blend(prev.lat, next.lat),
            lon: blend(prev.lon, next.lon),
            elevation,
            lat_decimals: prev.lat_decimals.min(next.lat_decimals).min(MAX_DECIMALS),
            lon_decimals: prev.lon_decimals.min(next.lon_decimals).min(MAX_DECIMALS),
            elevation_decimals: prev
                .elevation_decimals
                .min(next.elevation_decimals)
                .min(MAX_ELEVATION_DECIMALS),
            time,
        }
    }
}

/// How a successful match was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Interpolated,
    Rounded,
}

/// A successful correlation
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub kind: MatchKind,
    pub fix: GeoFix,
}

impl Match {
    fn exact(point: &TrackPoint) -> Self {
        Self {
            kind: MatchKind::Exact,
            fix: GeoFix::from_point(point, point.time),
        }
    }

    fn rounded(point: &TrackPoint, time: DateTime<Utc>) -> Self {
        let fix_time = if point.stationary { time } else { point.time };
        Self {
            kind: MatchKind::Rounded,
            fix: GeoFix::from_point(point, fix_time),
        }
    }
}

/// Why no position could be assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// Inside the tracks' overall time range, but nothing close enough
    Unmatched,
    /// Beyond the usable part of the tracks by more than the feather time
    TooFar,
}

/// Looks up positions in a read-only [`TrackStore`]
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    store: &'a TrackStore,
    options: &'a CorrelationOptions,
}

impl<'a> Matcher<'a> {
    pub fn new(store: &'a TrackStore, options: &'a CorrelationOptions) -> Self {
        Self { store, options }
    }

    /// Find the position for a photo taken at `time` (UTC)
    pub fn locate(&self, time: DateTime<Utc>) -> Result<Match, Miss> {
        let bracket = self.store.find_bracket(time);
        trace!(%time, ?bracket, "Track bracket");

        match bracket {
            Bracket::NoData => Err(Miss::Unmatched),
            Bracket::Exact(point) => Ok(Match::exact(point)),
            Bracket::BeforeAll(point) | Bracket::AfterAll(point) => {
                self.round_within_feather(point, time).ok_or(Miss::TooFar)
            }
            Bracket::Between {
                prev,
                next,
                crosses_segment,
            } => {
                if !self.options.interpolate {
                    Ok(Match::rounded(nearer(prev, next, time), time))
                } else if crosses_segment && !self.options.between_segments {
                    self.round_across_segment_gap(prev, next, time)
                } else {
                    Ok(Match {
                        kind: MatchKind::Interpolated,
                        fix: GeoFix::interpolated(prev, next, time),
                    })
                }
            }
            Bracket::BetweenTracks { before, after } => self
                .round_within_feather(nearer(before, after, time), time)
                .ok_or(Miss::Unmatched),
        }
    }

    /// Treat the two sides of a segment gap as track endpoints
    fn round_across_segment_gap(
        &self,
        prev: &TrackPoint,
        next: &TrackPoint,
        time: DateTime<Utc>,
    ) -> Result<Match, Miss> {
        let side = match self.options.segment_gap {
            SegmentGapPolicy::Nearest => nearer(prev, next, time),
            SegmentGapPolicy::Preceding => prev,
            SegmentGapPolicy::Following => next,
            SegmentGapPolicy::Reject => return Err(Miss::TooFar),
        };
        self.round_within_feather(side, time).ok_or(Miss::TooFar)
    }

    fn round_within_feather(&self, point: &TrackPoint, time: DateTime<Utc>) -> Option<Match> {
        (gap(point, time) <= self.options.feather).then(|| Match::rounded(point, time))
    }
}

fn gap(point: &TrackPoint, time: DateTime<Utc>) -> TimeDelta {
    (time - point.time).abs()
}

/// The temporally closer of two points; ties go to `a`
fn nearer<'p>(a: &'p TrackPoint, b: &'p TrackPoint, time: DateTime<Utc>) -> &'p TrackPoint {
    if gap(b, time) < gap(a, time) { b } else { a }
}
