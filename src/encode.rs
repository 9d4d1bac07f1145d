//! Fixed-point rational encoding of GPS values
//!
//! EXIF stores coordinates, altitude and time as unsigned fractions. The
//! number of digits kept follows the precision recorded for each value, so
//! a fix read as `51.5` is not written with nine spurious decimals.

use crate::config::CoordinateStyle;
use crate::error::{Error, Result};
use crate::matcher::{GeoFix, MAX_DECIMALS, MAX_ELEVATION_DECIMALS};
use crate::time::exif::format_gps_date;
use chrono::{DateTime, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

/// Decimals kept for the seconds of a GPS time stamp
const TIMESTAMP_DECIMALS: u8 = 3;

/// A numerator/denominator pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub num: i64,
    pub denom: i64,
}

impl Fraction {
    pub const fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    pub const fn whole(num: i64) -> Self {
        Self { num, denom: 1 }
    }

    pub fn value(&self) -> f64 {
        self.num as f64 / self.denom as f64
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

impl FromStr for Fraction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRational(s.to_string());
        let (num, denom) = s.trim().split_once('/').ok_or_else(invalid)?;
        let num: i64 = num.trim().parse().map_err(|_| invalid())?;
        let denom: i64 = denom.trim().parse().map_err(|_| invalid())?;
        if denom == 0 {
            return Err(invalid());
        }
        Ok(Self { num, denom })
    }
}

/// Three fractions: degrees/minutes/seconds or hours/minutes/seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triplet(pub [Fraction; 3]);

impl Triplet {
    /// Collapse to a single decimal value (`a + b/60 + c/3600`)
    pub fn to_decimal(&self) -> f64 {
        let [a, b, c] = self.0;
        a.value() + b.value() / 60.0 + c.value() / 3600.0
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{} {} {}", a, b, c)
    }
}

/// Scale a fractional part by `multiplier` and truncate it
///
/// Values a hair below a digit boundary because of binary representation
/// (`0.2` stored as `0.19999...`) are pulled up before truncating.
fn scaled_fraction(fraction: f64, multiplier: i64) -> i64 {
    let scaled = fraction * multiplier as f64;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-6 {
        nearest as i64
    } else {
        scaled.trunc() as i64
    }
}

/// Encode a decimal as a single fraction with `decimals` digits of precision
///
/// Integral results come out as `n/1`. Otherwise the fraction is reduced
/// only by halving while both parts are even.
pub fn to_rational(value: f64, decimals: u8) -> Fraction {
    let decimals = decimals.min(MAX_DECIMALS);
    let multiplier = 10_i64.pow(u32::from(decimals));

    let whole = value.trunc();
    let numerator = whole as i64 * multiplier + scaled_fraction(value - whole, multiplier);

    if numerator % multiplier == 0 {
        return Fraction::whole(numerator / multiplier);
    }

    let mut fraction = Fraction::new(numerator, multiplier);
    while fraction.num % 2 == 0 && fraction.denom % 2 == 0 {
        fraction.num /= 2;
        fraction.denom /= 2;
    }
    fraction
}

/// Degrees, whole minutes and fractional seconds of `abs(value)`
///
/// Seconds get `decimals - 3` digits (clamped to 0..=9): three decimal
/// digits of a degree are already resolved by the degree/minute parts.
pub fn to_dms_rational(value: f64, decimals: u8) -> Triplet {
    let value = value.abs();
    let degrees = value.floor();
    let minutes = (value - degrees) * 60.0;
    let whole_minutes = minutes.floor();
    let seconds = (minutes - whole_minutes) * 60.0;

    let digits = i32::from(decimals).saturating_sub(3).clamp(0, 9) as u32;
    let multiplier = 10_i64.pow(digits);

    Triplet([
        Fraction::whole(degrees as i64),
        Fraction::whole(whole_minutes as i64),
        Fraction::new((seconds * multiplier as f64).floor() as i64, multiplier),
    ])
}

/// Degrees and minutes with two decimals, seconds left at zero
pub fn to_dm_rational(value: f64) -> Triplet {
    let value = value.abs();
    let degrees = value.floor();
    let minutes = (value - degrees) * 60.0;

    Triplet([
        Fraction::whole(degrees as i64),
        Fraction::new((minutes * 100.0).floor() as i64, 100),
        Fraction::whole(0),
    ])
}

/// Parse an `n/d` fraction into its decimal value
pub fn parse_rational(text: &str) -> Result<f64> {
    text.parse::<Fraction>().map(|f| f.value())
}

/// Parse three fractions (space or comma separated) into decimal degrees
pub fn dms_to_decimal(text: &str) -> Result<f64> {
    let parts: Vec<Fraction> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_>>()?;

    match parts.as_slice() {
        [a, b, c] => Ok(Triplet([*a, *b, *c]).to_decimal()),
        _ => Err(Error::InvalidRational(text.to_string())),
    }
}

/// Whether an altitude is measured above or below sea level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeRef {
    AboveSeaLevel = 0,
    BelowSeaLevel = 1,
}

impl AltitudeRef {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// GPSTimeStamp and GPSDateStamp values for one UTC instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTimestamp {
    /// `h/1 m/1 s/d`
    pub time: Triplet,
    /// `YYYY:MM:DD`
    pub date: String,
}

impl EncodedTimestamp {
    pub fn from_time(time: &DateTime<Utc>) -> Self {
        let seconds = f64::from(time.second()) + f64::from(time.nanosecond() % 1_000_000_000) / 1e9;
        Self {
            time: Triplet([
                Fraction::whole(i64::from(time.hour())),
                Fraction::whole(i64::from(time.minute())),
                to_rational(seconds, TIMESTAMP_DECIMALS),
            ]),
            date: format_gps_date(time),
        }
    }
}

/// Everything written into the GPS IFD for one photo
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedLocation {
    pub latitude: Triplet,
    /// 'N' or 'S'
    pub latitude_ref: char,
    pub longitude: Triplet,
    /// 'E' or 'W'
    pub longitude_ref: char,
    /// Altitude magnitude and its reference, when elevation is known
    pub altitude: Option<(Fraction, AltitudeRef)>,
    pub timestamp: EncodedTimestamp,
    pub datum: String,
}

/// Encode a fix into its EXIF GPS representation
pub fn encode(fix: &GeoFix, style: CoordinateStyle, datum: &str) -> EncodedLocation {
    let coordinate = |value: f64, decimals: u8| match style {
        CoordinateStyle::DegMinSecs => to_dms_rational(value, decimals),
        CoordinateStyle::DegMins => to_dm_rational(value),
    };

    let altitude = fix.elevation.map(|elevation| {
        let reference = if elevation < 0.0 {
            AltitudeRef::BelowSeaLevel
        } else {
            AltitudeRef::AboveSeaLevel
        };
        let decimals = fix.elevation_decimals.min(MAX_ELEVATION_DECIMALS);
        (to_rational(elevation.abs(), decimals), reference)
    });

    EncodedLocation {
        latitude: coordinate(fix.lat, fix.lat_decimals),
        latitude_ref: if fix.lat < 0.0 { 'S' } else { 'N' },
        longitude: coordinate(fix.lon, fix.lon_decimals),
        longitude_ref: if fix.lon < 0.0 { 'W' } else { 'E' },
        altitude,
        timestamp: EncodedTimestamp::from_time(&fix.time),
        datum: datum.to_string(),
    }
}
