//! Fixed-position "track" from a `LAT,LONG[,ELE]` string

use super::{TrackPoint, typed_decimal_places};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Build a track that places every photo at one fixed location
///
/// The result is two identical fixes at the extremes of the representable
/// time range, so any photo time falls between them. Both are marked
/// stationary so a match reports the photo's own time, not the range ends.
pub fn parse_lat_long(text: &str) -> Result<Vec<TrackPoint>> {
    let invalid = || Error::InvalidLocation(text.to_string());

    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(invalid());
    }

    let (lat, lat_decimals) = parse_component(parts[0]).ok_or_else(invalid)?;
    let (lon, lon_decimals) = parse_component(parts[1]).ok_or_else(invalid)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    let elevation = match parts.get(2) {
        Some(text) => Some(parse_component(text).ok_or_else(invalid)?),
        None => None,
    };

    let make = |time: DateTime<Utc>| {
        let mut point = TrackPoint::new(time, lat, lon).stationary();
        point.lat_decimals = lat_decimals;
        point.lon_decimals = lon_decimals;
        if let Some((value, decimals)) = elevation {
            point = point.with_elevation(value);
            point.elevation_decimals = decimals;
        }
        point
    };

    Ok(vec![
        make(DateTime::<Utc>::MIN_UTC).starting_segment(),
        make(DateTime::<Utc>::MAX_UTC),
    ])
}

/// Parse a decimal number and count the digits typed after its point
fn parse_component(text: &str) -> Option<(f64, u8)> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((value, typed_decimal_places(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_long() {
        let points = parse_lat_long("-41.1234567, 174.50").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].lat, -41.1234567);
        assert_eq!(points[0].lat_decimals, 7);
        assert_eq!(points[0].lon_decimals, 2);
        assert_eq!(points[0].elevation, None);
        assert!(points[0].time < points[1].time);
        assert!(points.iter().all(|point| point.stationary));
    }

    #[test]
    fn test_parse_lat_long_with_elevation() {
        let points = parse_lat_long("51.5,-0.12,35.125").unwrap();
        assert_eq!(points[1].elevation, Some(35.125));
        assert_eq!(points[1].elevation_decimals, 3);
    }

    #[test]
    fn test_parse_lat_long_invalid() {
        assert!(parse_lat_long("51.5").is_err());
        assert!(parse_lat_long("abc,1").is_err());
        assert!(parse_lat_long("91,0").is_err());
        assert!(parse_lat_long("1,2,3,4").is_err());
    }
}
