//! EXIF date/time string handling

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    // EXIF format: "2024:01:15 14:30:00" or with quotes
    let s = s.trim().trim_matches('"').trim_end_matches('\0');

    // Try standard EXIF format
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }

    // Try with subseconds
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S%.f") {
        return Some(dt);
    }

    // Try alternative formats
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}

/// Format a UTC instant as a GPSDateStamp value: "YYYY:MM:DD"
pub fn format_gps_date(time: &DateTime<Utc>) -> String {
    format!("{:04}:{:02}:{:02}", time.year(), time.month(), time.day())
}

/// Combine GPSDateStamp text with GPSTimeStamp components into a UTC instant
///
/// The seconds component may carry a fraction; it is truncated to whole
/// seconds, which is the resolution every writer uses.
pub fn parse_gps_stamp(date: &str, hour: f64, minute: f64, second: f64) -> Option<DateTime<Utc>> {
    let date = date.trim().trim_end_matches('\0');
    let date = NaiveDate::parse_from_str(date, "%Y:%m:%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()?;
    let time = NaiveTime::from_hms_opt(hour as u32, minute as u32, second.trunc() as u32)?;
    Some(date.and_time(time).and_utc())
}
