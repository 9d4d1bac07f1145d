//! Photo time normalization
//!
//! Cameras record capture time as naive local wall-clock time, while GPS
//! loggers record UTC. This module turns the former into the latter using:
//! - A fixed timezone offset given by the user
//! - An offset detected once from the system timezone rules
//! - A flat correction for a camera clock that drifted

pub mod exif;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// How the camera's local time relates to UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneSetting {
    /// Camera clock runs this far ahead of UTC
    Fixed(FixedOffset),
    /// Detect from the system timezone at the first photo's date
    #[default]
    Auto,
}

impl FromStr for TimeZoneSetting {
    type Err = String;

    /// Accepts `auto`, `+HH`, `-HH`, `+HH:MM` or `-HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(TimeZoneSetting::Auto);
        }

        let invalid = || format!("invalid time zone '{}': expected auto or +/-HH[:MM]", s);

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (hours, minutes) = match body.split_once(':') {
            Some((h, m)) => (h, m),
            None => (body, "0"),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours < 0 || !(0..60).contains(&minutes) {
            return Err(invalid());
        }

        let seconds = (hours * 3600 + minutes * 60) * if negative { -1 } else { 1 };
        FixedOffset::east_opt(seconds)
            .map(TimeZoneSetting::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSetting::Auto => write!(f, "auto"),
            TimeZoneSetting::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Source of timezone rules for automatic offset detection
pub trait ZoneRules {
    /// UTC offset in force at the given local wall-clock time
    fn offset_at(&self, local: &NaiveDateTime) -> FixedOffset;
}

/// The timezone rules of the machine running the program
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZone;

impl ZoneRules for SystemZone {
    fn offset_at(&self, local: &NaiveDateTime) -> FixedOffset {
        offset_in(&Local, local)
    }
}

/// UTC offset of `zone` at a local wall-clock time
pub fn offset_in<Tz: TimeZone>(zone: &Tz, local: &NaiveDateTime) -> FixedOffset {
    // An autumn fold maps to two instants; the earlier one wins. A spring
    // gap maps to none, so fall back to reading the wall clock as UTC.
    zone.from_local_datetime(local)
        .earliest()
        .map(|dt| dt.offset().fix())
        .unwrap_or_else(|| zone.offset_from_utc_datetime(local).fix())
}

/// Converts camera timestamps to UTC for one run
///
/// With [`TimeZoneSetting::Auto`] the offset is resolved on the first photo
/// and reused for the rest of the run.
pub struct TimeNormalizer {
    setting: TimeZoneSetting,
    photo_offset: TimeDelta,
    resolved: Option<FixedOffset>,
    zone: Box<dyn ZoneRules>,
}

impl TimeNormalizer {
    pub fn new(setting: TimeZoneSetting, photo_offset: TimeDelta) -> Self {
        Self::with_zone_rules(setting, photo_offset, SystemZone)
    }

    pub fn with_zone_rules(
        setting: TimeZoneSetting,
        photo_offset: TimeDelta,
        zone: impl ZoneRules + 'static,
    ) -> Self {
        let resolved = match setting {
            TimeZoneSetting::Fixed(offset) => Some(offset),
            TimeZoneSetting::Auto => None,
        };
        Self {
            setting,
            photo_offset,
            resolved,
            zone: Box::new(zone),
        }
    }

    /// Offset in use, once known
    pub fn offset(&self) -> Option<FixedOffset> {
        self.resolved
    }

    pub fn setting(&self) -> TimeZoneSetting {
        self.setting
    }

    /// Parse an EXIF timestamp and convert it to UTC
    ///
    /// Returns `None` when the text is not a usable timestamp.
    pub fn normalize(&mut self, exif_time: &str) -> Option<DateTime<Utc>> {
        let local = exif::parse_exif_datetime(exif_time);
        if local.is_none() {
            debug!(exif_time, "Unusable capture timestamp");
        }
        let utc = local.and_then(|local| self.to_utc(local));
        if local.is_some() && utc.is_none() {
            debug!(exif_time, "Capture timestamp out of range after offsets");
        }
        utc
    }

    /// Convert a naive camera time to UTC
    ///
    /// Returns `None` when the offsets push the time out of range.
    pub fn to_utc(&mut self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let offset = match self.resolved {
            Some(offset) => offset,
            None => {
                let offset = self.zone.offset_at(&local);
                info!(%offset, photo_time = %local, "Detected time zone from first photo");
                self.resolved = Some(offset);
                offset
            }
        };

        local
            .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))?
            .and_utc()
            .checked_add_signed(self.photo_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{LocalResult, NaiveDate, NaiveTime};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingZone {
        offset: FixedOffset,
        calls: Rc<Cell<usize>>,
    }

    impl ZoneRules for CountingZone {
        fn offset_at(&self, _local: &NaiveDateTime) -> FixedOffset {
            self.calls.set(self.calls.get() + 1);
            self.offset
        }
    }

    fn local(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_time_zone_setting() {
        assert_eq!("auto".parse::<TimeZoneSetting>().unwrap(), TimeZoneSetting::Auto);
        assert_eq!(
            "+10".parse::<TimeZoneSetting>().unwrap(),
            TimeZoneSetting::Fixed(FixedOffset::east_opt(10 * 3600).unwrap())
        );
        assert_eq!(
            "9:30".parse::<TimeZoneSetting>().unwrap(),
            TimeZoneSetting::Fixed(FixedOffset::east_opt(9 * 3600 + 1800).unwrap())
        );
        // The sign covers the minutes too
        assert_eq!(
            "-3:30".parse::<TimeZoneSetting>().unwrap(),
            TimeZoneSetting::Fixed(FixedOffset::west_opt(3 * 3600 + 1800).unwrap())
        );
        assert_eq!(
            "-0:30".parse::<TimeZoneSetting>().unwrap(),
            TimeZoneSetting::Fixed(FixedOffset::west_opt(1800).unwrap())
        );
        assert!("+5:75".parse::<TimeZoneSetting>().is_err());
        assert!("+30".parse::<TimeZoneSetting>().is_err());
        assert!("east".parse::<TimeZoneSetting>().is_err());
    }

    #[test]
    fn test_fixed_offset_and_photo_offset() {
        let zone = "+10:00".parse().unwrap();
        let mut normalizer = TimeNormalizer::new(zone, TimeDelta::zero());
        let utc = normalizer.normalize("2024:06:15 14:30:00").unwrap();
        assert_eq!(utc, local(4, 30, 0).and_utc());

        let mut shifted = TimeNormalizer::new(zone, TimeDelta::seconds(-90));
        let utc = shifted.normalize("2024:06:15 14:30:00").unwrap();
        assert_eq!(utc, local(4, 28, 30).and_utc());
    }

    #[test]
    fn test_negative_offset() {
        let zone = "-5".parse().unwrap();
        let mut normalizer = TimeNormalizer::new(zone, TimeDelta::zero());
        let utc = normalizer.to_utc(local(20, 0, 0)).unwrap();
        assert_eq!(utc, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap().and_hms_opt(1, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn test_auto_offset_resolved_once() {
        let calls = Rc::new(Cell::new(0));
        let zone = CountingZone {
            offset: FixedOffset::east_opt(2 * 3600).unwrap(),
            calls: Rc::clone(&calls),
        };
        let mut normalizer =
            TimeNormalizer::with_zone_rules(TimeZoneSetting::Auto, TimeDelta::zero(), zone);
        assert!(normalizer.offset().is_none());

        assert_eq!(normalizer.to_utc(local(12, 0, 0)), Some(local(10, 0, 0).and_utc()));
        assert_eq!(normalizer.to_utc(local(13, 0, 0)), Some(local(11, 0, 0).and_utc()));
        assert_eq!(calls.get(), 1);
        assert_eq!(normalizer.offset(), FixedOffset::east_opt(2 * 3600));
    }

    #[test]
    fn test_unusable_timestamp() {
        let mut normalizer = TimeNormalizer::new(TimeZoneSetting::Auto, TimeDelta::zero());
        assert!(normalizer.normalize("").is_none());
        assert!(normalizer.normalize("0000:00:00 00:00:00").is_none());
        // A failed parse must not lock in an auto offset
        assert!(normalizer.offset().is_none());
    }

    #[test]
    fn test_out_of_range_photo_offset() {
        let zone = "+01:00".parse().unwrap();
        let mut normalizer = TimeNormalizer::new(zone, TimeDelta::seconds(1_000_000_000_000_000));
        assert!(normalizer.normalize("2024:06:15 14:30:00").is_none());

        let mut normalizer = TimeNormalizer::new(zone, TimeDelta::seconds(-1_000_000_000_000_000));
        assert!(normalizer.normalize("2024:06:15 14:30:00").is_none());
    }

    /// Central European rules for 2024: +01:00, or +02:00 between
    /// 2024-03-31 01:00 UTC and 2024-10-27 01:00 UTC
    #[derive(Debug, Clone, Copy)]
    struct Cet2024;

    impl Cet2024 {
        fn summer(utc: &NaiveDateTime) -> bool {
            let start = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(1, 0, 0).unwrap();
            let end = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap().and_hms_opt(1, 0, 0).unwrap();
            (start..end).contains(utc)
        }
    }

    impl TimeZone for Cet2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Cet2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            // Summer time first: it yields the earlier instant in a fold
            let candidates: Vec<FixedOffset> = [2, 1]
                .into_iter()
                .filter_map(|hours| FixedOffset::east_opt(hours * 3600))
                .filter(|offset| {
                    let utc = *local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                    self.offset_from_utc_datetime(&utc) == *offset
                })
                .collect();
            match candidates[..] {
                [] => LocalResult::None,
                [offset] => LocalResult::Single(offset),
                [earlier, later, ..] => LocalResult::Ambiguous(earlier, later),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let hours = if Self::summer(utc) { 2 } else { 1 };
            FixedOffset::east_opt(hours * 3600).unwrap()
        }
    }

    fn at(month: u32, day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_offset_in_regular_times() {
        assert_eq!(offset_in(&Cet2024, &at(1, 15, 12, 0)), FixedOffset::east_opt(3600).unwrap());
        assert_eq!(offset_in(&Cet2024, &at(7, 1, 12, 0)), FixedOffset::east_opt(7200).unwrap());
    }

    #[test]
    fn test_offset_in_autumn_fold_takes_earliest() {
        // 02:30 on 27 October happens twice, first at +02:00 then at +01:00
        assert_eq!(offset_in(&Cet2024, &at(10, 27, 2, 30)), FixedOffset::east_opt(7200).unwrap());
    }

    #[test]
    fn test_offset_in_spring_gap_reads_wall_clock_as_utc() {
        // 02:30 on 31 March never happens locally; 02:30 UTC is summer time
        assert_eq!(offset_in(&Cet2024, &at(3, 31, 2, 30)), FixedOffset::east_opt(7200).unwrap());
        // The same wall clock a night earlier is plain winter time
        assert_eq!(offset_in(&Cet2024, &at(3, 30, 2, 30)), FixedOffset::east_opt(3600).unwrap());
    }
}
