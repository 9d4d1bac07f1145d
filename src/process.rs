//! Per-photo correlation workflow
//!
//! Photos are handled strictly one after another. For each one the
//! [`Correlator`] reads the existing tags, normalizes the capture time,
//! looks up a position and writes it back, returning a single [`Outcome`].

use crate::config::{Config, CorrelationOptions};
use crate::encode::{EncodedTimestamp, encode};
use crate::error::{Error, Result};
use crate::matcher::{GeoFix, MatchKind, Matcher, Miss};
use crate::metadata::{FileTimes, PhotoMetadata};
use crate::time::{TimeNormalizer, TimeZoneSetting};
use crate::track::TrackStore;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Terminal state of one photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Exact,
    Interpolated,
    Rounded,
    /// No track data close enough inside the tracks' time range
    Unmatched,
    /// Too far outside the tracks' time range
    TooFar,
    /// No usable capture timestamp
    NoInputTimestamp,
    /// A location is already present and overwriting is off
    AlreadyTagged,
    /// A position was found but could not be written
    WriteFailed,
}

impl Outcome {
    /// All outcomes, in legend order
    pub const ALL: [Outcome; 8] = [
        Outcome::Exact,
        Outcome::Interpolated,
        Outcome::Rounded,
        Outcome::Unmatched,
        Outcome::TooFar,
        Outcome::WriteFailed,
        Outcome::NoInputTimestamp,
        Outcome::AlreadyTagged,
    ];

    /// Single-character progress marker
    pub fn symbol(self) -> char {
        match self {
            Outcome::Exact => '.',
            Outcome::Interpolated => '/',
            Outcome::Rounded => '<',
            Outcome::Unmatched => '-',
            Outcome::TooFar => '^',
            Outcome::WriteFailed => 'w',
            Outcome::NoInputTimestamp => '?',
            Outcome::AlreadyTagged => '!',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Outcome::Exact => "Exact match",
            Outcome::Interpolated => "Interpolated",
            Outcome::Rounded => "Rounded",
            Outcome::Unmatched => "No match",
            Outcome::TooFar => "Too far from nearest point",
            Outcome::WriteFailed => "EXIF write failure",
            Outcome::NoInputTimestamp => "No EXIF date tag present",
            Outcome::AlreadyTagged => "GPS data already present",
        }
    }

    /// Whether a position was found for the photo
    pub fn has_fix(self) -> bool {
        matches!(
            self,
            Outcome::Exact | Outcome::Interpolated | Outcome::Rounded | Outcome::WriteFailed
        )
    }
}

impl From<MatchKind> for Outcome {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Exact => Outcome::Exact,
            MatchKind::Interpolated => Outcome::Interpolated,
            MatchKind::Rounded => Outcome::Rounded,
        }
    }
}

impl From<Miss> for Outcome {
    fn from(miss: Miss) -> Self {
        match miss {
            Miss::Unmatched => Outcome::Unmatched,
            Miss::TooFar => Outcome::TooFar,
        }
    }
}

/// Result of correlating one photo
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub outcome: Outcome,
    /// The position found, also on `WriteFailed` and in dry runs
    pub fix: Option<GeoFix>,
}

impl Correlation {
    fn without_fix(outcome: Outcome) -> Self {
        Self { outcome, fix: None }
    }
}

/// Geotags photos one at a time against a loaded [`TrackStore`]
pub struct Correlator<'a> {
    store: &'a TrackStore,
    options: &'a CorrelationOptions,
    metadata: &'a dyn PhotoMetadata,
    times: &'a dyn FileTimes,
    normalizer: TimeNormalizer,
}

impl<'a> Correlator<'a> {
    pub fn new(
        store: &'a TrackStore,
        options: &'a CorrelationOptions,
        metadata: &'a dyn PhotoMetadata,
        times: &'a dyn FileTimes,
    ) -> Self {
        let normalizer = TimeNormalizer::new(options.time_zone, options.photo_offset);
        Self::with_normalizer(store, options, metadata, times, normalizer)
    }

    pub fn with_normalizer(
        store: &'a TrackStore,
        options: &'a CorrelationOptions,
        metadata: &'a dyn PhotoMetadata,
        times: &'a dyn FileTimes,
        normalizer: TimeNormalizer,
    ) -> Self {
        Self {
            store,
            options,
            metadata,
            times,
            normalizer,
        }
    }

    /// Time zone offset in use, once the first photo resolved it
    pub fn time_zone_offset(&self) -> Option<FixedOffset> {
        self.normalizer.offset()
    }

    /// Correlate and tag a single photo
    pub fn correlate(&mut self, path: &Path) -> Correlation {
        let tags = match self.metadata.read_tags(path) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(?path, error = %e, "Could not read photo metadata");
                Default::default()
            }
        };

        let Some(capture_time) = tags.capture_time else {
            debug!(?path, "No capture time");
            return Correlation::without_fix(Outcome::NoInputTimestamp);
        };

        if tags.has_location && !self.options.overwrite {
            debug!(?path, "Location already present, skipping");
            return Correlation::without_fix(Outcome::AlreadyTagged);
        }

        let Some(time) = self.normalizer.normalize(&capture_time) else {
            return Correlation::without_fix(Outcome::NoInputTimestamp);
        };

        let found = match Matcher::new(self.store, self.options).locate(time) {
            Ok(found) => found,
            Err(miss) => {
                debug!(?path, %time, ?miss, "No position for photo");
                return Correlation::without_fix(miss.into());
            }
        };

        let outcome = Outcome::from(found.kind);
        debug!(
            ?path,
            %time,
            ?outcome,
            lat = found.fix.lat,
            lon = found.fix.lon,
            "Position found"
        );

        if self.options.no_write {
            return Correlation {
                outcome,
                fix: Some(found.fix),
            };
        }

        let encoded = encode(&found.fix, self.options.style, &self.options.datum);
        let metadata = self.metadata;
        let written = with_preserved_mtime(self.times, path, self.options.preserve_mtime, || {
            metadata.write_location(path, &encoded)
        });

        match written {
            Ok(()) => Correlation {
                outcome,
                fix: Some(found.fix),
            },
            Err(e) => {
                warn!(?path, error = %e, "Failed to write location");
                Correlation {
                    outcome: Outcome::WriteFailed,
                    fix: Some(found.fix),
                }
            }
        }
    }
}

/// Run `write`, restoring the file's modification time afterwards when asked
///
/// Failing to read or restore the time is logged, never fatal.
fn with_preserved_mtime<F>(times: &dyn FileTimes, path: &Path, preserve: bool, write: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let mtime = if preserve {
        match times.modified(path) {
            Ok(mtime) => Some(mtime),
            Err(e) => {
                warn!(?path, error = %e, "Could not read modification time");
                None
            }
        }
    } else {
        None
    };

    let result = write();

    if let Some(mtime) = mtime
        && let Err(e) = times.set_modified(path, mtime)
    {
        warn!(?path, error = %e, "Could not restore modification time");
    }

    result
}

/// What stripping GPS tags from a photo did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The photo had no location to remove
    NothingToRemove,
    /// Tags found but left in place for a dry run
    WouldRemove,
    Removed,
}

/// Strip GPS tags from one photo
pub fn remove_location(
    metadata: &dyn PhotoMetadata,
    times: &dyn FileTimes,
    path: &Path,
    options: &CorrelationOptions,
) -> Result<Removal> {
    if !metadata.read_tags(path)?.has_location {
        debug!(?path, "No GPS tags present");
        return Ok(Removal::NothingToRemove);
    }
    if options.no_write {
        info!(?path, "Would remove GPS tags (dry run)");
        return Ok(Removal::WouldRemove);
    }

    with_preserved_mtime(times, path, options.preserve_mtime, || metadata.remove_location(path))?;
    info!(?path, "Removed GPS tags");
    Ok(Removal::Removed)
}

/// What checking a photo's GPS date stamp found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatestampCheck {
    NoCaptureTime,
    NoGpsData,
    /// Stamp agrees with the capture time
    Correct { photo: DateTime<Utc> },
    /// Stamp differed; it was rewritten unless this is a dry run
    Corrected { photo: DateTime<Utc>, gps: DateTime<Utc> },
}

/// Repair GPS date/time stamps that disagree with the capture time
///
/// The capture time is shifted by `offset` only; the photo offset is not
/// applied. The file's modification time is always preserved.
pub fn fix_datestamp(
    metadata: &dyn PhotoMetadata,
    times: &dyn FileTimes,
    path: &Path,
    offset: FixedOffset,
    no_write: bool,
) -> Result<DatestampCheck> {
    let tags = metadata.read_tags(path)?;
    let mut normalizer = TimeNormalizer::new(TimeZoneSetting::Fixed(offset), TimeDelta::zero());
    let Some(photo) = tags
        .capture_time
        .as_deref()
        .and_then(|text| normalizer.normalize(text))
    else {
        return Ok(DatestampCheck::NoCaptureTime);
    };

    let Some(gps) = metadata.read_location(path)?.and_then(|location| location.gps_time) else {
        return Ok(DatestampCheck::NoGpsData);
    };

    if gps == photo {
        debug!(?path, %photo, "GPS time stamp is correct");
        return Ok(DatestampCheck::Correct { photo });
    }

    info!(?path, %photo, %gps, "GPS time stamp is wrong");
    if !no_write {
        let stamp = EncodedTimestamp::from_time(&photo);
        with_preserved_mtime(times, path, true, || metadata.write_gps_timestamp(path, &stamp))?;
    }
    Ok(DatestampCheck::Corrected { photo, gps })
}

/// Expand files and directories into the list of photos to process
///
/// Files named directly are taken as given. Directories are walked
/// recursively and filtered by the configured image extensions; their
/// contents are sorted by path.
pub fn collect_photos(inputs: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut photos = Vec::new();

    for input in inputs {
        if input.is_file() {
            photos.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            warn!(?input, "Input does not exist, skipping");
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && let Some(ext) = path.extension().and_then(|e| e.to_str())
                && config.is_image(ext)
            {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        debug!(?input, count = found.len(), "Collected photos from directory");
        photos.extend(found);
    }

    if photos.is_empty() {
        return Err(Error::Config("no photos to process".to_string()));
    }
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EncodedLocation;
    use crate::metadata::{PhotoTags, StoredLocation};
    use crate::track::TrackPoint;
    use chrono::{NaiveDateTime, TimeZone};
    use filetime::FileTime;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeMetadata {
        tags: PhotoTags,
        location: Option<StoredLocation>,
        fail_read: bool,
        fail_write: bool,
        written: RefCell<Vec<EncodedLocation>>,
        stamps: RefCell<Vec<EncodedTimestamp>>,
        removed: Cell<usize>,
    }

    impl FakeMetadata {
        fn dated(time: &str) -> Self {
            Self {
                tags: PhotoTags {
                    capture_time: Some(time.to_string()),
                    has_location: false,
                },
                ..Default::default()
            }
        }

        fn write_error(path: &Path) -> Error {
            Error::ExifWrite {
                path: path.to_path_buf(),
                message: "disk full".to_string(),
            }
        }
    }

    impl PhotoMetadata for FakeMetadata {
        fn read_tags(&self, path: &Path) -> Result<PhotoTags> {
            if self.fail_read {
                return Err(Error::ExifRead {
                    path: path.to_path_buf(),
                    message: "corrupt".to_string(),
                });
            }
            Ok(self.tags.clone())
        }

        fn read_location(&self, _path: &Path) -> Result<Option<StoredLocation>> {
            Ok(self.location.clone())
        }

        fn write_location(&self, path: &Path, location: &EncodedLocation) -> Result<()> {
            if self.fail_write {
                return Err(Self::write_error(path));
            }
            self.written.borrow_mut().push(location.clone());
            Ok(())
        }

        fn remove_location(&self, path: &Path) -> Result<()> {
            if self.fail_write {
                return Err(Self::write_error(path));
            }
            self.removed.set(self.removed.get() + 1);
            Ok(())
        }

        fn write_gps_timestamp(&self, _path: &Path, stamp: &EncodedTimestamp) -> Result<()> {
            self.stamps.borrow_mut().push(stamp.clone());
            Ok(())
        }
    }

    /// Records modification-time traffic; every file starts at `initial`
    struct FakeTimes {
        initial: FileTime,
        restored: RefCell<Vec<FileTime>>,
    }

    impl Default for FakeTimes {
        fn default() -> Self {
            Self {
                initial: FileTime::from_unix_time(1_600_000_000, 0),
                restored: RefCell::new(Vec::new()),
            }
        }
    }

    impl FileTimes for FakeTimes {
        fn modified(&self, _path: &Path) -> Result<FileTime> {
            Ok(self.initial)
        }

        fn set_modified(&self, _path: &Path, mtime: FileTime) -> Result<()> {
            self.restored.borrow_mut().push(mtime);
            Ok(())
        }
    }

    fn utc(text: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap().and_utc()
    }

    /// Track from 10:00 to 10:10 UTC, exact point at 10:05
    fn store() -> TrackStore {
        let mut store = TrackStore::new();
        store
            .load(
                "walk.gpx",
                vec![
                    TrackPoint::new(utc("2024-06-15 10:00:00"), 10.0, 20.0).with_elevation(100.0),
                    TrackPoint::new(utc("2024-06-15 10:05:00"), 11.0, 21.0).with_elevation(110.0),
                    TrackPoint::new(utc("2024-06-15 10:10:00"), 12.0, 22.0),
                ],
                true,
            )
            .unwrap();
        store
    }

    fn options() -> CorrelationOptions {
        CorrelationOptions {
            time_zone: "+02:00".parse().unwrap(),
            ..CorrelationOptions::default()
        }
    }

    #[test]
    fn test_outcome_symbols() {
        let symbols: String = Outcome::ALL.iter().map(|o| o.symbol()).collect();
        assert_eq!(symbols, "./<-^w?!");
        assert!(Outcome::WriteFailed.has_fix());
        assert!(!Outcome::AlreadyTagged.has_fix());
    }

    #[test]
    fn test_correlate_and_write() {
        let store = store();
        let options = options();
        let metadata = FakeMetadata::dated("2024:06:15 12:02:30");
        let times = FakeTimes::default();

        let mut correlator = Correlator::new(&store, &options, &metadata, &times);
        let result = correlator.correlate(Path::new("a.jpg"));

        assert_eq!(result.outcome, Outcome::Interpolated);
        let fix = result.fix.unwrap();
        assert_eq!(fix.lat, 10.5);
        assert_eq!(fix.time, utc("2024-06-15 10:02:30"));

        let written = metadata.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].latitude_ref, 'N');
        assert_eq!(written[0].timestamp.time.to_string(), "10/1 2/1 30/1");
        assert!(times.restored.borrow().is_empty());
    }

    #[test]
    fn test_already_tagged_short_circuits() {
        let store = store();
        let options = options();
        let mut metadata = FakeMetadata::dated("2024:06:15 12:05:00");
        metadata.tags.has_location = true;
        let times = FakeTimes::default();

        let result = Correlator::new(&store, &options, &metadata, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result, Correlation::without_fix(Outcome::AlreadyTagged));
        assert!(metadata.written.borrow().is_empty());
    }

    #[test]
    fn test_overwrite_replaces_existing() {
        let store = store();
        let options = CorrelationOptions {
            overwrite: true,
            ..options()
        };
        let mut metadata = FakeMetadata::dated("2024:06:15 12:05:00");
        metadata.tags.has_location = true;
        let times = FakeTimes::default();

        let result = Correlator::new(&store, &options, &metadata, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::Exact);
        assert_eq!(metadata.written.borrow().len(), 1);
    }

    #[test]
    fn test_dry_run_never_writes() {
        let store = store();
        let options = CorrelationOptions {
            no_write: true,
            preserve_mtime: true,
            ..options()
        };
        let metadata = FakeMetadata::dated("2024:06:15 12:05:00");
        let times = FakeTimes::default();

        let result = Correlator::new(&store, &options, &metadata, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::Exact);
        assert_eq!(result.fix.unwrap().lat, 11.0);
        assert!(metadata.written.borrow().is_empty());
        assert!(times.restored.borrow().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_fix() {
        let store = store();
        let options = options();
        let metadata = FakeMetadata {
            fail_write: true,
            ..FakeMetadata::dated("2024:06:15 12:05:00")
        };
        let times = FakeTimes::default();

        let result = Correlator::new(&store, &options, &metadata, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::WriteFailed);
        assert_eq!(result.fix.unwrap().lat, 11.0);
    }

    #[test]
    fn test_missing_or_unreadable_timestamp() {
        let store = store();
        let options = options();
        let times = FakeTimes::default();

        let undated = FakeMetadata::default();
        let result = Correlator::new(&store, &options, &undated, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::NoInputTimestamp);

        let garbled = FakeMetadata::dated("    :  :     :  :  ");
        let result = Correlator::new(&store, &options, &garbled, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::NoInputTimestamp);

        let unreadable = FakeMetadata {
            fail_read: true,
            ..FakeMetadata::dated("2024:06:15 12:05:00")
        };
        let result = Correlator::new(&store, &options, &unreadable, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result.outcome, Outcome::NoInputTimestamp);
    }

    #[test]
    fn test_misses_are_reported() {
        let store = store();
        let options = options();
        let times = FakeTimes::default();

        let late = FakeMetadata::dated("2024:06:15 13:00:00");
        let result = Correlator::new(&store, &options, &late, &times).correlate(Path::new("a.jpg"));
        assert_eq!(result, Correlation::without_fix(Outcome::TooFar));
        assert!(late.written.borrow().is_empty());
    }

    #[test]
    fn test_preserve_mtime_restores_after_write() {
        let store = store();
        let options = CorrelationOptions {
            preserve_mtime: true,
            ..options()
        };
        let metadata = FakeMetadata::dated("2024:06:15 12:05:00");
        let times = FakeTimes::default();

        Correlator::new(&store, &options, &metadata, &times).correlate(Path::new("a.jpg"));
        assert_eq!(*times.restored.borrow(), vec![times.initial]);

        // Restored even when the write fails
        let failing = FakeMetadata {
            fail_write: true,
            ..FakeMetadata::dated("2024:06:15 12:05:00")
        };
        let times = FakeTimes::default();
        Correlator::new(&store, &options, &failing, &times).correlate(Path::new("a.jpg"));
        assert_eq!(times.restored.borrow().len(), 1);
    }

    #[test]
    fn test_remove_location() {
        let options = CorrelationOptions::default();
        let times = FakeTimes::default();

        let untagged = FakeMetadata::dated("2024:06:15 12:05:00");
        assert_eq!(
            remove_location(&untagged, &times, Path::new("a.jpg"), &options).unwrap(),
            Removal::NothingToRemove
        );
        assert_eq!(untagged.removed.get(), 0);

        let mut tagged = FakeMetadata::dated("2024:06:15 12:05:00");
        tagged.tags.has_location = true;
        assert_eq!(
            remove_location(&tagged, &times, Path::new("a.jpg"), &options).unwrap(),
            Removal::Removed
        );
        assert_eq!(tagged.removed.get(), 1);

        let dry_run = CorrelationOptions {
            no_write: true,
            ..CorrelationOptions::default()
        };
        assert_eq!(
            remove_location(&tagged, &times, Path::new("a.jpg"), &dry_run).unwrap(),
            Removal::WouldRemove
        );
        assert_eq!(tagged.removed.get(), 1);
    }

    fn stored_at(gps_time: DateTime<Utc>) -> StoredLocation {
        StoredLocation {
            lat: 1.0,
            lon: 2.0,
            elevation: None,
            gps_time: Some(gps_time),
            datum: None,
        }
    }

    #[test]
    fn test_fix_datestamp() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let times = FakeTimes::default();

        // Stamp written with the local date instead of the UTC date
        let wrong = FakeMetadata {
            location: Some(stored_at(Utc.with_ymd_and_hms(2024, 6, 16, 23, 30, 0).unwrap())),
            ..FakeMetadata::dated("2024:06:16 01:30:00")
        };
        let check = fix_datestamp(&wrong, &times, Path::new("a.jpg"), offset, false).unwrap();
        let photo = Utc.with_ymd_and_hms(2024, 6, 15, 23, 30, 0).unwrap();
        assert_eq!(
            check,
            DatestampCheck::Corrected {
                photo,
                gps: Utc.with_ymd_and_hms(2024, 6, 16, 23, 30, 0).unwrap(),
            }
        );
        let stamps = wrong.stamps.borrow();
        assert_eq!(stamps.len(), 1);
        assert_eq!(stamps[0].date, "2024:06:15");
        // Modification time is always kept
        assert_eq!(times.restored.borrow().len(), 1);

        let right = FakeMetadata {
            location: Some(stored_at(photo)),
            ..FakeMetadata::dated("2024:06:16 01:30:00")
        };
        let check = fix_datestamp(&right, &times, Path::new("a.jpg"), offset, false).unwrap();
        assert_eq!(check, DatestampCheck::Correct { photo });
        assert!(right.stamps.borrow().is_empty());
    }

    #[test]
    fn test_fix_datestamp_missing_data() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let times = FakeTimes::default();

        let undated = FakeMetadata::default();
        assert_eq!(
            fix_datestamp(&undated, &times, Path::new("a.jpg"), offset, false).unwrap(),
            DatestampCheck::NoCaptureTime
        );

        let untagged = FakeMetadata::dated("2024:06:16 01:30:00");
        assert_eq!(
            fix_datestamp(&untagged, &times, Path::new("a.jpg"), offset, true).unwrap(),
            DatestampCheck::NoGpsData
        );
    }

    #[test]
    fn test_collect_photos() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("day2");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.JPG"), b"").unwrap();
        fs::write(dir.path().join("a.jpeg"), b"").unwrap();
        fs::write(nested.join("c.jpg"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let explicit = dir.path().join("scan.tiff");
        fs::write(&explicit, b"").unwrap();

        let config = Config::default();
        let photos = collect_photos(&[dir.path().to_path_buf(), explicit.clone()], &config).unwrap();

        let names: Vec<_> = photos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.jpeg", "b.JPG", "c.jpg", "scan.tiff"]);
    }

    #[test]
    fn test_collect_photos_empty() {
        let dir = tempdir().unwrap();
        assert!(collect_photos(&[dir.path().to_path_buf()], &Config::default()).is_err());
    }
}
