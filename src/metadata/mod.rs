//! Photo metadata access
//!
//! The correlation workflow only talks to photos through the traits here,
//! so tests can run it against in-memory fakes.

pub mod exif;
pub mod jpeg;

pub use self::exif::ExifFile;

use crate::encode::{EncodedLocation, EncodedTimestamp};
use crate::error::Result;
use chrono::{DateTime, Utc};
use filetime::FileTime;
use std::fs;
use std::path::Path;

/// Tags needed to decide whether and how to geotag a photo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoTags {
    /// Raw capture timestamp text, as stored by the camera
    pub capture_time: Option<String>,
    /// A GPS latitude is already present
    pub has_location: bool,
}

/// Location already stored in a photo
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLocation {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    /// GPSDateStamp + GPSTimeStamp, when both are present
    pub gps_time: Option<DateTime<Utc>>,
    pub datum: Option<String>,
}

/// Reads and writes location metadata of a photo file
pub trait PhotoMetadata {
    /// Capture time and whether a location exists
    ///
    /// A file with no metadata block yields empty tags rather than an error.
    fn read_tags(&self, path: &Path) -> Result<PhotoTags>;

    /// Decoded location, or `None` when the photo is not geotagged
    fn read_location(&self, path: &Path) -> Result<Option<StoredLocation>>;

    /// Replace all GPS tags with `location`
    fn write_location(&self, path: &Path, location: &EncodedLocation) -> Result<()>;

    /// Strip every GPS tag
    fn remove_location(&self, path: &Path) -> Result<()>;

    /// Rewrite only GPSDateStamp and GPSTimeStamp
    fn write_gps_timestamp(&self, path: &Path, stamp: &EncodedTimestamp) -> Result<()>;
}

/// File modification time access
pub trait FileTimes {
    fn modified(&self, path: &Path) -> Result<FileTime>;

    /// Set the modification time, leaving the access time as it is now
    fn set_modified(&self, path: &Path, mtime: FileTime) -> Result<()>;
}

/// [`FileTimes`] backed by the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileTimes;

impl FileTimes for SystemFileTimes {
    fn modified(&self, path: &Path) -> Result<FileTime> {
        let metadata = fs::metadata(path)?;
        Ok(FileTime::from_last_modification_time(&metadata))
    }

    fn set_modified(&self, path: &Path, mtime: FileTime) -> Result<()> {
        let metadata = fs::metadata(path)?;
        let atime = FileTime::from_last_access_time(&metadata);
        filetime::set_file_times(path, atime, mtime)?;
        Ok(())
    }
}
