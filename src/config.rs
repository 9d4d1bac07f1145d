//! Configuration types for gps-correlate

use crate::time::TimeZoneSetting;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default geodetic datum written alongside coordinates
pub const DEFAULT_DATUM: &str = "WGS-84";

/// How latitude/longitude are laid out in the three GPS rationals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateStyle {
    /// DD/1 MM/1 SS.SS: degrees, minutes and fractional seconds
    #[default]
    DegMinSecs,
    /// DD/1 MM.MM/100 0/1: the older layout with two decimals of minutes
    DegMins,
}

/// Which side of a segment gap a photo may be rounded to when
/// interpolation across segments is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SegmentGapPolicy {
    /// The temporally nearer side
    #[default]
    Nearest,
    /// The last fix before the gap
    Preceding,
    /// The first fix after the gap
    Following,
    /// Never round into a segment gap
    Reject,
}

/// Immutable per-run correlation settings
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationOptions {
    /// Blend between surrounding fixes instead of rounding
    pub interpolate: bool,
    /// Interpolate across track segment boundaries too
    pub between_segments: bool,
    /// Maximum distance in time from usable track data
    pub feather: TimeDelta,
    pub segment_gap: SegmentGapPolicy,
    pub time_zone: TimeZoneSetting,
    /// Added to photo time to make it match the GPS clock
    pub photo_offset: TimeDelta,
    /// Replace location tags already present in a photo
    pub overwrite: bool,
    /// Dry run: correlate but never write
    pub no_write: bool,
    /// Restore the file's modification time after writing
    pub preserve_mtime: bool,
    pub style: CoordinateStyle,
    pub datum: String,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            interpolate: true,
            between_segments: false,
            feather: TimeDelta::zero(),
            segment_gap: SegmentGapPolicy::default(),
            time_zone: TimeZoneSetting::Auto,
            photo_offset: TimeDelta::zero(),
            overwrite: false,
            no_write: false,
            preserve_mtime: false,
            style: CoordinateStyle::default(),
            datum: DEFAULT_DATUM.to_string(),
        }
    }
}

/// Configuration for gps-correlate, as stored in a TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Photos or directories of photos to process
    pub photos: Vec<PathBuf>,

    /// GPX track logs to correlate against
    pub gpx_files: Vec<PathBuf>,

    /// Fixed location "LAT,LONG[,ELE]" used instead of (or besides) tracks
    pub lat_long: Option<String>,

    /// "auto" or a fixed "+HH[:MM]" offset of the camera clock from UTC
    pub time_zone: String,

    /// Seconds added to photo times to match the GPS clock
    pub photo_offset: i64,

    /// Interpolate between track points
    pub interpolate: bool,

    /// Interpolate across track segment boundaries
    pub between_segments: bool,

    /// Max seconds outside track data that a photo is still matched
    pub max_gap: i64,

    /// Rounding policy at segment gaps
    pub segment_gap: SegmentGapPolicy,

    /// Overwrite existing GPS tags
    pub replace: bool,

    /// Do not write anything
    pub no_write: bool,

    /// Keep the modification time of updated photos
    pub preserve_mtime: bool,

    /// Rational layout for latitude/longitude
    pub coordinate_style: CoordinateStyle,

    /// Geodetic datum label
    pub datum: String,

    /// Verbose output
    pub verbose: bool,

    /// Extensions picked up when walking photo directories
    pub image_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            photos: vec![],
            gpx_files: vec![],
            lat_long: None,
            time_zone: "auto".to_string(),
            photo_offset: 0,
            interpolate: true,
            between_segments: false,
            max_gap: 0,
            segment_gap: SegmentGapPolicy::default(),
            replace: false,
            no_write: false,
            preserve_mtime: false,
            coordinate_style: CoordinateStyle::default(),
            datum: DEFAULT_DATUM.to_string(),
            verbose: false,
            image_extensions: vec!["jpg".into(), "jpeg".into()],
        }
    }
}

impl Config {
    /// Check if a file extension is a supported image format
    pub fn is_image(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.image_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Parsed time zone setting
    pub fn time_zone_setting(&self) -> Result<TimeZoneSetting, ConfigError> {
        self.time_zone
            .parse()
            .map_err(|message| ConfigError::InvalidValue {
                key: "time_zone",
                message,
            })
    }

    /// Validate the configuration and freeze it into correlation options
    pub fn correlation_options(&self) -> Result<CorrelationOptions, ConfigError> {
        if self.max_gap < 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_gap",
                message: format!("must not be negative, got {}", self.max_gap),
            });
        }
        let feather = TimeDelta::try_seconds(self.max_gap).ok_or_else(|| ConfigError::InvalidValue {
            key: "max_gap",
            message: format!("{} seconds is out of range", self.max_gap),
        })?;
        let photo_offset =
            TimeDelta::try_seconds(self.photo_offset).ok_or_else(|| ConfigError::InvalidValue {
                key: "photo_offset",
                message: format!("{} seconds is out of range", self.photo_offset),
            })?;
        if self.datum.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "datum",
                message: "must not be empty".to_string(),
            });
        }

        Ok(CorrelationOptions {
            interpolate: self.interpolate,
            between_segments: self.between_segments,
            feather,
            segment_gap: self.segment_gap,
            time_zone: self.time_zone_setting()?,
            photo_offset,
            overwrite: self.replace,
            no_write: self.no_write,
            preserve_mtime: self.preserve_mtime,
            style: self.coordinate_style,
            datum: self.datum.clone(),
        })
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# gps-correlate configuration file
# This file uses TOML format (https://toml.io)

# Photos to geotag; directories are searched recursively
photos = [
    "D:/Photos/Trip",
]

# GPX track logs recorded while the photos were taken
gpx_files = [
    "D:/Tracks/day1.gpx",
    "D:/Tracks/day2.gpx",
]

# Fixed location for every photo instead of a track: "LAT,LONG[,ELE]"
# lat_long = "-41.2865,174.7762,12"

# Camera clock offset from UTC: "auto" or "+HH[:MM]" / "-HH[:MM]"
# - auto: use this computer's time zone rules at the first photo's date
time_zone = "auto"

# Seconds added to photo times to make them match the GPS clock
photo_offset = 0

# Interpolate linearly between track points (otherwise round to nearest)
interpolate = true

# Interpolate across track segment boundaries (e.g. GPS signal loss)
between_segments = false

# Max seconds outside track data that a photo is still matched
max_gap = 0

# Rounding at segment gaps: "nearest", "preceding", "following" or "reject"
segment_gap = "nearest"

# Overwrite GPS tags already present in a photo
replace = false

# Correlate but do not write anything
no_write = false

# Keep the modification time of updated photos
preserve_mtime = false

# Coordinate layout: "deg-min-secs" (DD MM SS.SS) or "deg-mins" (DD MM.MM)
coordinate_style = "deg-min-secs"

# Geodetic datum of the GPS data
datum = "WGS-84"

# Verbose output - one line per photo
verbose = false

# Extensions picked up when walking photo directories
image_extensions = ["jpg", "jpeg"]
"#
        .to_string()
    }
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value is out of range or malformed
    InvalidValue { key: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use tempfile::tempdir;

    #[test]
    fn test_default_options() {
        let options = Config::default().correlation_options().unwrap();
        assert_eq!(options, CorrelationOptions::default());
    }

    #[test]
    fn test_sample_config_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gps.toml");
        fs::write(&path, Config::sample_config()).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.gpx_files.len(), 2);
        assert_eq!(config.segment_gap, SegmentGapPolicy::Nearest);
        assert_eq!(config.coordinate_style, CoordinateStyle::DegMinSecs);
        assert!(config.correlation_options().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
time_zone = "-3:30"
max_gap = 120
coordinate_style = "deg-mins"
segment_gap = "reject"
"#,
        )
        .unwrap();

        let options = config.correlation_options().unwrap();
        assert_eq!(
            options.time_zone,
            TimeZoneSetting::Fixed(FixedOffset::west_opt(3 * 3600 + 1800).unwrap())
        );
        assert_eq!(options.feather, TimeDelta::seconds(120));
        assert_eq!(options.style, CoordinateStyle::DegMins);
        assert_eq!(options.segment_gap, SegmentGapPolicy::Reject);
        assert!(options.interpolate);
        assert_eq!(options.datum, DEFAULT_DATUM);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config {
            max_gap: -1,
            ..Config::default()
        };
        assert!(matches!(
            config.correlation_options(),
            Err(ConfigError::InvalidValue { key: "max_gap", .. })
        ));

        let config = Config {
            time_zone: "+99".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.correlation_options(),
            Err(ConfigError::InvalidValue { key: "time_zone", .. })
        ));
    }

    #[test]
    fn test_out_of_range_durations() {
        let config = Config {
            max_gap: i64::MAX / 10,
            ..Config::default()
        };
        assert!(matches!(
            config.correlation_options(),
            Err(ConfigError::InvalidValue { key: "max_gap", .. })
        ));

        let config = Config {
            photo_offset: i64::MIN,
            ..Config::default()
        };
        assert!(matches!(
            config.correlation_options(),
            Err(ConfigError::InvalidValue { key: "photo_offset", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file("/nonexistent/gps.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_is_image() {
        let config = Config::default();
        assert!(config.is_image("JPG"));
        assert!(config.is_image("jpeg"));
        assert!(!config.is_image("gpx"));
    }
}
