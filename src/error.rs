//! Error types for gps-correlate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gps-correlate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gps-correlate
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to write EXIF data to {path}: {message}")]
    ExifWrite { path: PathBuf, message: String },

    #[error("Failed to parse GPS track {path}: {message}")]
    TrackParse { path: PathBuf, message: String },

    #[error("Failed to write GPX output: {0}")]
    GpxWrite(String),

    #[error("Track {source_info} contains no timestamped points")]
    EmptyTrack { source_info: String },

    #[error("Invalid location '{0}': expected LAT,LONG[,ELEVATION]")]
    InvalidLocation(String),

    #[error("Invalid rational value '{0}'")]
    InvalidRational(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed JPEG: {0}")]
    Jpeg(String),

    #[error("Unsupported file format for writing: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
