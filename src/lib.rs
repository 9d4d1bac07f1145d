//! gps-correlate - Geotag photos from GPS track logs
//!
//! This library matches photo capture times against positions recorded
//! by a separate GPS logger and writes them into EXIF GPS tags:
//! - GPX track loading with segment awareness
//! - Camera clock to UTC normalization with fixed or detected time zones
//! - Exact, interpolated and rounded position matching with a gap tolerance
//! - Precision-aware rational encoding of coordinates, altitude and time
//! - Tag writing, removal and GPS date stamp repair for JPEG files

pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod matcher;
pub mod metadata;
pub mod process;
pub mod show;
pub mod summary;
pub mod time;
pub mod track;

pub use cli::{Cli, Mode};
pub use config::{Config, ConfigError, CoordinateStyle, CorrelationOptions, SegmentGapPolicy};
pub use error::{Error, Result};
pub use matcher::{GeoFix, Matcher};
pub use process::{Correlation, Correlator, Outcome};
pub use summary::BatchSummary;
pub use time::{TimeNormalizer, TimeZoneSetting};
pub use track::TrackStore;
