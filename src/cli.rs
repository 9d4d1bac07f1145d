//! CLI argument parsing with clap

use crate::config::{Config, CoordinateStyle, SegmentGapPolicy};
use crate::show::ShowFormat;
use crate::time::TimeZoneSetting;
use clap::Parser;
use std::path::PathBuf;

/// gps-correlate - Geotag photos from GPS track logs
///
/// Matches each photo's capture time against the positions recorded by a
/// separate GPS logger and writes the location into the photo's EXIF GPS
/// tags.
#[derive(Parser, Debug)]
#[command(name = "gps-correlate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Photos to process; directories are searched recursively
    pub photos: Vec<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// GPX track log to correlate against (repeatable)
    #[arg(short = 'g', long = "gps", value_name = "FILE")]
    pub gps: Vec<PathBuf>,

    /// Fixed location "LAT,LONG[,ELE]" to apply to every photo
    #[arg(short = 'l', long = "latlong", value_name = "LAT,LONG[,ELE]", allow_hyphen_values = true)]
    pub lat_long: Option<String>,

    /// Camera clock offset from UTC, e.g. +10 or -3:30 (default: detect from this machine)
    #[arg(short = 'z', long = "timeadd", value_name = "+/-HH[:MM]", allow_hyphen_values = true)]
    pub time_add: Option<TimeZoneSetting>,

    /// Seconds added to photo times to match the GPS clock
    #[arg(short = 'O', long = "photooffset", value_name = "SECS", allow_negative_numbers = true)]
    pub photo_offset: Option<i64>,

    /// Round to the nearest track point instead of interpolating
    #[arg(short = 'i', long)]
    pub no_interpolation: bool,

    /// Interpolate between track segments, too
    #[arg(short = 't', long)]
    pub ignore_tracksegs: bool,

    /// Which side of a segment gap a photo is rounded to
    #[arg(long, value_enum)]
    pub segment_gap: Option<SegmentGapPolicy>,

    /// Max seconds outside the track that a photo is still matched
    #[arg(short = 'm', long = "max-dist", value_name = "SECS")]
    pub max_dist: Option<i64>,

    /// Geodetic datum of the GPS data
    #[arg(short = 'd', long)]
    pub datum: Option<String>,

    /// Write degrees and decimal minutes instead of degrees, minutes, seconds
    #[arg(long)]
    pub degmins: bool,

    /// Correlate but do not write anything
    #[arg(short = 'n', long)]
    pub no_write: bool,

    /// Overwrite GPS tags already present
    #[arg(short = 'R', long)]
    pub replace: bool,

    /// Keep the modification time of changed photos
    #[arg(short = 'M', long)]
    pub no_mtime: bool,

    /// Show the GPS data stored in the photos
    #[arg(short = 's', long, group = "action")]
    pub show: bool,

    /// Show the GPS data stored in the photos as CSV
    #[arg(short = 'o', long, group = "action")]
    pub machine: bool,

    /// Show the GPS data stored in the photos as a GPX track
    #[arg(short = 'x', long, group = "action")]
    pub show_gpx: bool,

    /// Remove GPS tags from the photos
    #[arg(short = 'r', long, group = "action")]
    pub remove: bool,

    /// Fix GPS date stamps written with the local date (requires -z)
    #[arg(short = 'f', long, group = "action", requires = "time_add")]
    pub fix_datestamps: bool,

    /// Print a sample configuration file and exit
    #[arg(long, group = "action")]
    pub sample_config: bool,

    /// Verbose output - one line per photo
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

/// What the run does with the photos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Correlate,
    Show(ShowFormat),
    Remove,
    FixDatestamps,
    SampleConfig,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.sample_config {
            Mode::SampleConfig
        } else if self.show {
            Mode::Show(ShowFormat::Text)
        } else if self.machine {
            Mode::Show(ShowFormat::Csv)
        } else if self.show_gpx {
            Mode::Show(ShowFormat::Gpx)
        } else if self.remove {
            Mode::Remove
        } else if self.fix_datestamps {
            Mode::FixDatestamps
        } else {
            Mode::Correlate
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if !self.photos.is_empty() {
            config.photos = self.photos.clone();
        }
        if !self.gps.is_empty() {
            config.gpx_files = self.gps.clone();
        }
        if let Some(ref lat_long) = self.lat_long {
            config.lat_long = Some(lat_long.clone());
        }
        if let Some(time_add) = self.time_add {
            config.time_zone = time_add.to_string();
        }
        if let Some(photo_offset) = self.photo_offset {
            config.photo_offset = photo_offset;
        }
        if self.no_interpolation {
            config.interpolate = false;
        }
        if self.ignore_tracksegs {
            config.between_segments = true;
        }
        if let Some(segment_gap) = self.segment_gap {
            config.segment_gap = segment_gap;
        }
        if let Some(max_dist) = self.max_dist {
            config.max_gap = max_dist;
        }
        if let Some(ref datum) = self.datum {
            config.datum = datum.clone();
        }
        if self.degmins {
            config.coordinate_style = CoordinateStyle::DegMins;
        }
        if self.no_write {
            config.no_write = true;
        }
        if self.replace {
            config.replace = true;
        }
        if self.no_mtime {
            config.preserve_mtime = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
