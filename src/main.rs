//! gps-correlate - Geotag photos from GPS track logs
//!
//! A CLI tool that matches photo capture times against GPX track logs and
//! writes the resulting positions into the photos' EXIF GPS tags.

use anyhow::{Context, Result};
use clap::Parser;
use gps_correlate::metadata::{ExifFile, SystemFileTimes};
use gps_correlate::process::{DatestampCheck, Removal, collect_photos, fix_datestamp, remove_location};
use gps_correlate::show::{ShowFormat, ShowWriter};
use gps_correlate::summary::{BatchSummary, EXIT_FAILURE, EXIT_SUCCESS};
use gps_correlate::track::{TrackStore, gpx_file::read_gpx, latlong::parse_lat_long};
use gps_correlate::{Cli, Config, CorrelationOptions, Correlator, Mode, TimeNormalizer, TimeZoneSetting};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored terminal output for the command line

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use gps_correlate::process::Outcome;
    use std::io::{Write, stdout};

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    /// Color used for an outcome's marker
    pub fn outcome_color(outcome: Outcome) -> Color {
        match outcome {
            Outcome::Exact | Outcome::Interpolated => CliTheme::SUCCESS,
            Outcome::Rounded => CliTheme::ACCENT,
            Outcome::Unmatched | Outcome::TooFar | Outcome::NoInputTimestamp | Outcome::AlreadyTagged => {
                CliTheme::WARNING
            }
            Outcome::WriteFailed => CliTheme::ERROR,
        }
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let _ = stdout().execute(Print(&format!("  {}\n", title.bold().stylize())));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print one result line: icon, file and message
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, msg: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(msg).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print a single progress marker without a newline
    pub fn print_marker(outcome: Outcome) {
        let symbol = outcome.symbol().to_string();
        let _ = stdout().execute(Print(style(symbol).with(outcome_color(outcome))));
        let _ = stdout().flush();
    }

    pub fn print_legend() {
        let legend: Vec<String> = Outcome::ALL
            .iter()
            .map(|o| format!("{} = {}", o.symbol(), o.description()))
            .collect();
        print_hint(&format!("Legend: {}", legend.join(", ")));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "gps-correlate starting");

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Run failed");
            cli_output::print_error(&format!("{:#}", e));
            EXIT_FAILURE
        }
    };

    // Flush the file log before exiting
    drop(guard);
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    let mode = cli.mode();
    if mode == Mode::SampleConfig {
        print!("{}", Config::sample_config());
        return Ok(EXIT_SUCCESS);
    }

    let config = load_config(cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    let options = config.correlation_options()?;
    let photos = collect_photos(&config.photos, &config)
        .context("At least one image file name must be given")?;
    info!(count = photos.len(), ?mode, "Photos collected");

    match mode {
        Mode::Correlate => run_correlate(&config, &options, &photos),
        Mode::Show(format) => run_show(format, &options, &photos),
        Mode::Remove => run_remove(&options, &photos),
        Mode::FixDatestamps => run_fix_datestamps(&options, &photos),
        Mode::SampleConfig => Ok(EXIT_SUCCESS),
    }
}

/// Build the track store from GPX files and a fixed location
fn load_tracks(config: &Config) -> Result<TrackStore> {
    let mut store = TrackStore::new();

    for path in &config.gpx_files {
        let points = read_gpx(path)?;
        store.load(path.display().to_string(), points, true)?;
    }
    if let Some(ref lat_long) = config.lat_long {
        store.load("latlong", parse_lat_long(lat_long)?, true)?;
    }

    if store.is_empty() {
        anyhow::bail!("Cannot continue since no GPS data is available (use -g or -l)");
    }
    info!(
        tracks = store.tracks().len(),
        points = store.total_points(),
        "GPS data loaded"
    );
    Ok(store)
}

fn run_correlate(config: &Config, options: &CorrelationOptions, photos: &[PathBuf]) -> Result<i32> {
    use cli_output::*;

    let store = load_tracks(config)?;
    let metadata = ExifFile::new();
    let times = SystemFileTimes;
    let mut correlator = Correlator::new(&store, options, &metadata, &times);
    let mut summary = BatchSummary::new();

    if options.no_write {
        print_warning("Dry run: no photos will be changed");
    }
    if !config.verbose {
        print_legend();
    }
    print_title("Correlate:");

    for photo in photos {
        let result = correlator.correlate(photo);
        summary.record(result.outcome);

        if config.verbose {
            let detail = match &result.fix {
                Some(fix) => {
                    let elevation = fix
                        .elevation
                        .map(|e| format!("{:.3}", e))
                        .unwrap_or_else(|| "(unknown)".to_string());
                    format!(
                        "{}: Lat {:.6}, Long {:.6}, Elev {}",
                        result.outcome.description(),
                        fix.lat,
                        fix.lon,
                        elevation
                    )
                }
                None => result.outcome.description().to_string(),
            };
            print_result(
                &result.outcome.symbol().to_string(),
                outcome_color(result.outcome),
                &photo.display().to_string(),
                &detail,
            );
        } else {
            print_marker(result.outcome);
        }
    }
    if !config.verbose {
        print_blank();
    }

    print_separator();
    print_title("Completed correlation process");
    print_separator();
    if let Some(offset) = correlator.time_zone_offset() {
        print_key_value("Used time zone offset", &offset.to_string());
    }
    print_stat(
        "Matched",
        &format!(
            "{:5} ({} Exact, {} Interpolated, {} Rounded)",
            summary.matched(),
            summary.exact,
            summary.interpolated,
            summary.rounded
        ),
        CliTheme::SUCCESS,
    );
    print_stat(
        "Failed",
        &format!(
            "{:5} ({} Not matched, {} Write failure, {} Too far, {} No date, {} GPS already present)",
            summary.failed(),
            summary.unmatched,
            summary.write_failed,
            summary.too_far,
            summary.no_date,
            summary.already_tagged
        ),
        if summary.failed() > 0 {
            CliTheme::WARNING
        } else {
            CliTheme::HINT
        },
    );

    info!(summary = %summary.summary(), "Correlation complete");
    Ok(summary.exit_code())
}

fn run_show(format: ShowFormat, options: &CorrelationOptions, photos: &[PathBuf]) -> Result<i32> {
    let metadata = ExifFile::new();
    let normalizer = TimeNormalizer::new(options.time_zone, options.photo_offset);
    let mut writer = ShowWriter::new(std::io::stdout().lock(), format, normalizer);

    let mut all_readable = true;
    for photo in photos {
        all_readable &= writer.show_photo(&metadata, photo)?;
    }
    writer.finish()?;

    Ok(if format == ShowFormat::Text && !all_readable {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    })
}

fn run_remove(options: &CorrelationOptions, photos: &[PathBuf]) -> Result<i32> {
    use cli_output::*;

    let metadata = ExifFile::new();
    let times = SystemFileTimes;
    let mut failures = 0usize;

    for photo in photos {
        let file = photo.display().to_string();
        match remove_location(&metadata, &times, photo, options) {
            Ok(Removal::Removed) => print_result("✓", CliTheme::SUCCESS, &file, "Removed GPS tags"),
            Ok(Removal::WouldRemove) => print_result("✓", CliTheme::HINT, &file, "Would remove GPS tags"),
            Ok(Removal::NothingToRemove) => print_result("⊘", CliTheme::HINT, &file, "No GPS tags"),
            Err(e) => {
                failures += 1;
                error!(path = %file, error = %e, "Tag removal failure");
                print_result("✗", CliTheme::ERROR, &file, &format!("Tag removal failure: {}", e));
            }
        }
    }

    Ok(if failures > 0 { EXIT_FAILURE } else { EXIT_SUCCESS })
}

fn run_fix_datestamps(options: &CorrelationOptions, photos: &[PathBuf]) -> Result<i32> {
    use cli_output::*;

    let TimeZoneSetting::Fixed(offset) = options.time_zone else {
        anyhow::bail!("A time offset must be given with the -z option to fix photos");
    };

    let metadata = ExifFile::new();
    let times = SystemFileTimes;
    let mut failures = 0usize;

    for photo in photos {
        let file = photo.display().to_string();
        match fix_datestamp(&metadata, &times, photo, offset, options.no_write) {
            Ok(DatestampCheck::Correct { photo: time }) => {
                print_result("✓", CliTheme::SUCCESS, &file, &format!("Timestamp is OK: {}", time))
            }
            Ok(DatestampCheck::Corrected { photo: time, gps }) => print_result(
                "↻",
                CliTheme::ACCENT,
                &file,
                &format!("Wrong timestamp: GPS {}, corrected to {}", gps, time),
            ),
            Ok(DatestampCheck::NoCaptureTime) => {
                failures += 1;
                print_result("?", CliTheme::WARNING, &file, "No EXIF data");
            }
            Ok(DatestampCheck::NoGpsData) => {
                failures += 1;
                print_result("-", CliTheme::WARNING, &file, "No GPS data");
            }
            Err(e) => {
                failures += 1;
                error!(path = %file, error = %e, "Time stamp fix failed");
                print_result("✗", CliTheme::ERROR, &file, &e.to_string());
            }
        }
    }

    Ok(if failures > 0 { EXIT_FAILURE } else { EXIT_SUCCESS })
}

/// Resolve config path - a missing `.toml` extension may be left off
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }
    config_path.with_extension("toml")
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    Ok(config)
}

/// Setup logging: console always, plus an optional log file
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(ref log_path) = cli.log_file else {
        subscriber.init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}
