//! Tracing setup for the `filmeto-crew` binary.
//!
//! Events go to stderr so that `list --json` and friends keep stdout clean.
//! A rolling file sink is added when `[logging] file` is set. `RUST_LOG`
//! directives are layered on top of the resolved level.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

type DynLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Keeps the file writer alive; drop it last.
#[must_use = "dropping the guard stops the file writer"]
pub struct LogGuards {
    _file: Option<WorkerGuard>,
}

/// Logging decisions derived from settings and command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPlan {
    pub level: Level,
    pub json: bool,
    pub file: Option<PathBuf>,
    pub rotation: RotationKind,
    pub keep_files: usize,
}

/// Rotation cadence for the file sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationKind {
    Hourly,
    Daily,
}

impl LogPlan {
    /// `--quiet` beats `-v`; `-v`/`-vv` beat the configured level.
    pub fn resolve(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => level_from_str(&settings.level),
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };

        // tracing-appender rotates on time only; small size caps get hourly files
        let rotation = match settings.max_file_size_mb {
            1..=9 => RotationKind::Hourly,
            _ => RotationKind::Daily,
        };

        Self {
            level,
            json: settings.json_format,
            file: settings
                .file
                .as_deref()
                .filter(|f| !f.trim().is_empty())
                .map(PathBuf::from),
            rotation,
            keep_files: settings.max_files.max(1) as usize,
        }
    }

    /// Filter: the resolved level everywhere, `RUST_LOG` where it is set.
    fn filter(&self) -> Result<EnvFilter> {
        let level = self.level.to_string().to_lowercase();
        let crate_directive = format!("filmeto_crew={level}")
            .parse()
            .map_err(|e| Error::Config(format!("Invalid log directive: {e}")))?;

        let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
        Ok(base.add_directive(crate_directive))
    }
}

/// Install the global subscriber described by `settings` and the CLI flags.
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let plan = LogPlan::resolve(settings, verbose, quiet);

    let (file_layer, file_guard) = match &plan.file {
        Some(path) => {
            let (writer, guard) = open_appender(path, plan.rotation, plan.keep_files)?;
            (Some(writer_layer(writer, plan.json)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(plan.filter()?)
        .with(stderr_layer(plan.json))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {e}")))?;

    tracing::debug!(level = %plan.level, json = plan.json, file = ?plan.file, "Logging ready");

    Ok(LogGuards { _file: file_guard })
}

/// Stderr logging for commands that run before the config is read.
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(fmt::layer().with_writer(std::io::stderr).without_time().compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {e}")))
}

fn level_from_str(value: &str) -> Level {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn stderr_layer<S>(json: bool) -> DynLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_writer(std::io::stderr);
    if json {
        layer.json().with_target(true).with_file(true).boxed()
    } else {
        layer.with_target(false).compact().boxed()
    }
}

fn writer_layer<S>(writer: NonBlocking, json: bool) -> DynLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Non-blocking rolling writer for `path`, creating its directory.
fn open_appender(path: &Path, rotation: RotationKind, keep: usize) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io_write(dir, e))?;

    let prefix = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "filmeto-crew".to_string());

    let appender = RollingFileAppender::builder()
        .rotation(match rotation {
            RotationKind::Hourly => Rotation::HOURLY,
            RotationKind::Daily => Rotation::DAILY,
        })
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(keep)
        .build(dir)
        .map_err(|e| Error::Config(format!("Cannot open log file in {}: {e}", dir.display())))?;

    Ok(tracing_appender::non_blocking(appender))
}
