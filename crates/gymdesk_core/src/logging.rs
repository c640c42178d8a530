//! Process-wide log sink for the gym desk core.
//!
//! # Responsibility
//! - Start one rolling file logger per process.
//! - Capture panics as single-line log events.
//!
//! # Invariants
//! - A second init with identical settings is a no-op.
//! - A second init with different settings is rejected, never applied.
//! - Init never panics.
//!
//! Log lines use `event=<name> module=<area> status=<outcome>` followed by
//! metadata fields. Attendance notes and names are never logged.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "gymdesk";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 4;
const PANIC_TEXT_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Logging bootstrap failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    EmptyDirectory,
    RelativeDirectory(String),
    CreateDirectory { dir: PathBuf, reason: String },
    Backend(String),
    /// Logging already runs with other settings.
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyDirectory => write!(f, "log directory must not be empty"),
            Self::RelativeDirectory(dir) => {
                write!(f, "log directory must be absolute, got `{dir}`")
            }
            Self::CreateDirectory { dir, reason } => write!(
                f,
                "cannot create log directory `{}`: {reason}",
                dir.display()
            ),
            Self::Backend(reason) => write!(f, "logger backend failed to start: {reason}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging at `level` under `log_dir`.
///
/// # Errors
/// - `UnknownLevel` / `EmptyDirectory` / `RelativeDirectory` for bad input.
/// - `CreateDirectory` / `Backend` when the sink cannot start.
/// - `Conflict` when logging already runs with other settings.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let dir = parse_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start(level, &dir))?;
    if active.dir != dir {
        return Err(LoggingError::Conflict {
            active: format!("dir `{}`", active.dir.display()),
            requested: format!("dir `{}`", dir.display()),
        });
    }
    if active.level != level {
        return Err(LoggingError::Conflict {
            active: format!("level `{}`", active.level),
            requested: format!("level `{level}`"),
        });
    }
    Ok(())
}

/// Active `(level, dir)`, or `None` before init.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: &'static str, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|err| LoggingError::CreateDirectory {
        dir: dir.to_path_buf(),
        reason: err.to_string(),
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();

    info!(
        "event=app_start module=core status=ok os={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=logging_init module=core status=ok level={level} dir={}",
        dir.display()
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnknownLevel(other.to_string())),
    }
}

fn parse_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::EmptyDirectory);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::RelativeDirectory(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_TEXT_LIMIT)
        );
        previous(info);
    }));
}

/// Collapses line breaks and caps length so one event stays on one line.
fn one_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    let mut out: String = flat.chars().take(limit).collect();
    if flat.chars().count() > limit {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line, parse_dir, parse_level, LoggingError};

    #[test]
    fn levels_are_case_insensitive_and_accept_warning() {
        assert_eq!(parse_level(" DEBUG ").expect("uppercase level parses"), "debug");
        assert_eq!(parse_level("warning").expect("warning alias parses"), "warn");
        assert_eq!(
            parse_level("loud").expect_err("unknown level must fail"),
            LoggingError::UnknownLevel("loud".to_string())
        );
    }

    #[test]
    fn relative_and_blank_dirs_are_rejected() {
        assert_eq!(parse_dir("  ").expect_err("blank dir must fail"), LoggingError::EmptyDirectory);
        assert!(matches!(
            parse_dir("logs/dev").expect_err("relative dir must fail"),
            LoggingError::RelativeDirectory(_)
        ));
    }

    #[test]
    fn one_line_flattens_and_truncates() {
        let text = one_line("a\nb\rc-long-tail", 5);
        assert_eq!(text, "a b c...");
    }

    #[test]
    fn second_init_must_match_first() {
        let first = tempfile::tempdir().expect("create first temp dir");
        let second = tempfile::tempdir().expect("create second temp dir");
        let first_path = first.path().to_str().expect("utf-8 temp path").to_string();
        let second_path = second.path().to_str().expect("utf-8 temp path").to_string();

        init_logging("info", &first_path).expect("first init succeeds");
        init_logging("INFO", &first_path).expect("same config re-init is a no-op");

        assert!(matches!(
            init_logging("debug", &first_path).expect_err("level change must conflict"),
            LoggingError::Conflict { .. }
        ));
        assert!(matches!(
            init_logging("info", &second_path).expect_err("dir change must conflict"),
            LoggingError::Conflict { .. }
        ));

        let (level, dir) = logging_status().expect("logger is initialized");
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
