//! tracing setup: stderr plus a daily log file

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Where log files go, if the platform gives us a data dir
pub fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("io.github", "fsobolev", "Cavalier")
        .map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Must run before any other thread starts: the local UTC offset can
/// only be read reliably while the process is single-threaded.
///
/// Keep the returned guard alive until exit or buffered file output is lost.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_target(false)
        .with_writer(std::io::stderr);

    let mut file_error = None;
    let (file_layer, guard) = match log_dir.map(open_log_file) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("[Log] Subscriber already installed: {}", e);
    }

    if let Some(e) = file_error {
        tracing::warn!("[Log] File logging disabled: {}", e);
    }

    guard
}

fn open_log_file(dir: &Path) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("cavalier-prefs")
        .filename_suffix("log")
        .max_log_files(7)
        .build(dir)
}
