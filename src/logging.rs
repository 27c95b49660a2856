//! Logging setup.
//!
//! Diagnostics go through `tracing`. The level comes from `--log-level` (or
//! `HOTELS_LOG`) and defaults to `info`. Records go to stderr, except in the TUI
//! where stderr would corrupt the screen; `--log-file` adds a plain-text copy.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

/// Install the global subscriber. Fails on an unparsable level directive or an
/// unwritable log file.
pub fn setup_log(level: &str, log_file: Option<&Path>, tui: bool) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_new(level)
        .map_err(|e| AppError::new(2, format!("Invalid log level '{level}': {e}")))?;

    let timestamper = CompactTimestamp;

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create log file '{}': {e}", path.display())))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_timer(timestamper),
            )
        }
        None => None,
    };

    let stderr_layer = (!tui).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(timestamper)
    });

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to initialise logging: {e}")))?;

    tracing::debug!(level, tui, "logging ready");
    Ok(())
}

/// Local wall-clock time, e.g. `14:03:27`.
#[derive(Clone, Copy)]
struct CompactTimestamp;

impl FormatTime for CompactTimestamp {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_an_input_error() {
        let err = setup_log("hotels=verbose", None, true).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unwritable_log_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("hotels.log");
        let err = setup_log("info", Some(&path), true).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
