//! Structured Logger
//!
//! Console output plus an optional daily-rolling JSON file, with
//! environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file prefix; files are named `vaultbot.log.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "vaultbot.log";

/// Initialize the global logger.
///
/// `RUST_LOG` wins over `level`. With `log_dir` set, a JSON layer writes
/// NDJSON to a daily-rolling file in that directory. Calling this twice is a
/// no-op.
pub fn init_logger(log_dir: Option<&Path>, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
