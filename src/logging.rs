use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV_VAR: &str = "TYPECLOCK_LOG";

/// Route tracing output to a daily rolling file in `log_dir`.
///
/// The terminal belongs to the UI, so nothing goes to stdout or stderr.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_file_logging(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("typeclock: logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "typeclock.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new("typeclock=info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    match installed {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}
