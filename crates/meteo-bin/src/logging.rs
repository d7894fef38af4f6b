//! Structured logging setup and panic hook, installed before anything else
//! runs so a crash during panel init is still captured.

use anyhow::Result;
use std::path::Path;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;

/// Installs a non-blocking file-backed `tracing` subscriber. The returned
/// guard must be kept alive for the process lifetime; dropping it flushes
/// and stops the background writer thread.
pub fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("meteo-station.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "meteo-station.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);

    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_already_set) => Ok(None),
    }
}

pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}
