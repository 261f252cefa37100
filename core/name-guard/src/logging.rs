//! Optional log setup for hosts that do not install a subscriber themselves.
//!
//! Writes to a daily-rotating file under `<root>/logs/`. The filter comes
//! from `NAME_GUARD_DEBUG_LOG` (any truthy value means `debug`), then
//! `RUST_LOG`, then [`GuardConfig::log_level`].

use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::storage::StorageConfig;

pub const DEBUG_ENV_VAR: &str = "NAME_GUARD_DEBUG_LOG";

const LOG_FILE_PREFIX: &str = "name-guard.log";

/// Installs the global subscriber. Keep the returned guard alive for as long
/// as logs should be flushed.
///
/// Fails instead of panicking when the host already installed a subscriber.
pub fn init(storage: &StorageConfig, config: &GuardConfig) -> Result<WorkerGuard> {
    let logs_dir = storage.logs_dir();
    fs_err::create_dir_all(&logs_dir).map_err(|source| GuardError::Io {
        context: "create log directory".to_string(),
        source,
    })?;

    let (writer, guard) =
        tracing_appender::non_blocking(rolling::daily(&logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| GuardError::LoggingInit(e.to_string()))?;

    tracing::info!(dir = %logs_dir.display(), "Logging initialized");
    Ok(guard)
}

fn build_filter(config: &GuardConfig) -> EnvFilter {
    if debug_requested(env::var(DEBUG_ENV_VAR).ok().as_deref()) {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

fn debug_requested(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}
