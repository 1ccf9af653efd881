use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "spotdiff";
const MAX_LOG_FILES: usize = 5;

/// Installs stderr logging and, when `log_dir` is given, a daily-rolling
/// log file in that directory.
///
/// `base_level` is an `EnvFilter` directive used when `RUST_LOG` is unset.
/// Console output goes to stderr so stdout stays free for program output.
pub fn setup_logging(base_level: &str, log_dir: Option<&Path>) {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = env_filter(env_directives.as_deref(), base_level);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    let file_layer = log_dir.map(|dir| {
        std::fs::create_dir_all(dir)
            .unwrap_or_else(|e| panic!("Failed to create logs directory {}: {}", dir.display(), e));

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(dir)
            .unwrap_or_else(|e| panic!("Failed to create log file appender: {}", e));

        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        LOG_GUARD.set(guard).expect("Logging already initialized");

        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(file_writer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
}

/// `env_directives` (the `RUST_LOG` value) if set and valid, otherwise
/// `base_level`.
fn env_filter(env_directives: Option<&str>, base_level: &str) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(|| EnvFilter::try_new(base_level), Ok)
        .unwrap_or_else(|e| panic!("Invalid log filter '{}': {}", base_level, e))
}
