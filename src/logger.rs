//! Tracing subscriber setup. Logs go to stderr so they never mix with a
//! record stream written to stdout.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LogLevel, LoggerSettings};

/// Builds the filter: `RUST_LOG` wins, then the forced level, then the
/// configured one.
#[must_use]
pub fn env_filter(settings: &LoggerSettings, force: Option<LogLevel>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = force.unwrap_or(settings.level);
        EnvFilter::new(level.as_str())
    })
}

/// Installs the global subscriber. A second call is a no-op, which keeps
/// tests that run the command line in one process from failing.
pub fn init(settings: &LoggerSettings, force: Option<LogLevel>) {
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match settings.format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(settings, force))
        .try_init();
}
