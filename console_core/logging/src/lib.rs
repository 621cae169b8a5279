use time::macros::format_description;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line output with a local timestamp.
    #[default]
    Compact,
    Pretty,
}

fn env_filter() -> EnvFilter {
    // RUST_LOG overrides the default level
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. `log` records from the library crates are
/// bridged through `tracing-log`. Calling it twice is a no-op.
pub fn init_logger(format: LogFormat) {
    let time_format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:2]");

    let result = match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_timer(fmt::time::LocalTime::new(time_format))
                    .with_target(false)
                    .with_level(true)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(fmt::format::FmtSpan::NONE)
                    .compact(),
            )
            .with(env_filter())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_thread_names(true)
                    .with_line_number(false)
                    .with_file(false)
                    .pretty(),
            )
            .with(env_filter())
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(?format, "logger initialised");
    }
}
