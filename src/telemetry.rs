use anyhow::Context;
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LogConfig;

/// Keeps the non-blocking file writers flushing until dropped.
pub struct LogGuards {
    _combined: WorkerGuard,
    _errors: WorkerGuard,
}

fn file_appender(cfg: &LogConfig, name: &str) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(&cfg.dir)
        .with_context(|| format!("open log file {}/{}", cfg.dir.display(), name))
}

/// JSON sinks: every info+ event into `combined`, error events into `errors`.
pub fn file_layers<S, C, E>(combined: C, errors: E) -> Vec<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    vec![
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(combined)
            .with_filter(LevelFilter::INFO)
            .boxed(),
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(errors)
            .with_filter(LevelFilter::ERROR)
            .boxed(),
    ]
}

/// Console output filtered by `RUST_LOG`, plus the two JSON log files.
pub fn init(cfg: &LogConfig) -> anyhow::Result<LogGuards> {
    let (combined, combined_guard) =
        tracing_appender::non_blocking(file_appender(cfg, &cfg.combined_file)?);
    let (errors, errors_guard) =
        tracing_appender::non_blocking(file_appender(cfg, &cfg.error_file)?);

    let console = if cfg.json_console {
        fmt::layer().with_target(false).json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(console.with_filter(EnvFilter::new(&cfg.filter)))
        .with(file_layers(combined, errors))
        .init();

    Ok(LogGuards {
        _combined: combined_guard,
        _errors: errors_guard,
    })
}
