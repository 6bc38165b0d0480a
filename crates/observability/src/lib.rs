//! # Observability
//!
//! Tracing and Prometheus metrics setup for the lapgap binaries.
//!
//! ## Features
//!
//! - Tracing initialization (JSON / Pretty / Compact)
//! - Prometheus exporter
//! - Tick output aggregation and lap summary metrics
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init_with_config, ObservabilityConfig, TickMetricsAggregator};
//!
//! init_with_config(ObservabilityConfig::default())?;
//!
//! let mut aggregator = TickMetricsAggregator::new();
//! while let Some(output) = outputs.recv().await {
//!     aggregator.update(&output);
//! }
//! println!("{}", aggregator.summary());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_commit_rejected, record_mapping_built, record_summary_metrics, RunningStats,
    StatsSummary, TickMetricsAggregator, TickMetricsSummary,
};

/// Observability settings
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    pub writer: LogWriter,
    /// Used when `RUST_LOG` is unset
    pub default_log_level: String,
    /// Ignore `RUST_LOG` and use `default_log_level` as is
    pub force_level: bool,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            writer: LogWriter::Stdout,
            default_log_level: "info".to_string(),
            force_level: false,
            metrics_port: None,
        }
    }
}

impl ObservabilityConfig {
    /// Filter directive in effect, given the current `RUST_LOG` value
    pub fn filter_directive(&self, rust_log: Option<&str>) -> String {
        match rust_log {
            Some(directive) if !self.force_level && !directive.trim().is_empty() => {
                directive.to_string()
            }
            _ => self.default_log_level.clone(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON
    #[default]
    Json,
    /// Human readable, multi-line
    Pretty,
    /// Single line
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other} (json, pretty, compact)")),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogWriter {
    #[default]
    Stdout,
    /// Keeps stdout free for command output
    Stderr,
}

/// Initialize tracing (and Prometheus when a port is set)
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(config.filter_directive(rust_log.as_deref()))
        .or_else(|_| EnvFilter::try_new(&config.default_log_level))
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(config.log_format, config.writer))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        writer = ?config.writer,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

fn fmt_layer<S>(format: LogFormat, writer: LogWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    match (format, writer) {
        (LogFormat::Json, LogWriter::Stdout) => json_layer().boxed(),
        (LogFormat::Json, LogWriter::Stderr) => json_layer().with_writer(std::io::stderr).boxed(),
        (LogFormat::Pretty, LogWriter::Stdout) => fmt::layer().pretty().boxed(),
        (LogFormat::Pretty, LogWriter::Stderr) => {
            fmt::layer().pretty().with_writer(std::io::stderr).boxed()
        }
        (LogFormat::Compact, LogWriter::Stdout) => fmt::layer().compact().boxed(),
        (LogFormat::Compact, LogWriter::Stderr) => {
            fmt::layer().compact().with_writer(std::io::stderr).boxed()
        }
    }
}

fn json_layer<S>() -> fmt::Layer<S, fmt::format::JsonFields, fmt::format::Format<fmt::format::Json>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
}

/// Install only the Prometheus recorder
///
/// For hosts that set up tracing themselves.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
