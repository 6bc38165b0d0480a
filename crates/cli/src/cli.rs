//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use observability::{LogFormat, LogWriter, ObservabilityConfig};
use std::path::PathBuf;

/// LapGap - align two lap videos and compare the laps
#[derive(Parser, Debug)]
#[command(
    name = "lapgap",
    author,
    version,
    about = "Lap video alignment and lap comparison",
    long_about = "Maps lap A time onto lap B time from matched anchor pairs, keeps two \n\
                  playing streams aligned with soft rate trims and seeks, and computes \n\
                  lap statistics (theoretical best, consistency, lead share)."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LAPGAP_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (json, pretty, compact)
    #[arg(
        long,
        default_value = "pretty",
        global = true,
        env = "LAPGAP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup for the flags; logs go to stderr, stdout carries command output
    pub fn observability_config(&self) -> ObservabilityConfig {
        let level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        ObservabilityConfig {
            log_format: self.log_format,
            writer: LogWriter::Stderr,
            default_log_level: level.to_string(),
            force_level: self.quiet,
            metrics_port: None,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute lap statistics from a session file
    Analyze(AnalyzeArgs),

    /// Map lap A timestamps onto lap B through the session anchors
    Map(MapArgs),

    /// Play two simulated streams through the sync loop and summarize the run
    Simulate(SimulateArgs),

    /// Validate a session file without analyzing it
    Validate(ValidateArgs),
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Path to session file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "session.toml",
        env = "LAPGAP_SESSION"
    )]
    pub session: PathBuf,

    /// Number of ranked gain/loss segments (overrides the session)
    #[arg(long)]
    pub top: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `map` command
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Path to session file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "session.toml",
        env = "LAPGAP_SESSION"
    )]
    pub session: PathBuf,

    /// Lap A timestamps (seconds)
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub times: Vec<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command
#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Session file providing laps, anchors and tuning (defaults otherwise)
    #[arg(short, long, env = "LAPGAP_SESSION")]
    pub session: Option<PathBuf>,

    /// Lap length of both streams when no session is given (seconds)
    #[arg(long, default_value = "30.0")]
    pub duration: f64,

    /// Intrinsic speed of the reference stream (1.0 = real time)
    #[arg(long, default_value = "1.0")]
    pub pace_a: f64,

    /// Intrinsic speed of the follower stream (1.0 = real time)
    #[arg(long, default_value = "1.02")]
    pub pace_b: f64,

    /// Wall-clock run length (seconds)
    #[arg(long, default_value = "5.0", env = "LAPGAP_RUN_SECONDS")]
    pub seconds: f64,

    /// Drive ticks from a simulated decoder clock at this rate instead of the timer
    #[arg(long)]
    pub fps: Option<f64>,

    /// Print every published tick
    #[arg(long)]
    pub follow: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LAPGAP_METRICS_PORT")]
    pub metrics_port: u16,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to session file to validate
    #[arg(short, long, default_value = "session.toml")]
    pub session: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_map_times() {
        let cli = Cli::try_parse_from(["lapgap", "map", "-s", "s.toml", "1.5", "12"]).unwrap();
        match cli.command {
            Commands::Map(args) => assert_eq!(args.times, vec![1.5, 12.0]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_logging_flags() {
        let cli = Cli::try_parse_from(["lapgap", "-vv", "--log-format", "json", "validate"]).unwrap();
        let config = cli.observability_config();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.writer, LogWriter::Stderr);
        assert_eq!(config.default_log_level, "trace");
        assert!(!config.force_level);

        let cli = Cli::try_parse_from(["lapgap", "-q", "validate"]).unwrap();
        let config = cli.observability_config();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.filter_directive(Some("debug")), "warn");

        assert!(Cli::try_parse_from(["lapgap", "--log-format", "xml", "validate"]).is_err());
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["lapgap", "simulate"]).unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert!(args.session.is_none());
        assert_eq!(args.fps, None);
        assert_eq!(args.pace_b, 1.02);
    }
}
