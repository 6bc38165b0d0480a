//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    session_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SessionSummary>,
}

#[derive(Serialize)]
struct SessionSummary {
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    track: Option<String>,
    lap_a: f64,
    lap_b: f64,
    anchor_count: usize,
    sample_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(session = %args.session.display(), "Validating session");

    let result = validate_session(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Session validation failed")
    }
}

fn validate_session(args: &ValidateArgs) -> ValidationResult {
    let session_path = args.session.display().to_string();

    if !args.session.exists() {
        return ValidationResult {
            valid: false,
            session_path,
            error: Some(format!("File not found: {}", args.session.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.session) {
        Ok(session) => {
            let warnings = collect_warnings(&session);
            ValidationResult {
                valid: true,
                session_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(SessionSummary {
                    version: format!("{:?}", session.version),
                    track: session.laps.track.clone(),
                    lap_a: session.laps.lap_a,
                    lap_b: session.laps.lap_b,
                    anchor_count: session.anchor_pairs().len(),
                    sample_count: session.delta_samples.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            session_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal issues
fn collect_warnings(session: &SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let anchors = session.anchor_pairs().len();
    let min_points = session.analysis.min_commit_points;

    if anchors < 2 {
        warnings.push(
            "Fewer than 2 anchors - theoretical best falls back to delta density".to_string(),
        );
    } else if anchors < min_points {
        warnings.push(format!(
            "{anchors} anchors - an interactive commit needs at least {min_points}"
        ));
    }

    if session.anchors.raw_len() > anchors {
        warnings.push(format!(
            "{} anchor entries dropped during normalization",
            session.anchors.raw_len() - anchors
        ));
    }

    if anchors < 2 && session.delta_samples.is_empty() {
        warnings.push("No delta samples - theoretical best equals the faster lap".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Session is valid: {}", result.session_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            if let Some(ref track) = summary.track {
                println!("  Track: {}", track);
            }
            println!("  Lap A: {:.3}s", summary.lap_a);
            println!("  Lap B: {:.3}s", summary.lap_b);
            println!("  Anchors: {}", summary.anchor_count);
            println!("  Delta samples: {}", summary.sample_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Session is invalid: {}", result.session_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
