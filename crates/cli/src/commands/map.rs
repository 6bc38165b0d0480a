//! `map` command implementation.

use anyhow::{Context, Result};
use lap_analysis::{format_gap, format_lap_time};
use serde::Serialize;
use tracing::{info, warn};
use warp_mapper::{map_a_to_b, WarpMapping};

use crate::cli::MapArgs;
use crate::error::CliError;

/// One mapped timestamp
#[derive(Debug, Serialize, PartialEq)]
struct MappedTime {
    t_a: f64,
    t_b: f64,
    /// `t_b - t_a`: time B has lost (+) or gained (-) by this point
    gap: f64,
}

/// Execute the `map` command
pub fn run_map(args: &MapArgs) -> Result<()> {
    let session = super::load_session(&args.session)?;
    let pairs = session.anchor_pairs();

    let mapping = match WarpMapping::build(&pairs) {
        Ok(mapping) => {
            info!(points = mapping.len(), "Mapping built");
            Some(mapping)
        }
        Err(e) => {
            warn!(error = %e, "No usable mapping, timestamps map to themselves");
            None
        }
    };

    let rows = map_times(mapping.as_ref(), &args.times)?;

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize mapping")?;
        println!("{}", json);
    } else {
        println!("{:>12} {:>12} {:>9}", session.laps.title_a, session.laps.title_b, "gap");
        for row in &rows {
            println!(
                "{:>12} {:>12} {:>9}",
                format_lap_time(row.t_a),
                format_lap_time(row.t_b),
                format_gap(row.gap)
            );
        }
    }
    Ok(())
}

fn map_times(mapping: Option<&WarpMapping>, times: &[f64]) -> Result<Vec<MappedTime>, CliError> {
    times
        .iter()
        .map(|&t_a| {
            if !t_a.is_finite() || t_a < 0.0 {
                return Err(CliError::invalid_time(t_a));
            }
            let t_b = map_a_to_b(mapping, t_a);
            Ok(MappedTime {
                t_a,
                t_b,
                gap: t_b - t_a,
            })
        })
        .collect()
}
