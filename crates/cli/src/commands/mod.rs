//! Command implementations.

mod analyze;
mod map;
mod simulate;
mod validate;

pub use analyze::run_analyze;
pub use map::run_map;
pub use simulate::run_simulate;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use tracing::info;

use crate::error::CliError;

/// Load and validate a session file
fn load_session(path: &Path) -> Result<SessionBlueprint> {
    if !path.exists() {
        return Err(CliError::session_not_found(path.display().to_string()).into());
    }

    let session = config_loader::ConfigLoader::load_from_path(path)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load session from {}", path.display()))?;

    info!(
        session = %path.display(),
        lap_a = session.laps.lap_a,
        lap_b = session.laps.lap_b,
        anchors = session.anchors.raw_len(),
        samples = session.delta_samples.len(),
        "Session loaded"
    );
    Ok(session)
}
