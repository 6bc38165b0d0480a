//! # Config Loader
//!
//! Session file loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON session files
//! - Validate lap times, anchors, recorded samples and tuning
//! - Produce a `SessionBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let session = ConfigLoader::load_from_path(Path::new("session.toml")).unwrap();
//! println!("lap A: {}", session.laps.lap_a);
//! ```

mod parser;
mod validator;

pub use contracts::SessionBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Session loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a session from a file path
    ///
    /// The format is taken from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SessionBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a session from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SessionBlueprint, ContractError> {
        let session = parser::parse(content, format)?;
        validator::validate(&session)?;
        Ok(session)
    }

    /// Validate an in-memory session
    pub fn validate(session: &SessionBlueprint) -> Result<(), ContractError> {
        validator::validate(session)
    }

    /// Serialize to a TOML string
    pub fn to_toml(session: &SessionBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(session)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize to a JSON string
    pub fn to_json(session: &SessionBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(session)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SESSION_TOML: &str = r#"
[laps]
lap_a = 30.0
lap_b = 28.0
title_a = "Car A"
title_b = "Car B"

[[anchors]]
tA = 0.0
tB = 0.0
locked = true

[[anchors]]
tA = 10.0
tB = 9.0

[[anchors]]
tA = 20.0
tB = 21.0

[[anchors]]
tA = 30.0
tB = 28.0
locked = true

[analysis]
density_bins = 40
"#;

    #[test]
    fn test_load_from_str_toml() {
        let session = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(session.anchor_pairs().len(), 4);
        assert_eq!(session.analysis.density_bins, 40);
    }

    #[test]
    fn test_round_trip_toml() {
        let session = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&session).unwrap();
        let again = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(session.anchor_pairs(), again.anchor_pairs());
        assert_eq!(session.laps.lap_b, again.laps.lap_b);
    }

    #[test]
    fn test_round_trip_json() {
        let session = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&session).unwrap();
        assert!(json.contains("\"tA\""));
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(session.anchor_pairs(), again.anchor_pairs());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[laps]
lap_a = 30.0
lap_b = 28.0

[controller]
smoothing_alpha = 1.5
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("controller.smoothing_alpha"), "got: {err}");
    }

    #[test]
    fn test_oversized_rate_window_rejected() {
        let content = "[laps]\nlap_a = 30.0\nlap_b = 28.0\n[analysis]\nrate_window_ms = 1e30\n";
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("analysis.rate_window_ms"), "got: {err}");
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SESSION_TOML.as_bytes()).unwrap();

        let session = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(session.laps.lap_a, 30.0);
    }

    #[test]
    fn test_load_from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = ConfigLoader::load_from_path(Path::new("/nonexistent/session.toml")).unwrap_err();
        assert!(matches!(err, ContractError::Io(_)));
    }
}
