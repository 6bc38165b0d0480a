//! SessionBlueprint - Config Loader output
//!
//! Describes one comparison session: lap times, committed anchors,
//! optionally a recorded delta log, and controller/analysis tuning.

use serde::{Deserialize, Serialize};

use crate::{AnalysisConfig, AnchorInput, AnchorPair, DeltaSample, SyncControllerConfig, TickConfig};

/// Session file version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionVersion {
    #[default]
    V1,
}

/// Complete session description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// File version
    #[serde(default)]
    pub version: SessionVersion,

    /// Lap metadata
    pub laps: LapConfig,

    /// Committed anchors (any accepted shape)
    #[serde(default)]
    pub anchors: AnchorInput,

    /// Recorded delta log, if the session was played before
    #[serde(default)]
    pub delta_samples: Vec<DeltaSample>,

    /// Controller tuning
    #[serde(default)]
    pub controller: SyncControllerConfig,

    /// Tick scheduling
    #[serde(default)]
    pub tick: TickConfig,

    /// Analysis tuning
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl SessionBlueprint {
    /// Committed anchors normalized to canonical pairs
    pub fn anchor_pairs(&self) -> Vec<AnchorPair> {
        self.anchors.clone().into_pairs()
    }
}

/// Lap metadata of both streams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapConfig {
    /// Lap time of stream A (seconds)
    pub lap_a: f64,

    /// Lap time of stream B (seconds)
    pub lap_b: f64,

    /// Display title of stream A
    #[serde(default = "default_title_a")]
    pub title_a: String,

    /// Display title of stream B
    #[serde(default = "default_title_b")]
    pub title_b: String,

    /// Track name
    #[serde(default)]
    pub track: Option<String>,
}

fn default_title_a() -> String {
    "Car A".to_string()
}

fn default_title_b() -> String {
    "Car B".to_string()
}
