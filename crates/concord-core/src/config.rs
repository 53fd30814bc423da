//! Engine configuration shared by the matcher, the resolver, and the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// Tunable thresholds for automated coding.
///
/// Every field has a default, so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum similarity for the top candidate to become an annotation. Default: 0.3.
    pub min_confidence: f64,
    /// Candidates below this cosine similarity are discarded. Default: 0.1.
    pub similarity_floor: f64,
    /// Ranked candidates kept per segment. Default: 3.
    pub max_candidates: usize,
    /// Segments shorter than this (in characters) are not coding units. Default: 10.
    pub min_segment_chars: usize,
    /// Fraction of passes that must agree before a claim is accepted. Default: 2/3.
    pub min_agreement_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            similarity_floor: 0.1,
            max_candidates: 3,
            min_segment_chars: 10,
            min_agreement_fraction: 2.0 / 3.0,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(CoreError::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_floor) {
            return Err(CoreError::Config(format!(
                "similarity_floor must be within [0, 1], got {}",
                self.similarity_floor
            )));
        }
        if self.max_candidates == 0 {
            return Err(CoreError::Config("max_candidates must be at least 1".into()));
        }
        if !(self.min_agreement_fraction > 0.0 && self.min_agreement_fraction <= 1.0) {
            return Err(CoreError::Config(format!(
                "min_agreement_fraction must be within (0, 1], got {}",
                self.min_agreement_fraction
            )));
        }
        Ok(())
    }
}
