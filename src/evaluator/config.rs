//! Evaluator configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::score::Track;
use crate::{Error, Result};

/// Evaluator settings.
///
/// ```json
/// { "tracks": ["sat", "agl"], "parallel": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Tracks to score every run on. Empty means each run is scored on the
    /// track named by its own `track` property.
    pub tracks: Vec<Track>,
    /// Evaluate batches on the rayon pool (needs the `rayon` feature)
    pub parallel: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            parallel: true,
        }
    }
}

impl EvaluatorConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> EvaluatorConfigBuilder {
        EvaluatorConfigBuilder::default()
    }

    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the configuration invalid
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check the configuration for contradictions.
    ///
    /// # Errors
    /// Returns error if a track is listed twice
    pub fn validate(&self) -> Result<()> {
        for (i, track) in self.tracks.iter().enumerate() {
            if self.tracks[..i].contains(track) {
                return Err(Error::Config(format!("track {track} listed twice")));
            }
        }
        Ok(())
    }
}

/// Builder for `EvaluatorConfig`.
#[derive(Debug, Default)]
pub struct EvaluatorConfigBuilder {
    config: EvaluatorConfig,
}

impl EvaluatorConfigBuilder {
    /// Score every run on this track as well.
    #[must_use]
    pub fn track(mut self, track: Track) -> Self {
        if !self.config.tracks.contains(&track) {
            self.config.tracks.push(track);
        }
        self
    }

    /// Enable or disable parallel batch evaluation.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EvaluatorConfig {
        self.config
    }
}
