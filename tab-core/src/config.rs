//! Configuration parameters for transcription

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{TabError, TabResult};
use crate::pitch::{DEFAULT_FRAME_SIZE, DEFAULT_HOP_LENGTH, DEFAULT_SILENCE_THRESHOLD};
use crate::smoothing::DEFAULT_WINDOW_SIZE;
use crate::tab::{DEFAULT_SLOT_SECONDS, MAX_FRET, STANDARD_TUNING};

/// Transcription configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Analysis window length in samples (default: 2048)
    pub frame_size: usize,

    /// Distance between consecutive window starts in samples (default: 512)
    pub hop_length: usize,

    /// Windowed-frame peak below which a frame counts as silence (default: 0.1)
    pub silence_threshold: f32,

    /// Centered majority-vote window for note smoothing, odd (default: 5)
    pub smoothing_window: usize,

    /// Seconds represented by one tablature slot (default: 0.1)
    pub slot_seconds: f64,

    /// Highest fret the mapper will use (default: 20)
    pub max_fret: u8,

    /// Open-string MIDI numbers, low to high (default: standard E tuning)
    pub tuning: [u8; 6],
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_length: DEFAULT_HOP_LENGTH,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            smoothing_window: DEFAULT_WINDOW_SIZE,
            slot_seconds: DEFAULT_SLOT_SECONDS,
            max_fret: MAX_FRET,
            tuning: STANDARD_TUNING,
        }
    }
}

impl TranscriptionConfig {
    /// Checks every parameter against the range the pipeline can work with.
    pub fn validate(&self) -> TabResult<()> {
        if self.frame_size == 0 {
            return Err(TabError::InvalidConfig("frame_size must be positive".into()));
        }
        if self.hop_length == 0 {
            return Err(TabError::InvalidConfig("hop_length must be positive".into()));
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(TabError::InvalidConfig(format!(
                "smoothing_window must be odd, got {}",
                self.smoothing_window
            )));
        }
        if !self.slot_seconds.is_finite() || self.slot_seconds <= 0.0 {
            return Err(TabError::InvalidConfig(format!(
                "slot_seconds must be positive, got {}",
                self.slot_seconds
            )));
        }
        if !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            return Err(TabError::InvalidConfig(format!(
                "silence_threshold must be non-negative, got {}",
                self.silence_threshold
            )));
        }
        Ok(())
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: TranscriptionConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TranscriptionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.hop_length, 512);
        assert_eq!(config.tuning, [40, 45, 50, 55, 59, 64]);
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.slot_seconds, 0.1);
        assert_eq!(config.silence_threshold, 0.1);
    }

    #[test]
    fn test_rejects_even_smoothing_window() {
        let config = TranscriptionConfig {
            smoothing_window: 4,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TabError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_hop() {
        let config = TranscriptionConfig {
            hop_length: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TabError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TranscriptionConfig =
            serde_json::from_str(r#"{ "hop_length": 256, "tuning": [38, 45, 50, 55, 59, 64] }"#)
                .unwrap();
        assert_eq!(config.hop_length, 256);
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.tuning[0], 38);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = TranscriptionConfig {
            max_fret: 12,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(TranscriptionConfig::load(&path).unwrap(), config);
    }
}
