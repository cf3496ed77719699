//! Chain configuration — the host-facing parameter snapshot.
//!
//! A [`ChainConfig`] carries the four control values the host reads from
//! its parameter store once per audio block, plus master gain. The struct
//! is plain data: hosts persist it (serde), hand it to
//! [`EffectsChain::process_block`](crate::dsp::chain::EffectsChain::process_block)
//! per block, and own whatever synchronization its storage needs.

use serde::{Deserialize, Serialize};

use crate::dsp::crush::CrushLevel;
use crate::dsp::preset::ReverbType;
use crate::error::{ConfigError, PsxVerbError};

/// Parameter snapshot for one audio block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Wet (reverb) gain, 0.0 to 1.0.
    pub wet_gain: f32,
    /// Dry (input) gain, 0.0 to 1.0.
    pub dry_gain: f32,
    /// Master output gain.
    pub master_gain: f32,
    /// Active reverb preset.
    pub preset: ReverbType,
    /// Crush/downsample level.
    pub crush: CrushLevel,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            wet_gain: 0.5,
            dry_gain: 0.5,
            master_gain: 1.0,
            preset: ReverbType::Room,
            crush: CrushLevel::HiDef,
        }
    }
}

impl ChainConfig {
    /// Check the advertised parameter ranges. Out-of-range snapshots are
    /// rejected here, before they ever reach the audio thread; the engine
    /// itself does not clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("wet_gain", self.wet_gain), ("dry_gain", self.dry_gain)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::GainOutOfRange { field, value });
            }
        }
        if !self.master_gain.is_finite() {
            return Err(ConfigError::GainOutOfRange {
                field: "master_gain",
                value: self.master_gain,
            });
        }
        Ok(())
    }

    /// Parse and validate a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, PsxVerbError> {
        let config: ChainConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Render the snapshot as JSON for host persistence.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ChainConfig serialization cannot fail")
    }
}
