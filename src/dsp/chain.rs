//! Effects chain — per-block orchestration of the crush and reverb stages.
//!
//! The host hands the chain one [`ChainConfig`] snapshot and a block of
//! audio; the chain applies the snapshot (gains, preset selection, crush
//! level) once, then runs crush and reverb in place. Control values are
//! read only here, once per block: hosts that mutate the config from a
//! control thread are responsible for race-safe storage. Tearing on gain
//! scalars is tolerable; a preset change must arrive as a single index
//! change.

use crate::config::ChainConfig;

use super::crush::Crush;
use super::reverb::SpuReverb;

/// The full PsxVerb signal chain: crush/downsample into SPU reverb.
#[derive(Debug, Clone)]
pub struct EffectsChain {
    crush: Crush,
    reverb: SpuReverb,
}

impl EffectsChain {
    /// Build a chain configured for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            crush: Crush::new(),
            reverb: SpuReverb::new(sample_rate),
        }
    }

    /// Reconfigure for a new sample rate, clearing all reverb history.
    /// Safe to call repeatedly; hosts call this outside the audio callback.
    pub fn init(&mut self, sample_rate: f32) {
        self.reverb.init(sample_rate);
    }

    /// Process a stereo block in place. The config snapshot is sampled once
    /// at the head of the block; gains take effect from the first sample.
    pub fn process_block(&mut self, config: &ChainConfig, left: &mut [f32], right: &mut [f32]) {
        self.apply_config(config);

        let n = left.len().min(right.len());
        let (left, right) = (&mut left[..n], &mut right[..n]);
        self.crush.process_channel(left);
        self.crush.process_channel(right);
        self.reverb.process(left, right);
    }

    /// Process a mono block: the single channel is crushed once and
    /// duplicated into `right` before the stereo reverb runs. The reverb's
    /// left and right delay networks use different offsets, so after
    /// processing the right-side result is copied back over `mono` — both
    /// outputs are identical sample for sample.
    pub fn process_mono_block(&mut self, config: &ChainConfig, mono: &mut [f32], right: &mut [f32]) {
        self.apply_config(config);

        let n = mono.len().min(right.len());
        let (mono, right) = (&mut mono[..n], &mut right[..n]);
        self.crush.process_channel(mono);
        right.copy_from_slice(mono);
        self.reverb.process(mono, right);
        mono.copy_from_slice(right);
    }

    /// Zero all reverb history (e.g. on transport stop).
    pub fn clear(&mut self) {
        self.reverb.clear();
    }

    fn apply_config(&mut self, config: &ChainConfig) {
        self.reverb.set_wet_gain(config.wet_gain);
        self.reverb.set_dry_gain(config.dry_gain);
        self.reverb.set_master_gain(config.master_gain);
        // The engine dedups same-index selections, so an unchanged snapshot
        // never disturbs the running tail.
        self.reverb.set_preset(config.preset.index());
        self.crush.set_level(config.crush);
    }
}
