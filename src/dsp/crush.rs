//! Crush stage — stepped sample-rate and bit-depth reduction.
//!
//! Runs ahead of the reverb in the signal chain. The steps mirror the
//! host's "Crush" parameter choices: full fidelity, half sample rate, and
//! half rate with 12- or 10-bit amplitude quantization.

use serde::{Deserialize, Serialize};

/// Degradation step, from clean to most crushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrushLevel {
    /// Pass-through, no modification.
    #[default]
    HiDef,
    /// Half the effective sample rate.
    Og,
    /// Half rate plus 12-bit quantization.
    Crushed,
    /// Half rate plus 10-bit quantization.
    Scrunted,
}

impl CrushLevel {
    pub const ALL: [CrushLevel; 4] = [
        CrushLevel::HiDef,
        CrushLevel::Og,
        CrushLevel::Crushed,
        CrushLevel::Scrunted,
    ];

    /// Ordinal matching the host's parameter index.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<CrushLevel> {
        Self::ALL.get(index).copied()
    }

    /// Display name, matching the host's parameter choices.
    pub fn name(&self) -> &'static str {
        match self {
            CrushLevel::HiDef => "Hi Def",
            CrushLevel::Og => "OG",
            CrushLevel::Crushed => "Crushed",
            CrushLevel::Scrunted => "Scrunted",
        }
    }

    /// Whether this level halves the effective sample rate.
    pub fn downsamples(&self) -> bool {
        *self != CrushLevel::HiDef
    }

    /// Quantization depth in bits, if this level quantizes.
    pub fn bit_depth(&self) -> Option<u32> {
        match self {
            CrushLevel::HiDef | CrushLevel::Og => None,
            CrushLevel::Crushed => Some(12),
            CrushLevel::Scrunted => Some(10),
        }
    }
}

/// The crush processor. Owns a reusable scratch buffer for the decimation
/// pass so per-block processing does not allocate after warm-up.
#[derive(Debug, Clone, Default)]
pub struct Crush {
    level: CrushLevel,
    scratch: Vec<f32>,
}

impl Crush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&mut self, level: CrushLevel) {
        self.level = level;
    }

    pub fn level(&self) -> CrushLevel {
        self.level
    }

    /// Degrade one channel in place according to the current level.
    pub fn process_channel(&mut self, samples: &mut [f32]) {
        if self.level.downsamples() {
            self.downsample(samples);
        }
        if let Some(bits) = self.level.bit_depth() {
            quantize(samples, bits);
        }
    }

    /// Halve the effective sample rate: decimate every second sample, then
    /// rebuild the full-length block by linear interpolation between
    /// decimated neighbors. The neighbor index wraps modulo the decimated
    /// length, so the last output samples interpolate toward the block's
    /// first decimated sample rather than carrying phase into the next
    /// block.
    fn downsample(&mut self, samples: &mut [f32]) {
        let half = samples.len() / 2;
        if half == 0 {
            return;
        }

        self.scratch.clear();
        self.scratch.extend(samples.iter().step_by(2).take(half));

        for i in 0..samples.len() {
            let fraction = (i % 2) as f32 / 2.0;
            let index = (i / 2) % half;
            let next = (index + 1) % half;
            samples[i] =
                self.scratch[index] * (1.0 - fraction) + self.scratch[next] * fraction;
        }
    }
}

/// Quantize amplitudes to `round(x * 2^(bits-1)) / 2^(bits-1)`.
fn quantize(samples: &mut [f32], bits: u32) {
    let factor = (1_u32 << (bits - 1)) as f32;
    for sample in samples.iter_mut() {
        *sample = (*sample * factor).round() / factor;
    }
}
