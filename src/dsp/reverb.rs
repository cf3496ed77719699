//! SPU reverb engine — the PlayStation's hardware reverb delay network.
//!
//! One circular buffer and a write cursor stand in for the console's reverb
//! work RAM. Every output sample reads prior buffer contents at
//! preset-defined offsets and combines them through same-side and cross-side
//! wall reflections, four comb taps, and two cascaded Schroeder all-pass
//! stages, exactly as the SPU wires them. Preset offsets are authored for
//! the hardware's 22050 Hz reverb rate and stretched to the configured
//! sample rate at load time.

use std::f64::consts::PI;

use super::preset;

/// The hardware's native reverb sample rate in Hz.
pub const SPU_REV_RATE: f32 = 22050.0;

/// Largest SPU address any preset touches, in 16-bit words (Chaos Echo and
/// Delay span the full 0x18040 bytes of reverb work RAM). Sizing the buffer
/// from this worst case at init time keeps every preset's scaled offsets
/// strictly inside the buffer.
const PRESET_LONGEST_COUNT: usize = 0x18040 / 2;

/// Convert a Q15 register value to a float gain in [-1, 1].
#[inline]
fn q15_to_f32(v: i16) -> f32 {
    v as f32 / 32768.0
}

/// Convert a one-pole IIR coefficient to its center frequency.
fn alpha_to_fc(alpha: f32, sample_rate: f32) -> f32 {
    let dt = 1.0 / sample_rate as f64;
    let fc_inv = 2.0 * PI * (dt / alpha as f64 - dt);
    (1.0 / fc_inv) as f32
}

/// Convert a center frequency back to a one-pole IIR coefficient.
fn fc_to_alpha(fc: f32, sample_rate: f32) -> f32 {
    let dt = 1.0 / sample_rate as f64;
    let rc = 1.0 / (2.0 * PI * fc as f64);
    (dt / (rc + dt)) as f32
}

/// The SPU reverb processor.
///
/// Construct with [`SpuReverb::new`], reconfigure with [`SpuReverb::init`]
/// on sample-rate changes. Processing is in place, stereo, allocation-free.
#[derive(Debug, Clone)]
pub struct SpuReverb {
    rate: f32,
    buffer: Vec<f32>,
    mask: usize,
    cursor: usize,

    wet: f32,
    dry: f32,
    master: f32,
    preset_index: usize,

    // Active preset, converted to sample offsets and float gains.
    d_apf1: usize,
    d_apf2: usize,
    v_iir: f32,
    v_comb1: f32,
    v_comb2: f32,
    v_comb3: f32,
    v_comb4: f32,
    v_wall: f32,
    v_apf1: f32,
    v_apf2: f32,
    m_l_same: usize,
    m_r_same: usize,
    m_l_comb1: usize,
    m_r_comb1: usize,
    m_l_comb2: usize,
    m_r_comb2: usize,
    d_l_same: usize,
    d_r_same: usize,
    m_l_diff: usize,
    m_r_diff: usize,
    m_l_comb3: usize,
    m_r_comb3: usize,
    m_l_comb4: usize,
    m_r_comb4: usize,
    d_l_diff: usize,
    d_r_diff: usize,
    m_l_apf1: usize,
    m_r_apf1: usize,
    m_l_apf2: usize,
    m_r_apf2: usize,
    v_l_in: f32,
    v_r_in: f32,
}

impl SpuReverb {
    /// Create an engine configured for the given sample rate, with preset 0
    /// (Room) loaded and unity gains.
    pub fn new(sample_rate: f32) -> Self {
        let mut reverb = Self {
            rate: sample_rate,
            buffer: Vec::new(),
            mask: 0,
            cursor: 0,
            wet: 1.0,
            dry: 1.0,
            master: 1.0,
            preset_index: 0,
            d_apf1: 0,
            d_apf2: 0,
            v_iir: 0.0,
            v_comb1: 0.0,
            v_comb2: 0.0,
            v_comb3: 0.0,
            v_comb4: 0.0,
            v_wall: 0.0,
            v_apf1: 0.0,
            v_apf2: 0.0,
            m_l_same: 0,
            m_r_same: 0,
            m_l_comb1: 0,
            m_r_comb1: 0,
            m_l_comb2: 0,
            m_r_comb2: 0,
            d_l_same: 0,
            d_r_same: 0,
            m_l_diff: 0,
            m_r_diff: 0,
            m_l_comb3: 0,
            m_r_comb3: 0,
            m_l_comb4: 0,
            m_r_comb4: 0,
            d_l_diff: 0,
            d_r_diff: 0,
            m_l_apf1: 0,
            m_r_apf1: 0,
            m_l_apf2: 0,
            m_r_apf2: 0,
            v_l_in: 0.0,
            v_r_in: 0.0,
        };
        reverb.init(sample_rate);
        reverb
    }

    /// (Re)configure for a sample rate: size the circular buffer to the next
    /// power of two above the worst-case preset length, zero all history,
    /// and reload the active preset at the new rate. Safe to call repeatedly.
    pub fn init(&mut self, sample_rate: f32) {
        self.rate = sample_rate;
        let stretch = sample_rate / SPU_REV_RATE;
        let required = (PRESET_LONGEST_COUNT as f32 * stretch).ceil() as usize;
        let len = required.next_power_of_two();
        self.buffer.clear();
        self.buffer.resize(len, 0.0);
        self.mask = len - 1;
        self.cursor = 0;
        self.load_preset(self.preset_index);
    }

    /// Select a preset by ordinal. A no-op when the index is already active
    /// or out of range; otherwise the buffer is zeroed as part of the
    /// switch, so presets always start from silence.
    pub fn set_preset(&mut self, index: usize) {
        if index != self.preset_index {
            self.load_preset(index);
        }
    }

    pub fn set_wet_gain(&mut self, wet: f32) {
        self.wet = wet;
    }

    pub fn set_dry_gain(&mut self, dry: f32) {
        self.dry = dry;
    }

    pub fn set_master_gain(&mut self, master: f32) {
        self.master = master;
    }

    /// Ordinal of the active preset.
    pub fn preset_index(&self) -> usize {
        self.preset_index
    }

    /// Length of the circular buffer in samples. Always a power of two.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Zero all reverb history without touching the active preset.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }

    fn load_preset(&mut self, index: usize) {
        let Some(p) = preset::lookup(index) else {
            return;
        };

        let stretch = self.rate / SPU_REV_RATE;
        // Register offsets are in 8-byte hardware units; <<2 yields sample
        // counts at 22050 Hz, then stretch rescales to the configured rate.
        let off = |v: u16| (((v as u32) << 2) as f32 * stretch) as usize;

        self.d_apf1 = off(p.d_apf1);
        self.d_apf2 = off(p.d_apf2);
        // Re-derive the IIR coefficient through its center frequency so the
        // filter keeps the same cutoff at the configured rate.
        self.v_iir = fc_to_alpha(alpha_to_fc(q15_to_f32(p.v_iir), SPU_REV_RATE), self.rate);
        self.v_comb1 = q15_to_f32(p.v_comb1);
        self.v_comb2 = q15_to_f32(p.v_comb2);
        self.v_comb3 = q15_to_f32(p.v_comb3);
        self.v_comb4 = q15_to_f32(p.v_comb4);
        self.v_wall = q15_to_f32(p.v_wall);
        self.v_apf1 = q15_to_f32(p.v_apf1);
        self.v_apf2 = q15_to_f32(p.v_apf2);
        self.m_l_same = off(p.m_l_same);
        self.m_r_same = off(p.m_r_same);
        self.m_l_comb1 = off(p.m_l_comb1);
        self.m_r_comb1 = off(p.m_r_comb1);
        self.m_l_comb2 = off(p.m_l_comb2);
        self.m_r_comb2 = off(p.m_r_comb2);
        self.d_l_same = off(p.d_l_same);
        self.d_r_same = off(p.d_r_same);
        self.m_l_diff = off(p.m_l_diff);
        self.m_r_diff = off(p.m_r_diff);
        self.m_l_comb3 = off(p.m_l_comb3);
        self.m_r_comb3 = off(p.m_r_comb3);
        self.m_l_comb4 = off(p.m_l_comb4);
        self.m_r_comb4 = off(p.m_r_comb4);
        self.d_l_diff = off(p.d_l_diff);
        self.d_r_diff = off(p.d_r_diff);
        self.m_l_apf1 = off(p.m_l_apf1);
        self.m_r_apf1 = off(p.m_r_apf1);
        self.m_l_apf2 = off(p.m_l_apf2);
        self.m_r_apf2 = off(p.m_r_apf2);
        self.v_l_in = q15_to_f32(p.v_l_in);
        self.v_r_in = q15_to_f32(p.v_r_in);

        self.buffer.fill(0.0);
        self.preset_index = index;
    }

    /// Process a stereo block in place over `min(left.len(), right.len())`
    /// samples. No allocation, no bounds checks beyond the circular mask.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let mask = self.mask;
        let n = left.len().min(right.len());

        for i in 0..n {
            let cursor = self.cursor;
            let l_in = self.v_l_in * left[i];
            let r_in = self.v_r_in * right[i];

            // Same-side wall reflections through the one-pole IIR, reading
            // one sample behind the write position for the filter history.
            let l_same_prev = self.buffer[(self.m_l_same + cursor).wrapping_sub(1) & mask];
            let l_same = (l_in + self.buffer[(self.d_l_same + cursor) & mask] * self.v_wall
                - l_same_prev)
                * self.v_iir
                + l_same_prev;
            self.buffer[(self.m_l_same + cursor) & mask] = l_same;

            let r_same_prev = self.buffer[(self.m_r_same + cursor).wrapping_sub(1) & mask];
            let r_same = (r_in + self.buffer[(self.d_r_same + cursor) & mask] * self.v_wall
                - r_same_prev)
                * self.v_iir
                + r_same_prev;
            self.buffer[(self.m_r_same + cursor) & mask] = r_same;

            // Cross-side reflections: each channel fed from the opposite
            // side's wall tap.
            let l_diff_prev = self.buffer[(self.m_l_diff + cursor).wrapping_sub(1) & mask];
            let l_diff = (l_in + self.buffer[(self.d_r_diff + cursor) & mask] * self.v_wall
                - l_diff_prev)
                * self.v_iir
                + l_diff_prev;
            self.buffer[(self.m_l_diff + cursor) & mask] = l_diff;

            let r_diff_prev = self.buffer[(self.m_r_diff + cursor).wrapping_sub(1) & mask];
            let r_diff = (r_in + self.buffer[(self.d_l_diff + cursor) & mask] * self.v_wall
                - r_diff_prev)
                * self.v_iir
                + r_diff_prev;
            self.buffer[(self.m_r_diff + cursor) & mask] = r_diff;

            // Early echo: four comb taps per channel.
            let mut l_out = self.v_comb1 * self.buffer[(self.m_l_comb1 + cursor) & mask]
                + self.v_comb2 * self.buffer[(self.m_l_comb2 + cursor) & mask]
                + self.v_comb3 * self.buffer[(self.m_l_comb3 + cursor) & mask]
                + self.v_comb4 * self.buffer[(self.m_l_comb4 + cursor) & mask];

            let mut r_out = self.v_comb1 * self.buffer[(self.m_r_comb1 + cursor) & mask]
                + self.v_comb2 * self.buffer[(self.m_r_comb2 + cursor) & mask]
                + self.v_comb3 * self.buffer[(self.m_r_comb3 + cursor) & mask]
                + self.v_comb4 * self.buffer[(self.m_r_comb4 + cursor) & mask];

            // Late diffusion, all-pass stage 1.
            let l_apf1_delayed =
                self.buffer[(self.m_l_apf1 + cursor).wrapping_sub(self.d_apf1) & mask];
            l_out -= self.v_apf1 * l_apf1_delayed;
            self.buffer[(self.m_l_apf1 + cursor) & mask] = l_out;
            l_out = l_out * self.v_apf1 + l_apf1_delayed;

            let r_apf1_delayed =
                self.buffer[(self.m_r_apf1 + cursor).wrapping_sub(self.d_apf1) & mask];
            r_out -= self.v_apf1 * r_apf1_delayed;
            self.buffer[(self.m_r_apf1 + cursor) & mask] = r_out;
            r_out = r_out * self.v_apf1 + r_apf1_delayed;

            // All-pass stage 2, fed by stage 1's output.
            let l_apf2_delayed =
                self.buffer[(self.m_l_apf2 + cursor).wrapping_sub(self.d_apf2) & mask];
            l_out -= self.v_apf2 * l_apf2_delayed;
            self.buffer[(self.m_l_apf2 + cursor) & mask] = l_out;
            l_out = l_out * self.v_apf2 + l_apf2_delayed;

            let r_apf2_delayed =
                self.buffer[(self.m_r_apf2 + cursor).wrapping_sub(self.d_apf2) & mask];
            r_out -= self.v_apf2 * r_apf2_delayed;
            self.buffer[(self.m_r_apf2 + cursor) & mask] = r_out;
            r_out = r_out * self.v_apf2 + r_apf2_delayed;

            self.cursor = (cursor + 1) & mask;

            left[i] = (l_out * self.wet + l_in * self.dry) * self.master;
            right[i] = (r_out * self.wet + r_in * self.dry) * self.master;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::preset::{NUM_PRESETS, ReverbType};

    const TEST_RATES: [f32; 4] = [22050.0, 44100.0, 48000.0, 96000.0];

    #[test]
    fn buffer_len_is_power_of_two_and_covers_presets() {
        for rate in TEST_RATES {
            let reverb = SpuReverb::new(rate);
            let len = reverb.buffer_len();
            assert!(len.is_power_of_two(), "len {len} at {rate} Hz");

            let stretch = rate / SPU_REV_RATE;
            for ty in ReverbType::ALL {
                for offset in ty.preset().offsets() {
                    let scaled = (((offset as u32) << 2) as f32 * stretch) as usize;
                    assert!(
                        scaled < len,
                        "{} offset {scaled} >= buffer {len} at {rate} Hz",
                        ty.name()
                    );
                }
            }
        }
    }

    #[test]
    fn off_preset_outputs_silence() {
        let mut reverb = SpuReverb::new(44100.0);
        reverb.set_preset(ReverbType::Off.index());
        reverb.set_wet_gain(1.0);
        reverb.set_dry_gain(1.0);

        let mut left: Vec<f32> = (0..512).map(|i| ((i * 37) % 100) as f32 / 100.0 - 0.5).collect();
        let mut right: Vec<f32> = left.iter().map(|s| -s).collect();
        reverb.process(&mut left, &mut right);

        assert!(left.iter().all(|&s| s == 0.0), "Off preset left not silent");
        assert!(right.iter().all(|&s| s == 0.0), "Off preset right not silent");
    }

    #[test]
    fn dry_path_applies_input_gain() {
        // With wet 0 / dry 1 / master 1, output is the input scaled by the
        // preset's input gain, which is Q15 0x8000 = -1.0 for Room.
        let mut reverb = SpuReverb::new(48000.0);
        reverb.set_wet_gain(0.0);
        reverb.set_dry_gain(1.0);
        reverb.set_master_gain(1.0);

        let input: Vec<f32> = (0..256).map(|i| (i as f32 / 256.0) - 0.5).collect();
        let mut left = input.clone();
        let mut right = input.clone();
        reverb.process(&mut left, &mut right);

        for i in 0..input.len() {
            assert_eq!(left[i], -input[i], "left sample {i}");
            assert_eq!(right[i], -input[i], "right sample {i}");
        }
    }

    #[test]
    fn preset_switch_clears_history() {
        let mut reverb = SpuReverb::new(44100.0);
        reverb.set_preset(ReverbType::Hall.index());
        reverb.set_wet_gain(1.0);
        reverb.set_dry_gain(1.0);

        let mut left = vec![0.8_f32; 2048];
        let mut right = vec![-0.8_f32; 2048];
        reverb.process(&mut left, &mut right);

        reverb.set_preset(ReverbType::Room.index());

        let mut left = vec![0.0_f32; 2048];
        let mut right = vec![0.0_f32; 2048];
        reverb.process(&mut left, &mut right);

        assert!(
            left.iter().chain(right.iter()).all(|&s| s == 0.0),
            "residual tail survived the preset switch"
        );
    }

    #[test]
    fn set_preset_same_index_keeps_history() {
        let mut reverb = SpuReverb::new(44100.0);
        reverb.set_preset(ReverbType::Hall.index());
        reverb.set_dry_gain(0.0);

        let mut left = vec![1.0_f32; 4096];
        let mut right = vec![1.0_f32; 4096];
        reverb.process(&mut left, &mut right);

        // Re-selecting the active preset must not zero the tail.
        reverb.set_preset(ReverbType::Hall.index());

        let mut left = vec![0.0_f32; 4096];
        let mut right = vec![0.0_f32; 4096];
        reverb.process(&mut left, &mut right);
        let peak = left.iter().fold(0.0_f32, |m, &s| m.max(s.abs()));
        assert!(peak > 0.0, "tail should survive a same-index set_preset");
    }

    #[test]
    fn invalid_preset_index_is_ignored() {
        let mut reverb = SpuReverb::new(44100.0);
        reverb.set_preset(ReverbType::Hall.index());
        reverb.set_preset(99);
        assert_eq!(reverb.preset_index(), ReverbType::Hall.index());
    }

    #[test]
    fn init_is_idempotent() {
        let mut reverb = SpuReverb::new(44100.0);
        reverb.set_preset(ReverbType::SpaceEcho.index());
        let mut left = vec![0.5_f32; 1024];
        let mut right = vec![0.5_f32; 1024];
        reverb.process(&mut left, &mut right);

        reverb.init(48000.0);
        assert_eq!(reverb.preset_index(), ReverbType::SpaceEcho.index());

        // History must be gone after a re-init.
        let mut left = vec![0.0_f32; 1024];
        let mut right = vec![0.0_f32; 1024];
        reverb.process(&mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn processing_is_deterministic() {
        let input: Vec<f32> = (0..1024).map(|i| ((i * 13) % 64) as f32 / 64.0 - 0.5).collect();

        let render = || {
            let mut reverb = SpuReverb::new(48000.0);
            reverb.set_preset(ReverbType::Hall.index());
            reverb.set_wet_gain(0.7);
            reverb.set_dry_gain(0.4);
            let mut left = input.clone();
            let mut right = input.clone();
            reverb.process(&mut left, &mut right);
            (left, right)
        };

        let (l1, r1) = render();
        let (l2, r2) = render();
        assert_eq!(l1, l2, "left output differs between identical runs");
        assert_eq!(r1, r2, "right output differs between identical runs");
    }

    #[test]
    fn hall_impulse_is_dense_bounded_and_decays() {
        let mut reverb = SpuReverb::new(48000.0);
        reverb.set_preset(ReverbType::Hall.index());
        reverb.set_wet_gain(1.0);
        reverb.set_dry_gain(0.0);
        reverb.set_master_gain(1.0);

        let mut left = vec![0.0_f32; 4096];
        let mut right = vec![0.0_f32; 4096];
        left[0] = 1.0;
        right[0] = 1.0;
        reverb.process(&mut left, &mut right);

        let block_peak = |l: &[f32], r: &[f32]| {
            l.iter().chain(r.iter()).fold(0.0_f32, |m, &s| m.max(s.abs()))
        };

        let mut global_peak = block_peak(&left, &right);
        let mut last_peak = global_peak;
        for _ in 0..30 {
            let mut l = vec![0.0_f32; 4096];
            let mut r = vec![0.0_f32; 4096];
            reverb.process(&mut l, &mut r);
            assert!(l.iter().chain(r.iter()).all(|s| s.is_finite()));
            last_peak = block_peak(&l, &r);
            global_peak = global_peak.max(last_peak);
        }

        assert!(global_peak > 0.0, "impulse produced no reverb energy");
        assert!(global_peak < 16.0, "reverb blew up: peak {global_peak}");
        assert!(
            last_peak < global_peak,
            "tail is not decaying: last {last_peak}, peak {global_peak}"
        );
    }

    #[test]
    fn unequal_slice_lengths_process_shorter() {
        let mut reverb = SpuReverb::new(44100.0);
        let mut left = vec![0.5_f32; 64];
        let mut right = vec![0.5_f32; 32];
        reverb.process(&mut left, &mut right);
        // Samples past the shorter length are untouched.
        assert!(left[32..].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn all_presets_load_at_all_rates() {
        for rate in TEST_RATES {
            let mut reverb = SpuReverb::new(rate);
            for index in 0..NUM_PRESETS {
                reverb.set_preset(index);
                assert_eq!(reverb.preset_index(), index);
                let mut left = vec![0.25_f32; 256];
                let mut right = vec![0.25_f32; 256];
                reverb.process(&mut left, &mut right);
                assert!(
                    left.iter().chain(right.iter()).all(|s| s.is_finite()),
                    "preset {index} at {rate} Hz produced non-finite output"
                );
            }
        }
    }
}
