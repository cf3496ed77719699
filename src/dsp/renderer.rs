//! Offline renderer — bounces audio through the chain to a WAV byte buffer.
//!
//! Non-real-time conveniences for hosts and tooling: process a captured
//! block through a freshly built chain and get 16-bit stereo PCM WAV bytes
//! back, or capture the chain's impulse response for decay inspection. The
//! WAV container is written by hand so the WASM build needs no audio-file
//! crate.

use crate::config::ChainConfig;

use super::chain::EffectsChain;

/// Process a stereo buffer through a fresh chain and encode the result as
/// a WAV file (16-bit stereo PCM) in memory.
pub fn render_wav(config: &ChainConfig, left: &[f32], right: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    let mut chain = EffectsChain::new(sample_rate as f32);
    chain.process_block(config, &mut left, &mut right);

    let pcm = interleave_pcm_i16(&left, &right);
    encode_wav(&pcm, sample_rate, 2)
}

/// Run a unit impulse through a fresh chain and return `len` samples of
/// the response per channel.
pub fn render_impulse_response(
    config: &ChainConfig,
    sample_rate: u32,
    len: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0_f32; len];
    let mut right = vec![0.0_f32; len];
    if len > 0 {
        left[0] = 1.0;
        right[0] = 1.0;
    }

    let mut chain = EffectsChain::new(sample_rate as f32);
    chain.process_block(config, &mut left, &mut right);
    (left, right)
}

/// Interleave stereo f32 to i16 PCM with rounding and clamping.
fn interleave_pcm_i16(left: &[f32], right: &[f32]) -> Vec<i16> {
    let n = left.len().min(right.len());
    let mut pcm = Vec::with_capacity(n * 2);
    for i in 0..n {
        pcm.push(f32_to_i16(left[i]));
        pcm.push(f32_to_i16(right[i]));
    }
    pcm
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
