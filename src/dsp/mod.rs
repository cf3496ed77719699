//! DSP engine — Pure Rust emulation of the PsxVerb signal chain.
//!
//! All DSP runs in Rust for deterministic, cross-platform audio output.
//! The same code powers both native hosts and the WebAudio path
//! (AudioWorklet + WASM).

pub mod chain;
pub mod crush;
pub mod preset;
pub mod renderer;
pub mod reverb;
