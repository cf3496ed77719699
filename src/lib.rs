pub mod config;
pub mod dsp;
pub mod error;

use crate::config::ChainConfig;
use crate::dsp::chain::EffectsChain;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the psxverb-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the full PsxVerb chain behind a block-processing handle.
///
/// An AudioWorklet constructs one `Processor` per node, pushes config
/// snapshots from the control thread's parameter messages, and calls
/// `process` once per render quantum with the block buffers in place.
#[wasm_bindgen]
pub struct Processor {
    chain: EffectsChain,
    config: ChainConfig,
}

#[wasm_bindgen]
impl Processor {
    /// Build a processor for the given sample rate with default parameters.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f32) -> Processor {
        Processor {
            chain: EffectsChain::new(sample_rate),
            config: ChainConfig::default(),
        }
    }

    /// Replace the parameter snapshot from a JS config object.
    /// Errors if the object fails to deserialize or validate.
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: ChainConfig =
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.config = config;
        Ok(())
    }

    /// Replace the parameter snapshot from a JSON string.
    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.config =
            ChainConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(())
    }

    /// Current parameter snapshot as JSON, for host persistence.
    pub fn config_json(&self) -> String {
        self.config.to_json()
    }

    /// Process a stereo block in place.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.chain.process_block(&self.config, left, right);
    }

    /// Process a mono block: `mono` is crushed and reverbed, `right`
    /// receives the duplicated channel. Outputs are identical.
    pub fn process_mono(&mut self, mono: &mut [f32], right: &mut [f32]) {
        self.chain.process_mono_block(&self.config, mono, right);
    }

    /// Reconfigure for a new sample rate, clearing all reverb history.
    pub fn reset(&mut self, sample_rate: f32) {
        self.chain.init(sample_rate);
    }
}
