//! Generation engine wrapping a Candle-loaded causal LM
//!
//! Owns the tokenizer and model weights for the process lifetime and
//! performs bounded autoregressive sampling. Sampling is stochastic: two
//! calls with the same prompt produce different text unless a seed is
//! pinned, which is expected behavior - tests pin a seed or assert
//! structural properties, never exact text.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::qwen2::{Config as Qwen2Config, ModelForCausalLM};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::model::{select_device, DevicePreference, ModelAssets, TokenizerWrapper};

/// Prompts longer than this many tokens keep only the trailing window;
/// oldest context is dropped first.
const PROMPT_WINDOW: usize = 400;

/// Conversational template marker separating prompt echo from the reply.
const REPLY_MARKER: &str = "Assistant:";

/// Trait for text generation models.
///
/// The pipeline depends on this seam so tests can substitute a canned
/// generator for the real model.
pub trait Generator: Send + Sync {
    /// Generate a response for a prompt, bounded by the configured token cap.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Configuration for initializing the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HuggingFace model ID or local path of the base model
    pub model_id: String,

    /// Optional fine-tuned safetensors file; a missing file falls back to
    /// the base weights with a warning rather than failing startup
    pub finetuned_weights: Option<PathBuf>,

    /// Device preference (auto, cuda, metal, cpu)
    pub device: DevicePreference,

    /// Maximum new tokens per generation
    pub max_tokens: usize,

    /// Sampling temperature; values near zero sharpen the distribution
    pub temperature: f64,

    /// Random seed; None samples a fresh seed per call
    pub seed: Option<u64>,

    /// Model data type ("f32", "f16", "bf16")
    pub dtype: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_id: "Qwen/Qwen2.5-0.5B".to_string(),
            finetuned_weights: None,
            device: DevicePreference::Auto,
            max_tokens: 150,
            temperature: 0.8,
            seed: None,
            dtype: "f32".to_string(),
        }
    }
}

/// Candle-backed text generator.
///
/// The model sits behind a `Mutex` held for the whole decode loop: the KV
/// cache mutates during a forward pass, so concurrent requests must not
/// interleave sampling steps.
pub struct GenerationEngine {
    model: Mutex<ModelForCausalLM>,
    tokenizer: TokenizerWrapper,
    device: Device,
    eos_token_id: u32,
    max_tokens: usize,
    temperature: f64,
    seed: Option<u64>,
}

impl GenerationEngine {
    /// Load the tokenizer and weights and build the engine.
    ///
    /// Fatal on a missing base model or tokenizer; a missing fine-tuned
    /// weights file only logs a warning and uses the base model.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let device = select_device(config.device)?;

        tracing::info!("Loading generator model: {}", config.model_id);
        tracing::info!("  Device: {:?}", device);
        tracing::info!("  Max new tokens: {}", config.max_tokens);

        let assets = ModelAssets::resolve(&config.model_id)?;

        let tokenizer =
            TokenizerWrapper::from_file(&assets.tokenizer_file).context("Failed to load tokenizer")?;
        let eos_token_id = tokenizer.eos_token_id().unwrap_or(151643); // Qwen2 default

        let weights_file = match &config.finetuned_weights {
            Some(path) if path.exists() => {
                tracing::info!("Loading fine-tuned weights from {:?}", path);
                path.clone()
            }
            Some(path) => {
                tracing::warn!(
                    "Fine-tuned weights {:?} not found, using base model",
                    path
                );
                assets.weights_file.clone()
            }
            None => assets.weights_file.clone(),
        };

        let dtype = match config.dtype.as_str() {
            "f16" => DType::F16,
            "bf16" => DType::BF16,
            _ => DType::F32,
        };

        let model_config: Qwen2Config =
            serde_json::from_str(&std::fs::read_to_string(&assets.config_file)?)
                .context("Failed to parse model config")?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_file], dtype, &device)
                .context("Failed to load model weights")?
        };
        let model = ModelForCausalLM::new(&model_config, vb).context("Failed to create model")?;

        tracing::info!("Generator loaded successfully");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            eos_token_id,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            seed: config.seed,
        })
    }

    fn generate_internal(&self, prompt: &str) -> Result<String> {
        let encoded = self.tokenizer.encode(prompt, true)?;
        if encoded.is_empty() {
            // Empty or unencodable prompt yields an empty response, not an error
            return Ok(String::new());
        }
        let mut all_tokens = tail_window(encoded, PROMPT_WINDOW);

        let seed = self.seed.unwrap_or_else(rand::random);
        let temperature = if self.temperature > 0.0 {
            Some(self.temperature)
        } else {
            None
        };
        let mut logits_processor = LogitsProcessor::new(seed, temperature, None);

        // Hold the lock for the full decode loop: the KV cache is per-request
        // state and must not interleave with another request.
        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Model lock poisoned: {}", e))?;
        model.clear_kv_cache();

        let mut pos = 0;
        for _ in 0..self.max_tokens {
            let context_size = if pos == 0 { all_tokens.len() } else { 1 };
            let start = all_tokens.len() - context_size;
            let input = Tensor::new(&all_tokens[start..], &self.device)?.unsqueeze(0)?;

            let logits = model.forward(&input, pos)?;
            let logits = logits.squeeze(0)?;
            let logits = if logits.dims().len() > 1 {
                logits.get(logits.dim(0)? - 1)?
            } else {
                logits
            };

            let next_token = logits_processor.sample(&logits)?;
            all_tokens.push(next_token);
            pos += context_size;

            if next_token == self.eos_token_id {
                tracing::debug!("Generation stopped: EOS token");
                break;
            }
        }
        drop(model);

        // Decode the whole sequence and discard the prompt echo up to the
        // last template marker.
        let decoded = self.tokenizer.decode(&all_tokens, true)?;
        Ok(extract_reply(&decoded))
    }
}

impl Generator for GenerationEngine {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_internal(prompt)
    }
}

/// Keep only the trailing `window` tokens of an over-long prompt.
fn tail_window(mut tokens: Vec<u32>, window: usize) -> Vec<u32> {
    let len = tokens.len();
    if len > window {
        tokens.split_off(len - window)
    } else {
        tokens
    }
}

/// Return the substring after the last `Assistant:` marker, trimmed.
///
/// Everything before the marker is prompt echo. Idempotent: re-applying to
/// already-extracted text is a no-op.
pub fn extract_reply(decoded: &str) -> String {
    match decoded.rsplit_once(REPLY_MARKER) {
        Some((_, reply)) => reply.trim().to_string(),
        None => decoded.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model_id, "Qwen/Qwen2.5-0.5B");
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.temperature, 0.8);
        assert!(config.finetuned_weights.is_none());
    }

    #[test]
    fn test_tail_window_truncates_oldest_first() {
        let tokens: Vec<u32> = (0..500).collect();
        let windowed = tail_window(tokens, 400);
        assert_eq!(windowed.len(), 400);
        assert_eq!(windowed[0], 100);
        assert_eq!(*windowed.last().unwrap(), 499);
    }

    #[test]
    fn test_tail_window_keeps_short_prompts() {
        let tokens: Vec<u32> = (0..42).collect();
        assert_eq!(tail_window(tokens.clone(), 400), tokens);
    }

    #[test]
    fn test_extract_reply_takes_last_marker() {
        let decoded = "[LIVE DATA: ...]\nUser: hi\nAssistant: hello there";
        assert_eq!(extract_reply(decoded), "hello there");

        let nested = "User: say Assistant:\nAssistant: ok, Assistant: it is";
        assert_eq!(extract_reply(nested), "it is");
    }

    #[test]
    fn test_extract_reply_idempotent() {
        let decoded = "User: hi\nAssistant:  a fine day in Kolkata  ";
        let once = extract_reply(decoded);
        assert_eq!(once, "a fine day in Kolkata");
        assert_eq!(extract_reply(&once), once);
    }

    #[test]
    fn test_extract_reply_without_marker() {
        assert_eq!(extract_reply("  plain text  "), "plain text");
        assert_eq!(extract_reply(""), "");
    }
}
