//! Runtime configuration from environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::DevicePreference;
use crate::rag::EngineConfig;

/// Runtime configuration, read once at startup.
///
/// Missing API keys are not fatal: the affected fetches fail per request
/// and degrade to absent data points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub openweather_api_key: String,
    pub serpapi_key: String,
    pub model_id: String,
    pub finetuned_weights: Option<PathBuf>,
    pub max_tokens: usize,
    pub temperature: f64,
    pub device: DevicePreference,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: String::new(),
            serpapi_key: String::new(),
            model_id: "Qwen/Qwen2.5-0.5B".to_string(),
            finetuned_weights: None,
            max_tokens: 150,
            temperature: 0.8,
            device: DevicePreference::Auto,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let openweather_api_key = lookup("OPENWEATHER_API_KEY").unwrap_or_default();
        if openweather_api_key.is_empty() {
            tracing::warn!("OPENWEATHER_API_KEY not set, live data will be unavailable");
        }

        let serpapi_key = lookup("SERPAPI_KEY").unwrap_or_default();
        if serpapi_key.is_empty() {
            tracing::warn!("SERPAPI_KEY not set, web search will be unavailable");
        }

        let max_tokens = match lookup("MAX_TOKENS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid MAX_TOKENS: {raw}"))?,
            None => defaults.max_tokens,
        };

        let temperature = match lookup("TEMPERATURE") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid TEMPERATURE: {raw}"))?,
            None => defaults.temperature,
        };

        let device = match lookup("DEVICE") {
            Some(raw) => raw.parse()?,
            None => defaults.device,
        };

        Ok(Self {
            openweather_api_key,
            serpapi_key,
            model_id: lookup("MODEL_ID").unwrap_or(defaults.model_id),
            finetuned_weights: lookup("FINETUNED_WEIGHTS").map(PathBuf::from),
            max_tokens,
            temperature,
            device,
        })
    }

    /// Engine configuration slice of this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model_id: self.model_id.clone(),
            finetuned_weights: self.finetuned_weights.clone(),
            device: self.device,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            ..EngineConfig::default()
        }
    }
}
