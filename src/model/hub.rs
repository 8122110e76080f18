//! Model asset resolution
//!
//! Resolves a model ID or local directory into concrete file paths for the
//! config, weights, and tokenizer, downloading from HuggingFace Hub when the
//! model is not available locally.

use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::Api;
use std::path::{Path, PathBuf};

/// Resolved on-disk locations of one model's files.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    /// Original model ID or path
    pub model_id: String,
    /// Path to config.json
    pub config_file: PathBuf,
    /// Path to model weights (safetensors)
    pub weights_file: PathBuf,
    /// Path to tokenizer.json
    pub tokenizer_file: PathBuf,
}

impl ModelAssets {
    /// Resolve a model ID or path - auto-detects local vs HuggingFace.
    ///
    /// A path that exists on disk (or starts with `.`, `/`, or `~`) is
    /// treated as a local model directory; anything else is treated as a Hub
    /// model ID and downloaded into the Hub cache.
    pub fn resolve(model_id_or_path: &str) -> Result<Self> {
        let local_path = Path::new(model_id_or_path);
        let looks_local = local_path.exists()
            || model_id_or_path.starts_with('.')
            || model_id_or_path.starts_with('/')
            || model_id_or_path.starts_with('~');

        if looks_local && local_path.exists() {
            tracing::info!("Loading model from local path: {}", model_id_or_path);
            Self::from_local(local_path)
        } else if looks_local {
            Err(anyhow!(
                "Local model path does not exist: {}",
                model_id_or_path
            ))
        } else {
            tracing::info!("Resolving model from HuggingFace Hub: {}", model_id_or_path);
            Self::from_hub(model_id_or_path)
        }
    }

    /// Build assets from a local model directory.
    pub fn from_local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let config_file = path.join("config.json");
        if !config_file.exists() {
            return Err(anyhow!("config.json not found in {:?}", path));
        }

        let weights_file = path.join("model.safetensors");
        if !weights_file.exists() {
            return Err(anyhow!("model.safetensors not found in {:?}", path));
        }

        let tokenizer_file = path.join("tokenizer.json");
        if !tokenizer_file.exists() {
            return Err(anyhow!("tokenizer.json not found in {:?}", path));
        }

        Ok(Self {
            model_id: path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            config_file,
            weights_file,
            tokenizer_file,
        })
    }

    /// Download required files from HuggingFace Hub (cached between runs).
    fn from_hub(model_id: &str) -> Result<Self> {
        let api = Api::new().context("Failed to initialize HuggingFace Hub API")?;
        let repo = api.model(model_id.to_string());

        let config_file = repo
            .get("config.json")
            .context("Failed to download config.json")?;
        let weights_file = repo
            .get("model.safetensors")
            .context("Failed to download model.safetensors")?;
        let tokenizer_file = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer.json")?;

        tracing::debug!("Model files cached at {:?}", config_file.parent());

        Ok(Self {
            model_id: model_id.to_string(),
            config_file,
            weights_file,
            tokenizer_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_local_path_must_exist() {
        let err = ModelAssets::resolve("./no-such-model").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_from_local_requires_all_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = ModelAssets::from_local(dir.path()).unwrap_err();
        assert!(err.to_string().contains("model.safetensors"));
    }

    #[test]
    fn test_from_local_complete_dir() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["config.json", "model.safetensors", "tokenizer.json"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let assets = ModelAssets::from_local(dir.path()).unwrap();
        assert!(assets.config_file.ends_with("config.json"));
        assert!(assets.weights_file.ends_with("model.safetensors"));
    }
}
