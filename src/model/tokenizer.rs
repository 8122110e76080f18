//! Tokenizer wrapper for HuggingFace tokenizers

use anyhow::Result;
use std::path::Path;
use tokenizers::Tokenizer;

/// End-of-sequence token candidates, checked in order.
const EOS_CANDIDATES: [&str; 3] = ["<|endoftext|>", "<|im_end|>", "</s>"];

/// Wrapper around a HuggingFace tokenizer with the small surface the
/// generation loop needs: encode, decode, and EOS lookup.
pub struct TokenizerWrapper {
    tokenizer: Tokenizer,
}

impl TokenizerWrapper {
    /// Load a tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        Ok(Self { tokenizer })
    }

    /// Encode text to token IDs.
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, add_special_tokens)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Decode token IDs back to text.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        self.tokenizer
            .decode(ids, skip_special_tokens)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))
    }

    /// Look up the end-of-sequence token ID, if the vocabulary has one.
    pub fn eos_token_id(&self) -> Option<u32> {
        EOS_CANDIDATES
            .iter()
            .find_map(|tok| self.tokenizer.token_to_id(tok))
    }
}
