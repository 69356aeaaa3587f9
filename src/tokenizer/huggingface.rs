use std::path::Path;
use tokenizers::Tokenizer;

use super::TokenCounter;
use crate::error::TokenizerError;

/// Subword counting backed by a Hugging Face `tokenizer.json`
pub struct HuggingFaceTokenizer {
    inner: Tokenizer,
    identifier: String,
}

impl HuggingFaceTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let inner = Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            inner,
            identifier: format!("huggingface::{}", name),
        })
    }
}

impl TokenCounter for HuggingFaceTokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        // Special tokens are per-sequence overhead, not part of the text budget
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.len())
            .map_err(|e| TokenizerError::Encode(e.to_string()))
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
