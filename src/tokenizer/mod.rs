mod huggingface;
mod whitespace;

pub use huggingface::HuggingFaceTokenizer;
pub use whitespace::WhitespaceTokenizer;

use crate::error::TokenizerError;
use std::path::Path;

/// Counts the tokens a piece of text encodes to.
///
/// Used only for budget accounting. Implementations must be deterministic:
/// the same text always yields the same count.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TokenizerError>;

    /// Stable name recorded in the chunks document, e.g. `whitespace`
    fn identifier(&self) -> &str;
}

/// Load a `tokenizer.json` if one is given, else fall back to whitespace counting
pub fn load_tokenizer(path: Option<&Path>) -> Result<Box<dyn TokenCounter>, TokenizerError> {
    match path {
        Some(path) => Ok(Box::new(HuggingFaceTokenizer::from_file(path)?)),
        None => Ok(Box::new(WhitespaceTokenizer)),
    }
}
