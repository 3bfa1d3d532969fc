//! The unit of output: one article URL and the text extracted from it.

use crate::http::FetchError;

/// Trimmed content shorter than this many characters is not an article.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Extracted article text that has passed the quality floor.
///
/// The only constructor enforces [`MIN_CONTENT_CHARS`], so every value of
/// this type in a run already satisfies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    url: String,
    content: String,
}

impl Article {
    /// Accept `content` for `url` if it clears the quality floor.
    ///
    /// Length is counted in characters of the trimmed text, so a page of
    /// CJK text is measured the same way as a page of ASCII.
    ///
    /// # Errors
    ///
    /// [`FetchError::ContentTooShort`] when the trimmed text is below
    /// [`MIN_CONTENT_CHARS`].
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Result<Self, FetchError> {
        let content = content.into();
        let len = content.trim().chars().count();
        if len < MIN_CONTENT_CHARS {
            return Err(FetchError::ContentTooShort {
                len,
                min: MIN_CONTENT_CHARS,
            });
        }
        Ok(Self {
            url: url.into(),
            content,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
