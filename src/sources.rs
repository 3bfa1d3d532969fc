//! Named feed presets and the selection that turns them into a feed list.

use serde::Deserialize;
use thiserror::Error;

/// A display name paired with a feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

const BUILTIN_SOURCES: [(&str, &str); 6] = [
    (
        "BBC Business",
        "https://feeds.bbci.co.uk/news/business/rss.xml",
    ),
    (
        "Bloomberg Technology",
        "https://feeds.bloomberg.com/technology/news.rss",
    ),
    (
        "WSJ World News",
        "https://feeds.content.dowjones.io/public/rss/RSSWorldNews",
    ),
    (
        "WSJ US Business",
        "https://feeds.content.dowjones.io/public/rss/WSJcomUSBusiness",
    ),
    (
        "WSJ Markets",
        "https://feeds.content.dowjones.io/public/rss/RSSMarketsMain",
    ),
    (
        "WSJ Technology",
        "https://feeds.content.dowjones.io/public/rss/RSSWSJD",
    ),
];

/// The built-in presets in declaration order.
pub fn builtin_sources() -> Vec<FeedSource> {
    BUILTIN_SOURCES
        .iter()
        .map(|(name, url)| FeedSource::new(*name, *url))
        .collect()
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unknown feed source '{name}' (known: {known})")]
    UnknownSource { name: String, known: String },
}

/// Which presets to include in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    None,
    Named(Vec<String>),
}

/// Build the ordered feed URL list for one run.
///
/// Selected presets come first, in the registry's declaration order no
/// matter how the names were given. A non-blank `custom_url` is trimmed and
/// appended last. Names are matched exactly.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSource`] for the first name that is not in
/// `registry`.
pub fn select_feed_urls(
    registry: &[FeedSource],
    selection: &Selection,
    custom_url: Option<&str>,
) -> Result<Vec<String>, SourceError> {
    let mut urls: Vec<String> = match selection {
        Selection::All => registry.iter().map(|s| s.url.clone()).collect(),
        Selection::None => Vec::new(),
        Selection::Named(names) => {
            if let Some(unknown) = names
                .iter()
                .find(|name| !registry.iter().any(|s| &s.name == *name))
            {
                return Err(SourceError::UnknownSource {
                    name: unknown.clone(),
                    known: registry
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            registry
                .iter()
                .filter(|s| names.contains(&s.name))
                .map(|s| s.url.clone())
                .collect()
        }
    };

    if let Some(custom) = custom_url.map(str::trim).filter(|u| !u.is_empty()) {
        urls.push(custom.to_string());
    }

    Ok(urls)
}
