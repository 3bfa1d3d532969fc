//! Feed resolution: turning an RSS feed URL into the article URLs it lists.
//!
//! - [`parser`] - streaming `quick-xml` scan for `<item><link>` text
//! - [`resolver`] - one retried GET per feed, then link extraction
//!
//! # Example
//!
//! ```no_run
//! use allnews::feed::FeedResolver;
//! use allnews::http::RequestLimits;
//! use allnews::retry::{DelayRange, RetryPolicy};
//! use allnews::runlog::RunLog;
//! use std::time::Duration;
//!
//! # async fn example(client: reqwest::Client) {
//! let policy = RetryPolicy::new("RSS", 3, DelayRange::new(3.0, 6.0));
//! let limits = RequestLimits { timeout: Duration::from_secs(60), max_body_bytes: 1 << 20 };
//! let resolver = FeedResolver::new(client, policy, limits);
//!
//! let mut log = RunLog::new();
//! let article_urls = resolver
//!     .resolve(&mut log, "https://feeds.bbci.co.uk/news/business/rss.xml")
//!     .await;
//! println!("{} articles", article_urls.len());
//! # }
//! ```

mod parser;
mod resolver;

pub use parser::{extract_item_links, FeedParseError, LinkExtraction};
pub use resolver::FeedResolver;
