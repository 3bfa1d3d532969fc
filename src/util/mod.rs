//! Small helpers shared by the feed and article stages.
//!
//! - **URL validation**: every feed and article URL is checked before a
//!   request is built, so malformed links from a feed never reach `reqwest`.
//!
//! # Examples
//!
//! ```
//! use allnews::util::validate_url;
//!
//! let url = validate_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.host_str(), Some("example.com"));
//! ```

mod url_validator;

pub use url_validator::{validate_url, UrlValidationError};
