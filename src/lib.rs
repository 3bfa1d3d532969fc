//! Fetch the articles behind a set of RSS feeds and save their text.
//!
//! A run resolves each feed into article URLs, fetches every article in
//! order under a bounded retry policy, and writes whatever succeeded to a
//! uniquely named text file. See [`pipeline::Pipeline`].

pub mod article;
pub mod config;
pub mod content;
pub mod feed;
pub mod http;
pub mod output;
pub mod pipeline;
pub mod retention;
pub mod retry;
pub mod runlog;
pub mod sources;
pub mod util;
