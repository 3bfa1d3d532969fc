//! Run orchestration: feeds in order, then each feed's articles in order.
//!
//! Nothing here runs concurrently. Every article fetch is an
//! [`ArticleTask`] that records into its own log fragment; the orchestrator
//! drains tasks one at a time and merges each fragment as it completes.

use crate::article::Article;
use crate::config::Config;
use crate::content::ArticleFetcher;
use crate::feed::FeedResolver;
use crate::http::{build_client, RequestLimits};
use crate::output::{write_articles, OutputError};
use crate::retry::RetryPolicy;
use crate::runlog::RunLog;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

/// Log plus the articles gathered by [`Pipeline::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    pub log: RunLog,
    pub articles: Vec<Article>,
}

/// Everything one invocation produces.
#[derive(Debug)]
pub struct RunResult {
    pub log: RunLog,
    pub articles: Vec<Article>,
    pub output_path: PathBuf,
}

/// One article fetch: position `index` of `total` within its feed.
#[derive(Debug, Clone)]
struct ArticleTask {
    index: usize,
    total: usize,
    url: String,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    feeds: FeedResolver,
    articles: ArticleFetcher,
}

impl Pipeline {
    pub fn new(feeds: FeedResolver, articles: ArticleFetcher) -> Self {
        Self { feeds, articles }
    }

    /// Wire resolver and fetcher from configuration, sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_client(config)?;
        let limits = RequestLimits::from_config(config);

        let feeds = FeedResolver::new(
            client.clone(),
            RetryPolicy::new("RSS", config.max_attempts, config.feed_retry_delay),
            limits,
        );
        let articles = ArticleFetcher::new(
            client,
            RetryPolicy::new("article", config.max_attempts, config.article_retry_delay),
            limits,
            config.article_pacing_delay,
        );
        Ok(Self::new(feeds, articles))
    }

    /// Resolve every feed and fetch its articles, strictly in order.
    ///
    /// Fetch failures never end the run; they only leave log lines behind.
    pub async fn run(&self, feed_urls: &[String]) -> RunReport {
        let mut report = RunReport::default();

        for feed_url in feed_urls {
            let links = self.feeds.resolve(&mut report.log, feed_url).await;
            if links.is_empty() {
                continue;
            }

            let total = links.len();
            let tasks = links.into_iter().enumerate().map(|(i, url)| ArticleTask {
                index: i + 1,
                total,
                url,
            });

            let mut completed = std::pin::pin!(
                stream::iter(tasks).then(|task| self.run_article_task(task))
            );
            while let Some((fragment, article)) = completed.next().await {
                report.log.append(fragment);
                report.articles.extend(article);
            }
        }

        tracing::info!(
            feeds = feed_urls.len(),
            articles = report.articles.len(),
            "Run finished"
        );
        report
    }

    /// [`run`](Self::run), then write the result file into `output_dir`.
    ///
    /// # Errors
    ///
    /// Only a failure to write the result file is returned.
    pub async fn execute(
        &self,
        feed_urls: &[String],
        output_dir: &Path,
    ) -> Result<RunResult, OutputError> {
        let RunReport { mut log, articles } = self.run(feed_urls).await;

        let output_path = write_articles(output_dir, &articles)?;

        if articles.is_empty() {
            log.info("No articles found from the selected RSS sources.");
        } else {
            let file_name = output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log.info(format!(
                "Scraping completed. Total articles: {}. Output saved to {file_name}",
                articles.len()
            ));
        }

        Ok(RunResult {
            log,
            articles,
            output_path,
        })
    }

    async fn run_article_task(&self, task: ArticleTask) -> (RunLog, Option<Article>) {
        let mut fragment = RunLog::new();
        fragment.info(format!(
            "Processing article {}/{}: {}",
            task.index, task.total, task.url
        ));

        let article = self.articles.fetch(&mut fragment, &task.url).await;

        if task.index < task.total {
            self.articles.pause(&mut fragment).await;
        }
        (fragment, article)
    }
}
