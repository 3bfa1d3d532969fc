use crate::article::Article;
use crate::content::extract::extract_paragraph_text;
use crate::http::{get_text, FetchError, RequestLimits};
use crate::retry::{DelayRange, RetryPolicy};
use crate::runlog::RunLog;
use crate::util::validate_url;

/// Fetches article pages and turns them into [`Article`]s.
///
/// The quality floor is checked inside each attempt, so a page that comes
/// back with too little paragraph text is retried exactly like a 500.
#[derive(Debug, Clone)]
pub struct ArticleFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
    limits: RequestLimits,
    pacing: DelayRange,
}

impl ArticleFetcher {
    pub fn new(
        client: reqwest::Client,
        policy: RetryPolicy,
        limits: RequestLimits,
        pacing: DelayRange,
    ) -> Self {
        Self {
            client,
            policy,
            limits,
            pacing,
        }
    }

    /// Fetch one article. `None` means it was dropped; `log` says why.
    pub async fn fetch(&self, log: &mut RunLog, url: &str) -> Option<Article> {
        let result = self
            .policy
            .run_with_log(log, url, |mut attempt_log| async move {
                let outcome = self.fetch_once(&mut attempt_log, url).await;
                (attempt_log, outcome)
            })
            .await;

        match result {
            Ok(article) => {
                log.info(format!("Successfully parsed article: {url}"));
                Some(article)
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Article dropped");
                None
            }
        }
    }

    /// One attempt. The article keeps the URL as the parser normalised it,
    /// so stray tabs or newlines from feed markup never reach the output.
    async fn fetch_once(&self, log: &mut RunLog, url: &str) -> Result<Article, FetchError> {
        let target = validate_url(url)?;
        let body = get_text(&self.client, target.as_str(), self.limits).await?;
        log.info(format!("Successfully fetched {url}, parsing content..."));
        Article::new(target.as_str(), extract_paragraph_text(&body))
    }

    /// Politeness pause between two articles.
    pub async fn pause(&self, log: &mut RunLog) {
        let wait = self.pacing.sample();
        log.info(format!(
            "Waiting {:.2} seconds before next article...",
            wait.as_secs_f64()
        ));
        tokio::time::sleep(wait).await;
    }
}
