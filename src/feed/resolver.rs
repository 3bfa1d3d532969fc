use crate::feed::parser::extract_item_links;
use crate::http::{get_text, RequestLimits};
use crate::retry::RetryPolicy;
use crate::runlog::RunLog;

/// Fetches a feed under the retry policy and lists its article URLs.
#[derive(Debug, Clone)]
pub struct FeedResolver {
    client: reqwest::Client,
    policy: RetryPolicy,
    limits: RequestLimits,
}

impl FeedResolver {
    pub fn new(client: reqwest::Client, policy: RetryPolicy, limits: RequestLimits) -> Self {
        Self {
            client,
            policy,
            limits,
        }
    }

    /// Resolve `feed_url` into article URLs, in document order.
    ///
    /// Never fails: a feed that cannot be fetched after every attempt yields
    /// an empty list, and the reason is already in `log`. A 200 response with
    /// broken markup is not retried; whatever links preceded the break are
    /// kept and a warning is logged.
    pub async fn resolve(&self, log: &mut RunLog, feed_url: &str) -> Vec<String> {
        log.info(format!("Starting to fetch RSS: {feed_url}"));

        let client = &self.client;
        let limits = self.limits;
        let body = match self
            .policy
            .run(log, feed_url, || get_text(client, feed_url, limits))
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(feed = %feed_url, error = %e, "Feed dropped");
                return Vec::new();
            }
        };

        log.info(format!(
            "Successfully fetched RSS {feed_url}, parsing XML..."
        ));

        let extraction = extract_item_links(&body);

        if let Some(err) = &extraction.malformed {
            log.warn(format!("Malformed feed markup from {feed_url}: {err}"));
        }
        if extraction.skipped > 0 {
            tracing::debug!(
                feed = %feed_url,
                skipped = extraction.skipped,
                "Items without a usable link skipped"
            );
        }

        log.info(format!(
            "Found {} articles from {feed_url}",
            extraction.links.len()
        ));
        extraction.links
    }
}
