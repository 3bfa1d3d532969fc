//! Bounded retry with jittered waits between attempts.
//!
//! Feed resolution and article fetching share this one policy. An operation
//! reports each attempt as `Result<T, FetchError>`; the policy decides whether
//! to try again, sleeps a uniformly random duration from its [`DelayRange`]
//! between attempts, and writes every step to the run log.
//!
//! # Example
//!
//! ```no_run
//! use allnews::http::{get_text, RequestLimits};
//! use allnews::retry::{DelayRange, RetryPolicy};
//! use allnews::runlog::RunLog;
//! use std::time::Duration;
//!
//! # async fn example(client: reqwest::Client) {
//! let policy = RetryPolicy::new("RSS", 3, DelayRange::new(3.0, 6.0));
//! let limits = RequestLimits { timeout: Duration::from_secs(60), max_body_bytes: 1 << 20 };
//! let mut log = RunLog::new();
//! let url = "https://feeds.bbci.co.uk/news/business/rss.xml";
//! let body = policy.run(&mut log, url, || get_text(&client, url, limits)).await;
//! # }
//! ```

use crate::http::FetchError;
use crate::runlog::RunLog;
use rand::Rng;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Inclusive range of seconds from which a wait is drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// A range that never waits.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Describe what is wrong with the range, if anything.
    pub fn check(&self) -> Result<(), String> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        if self.min_secs < 0.0 {
            return Err("min_secs must not be negative".to_string());
        }
        if self.min_secs > self.max_secs {
            return Err(format!(
                "min_secs ({}) is greater than max_secs ({})",
                self.min_secs, self.max_secs
            ));
        }
        Ok(())
    }

    /// Draw a wait from the range. An invalid range yields zero.
    pub fn sample(&self) -> Duration {
        if self.check().is_err() {
            return Duration::ZERO;
        }
        let secs = if self.max_secs > self.min_secs {
            rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
        } else {
            self.min_secs
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// Terminal outcome of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every attempt failed with a retryable error.
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: FetchError },
    /// An attempt failed with an error that retrying cannot fix.
    #[error("Stopped at attempt {attempt}: {error}")]
    Aborted { attempt: u32, error: FetchError },
}

impl RetryError {
    /// Number of attempts actually made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempt, .. } => *attempt,
        }
    }
}

/// Attempt cap plus inter-attempt wait, labelled for log lines.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// What is being fetched ("RSS", "article"); appears in give-up lines.
    pub subject: &'static str,
    pub max_attempts: u32,
    pub delay: DelayRange,
}

impl RetryPolicy {
    pub fn new(subject: &'static str, max_attempts: u32, delay: DelayRange) -> Self {
        Self {
            subject,
            max_attempts,
            delay,
        }
    }

    /// Run `operation` until it succeeds, hits a non-retryable error, or the
    /// attempt cap is reached.
    ///
    /// Each attempt logs `Attempt N - GET <url>` before it starts. Failures
    /// log the error; a wait line precedes every retry. No wait follows the
    /// final attempt. A cap of zero is treated as one attempt.
    pub async fn run<T, F, Fut>(
        &self,
        log: &mut RunLog,
        url: &str,
        mut operation: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.run_with_log(log, url, |attempt_log| {
            let attempt = operation();
            async move { (attempt_log, attempt.await) }
        })
        .await
    }

    /// Like [`run`](Self::run), but each attempt also gets an empty
    /// [`RunLog`] of its own and hands it back with its outcome. The entries
    /// land in `log` between that attempt's start line and its result.
    pub async fn run_with_log<T, F, Fut>(
        &self,
        log: &mut RunLog,
        url: &str,
        mut operation: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut(RunLog) -> Fut,
        Fut: Future<Output = (RunLog, Result<T, FetchError>)>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            log.info(format!("Attempt {attempt} - GET {url}"));

            let (attempt_log, outcome) = operation(RunLog::new()).await;
            log.append(attempt_log);

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(url = %url, attempts = attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            log.warn(format!("Attempt {attempt} failed for {url}: {error}"));

            if !error.is_retryable() {
                log.warn(format!(
                    "Giving up on {} {url}: error is not retryable.",
                    self.subject
                ));
                return Err(RetryError::Aborted { attempt, error });
            }

            if attempt >= max_attempts {
                log.warn(format!(
                    "Giving up on {} {url} after {attempt} attempts.",
                    self.subject
                ));
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let wait = self.delay.sample();
            log.info(format!("Waiting {:.2}s before retry...", wait.as_secs_f64()));
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}
