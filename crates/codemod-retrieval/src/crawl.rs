//! Bounded crawl pool
//!
//! Fetches a URL list through a [`PageFetcher`] with at most
//! `workers` requests in flight. Each URL is retried with exponential backoff
//! before it is reported as failed.

use crate::chunk::DocumentPage;
use crate::error::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Concurrent fetches
pub const DEFAULT_WORKERS: usize = 5;

/// Attempts per URL
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fetches and parses one documentation page
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, tagging the page with `framework`
    ///
    /// # Errors
    /// Returns error if the page cannot be fetched or parsed
    async fn fetch(&self, url: &str, framework: &str) -> Result<DocumentPage>;
}

/// Backoff schedule: `base_delay * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after the zero-based `attempt` failed
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Crawl pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlConfig {
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: RetryPolicy::default(),
        }
    }
}

impl CrawlConfig {
    /// With worker count
    #[inline]
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Outcome of a crawl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub framework: String,
    /// Distinct URLs attempted
    pub total_urls: usize,
    /// Fetched pages, in input order
    pub pages: Vec<DocumentPage>,
    /// URLs that failed every attempt, in input order
    pub failed_urls: Vec<String>,
}

impl CrawlReport {
    /// Pages fetched
    #[inline]
    #[must_use]
    pub fn successful(&self) -> usize {
        self.pages.len()
    }

    /// URLs given up on
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed_urls.len()
    }
}

/// Fetch one URL, retrying on failure
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    framework: &str,
    policy: &RetryPolicy,
) -> Option<DocumentPage> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 0..attempts {
        match fetcher.fetch(url, framework).await {
            Ok(page) => return Some(page),
            Err(e) => {
                tracing::warn!("Attempt {} failed for {}: {}", attempt + 1, url, e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
        }
    }
    tracing::error!("Failed to fetch {} after {} attempts", url, attempts);
    None
}

/// Crawl every distinct URL on a bounded pool
///
/// Fetches complete in any order, but `pages` and `failed_urls` are returned
/// in input order (first occurrence of each URL), not completion order.
pub async fn crawl(
    fetcher: &dyn PageFetcher,
    framework: &str,
    urls: &[String],
    config: &CrawlConfig,
) -> CrawlReport {
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = urls
        .iter()
        .map(String::as_str)
        .filter(|u| seen.insert(*u))
        .collect();
    tracing::info!("Crawling {} {} URLs with {} workers", distinct.len(), framework, config.workers);

    let mut results: Vec<(usize, &str, Option<DocumentPage>)> =
        stream::iter(distinct.iter().copied().enumerate())
            .map(|(idx, url)| async move {
                let page = fetch_with_retry(fetcher, url, framework, &config.retry).await;
                (idx, url, page)
            })
            .buffer_unordered(config.workers.max(1))
            .collect()
            .await;
    results.sort_by_key(|(idx, _, _)| *idx);

    let mut report = CrawlReport {
        framework: framework.to_string(),
        total_urls: distinct.len(),
        ..CrawlReport::default()
    };
    for (_, url, page) in results {
        match page {
            Some(page) => report.pages.push(page),
            None => report.failed_urls.push(url.to_string()),
        }
    }
    tracing::info!(
        "Crawl finished: {} fetched, {} failed",
        report.successful(),
        report.failed()
    );
    report
}
