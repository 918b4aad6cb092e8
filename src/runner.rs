//! Batch analysis over a URL task queue
//!
//! A bounded worker pool drains the queue; a shared token-bucket rate
//! limiter paces request starts toward the fetched origins. Results come
//! back in input order and one URL's failure never stops the batch.

use crate::analyzer::{AnalysisResult, UrlAnalyzer};
use crate::fetch::PageFetcher;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// One unit of work: a URL plus its conversation-turn correlation
#[derive(Debug, Clone)]
pub struct UrlTask {
    pub url: String,
    pub turn_number: Option<u32>,
}

impl UrlTask {
    pub fn new(url: impl Into<String>, turn_number: Option<u32>) -> Self {
        UrlTask {
            url: url.into(),
            turn_number,
        }
    }
}

/// Worker pool and pacing policy for a batch run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// URLs analyzed concurrently
    pub concurrency: usize,
    /// Analysis starts per second across the batch; 0 disables pacing
    pub requests_per_second: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            concurrency: 4,
            requests_per_second: 1,
        }
    }
}

/// A token bucket rate limiter for pacing analysis starts
#[derive(Debug)]
struct RateLimiter {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64,
    last_update: Instant,
    enabled: bool,
}

impl RateLimiter {
    fn new(requests_per_second: u32) -> Self {
        let enabled = requests_per_second > 0;
        let max_tokens = if enabled {
            requests_per_second as f64
        } else {
            f64::INFINITY
        };
        RateLimiter {
            tokens: max_tokens,
            max_tokens,
            refill_rate: requests_per_second as f64,
            last_update: Instant::now(),
            enabled,
        }
    }

    fn refill(&mut self) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_update = now;
    }

    /// Try to take a token, returning the wait time when none is available
    fn try_acquire(&mut self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let wait_secs = (1.0 - self.tokens) / self.refill_rate;
            Some(Duration::from_secs_f64(wait_secs))
        }
    }

    async fn acquire(&mut self) {
        loop {
            match self.try_acquire() {
                None => return,
                Some(wait_duration) => {
                    debug!("Rate limiter waiting {:?} for token", wait_duration);
                    sleep(wait_duration).await;
                }
            }
        }
    }
}

/// Thread-safe rate limiter shared across workers
#[derive(Debug, Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<RateLimiter>>,
}

impl SharedRateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        SharedRateLimiter {
            inner: Arc::new(Mutex::new(RateLimiter::new(requests_per_second))),
        }
    }

    pub async fn acquire(&self) {
        let mut limiter = self.inner.lock().await;
        limiter.acquire().await;
    }
}

/// Analyze every task in the batch, returning results in input order.
pub async fn run_batch<F>(
    analyzer: Arc<UrlAnalyzer<F>>,
    tasks: Vec<UrlTask>,
    config: &RunnerConfig,
) -> Vec<AnalysisResult>
where
    F: PageFetcher + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let limiter = SharedRateLimiter::new(config.requests_per_second);

    let mut handles = Vec::with_capacity(tasks.len());
    for task in tasks {
        let analyzer = Arc::clone(&analyzer);
        let semaphore = Arc::clone(&semaphore);
        let limiter = limiter.clone();
        let url = task.url.clone();
        let turn_number = task.turn_number;
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            limiter.acquire().await;
            analyzer.analyze(&task.url, task.turn_number).await
        });
        handles.push((url, turn_number, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (url, turn_number, handle) in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("Analysis task for {} did not complete: {}", url, e);
                results.push(AnalysisResult::task_failed(
                    &url,
                    turn_number,
                    &format!("analysis task did not complete: {}", e),
                ));
            }
        }
    }
    results
}

/// Aggregate statistics over a batch of results
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_country: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

/// Summarize a batch: counts by fetch status, attributed country, and
/// cultural category.
pub fn summarize(results: &[AnalysisResult]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: results.len(),
        ..BatchSummary::default()
    };
    for result in results {
        *summary
            .by_status
            .entry(result.fetch_status.to_string())
            .or_insert(0) += 1;
        *summary
            .by_country
            .entry(result.attributed_country.clone())
            .or_insert(0) += 1;
        *summary
            .by_category
            .entry(result.cultural_category.to_string())
            .or_insert(0) += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_disabled() {
        let mut limiter = RateLimiter::new(0);
        assert!(!limiter.enabled);
        assert!(limiter.try_acquire().is_none());
    }

    #[test]
    fn test_rate_limiter_first_request_immediate() {
        let mut limiter = RateLimiter::new(10);
        assert!(limiter.enabled);
        assert!(limiter.try_acquire().is_none());
    }

    #[test]
    fn test_rate_limiter_exhaustion_requires_wait() {
        let mut limiter = RateLimiter::new(2);
        assert!(limiter.try_acquire().is_none());
        assert!(limiter.try_acquire().is_none());
        let wait = limiter.try_acquire();
        assert!(wait.is_some(), "third immediate request must wait");
    }

    #[tokio::test]
    async fn test_shared_rate_limiter_high_rate_does_not_block() {
        let limiter = SharedRateLimiter::new(1000);
        limiter.acquire().await;
        limiter.acquire().await;
    }

    #[test]
    fn test_summarize_counts() {
        use crate::analyzer::AnalysisResult;
        let results = vec![
            AnalysisResult::task_failed("https://a.example/", None, "boom"),
            AnalysisResult::task_failed("https://b.example/", Some(2), "boom"),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_status.get("error"), Some(&2));
        assert_eq!(summary.by_country.get("Unknown"), Some(&2));
        assert_eq!(summary.by_category.get("unknown"), Some(&2));
    }
}
