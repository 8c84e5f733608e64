mod retry;
mod yt_dlp;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use backoff::{Error as BackoffError, future::retry};
use mockall::automock;
pub use retry::FixedAttempts;
use thiserror::Error;
use tokio::sync::Semaphore;
pub use yt_dlp::YtDlpProbe;

/// Errors of a single extraction attempt.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The extractor binary was not found on the system.
    #[error("Extractor binary `{0}` is not installed")]
    NotInstalled(String),
    /// The extractor process could not be started.
    #[error("Failed to run extractor: {0}")]
    Spawn(#[source] std::io::Error),
    /// The extractor exited with a non-zero status.
    #[error("Extractor exited with {status}: {stderr}")]
    Failed {
        /// Exit status as reported by the OS.
        status: String,
        /// Last line the extractor wrote to stderr.
        stderr: String,
    },
    /// The extractor printed something that is not its JSON metadata.
    #[error("Extractor returned invalid JSON: {0}")]
    InvalidOutput(#[from] serde_json::Error),
    /// The metadata carried no playable URL.
    #[error("Extractor found no direct media URL")]
    NoDirectUrl,
}

impl ExtractorError {
    /// Errors that can't go away by trying again.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ExtractorError::NotInstalled(_))
    }
}

/// A resolved, directly fetchable media resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLink {
    /// URL of the media file itself.
    pub direct_url: String,
    /// Title of the post or video, when the platform has one.
    pub title: Option<String>,
}

/// The outcome of resolving a link. Failures are already retried and logged
/// by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// The link was turned into a direct media URL.
    Resolved(MediaLink),
    /// Every attempt failed.
    Failed,
}

/// A single attempt at turning a page URL into a direct media URL.
#[automock]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Makes one attempt at resolving `url`.
    async fn probe(&self, url: &str) -> Result<MediaLink, ExtractorError>;
}

/// Resolves page URLs to direct media URLs.
#[automock]
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    /// Resolve `url`, retrying on failure. Never returns an error; callers get
    /// [`ExtractionResult::Failed`] once the retry budget is spent.
    async fn resolve(&self, url: &str) -> ExtractionResult;
}

/// Runs a [`MediaProbe`] with a fixed number of attempts and caps how many
/// probes run at the same time.
pub struct DefaultLinkExtractor {
    probe: Arc<dyn MediaProbe>,
    max_attempts: usize,
    retry_delay: Duration,
    permits: Semaphore,
}

impl DefaultLinkExtractor {
    /// Creates an extractor. Zero attempts or zero concurrency count as one.
    pub fn new(
        probe: Arc<dyn MediaProbe>,
        max_attempts: usize,
        retry_delay: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            probe,
            max_attempts: max_attempts.max(1),
            retry_delay,
            permits: Semaphore::new(max_concurrency.max(1)),
        }
    }
}

#[async_trait]
impl LinkExtractor for DefaultLinkExtractor {
    async fn resolve(&self, url: &str) -> ExtractionResult {
        let Ok(_permit) = self.permits.acquire().await else {
            tracing::error!("Extraction permits closed, dropping {url}");
            return ExtractionResult::Failed;
        };

        let probe = &self.probe;
        let max_attempts = self.max_attempts;
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;

        let operation = move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            probe.probe(url).await.map_err(|e| {
                if e.is_permanent() {
                    tracing::error!("Extraction of {url} failed permanently: {e}");
                    BackoffError::permanent(e)
                } else {
                    tracing::warn!("Extraction attempt {attempt}/{max_attempts} for {url} failed: {e}");
                    BackoffError::transient(e)
                }
            })
        };

        match retry(FixedAttempts::new(self.max_attempts, self.retry_delay), operation).await {
            Ok(link) => {
                tracing::info!(
                    "Resolved {url} ({}) after {} attempt(s)",
                    link.title.as_deref().unwrap_or("untitled"),
                    attempts.load(Ordering::Relaxed)
                );
                ExtractionResult::Resolved(link)
            }
            Err(e) => {
                tracing::warn!("Giving up on {url}: {e}");
                ExtractionResult::Failed
            }
        }
    }
}
