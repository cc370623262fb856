//! Asset transport: HTTP fetch with cooperative cancellation.
//!
//! The transport observes the shared [`CancelToken`] and reports a
//! distinguished [`FetchError::Cancelled`]; the pipeline propagates only
//! that variant, every other fetch failure is logged and skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;
use url::Url;

use crate::config::FetchConfig;

// ============================================================================
// Errors
// ============================================================================

/// Transport-level fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The crawl-wide cancellation signal was observed.
    #[error("download cancelled")]
    Cancelled,

    /// Request could not be performed (DNS, connect, timeout, body read).
    #[error("request for `{url}` failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("`{url}` returned status {status}")]
    Status { url: String, status: StatusCode },
}

impl FetchError {
    /// Check for the distinguished cancellation variant.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Crawl-wide cancellation signal shared between the driver and every
/// transport. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Irreversible for the token's lifetime.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested
    ///
    /// Uses Relaxed ordering for performance - worst case is processing
    /// one more asset before stopping, which is acceptable
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// One fetched asset: body bytes plus the response metadata the
/// transformers care about.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fetch collaborator consumed by the asset pipeline.
pub trait Transport {
    fn fetch(&self, cancel: &CancelToken, url: &Url) -> Result<FetchedAsset, FetchError>;
}

/// Blocking HTTP transport.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport from fetch settings (user agent, timeout).
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, cancel: &CancelToken, url: &Url) -> Result<FetchedAsset, FetchError> {
        // The blocking request itself cannot be interrupted mid-flight;
        // the token is observed at the fetch boundary.
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let response =
            self.client
                .get(url.clone())
                .send()
                .map_err(|source| FetchError::Request {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        Ok(FetchedAsset { body, content_type })
    }
}
