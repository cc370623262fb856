//! Asset acquisition pipeline for one page pass.
//!
//! The pipeline walks a page's reference index by category, decides per
//! URL whether a fetch is worthwhile, fetches each asset at most once,
//! optionally rewrites its content and persists it. Stylesheet
//! processing feeds newly discovered references back into the pass's
//! queue, which is drained afterwards.
//!
//! ```text
//! seed queue      body, img references
//! category walk   link, script, body, style
//!                 (link assets rewrite CSS and extend the queue)
//! queue drain     fetch + recode queued images
//! ```

mod css;
mod recode;

pub use css::{CssRef, scan_refs};
pub use recode::recode_image;

use rustc_hash::FxHashMap;
use url::Url;

use crate::config::ImageConfig;
use crate::core::{AssetQueue, RefCategory, TAGS_WITH_REFERENCES, normalize};
use crate::fetch::{CancelToken, FetchError, Transport};
use crate::index::ReferenceIndex;
use crate::policy::DownloadPolicy;
use crate::store::AssetStore;
use crate::{debug, log};

// ============================================================================
// Per-asset outcome
// ============================================================================

/// Why an asset was skipped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The eligibility policy rejected the URL.
    Ineligible,
    /// A file already exists at the derived path.
    AlreadyStored,
}

/// Outcome of one per-asset download operation.
///
/// The pass driver folds outcomes into control flow: everything
/// continues the pass except `Failed` with a cancellation error.
#[derive(Debug)]
pub enum AssetOutcome {
    /// Silent skip; not an error.
    Skipped(SkipReason),
    /// Fetched and persisted (a write failure is logged but the asset
    /// still counts as fetched).
    Fetched,
    /// The transport failed; the error was logged.
    Failed(FetchError),
}

// ============================================================================
// Transform strategy
// ============================================================================

/// Post-fetch content transform, selected per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Persist the fetched bytes as-is.
    None,
    /// Rewrite stylesheet references and queue discovered assets.
    Stylesheet,
    /// Recode raster images to the configured format.
    ImageRecode,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Drives one page's asset pass: decide, fetch, transform, persist.
pub struct AssetPipeline<P, S, T> {
    policy: P,
    store: S,
    transport: T,
    cancel: CancelToken,
    image: ImageConfig,
    queue: AssetQueue,
}

impl<P, S, T> AssetPipeline<P, S, T>
where
    P: DownloadPolicy,
    S: AssetStore,
    T: Transport,
{
    pub fn new(policy: P, store: S, transport: T, cancel: CancelToken, image: ImageConfig) -> Self {
        Self {
            policy,
            store,
            transport,
            cancel,
            image,
            queue: AssetQueue::new(),
        }
    }

    /// Process every asset referenced by one parsed page.
    ///
    /// Index failures and individual asset failures are logged and the
    /// pass continues; only cancellation aborts it. The queue is empty
    /// when this returns, whether the pass completed or was cancelled.
    pub fn process_references(&mut self, index: &impl ReferenceIndex) -> Result<(), FetchError> {
        let result = self.run_pass(index);
        if result.is_err() {
            // Cancelled: whatever is still queued is abandoned.
            self.queue.drain();
        }
        result
    }

    fn run_pass(&mut self, index: &impl ReferenceIndex) -> Result<(), FetchError> {
        // Body and img references go to the drain phase; stylesheet
        // processing below may add more.
        for category in [RefCategory::Body, RefCategory::Image] {
            match index.urls(category) {
                Ok(urls) => self.queue.extend(urls),
                Err(e) => log!("index"; "{}", e),
            }
        }

        for category in TAGS_WITH_REFERENCES {
            let refs = match index.urls(category) {
                Ok(urls) => urls,
                Err(e) => {
                    log!("index"; "{}", e);
                    continue;
                }
            };

            let transform = if category == RefCategory::Link {
                TransformKind::Stylesheet
            } else {
                TransformKind::None
            };
            self.run_batch(&refs, transform)?;
        }

        // Snapshot-then-clear until the queue stays empty, so entries
        // appended while a snapshot is processed are still visited.
        loop {
            let batch = self.queue.drain();
            if batch.is_empty() {
                break;
            }
            self.run_batch(&batch, TransformKind::ImageRecode)?;
        }

        Ok(())
    }

    /// Run one batch of URLs in order, stopping only on cancellation.
    fn run_batch(&mut self, urls: &[Url], transform: TransformKind) -> Result<(), FetchError> {
        for url in urls {
            if let AssetOutcome::Failed(err) = self.download_asset(url, transform)
                && err.is_cancelled()
            {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Download one asset if it is eligible and not materialized yet.
    pub fn download_asset(&mut self, url: &Url, transform: TransformKind) -> AssetOutcome {
        let url = normalize(url);

        if !self.policy.should_download(&url, 0, true) {
            return AssetOutcome::Skipped(SkipReason::Ineligible);
        }

        // Dedup is keyed by the derived path: two URLs mapping to the
        // same file are one asset.
        let path = self.store.file_path(&url, false);
        if self.store.exists(&path) {
            return AssetOutcome::Skipped(SkipReason::AlreadyStored);
        }

        log!("fetch"; "downloading asset {}", url);
        let fetched = match self.transport.fetch(&self.cancel, &url) {
            Ok(fetched) => fetched,
            Err(err) => {
                log!("error"; "downloading asset {} failed: {}", url, err);
                return AssetOutcome::Failed(err);
            }
        };

        let body = match transform {
            TransformKind::None => fetched.body,
            TransformKind::Stylesheet => self.rewrite_stylesheet(&url, fetched.body),
            TransformKind::ImageRecode => recode_image(&self.image, &url, fetched.body),
        };

        if let Err(err) = self.store.write(&path, &body) {
            log!("error"; "writing asset {} to {} failed: {}", url, path.display(), err);
        }

        AssetOutcome::Fetched
    }

    /// Rewrite one stylesheet's references to point at local copies and
    /// queue the discovered assets for the drain phase.
    fn rewrite_stylesheet(&mut self, url: &Url, body: Vec<u8>) -> Vec<u8> {
        let mut text = match String::from_utf8(body) {
            Ok(text) => text,
            Err(e) => {
                // A literal rewrite over lossily decoded bytes would
                // corrupt the stored asset.
                debug!("css"; "{} is not valid UTF-8, left unchanged", url);
                return e.into_bytes();
            }
        };

        // Relative references resolve against the stylesheet's own
        // location, not the page base.
        let mut mapping: FxHashMap<String, String> = FxHashMap::default();
        for reference in scan_refs(&text) {
            let Ok(resolved) = url.join(reference.target) else {
                debug!("css"; "unresolvable reference `{}` in {}", reference.target, url);
                continue;
            };
            let resolved = normalize(&resolved);
            self.queue.push(resolved.clone());
            mapping.insert(
                reference.token.to_string(),
                self.store.local_reference(&resolved),
            );
        }

        for (token, local) in &mapping {
            let replacement = format!("url({local})");
            debug!("css"; "relinked {} -> {}", token, replacement);
            text = text.replace(token.as_str(), &replacement);
        }
        text.into_bytes()
    }
}

// ============================================================================
// Tests
// ============================================================================
