//! webmirror - asset acquisition pipeline for website mirroring.
//!
//! Given a parsed page's referenced resources, the pipeline decides
//! which references are worth fetching, fetches each at most once,
//! rewrites stylesheets so embedded references point at local copies,
//! and persists everything to disk. It is invoked once per page by an
//! outer crawl driver; crawl scheduling, retries and rate limiting live
//! there, not here.
//!
//! ```no_run
//! use url::Url;
//! use webmirror::{
//!     AssetPipeline, CancelToken, HttpTransport, MemoryIndex, MirrorConfig, MirrorPolicy,
//!     MirrorStore,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = MirrorConfig::default();
//! let root = Url::parse("https://example.com/")?;
//!
//! let mut pipeline = AssetPipeline::new(
//!     MirrorPolicy::new(&root, &config.filter)?,
//!     MirrorStore::new(&config.output, &root),
//!     HttpTransport::new(&config.fetch)?,
//!     CancelToken::new(),
//!     config.image.clone(),
//! );
//!
//! let index = MemoryIndex::new(); // filled from the page parser
//! pipeline.process_references(&index)?;
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod config;
pub mod core;
pub mod fetch;
pub mod index;
pub mod logger;
pub mod policy;
pub mod store;

pub use asset::{AssetOutcome, AssetPipeline, SkipReason, TransformKind};
pub use config::{ConfigError, MirrorConfig};
pub use fetch::{CancelToken, FetchError, FetchedAsset, HttpTransport, Transport};
pub use index::{IndexError, MemoryIndex, ReferenceIndex};
pub use policy::{DownloadPolicy, MirrorPolicy};
pub use store::{AssetStore, MirrorStore};
