//! Reference index collaborator contract.
//!
//! The index is built by the page parser and queried once per category
//! during a pass. A category that fails to extract must not abort the
//! others; the pipeline logs the failure and moves on.

use rustc_hash::FxHashMap;
use thiserror::Error;
use url::Url;

use crate::core::RefCategory;

/// Failure to extract one category's references from a parsed page.
#[derive(Debug, Error)]
#[error("extracting `{category}` references failed: {message}")]
pub struct IndexError {
    /// Tag name of the failing category
    pub category: &'static str,
    /// Parser-specific description
    pub message: String,
}

impl IndexError {
    pub fn new(category: RefCategory, message: impl Into<String>) -> Self {
        Self {
            category: category.name(),
            message: message.into(),
        }
    }
}

/// Per-category access to a parsed page's referenced URLs.
///
/// URLs are returned in source-document order; the pipeline preserves
/// that order within a category.
pub trait ReferenceIndex {
    fn urls(&self, category: RefCategory) -> Result<Vec<Url>, IndexError>;
}

/// Reference index backed by a prebuilt category map.
///
/// The seam between the page parser and the pipeline: drivers fill one
/// of these from their parse results, tests fill it by hand.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    refs: FxHashMap<RefCategory, Vec<Url>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference under a category.
    pub fn insert(&mut self, category: RefCategory, url: Url) {
        self.refs.entry(category).or_default().push(url);
    }

    /// Append all references under a category, preserving order.
    pub fn extend(&mut self, category: RefCategory, urls: impl IntoIterator<Item = Url>) {
        self.refs.entry(category).or_default().extend(urls);
    }
}

impl ReferenceIndex for MemoryIndex {
    fn urls(&self, category: RefCategory) -> Result<Vec<Url>, IndexError> {
        Ok(self.refs.get(&category).cloned().unwrap_or_default())
    }
}
