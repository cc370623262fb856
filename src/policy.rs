//! URL eligibility policy.
//!
//! Decides whether a URL is worth fetching at all. The pipeline treats
//! an ineligible URL as a silent skip, not an error.

use regex::Regex;
use url::Url;

use crate::config::FilterConfig;
use crate::core::is_fetchable;

/// Eligibility decision for a candidate URL.
pub trait DownloadPolicy {
    /// `depth` is the page depth of the referencing document; assets are
    /// checked with depth 0. `is_asset` distinguishes asset fetches from
    /// page fetches (pages at max depth are skipped, their assets not).
    fn should_download(&self, url: &Url, depth: usize, is_asset: bool) -> bool;
}

/// Config-driven policy: scheme, host allowlist, include/exclude
/// patterns, depth ceiling.
#[derive(Debug)]
pub struct MirrorPolicy {
    root_host: String,
    extra_hosts: Vec<String>,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    max_depth: usize,
}

impl MirrorPolicy {
    /// Build a policy for a mirrored site root from filter settings.
    ///
    /// Patterns are recompiled here even though config validation
    /// already checked them; the config may not have gone through
    /// validation when constructed programmatically.
    pub fn new(root: &Url, filter: &FilterConfig) -> anyhow::Result<Self> {
        let compile = |patterns: &[String]| -> anyhow::Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(Into::into))
                .collect()
        };

        Ok(Self {
            root_host: root.host_str().unwrap_or_default().to_string(),
            extra_hosts: filter.hosts.clone(),
            include: compile(&filter.include)?,
            exclude: compile(&filter.exclude)?,
            max_depth: filter.max_depth,
        })
    }

    fn host_allowed(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        host == self.root_host || self.extra_hosts.iter().any(|h| h == host)
    }
}

impl DownloadPolicy for MirrorPolicy {
    fn should_download(&self, url: &Url, depth: usize, is_asset: bool) -> bool {
        if !is_fetchable(url) {
            return false;
        }
        if !self.host_allowed(url) {
            return false;
        }
        if !is_asset && depth > self.max_depth {
            return false;
        }

        let target = url.as_str();
        if self.exclude.iter().any(|re| re.is_match(target)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(target)) {
            return false;
        }

        true
    }
}
