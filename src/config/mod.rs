//! Mirror configuration for `mirror.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | top level  | Output directory                               |
//! | `[fetch]`  | Transport settings (user agent, timeout)       |
//! | `[filter]` | Eligibility rules (hosts, patterns, depth)     |
//! | `[image]`  | Image recoding for queued raster assets        |

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing mirror.toml
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Output directory the mirrored tree is written under
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Transport settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Eligibility rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Image recode settings
    #[serde(default)]
    pub image: ImageConfig,
}

fn default_output() -> PathBuf {
    PathBuf::from("mirror")
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            fetch: FetchConfig::default(),
            filter: FilterConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// Load configuration from a TOML file.
    ///
    /// Unknown keys are reported as warnings rather than errors, so a
    /// config written for a newer version still loads.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let de = toml::de::Deserializer::new(text);
        let config: Self = serde_ignored::deserialize(de, |key| {
            log!("config"; "unknown key `{}` ignored", key);
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values that serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output directory must not be empty".to_string(),
            ));
        }

        for pattern in self.filter.include.iter().chain(&self.filter.exclude) {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "invalid filter pattern `{pattern}`: {e}"
                )));
            }
        }

        if !(1..=100).contains(&self.image.quality) {
            return Err(ConfigError::Validation(format!(
                "image quality must be within 1..=100, got {}",
                self.image.quality
            )));
        }

        Ok(())
    }
}

// ============================================================================
// [fetch] section
// ============================================================================

/// Transport settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("webmirror/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: 30,
        }
    }
}

impl FetchConfig {
    /// Per-request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// ============================================================================
// [filter] section
// ============================================================================

/// Eligibility rules consumed by the download policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Additional hosts allowed besides the mirrored site's own host
    pub hosts: Vec<String>,
    /// URLs must match one of these patterns when non-empty
    pub include: Vec<String>,
    /// URLs matching any of these patterns are skipped
    pub exclude: Vec<String>,
    /// Maximum page depth; assets are always depth 0
    pub max_depth: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            max_depth: 10,
        }
    }
}

// ============================================================================
// [image] section
// ============================================================================

/// Target format for image recoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecodeFormat {
    Jpeg,
    Png,
}

/// Image recode settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Recode queued raster images to this format when set
    pub recode: Option<RecodeFormat>,
    /// JPEG quality used when recoding to jpeg
    pub quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            recode: None,
            quality: 85,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
