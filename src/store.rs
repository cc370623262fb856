//! Asset storage: URL → on-disk path mapping, existence check, write.
//!
//! The derived file path is the single source of truth for dedup: a URL
//! whose derived path already exists on disk is treated as satisfied,
//! even if a different URL produced that path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use percent_encoding::percent_decode_str;
use url::Url;

/// Storage collaborator consumed by the asset pipeline.
pub trait AssetStore {
    /// Derive the on-disk path for a URL. The query string does not
    /// participate; two URLs differing only by query share a path.
    fn file_path(&self, url: &Url, is_page: bool) -> PathBuf;

    /// Check whether an asset is already materialized at this path.
    fn exists(&self, path: &Path) -> bool;

    /// Persist one asset's bytes, creating parent directories.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Site-root-relative reference to the local copy of a URL, used
    /// when rewriting stylesheet references.
    fn local_reference(&self, url: &Url) -> String;
}

/// Filesystem store mirroring each host under `output/<host>/`.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    output: PathBuf,
    root_host: String,
}

impl MirrorStore {
    /// Create a store writing below `output`, mirroring the site whose
    /// root URL is `root`.
    pub fn new(output: impl Into<PathBuf>, root: &Url) -> Self {
        Self {
            output: output.into(),
            root_host: root.host_str().unwrap_or_default().to_string(),
        }
    }

    /// Decoded, traversal-safe path segments of a URL.
    ///
    /// The URL parser already collapses plain `.`/`..` segments, but a
    /// percent-encoded separator decodes into one, so separators are
    /// neutralized after decoding and dot segments dropped again.
    fn url_segments(url: &Url) -> Vec<String> {
        url.path_segments()
            .map(|segments| {
                segments
                    .map(|s| {
                        percent_decode_str(s)
                            .decode_utf8()
                            .map(|d| d.into_owned())
                            .unwrap_or_else(|_| s.to_string())
                            .replace(['/', '\\'], "_")
                    })
                    .filter(|s| !s.is_empty() && s != "." && s != "..")
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl AssetStore for MirrorStore {
    fn file_path(&self, url: &Url, is_page: bool) -> PathBuf {
        let host = url.host_str().unwrap_or("unknown-host");
        let mut path = self.output.join(host);

        let segments = Self::url_segments(url);
        let trailing_slash = url.path().ends_with('/');
        for segment in &segments {
            path.push(segment);
        }

        // Pages addressed as directories (or without an extension) are
        // stored as the directory's index document. Assets keep their
        // file name; a bare host fetched as an asset gets one too.
        let needs_index = segments.is_empty()
            || trailing_slash
            || (is_page && !segments.last().is_some_and(|s| s.contains('.')));
        if needs_index {
            path.push("index.html");
        }

        path
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    fn local_reference(&self, url: &Url) -> String {
        let segments = Self::url_segments(url);
        let joined = segments.join("/");

        match url.host_str() {
            // Cross-host assets live under a sibling host directory.
            Some(host) if host != self.root_host => format!("/{host}/{joined}"),
            _ => format!("/{joined}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(output: &Path) -> MirrorStore {
        let root = Url::parse("https://example.com/").unwrap();
        MirrorStore::new(output, &root)
    }

    fn u(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_file_path_asset() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.file_path(&u("https://example.com/img/logo.png"), false),
            PathBuf::from("out/example.com/img/logo.png")
        );
    }

    #[test]
    fn test_file_path_page_directory() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.file_path(&u("https://example.com/posts/"), true),
            PathBuf::from("out/example.com/posts/index.html")
        );
        assert_eq!(
            s.file_path(&u("https://example.com/"), true),
            PathBuf::from("out/example.com/index.html")
        );
    }

    #[test]
    fn test_file_path_page_without_extension() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.file_path(&u("https://example.com/about"), true),
            PathBuf::from("out/example.com/about/index.html")
        );
        assert_eq!(
            s.file_path(&u("https://example.com/page.html"), true),
            PathBuf::from("out/example.com/page.html")
        );
    }

    #[test]
    fn test_file_path_ignores_query() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.file_path(&u("https://example.com/a.css?v=2"), false),
            s.file_path(&u("https://example.com/a.css"), false),
        );
    }

    #[test]
    fn test_file_path_decodes_percent_encoding() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.file_path(&u("https://example.com/img/sp%20ace.png"), false),
            PathBuf::from("out/example.com/img/sp ace.png")
        );
    }

    #[test]
    fn test_file_path_neutralizes_traversal() {
        let s = store(Path::new("out"));

        // Plain dot segments are collapsed by the URL parser itself.
        let path = s.file_path(&u("https://example.com/a/../../etc/passwd"), false);
        assert_eq!(path, PathBuf::from("out/example.com/etc/passwd"));

        // Encoded separators must not escape the host directory.
        let path = s.file_path(&u("https://example.com/a/..%2F..%2Fetc/passwd"), false);
        assert!(path.starts_with("out/example.com"));
        assert!(
            path.components()
                .all(|c| c != std::path::Component::ParentDir)
        );
    }

    #[test]
    fn test_local_reference_same_host() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.local_reference(&u("https://example.com/assets/a.png")),
            "/assets/a.png"
        );
    }

    #[test]
    fn test_local_reference_cross_host() {
        let s = store(Path::new("out"));
        assert_eq!(
            s.local_reference(&u("https://cdn.example.com/lib/app.js")),
            "/cdn.example.com/lib/app.js"
        );
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let s = store(dir.path());

        let path = dir.path().join("example.com/deep/nested/a.txt");
        assert!(!s.exists(&path));

        s.write(&path, b"content").unwrap();
        assert!(s.exists(&path));
        assert_eq!(fs::read(&path).unwrap(), b"content");
    }
}
