//! Asset URL normalization.
//!
//! Two URLs that differ only by fragment name the same asset, so the
//! fragment is always stripped before a URL is used as an eligibility,
//! path-derivation or dedup key.

use url::Url;

/// Normalize a URL for use as an asset location: strips the fragment.
///
/// Query strings are kept - `style.css?v=2` may serve different bytes
/// than `style.css`.
pub fn normalize(url: &Url) -> Url {
    if url.fragment().is_none() {
        return url.clone();
    }
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Check if a URL uses a scheme the transport can fetch.
#[inline]
pub fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fragment() {
        let url = Url::parse("https://example.com/a.png#top").unwrap();
        assert_eq!(normalize(&url).as_str(), "https://example.com/a.png");
    }

    #[test]
    fn test_normalize_keeps_query() {
        let url = Url::parse("https://example.com/style.css?v=2#s").unwrap();
        assert_eq!(
            normalize(&url).as_str(),
            "https://example.com/style.css?v=2"
        );
    }

    #[test]
    fn test_normalize_without_fragment_is_identity() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        assert_eq!(normalize(&url), url);
    }

    #[test]
    fn test_fragment_only_difference_normalizes_equal() {
        let a = Url::parse("https://example.com/a.png#one").unwrap();
        let b = Url::parse("https://example.com/a.png#two").unwrap();
        assert_eq!(normalize(&a), normalize(&b));
    }

    #[test]
    fn test_is_fetchable() {
        assert!(is_fetchable(&Url::parse("http://example.com/").unwrap()));
        assert!(is_fetchable(&Url::parse("https://example.com/").unwrap()));
        assert!(!is_fetchable(&Url::parse("data:text/plain,x").unwrap()));
        assert!(!is_fetchable(&Url::parse("mailto:a@b.c").unwrap()));
    }

    #[test]
    fn test_join_resolves_against_stylesheet_directory() {
        // Relative references inside a stylesheet resolve against the
        // stylesheet's own directory, which is what Url::join does when
        // the base is the stylesheet URL itself.
        let css = Url::parse("https://example.com/css/style.css").unwrap();
        assert_eq!(
            css.join("bg.png").unwrap().as_str(),
            "https://example.com/css/bg.png"
        );
        assert_eq!(
            css.join("../img/bg.png").unwrap().as_str(),
            "https://example.com/img/bg.png"
        );
        assert_eq!(
            css.join("/img/bg.png").unwrap().as_str(),
            "https://example.com/img/bg.png"
        );
    }
}
