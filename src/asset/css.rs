//! Stylesheet reference scanning.
//!
//! Finds `url(...)` tokens in stylesheet text. The stylesheet is
//! treated as flat text, not an AST: each occurrence is reported with
//! its exact literal token so the rewrite can substitute the whole
//! token verbatim.

use std::sync::LazyLock;

use regex::Regex;

/// One URL-bearing token occurrence in stylesheet text.
#[derive(Debug, PartialEq, Eq)]
pub struct CssRef<'a> {
    /// Exact literal token text, e.g. `url("bg.png")`.
    pub token: &'a str,
    /// Referenced target inside the token, unquoted.
    pub target: &'a str,
}

/// `url(...)` in its three quoting forms. Unquoted targets cannot
/// contain whitespace, quotes or `)` per CSS syntax.
static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^"')\s]+))\s*\)"#).unwrap()
});

/// Scan stylesheet text for URL-bearing tokens, in source order.
///
/// `data:` URIs embed their content and `#fragment` targets reference
/// the containing document itself; neither is a fetchable asset, so
/// both are skipped.
pub fn scan_refs(css: &str) -> Vec<CssRef<'_>> {
    URL_TOKEN
        .captures_iter(css)
        .filter_map(|caps| {
            let token = caps.get(0)?.as_str();
            let target = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str()
                .trim();

            if target.is_empty() || target.starts_with("data:") || target.starts_with('#') {
                return None;
            }

            Some(CssRef { token, target })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_unquoted() {
        let refs = scan_refs("body { background: url(bg.png); }");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].token, "url(bg.png)");
        assert_eq!(refs[0].target, "bg.png");
    }

    #[test]
    fn test_scan_double_quoted() {
        let refs = scan_refs(r#"div { background: url("img/b g.png"); }"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].token, r#"url("img/b g.png")"#);
        assert_eq!(refs[0].target, "img/b g.png");
    }

    #[test]
    fn test_scan_single_quoted() {
        let refs = scan_refs("div { background: url('a.png'); }");
        assert_eq!(refs[0].token, "url('a.png')");
        assert_eq!(refs[0].target, "a.png");
    }

    #[test]
    fn test_scan_case_insensitive() {
        let refs = scan_refs("div { background: URL(a.png); }");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].token, "URL(a.png)");
    }

    #[test]
    fn test_scan_surrounding_whitespace() {
        let refs = scan_refs("div { background: url(  a.png  ); }");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "a.png");
    }

    #[test]
    fn test_scan_multiple_in_source_order() {
        let refs = scan_refs("a { background: url(one.png); } b { background: url(two.png); }");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].target, "one.png");
        assert_eq!(refs[1].target, "two.png");
    }

    #[test]
    fn test_scan_skips_data_uri() {
        let refs = scan_refs("div { background: url(data:image/png;base64,iVBOR); }");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_scan_skips_fragment_reference() {
        // SVG filter/mask references point into the document itself.
        let refs = scan_refs("rect { filter: url(#blur); }");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_scan_skips_empty() {
        assert!(scan_refs("div { background: url(); }").is_empty());
        assert!(scan_refs("div { background: url(\"\"); }").is_empty());
    }

    #[test]
    fn test_scan_none() {
        assert!(scan_refs("body { color: red; }").is_empty());
    }

    #[test]
    fn test_scan_absolute_and_relative_targets() {
        let refs = scan_refs("@font-face { src: url(/fonts/a.woff2), url(../b.woff); }");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].target, "/fonts/a.woff2");
        assert_eq!(refs[1].target, "../b.woff");
    }
}
