//! URL validation and rewriting ahead of a fetch.

/// Suffix some hosts serve animated images under as a video container.
const VIDEO_SUFFIX: &str = ".gifv";

/// Still-image suffix the video suffix is rewritten to.
const IMAGE_SUFFIX: &str = ".gif";

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string before fetching.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an `http` or `https` scheme and a host
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Rewrite a `.gifv` path to `.gif`.
///
/// Only the end of the path is considered; query and fragment are untouched.
/// Returns whether the URL changed.
pub fn rewrite_video_suffix(url: &mut url::Url) -> bool {
    let Some(stem) = url.path().strip_suffix(VIDEO_SUFFIX) else {
        return false;
    };

    let rewritten = format!("{stem}{IMAGE_SUFFIX}");
    url.set_path(&rewritten);
    true
}

/// Canonicalize `input` and apply the `.gifv` rewrite.
pub fn resolve_fetch_url(input: &str) -> Result<url::Url, UrlError> {
    let mut url = canonicalize(input)?;
    if rewrite_video_suffix(&mut url) {
        tracing::debug!("rewrote {} to {}", input.trim(), url);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_gifv_rewrite() {
        let url = resolve_fetch_url("http://imgur.test/z.gifv").unwrap();
        assert_eq!(url.as_str(), "http://imgur.test/z.gif");
    }

    #[test]
    fn test_resolve_gifv_keeps_query() {
        let url = resolve_fetch_url("https://i.imgur.test/abc.gifv?raw=1").unwrap();
        assert_eq!(url.as_str(), "https://i.imgur.test/abc.gif?raw=1");
    }

    #[test]
    fn test_resolve_gif_untouched() {
        let url = resolve_fetch_url("http://x.test/a.gif").unwrap();
        assert_eq!(url.as_str(), "http://x.test/a.gif");
    }

    #[test]
    fn test_resolve_gifv_mid_path_untouched() {
        let url = resolve_fetch_url("http://x.test/a.gifv/b.png").unwrap();
        assert_eq!(url.path(), "/a.gifv/b.png");
    }

    #[test]
    fn test_resolve_gifv_in_query_untouched() {
        let url = resolve_fetch_url("http://x.test/view?file=a.gifv").unwrap();
        assert_eq!(url.as_str(), "http://x.test/view?file=a.gifv");
    }

    #[test]
    fn test_rewrite_reports_change() {
        let mut url = url::Url::parse("http://x.test/a.gifv").unwrap();
        assert!(rewrite_video_suffix(&mut url));
        assert!(!rewrite_video_suffix(&mut url));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/a.gif#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/a.gif");
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://example.com/a.gif  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a.gif");
    }

    #[test]
    fn test_canonicalize_requires_scheme() {
        let result = canonicalize("example.com/a.gif");
        assert!(matches!(result, Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("ftp://example.com/a.gif");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }
}
