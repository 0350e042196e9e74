//! Proxy-accelerated download launch.

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Default accelerator origin prepended to asset URLs.
pub const DEFAULT_PROXY: &str = "https://ghproxy.net";

/// The characters `encodeURI` percent-encodes: controls, space, and the
/// handful of characters that are neither unreserved nor reserved in a URI.
/// Reserved characters (`:/?#&=+$,;@` and friends) pass through so the
/// accelerator receives a readable absolute URL in its path.
const ENCODE_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%')
    .add(b'[')
    .add(b']');

/// Rewrites an asset URL to route through the accelerator origin.
pub fn accelerated_url(proxy: &str, url: &str) -> String {
    format!(
        "{}/{}",
        proxy.trim_end_matches('/'),
        utf8_percent_encode(url, ENCODE_URI)
    )
}

/// Seam for opening a URL in a new browsing context, so the state machine
/// can be exercised in tests without spawning a browser.
#[cfg_attr(test, mockall::automock)]
pub trait Navigate {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform default browser, detached from the
/// console process.
pub struct Browser;

impl Navigate for Browser {
    #[tracing::instrument(skip(self))]
    fn open(&self, url: &str) -> Result<()> {
        open::that_detached(url).with_context(|| format!("Failed to open {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerated_url_prefixes_proxy() {
        assert_eq!(
            accelerated_url(DEFAULT_PROXY, "https://example.com/a/b.zip"),
            "https://ghproxy.net/https://example.com/a/b.zip"
        );
    }

    #[test]
    fn test_accelerated_url_keeps_reserved_characters() {
        let url = "https://example.com/dl?name=tool&v=1";
        assert_eq!(
            accelerated_url(DEFAULT_PROXY, url),
            format!("{}/{}", DEFAULT_PROXY, url)
        );
    }

    #[test]
    fn test_accelerated_url_encodes_spaces() {
        assert_eq!(
            accelerated_url(DEFAULT_PROXY, "https://example.com/my file.zip"),
            "https://ghproxy.net/https://example.com/my%20file.zip"
        );
    }

    #[test]
    fn test_accelerated_url_encodes_non_ascii() {
        assert_eq!(
            accelerated_url(DEFAULT_PROXY, "https://example.com/包.zip"),
            "https://ghproxy.net/https://example.com/%E5%8C%85.zip"
        );
    }

    #[test]
    fn test_accelerated_url_tolerates_trailing_slash_on_proxy() {
        assert_eq!(
            accelerated_url("https://ghproxy.net/", "https://example.com/a.zip"),
            "https://ghproxy.net/https://example.com/a.zip"
        );
    }
}
