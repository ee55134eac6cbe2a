//! The `https?://[class]+` matcher.
//!
//! Scans for `http`, accepts an optional `s`, requires `://`, then
//! consumes a run of class bytes; a non-empty run is a match.

use memchr::memmem;

use crate::automaton::ByteClass;
use crate::parser::read_class;

#[derive(Debug)]
pub struct UrlShape {
    class: ByteClass,
    scheme: memmem::Finder<'static>,
}

impl UrlShape {
    /// Claims patterns of the exact form `https?://[class]+` — no
    /// anchors, nothing else.
    pub fn recognize(pattern: &str) -> Option<Self> {
        let rest = pattern.strip_prefix("https?://")?;
        let bytes = rest.as_bytes();
        if bytes.first() != Some(&b'[') {
            return None;
        }

        let mut index = 1;
        let class = read_class(bytes, &mut index).ok()?;
        if bytes.get(index) != Some(&b'+') || index + 1 != bytes.len() {
            return None;
        }

        Some(UrlShape {
            class,
            scheme: memmem::Finder::new("http").into_owned(),
        })
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        for hit in self.scheme.find_iter(text) {
            let mut i = hit + 4;
            if text.get(i) == Some(&b's') {
                i += 1;
            }
            if !text[i.min(text.len())..].starts_with(b"://") {
                continue;
            }
            i += 3;
            if text.get(i).is_some_and(|&b| self.class.contains(b)) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize() {
        assert!(UrlShape::recognize("https?://[a-z]+").is_some());
        assert!(UrlShape::recognize("https?://[a-zA-Z0-9./-]+").is_some());

        assert!(UrlShape::recognize("http://[a-z]+").is_none());
        assert!(UrlShape::recognize("^https?://[a-z]+").is_none());
        assert!(UrlShape::recognize("https?://[a-z]+x").is_none());
        assert!(UrlShape::recognize("https?://[a-z]*").is_none());
        assert!(UrlShape::recognize("https?://abc").is_none());
    }

    #[test]
    fn test_match() {
        let url = UrlShape::recognize("https?://[a-z.]+").unwrap();

        assert!(url.is_match(b"see https://example.com for details"));
        assert!(url.is_match(b"http://example.com"));
        assert!(url.is_match(b"xhttps://e"));
        assert!(!url.is_match(b"https:// example.com"));
        assert!(!url.is_match(b"https://"));
        assert!(!url.is_match(b"ftp://example.com"));
        assert!(!url.is_match(b"httpx://example.com"));
        assert!(!url.is_match(b""));
    }

    #[test]
    fn test_match_retries_later_occurrences() {
        let url = UrlShape::recognize("https?://[a-z]+").unwrap();
        assert!(url.is_match(b"http:/broken then https://ok"));
    }
}
