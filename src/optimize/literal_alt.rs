//! The literal-alternation matcher: a disjunction of literal strings is a
//! multi-substring search.
//!
//! Alternatives that are all single bytes additionally get a 256-entry
//! dispatch table, with `memchr`/`memchr2`/`memchr3` doing the scan for
//! the small counts that dominate in practice.

use memchr::{memchr, memchr2, memchr3, memmem};
use rustc_hash::FxHashSet;

use crate::parser::MAX_RECURSION_DEPTH;

use super::{literal_run, split_top_level};

#[derive(Debug)]
pub struct LiteralAlternation {
    finders: Vec<memmem::Finder<'static>>,
    /// Set when every alternative is a single byte.
    single: Option<SingleByteSet>,
}

#[derive(Debug)]
struct SingleByteSet {
    table: [bool; 256],
    bytes: Vec<u8>,
}

impl LiteralAlternation {
    /// Claims top-level alternations — possibly grouped, like `(a|b)` or
    /// `ab|(cd|ef)` — whose every leaf is a literal run, with no anchors.
    pub fn recognize(pattern: &str) -> Option<Self> {
        let mut leaves = Vec::new();
        flatten(pattern, 0, &mut leaves)?;
        if leaves.len() < 2 {
            return None;
        }

        // Duplicate alternatives add nothing to a boolean search.
        let mut seen = FxHashSet::default();
        leaves.retain(|leaf| seen.insert(leaf.clone()));

        let single = if leaves.iter().all(|l| l.len() == 1) {
            let mut table = [false; 256];
            let bytes: Vec<u8> = leaves.iter().map(|l| l[0]).collect();
            for &b in &bytes {
                table[b as usize] = true;
            }
            Some(SingleByteSet { table, bytes })
        } else {
            None
        };

        let finders = leaves
            .iter()
            .map(|l| memmem::Finder::new(l).into_owned())
            .collect();

        Some(LiteralAlternation { finders, single })
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        if let Some(set) = &self.single {
            return match set.bytes[..] {
                [a] => memchr(a, text).is_some(),
                [a, b] => memchr2(a, b, text).is_some(),
                [a, b, c] => memchr3(a, b, c, text).is_some(),
                _ => text.iter().any(|&b| set.table[b as usize]),
            };
        }
        self.finders.iter().any(|f| f.find(text).is_some())
    }
}

/// Recursively flatten a disjunction tree of literals. Fails on anything
/// that is not a pure disjunction: anchors, quantifiers, classes, or
/// concatenation with a group.
fn flatten(pattern: &str, depth: usize, out: &mut Vec<Vec<u8>>) -> Option<()> {
    if depth > MAX_RECURSION_DEPTH {
        return None;
    }

    let parts = split_top_level(pattern);
    if parts.len() > 1 {
        for part in parts {
            flatten(part, depth + 1, out)?;
        }
        return Some(());
    }

    let part = parts[0];
    if let Some(inner) = unwrap_group(part) {
        return flatten(inner, depth + 1, out);
    }

    out.push(literal_run(part)?);
    Some(())
}

/// If the whole string is one `(...)` or `(?:...)` group, return its body.
fn unwrap_group(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'(') || bytes.last() != Some(&b')') {
        return None;
    }

    // The opening paren must close at the very end.
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\\' {
            i += 2;
            continue;
        }
        if in_class {
            if c == b']' {
                in_class = false;
            }
            i += 1;
            continue;
        }
        match c {
            b'[' => in_class = true,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 && i != bytes.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let body = &s[1..s.len() - 1];
    Some(body.strip_prefix("?:").unwrap_or(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize() {
        assert!(LiteralAlternation::recognize("foo|bar").is_some());
        assert!(LiteralAlternation::recognize("(foo|bar)").is_some());
        assert!(LiteralAlternation::recognize("foo|(bar|baz)").is_some());
        assert!(LiteralAlternation::recognize("(?:a|b)|c").is_some());
        assert!(LiteralAlternation::recognize("a\\.b|c").is_some());

        assert!(LiteralAlternation::recognize("foo").is_none());
        assert!(LiteralAlternation::recognize("(foo)").is_none());
        assert!(LiteralAlternation::recognize("^foo|bar").is_none());
        assert!(LiteralAlternation::recognize("foo|bar$").is_none());
        assert!(LiteralAlternation::recognize("foo|b.r").is_none());
        assert!(LiteralAlternation::recognize("fo+|bar").is_none());
        assert!(LiteralAlternation::recognize("(a|b)c").is_none());
    }

    #[test]
    fn test_match_substrings() {
        let alt = LiteralAlternation::recognize("cat|dog|bird").unwrap();

        assert!(alt.is_match(b"hot dog stand"));
        assert!(alt.is_match(b"cat"));
        assert!(alt.is_match(b"xxbirdxx"));
        assert!(!alt.is_match(b"parrot"));
        assert!(!alt.is_match(b""));
    }

    #[test]
    fn test_empty_alternative_matches_everything() {
        let alt = LiteralAlternation::recognize("a|").unwrap();
        assert!(alt.is_match(b"zzz"));
        assert!(alt.is_match(b""));
    }

    #[test]
    fn test_single_byte_dispatch() {
        let alt = LiteralAlternation::recognize("a|b|c").unwrap();
        assert!(alt.single.is_some());
        assert!(alt.is_match(b"xxcxx"));
        assert!(!alt.is_match(b"xyz"));

        let alt = LiteralAlternation::recognize("a|b|c|d|e").unwrap();
        assert!(alt.is_match(b"zzzez"));
        assert!(!alt.is_match(b"zzz"));
    }

    #[test]
    fn test_duplicates_deduped() {
        let alt = LiteralAlternation::recognize("x|x|x|y").unwrap();
        assert_eq!(alt.finders.len(), 2);
        assert!(alt.is_match(b"some y here"));
    }

    #[test]
    fn test_grouped_flattening() {
        let alt = LiteralAlternation::recognize("(GET|PUT)|(POST|DELETE)").unwrap();
        assert!(alt.is_match(b"a POST request"));
        assert!(alt.is_match(b"GET"));
        assert!(!alt.is_match(b"PATCH"));
    }
}
