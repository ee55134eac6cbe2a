//! The trie DFA: single literals and uniformly anchored literal
//! alternations.
//!
//! Each trie node is a DFA state — an accept flag and a 256-entry next
//! table. Anchored patterns walk once from the root; unanchored ones walk
//! from every offset, which is O(n·m) in the worst case but
//! branch-predictable and cache-friendly.

use super::{literal_run, split_top_level, strip_end_anchor};

const NONE: u32 = u32::MAX;

#[derive(Debug)]
struct DfaState {
    accept: bool,
    next: Box<[u32; 256]>,
}

impl DfaState {
    fn new() -> Self {
        DfaState {
            accept: false,
            next: Box::new([NONE; 256]),
        }
    }
}

#[derive(Debug)]
pub struct LiteralDfa {
    states: Vec<DfaState>,
    anchored_start: bool,
    anchored_end: bool,
}

impl LiteralDfa {
    /// Claims patterns built only of literal bytes, escapes, and
    /// top-level `|`, with uniform anchoring: every branch carries the
    /// same leading `^` / trailing `$` or none do.
    pub fn recognize(pattern: &str) -> Option<Self> {
        let branches = split_top_level(pattern);

        let anchored_start = branches.iter().all(|b| b.starts_with('^'));
        if !anchored_start && branches.iter().any(|b| b.starts_with('^')) {
            return None;
        }

        let mut literals = Vec::with_capacity(branches.len());
        let mut end_flags = Vec::with_capacity(branches.len());
        for &branch in &branches {
            let branch = if anchored_start { &branch[1..] } else { branch };
            let (branch, end) = strip_end_anchor(branch);
            end_flags.push(end);
            literals.push(literal_run(branch)?);
        }

        let anchored_end = end_flags.iter().all(|&e| e);
        if !anchored_end && end_flags.iter().any(|&e| e) {
            return None;
        }

        let mut states = vec![DfaState::new()];
        for literal in &literals {
            let mut node = 0usize;
            for &b in literal {
                let next = states[node].next[b as usize];
                node = if next == NONE {
                    let id = states.len() as u32;
                    states[node].next[b as usize] = id;
                    states.push(DfaState::new());
                    id as usize
                } else {
                    next as usize
                };
            }
            states[node].accept = true;
        }

        Some(LiteralDfa {
            states,
            anchored_start,
            anchored_end,
        })
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        if self.anchored_start {
            return self.walk(text);
        }
        // An accepting root with a free end matches everywhere.
        if self.states[0].accept && !self.anchored_end {
            return true;
        }
        (0..=text.len()).any(|offset| self.walk(&text[offset..]))
    }

    /// Walk the trie over `text` from its start; accept on any accepting
    /// node, additionally requiring end-of-input when end-anchored.
    fn walk(&self, text: &[u8]) -> bool {
        let mut node = 0usize;
        if self.states[node].accept && (!self.anchored_end || text.is_empty()) {
            return true;
        }
        for (i, &b) in text.iter().enumerate() {
            let next = self.states[node].next[b as usize];
            if next == NONE {
                return false;
            }
            node = next as usize;
            if self.states[node].accept && (!self.anchored_end || i + 1 == text.len()) {
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
        assert!(LiteralDfa::recognize("hello").is_some());
        assert!(LiteralDfa::recognize("^hello").is_some());
        assert!(LiteralDfa::recognize("hello$").is_some());
        assert!(LiteralDfa::recognize("^hello$").is_some());
        assert!(LiteralDfa::recognize("^a$|^b$").is_some());
        assert!(LiteralDfa::recognize("a$|b$").is_some());
        assert!(LiteralDfa::recognize("a\\.b").is_some());
        assert!(LiteralDfa::recognize("").is_some());
        assert!(LiteralDfa::recognize("^$").is_some());

        assert!(LiteralDfa::recognize("h.llo").is_none());
        assert!(LiteralDfa::recognize("a+").is_none());
        assert!(LiteralDfa::recognize("(ab)").is_none());
        assert!(LiteralDfa::recognize("[ab]").is_none());
        // mixed anchoring falls through to the general path
        assert!(LiteralDfa::recognize("^a|b").is_none());
        assert!(LiteralDfa::recognize("a$|b").is_none());
    }

    #[test]
    fn test_unanchored_literal() {
        let dfa = LiteralDfa::recognize("hello").unwrap();
        assert!(dfa.is_match(b"hello"));
        assert!(dfa.is_match(b"say hello there"));
        assert!(!dfa.is_match(b"hell"));
        assert!(!dfa.is_match(b""));
    }

    #[test]
    fn test_anchored_literal() {
        let dfa = LiteralDfa::recognize("^hello$").unwrap();
        assert!(dfa.is_match(b"hello"));
        assert!(!dfa.is_match(b"hello world"));
        assert!(!dfa.is_match(b"say hello"));
        assert!(!dfa.is_match(b""));

        let dfa = LiteralDfa::recognize("^hell").unwrap();
        assert!(dfa.is_match(b"hello"));
        assert!(!dfa.is_match(b"shell"));
    }

    #[test]
    fn test_end_anchored_alternation() {
        let dfa = LiteralDfa::recognize("jpg$|png$|gif$").unwrap();
        assert!(dfa.is_match(b"photo.jpg"));
        assert!(dfa.is_match(b"image.png"));
        assert!(dfa.is_match(b"gif"));
        assert!(!dfa.is_match(b"photo.jpg.bak"));
        assert!(!dfa.is_match(b"jpeg"));
    }

    #[test]
    fn test_shared_prefix_alternatives() {
        let dfa = LiteralDfa::recognize("^abc$|^abd$|^ab$").unwrap();
        assert!(dfa.is_match(b"abc"));
        assert!(dfa.is_match(b"abd"));
        assert!(dfa.is_match(b"ab"));
        assert!(!dfa.is_match(b"abe"));
        assert!(!dfa.is_match(b"abcd"));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let dfa = LiteralDfa::recognize("").unwrap();
        assert!(dfa.is_match(b""));
        assert!(dfa.is_match(b"anything"));
    }

    #[test]
    fn test_empty_both_anchored() {
        let dfa = LiteralDfa::recognize("^$").unwrap();
        assert!(dfa.is_match(b""));
        assert!(!dfa.is_match(b"x"));
    }
}
