//! The general matcher: a two-set automaton simulation.
//!
//! This is the correctness floor every specialized matcher must agree
//! with. The simulation keeps a current and a next set of states, consumes
//! one input byte per step, and takes the epsilon closure through splits
//! and position-satisfied anchors after every transition. Each step is
//! O(state-count), so the whole match is immune to catastrophic
//! backtracking by construction.
//!
//! Start positions are gated by whatever the pattern guarantees about its
//! first bytes: start-anchored patterns seed only offset 0, a literal
//! prefix of three or more bytes seeds at Boyer-Moore hits, a known first
//! byte seeds at byte-scan hits, and everything else seeds every offset.
//! Seeding happens inside a single left-to-right pass, so threads from
//! different candidate offsets share the per-step dedup.

use parking_lot::Mutex;

use crate::literal::{mandatory_prefix, BmSearcher, BM_MIN_PREFIX};
use crate::{optimize, parser, Error};

use super::arena::{State, StateId, StateKind};
use super::sparse_set::SparseSet;

/// A compiled general automaton plus its compile-time precomputation.
#[derive(Debug)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
    anchored_start: bool,
    /// The pattern is `.*` alone and accepts everything.
    match_all: bool,
    first_byte: Option<u8>,
    bm: Option<BmSearcher>,
    /// Per-match working frames. Popping a frame for the duration of a
    /// match is what makes one handle safe to match from many threads.
    frames: Mutex<Vec<Frame>>,
}

/// The working state of one in-flight match: the two step sets and the
/// epsilon-closure worklist, all sized to the state count so the match
/// itself never allocates.
#[derive(Debug)]
struct Frame {
    current: SparseSet,
    next: SparseSet,
    stack: Vec<StateId>,
}

impl Frame {
    fn new(state_count: usize) -> Self {
        Frame {
            current: SparseSet::new(state_count),
            next: SparseSet::new(state_count),
            stack: Vec::with_capacity(state_count),
        }
    }
}

/// Compile a pattern down the general path.
pub(crate) fn compile(pattern: &str) -> Result<Nfa, Error> {
    let (arena, start, accept) = parser::parse(pattern)?;
    let states = arena.into_states();

    let branches = optimize::split_top_level(pattern);
    let anchored_start = branches.iter().all(|b| b.starts_with('^'));
    let match_all = pattern == ".*";

    let mut first_byte = None;
    let mut bm = None;
    if !anchored_start && branches.len() == 1 {
        let prefix = mandatory_prefix(pattern.as_bytes());
        if prefix.len() >= BM_MIN_PREFIX {
            first_byte = Some(prefix[0]);
            bm = Some(BmSearcher::new(prefix));
        } else if !prefix.is_empty() {
            first_byte = Some(prefix[0]);
        }
    }

    log::debug!(
        "general automaton for {:?}: {} states, anchored={}, prefix scan={}",
        pattern,
        states.len(),
        anchored_start,
        match bm.as_ref() {
            Some(bm) => format!("boyer-moore {:?}", bm.needle().escape_ascii().to_string()),
            None => match first_byte {
                Some(b) => format!("first byte {:?}", b as char),
                None => "none".to_string(),
            },
        }
    );

    let frame = Frame::new(states.len());
    Ok(Nfa {
        states,
        start,
        accept,
        anchored_start,
        match_all,
        first_byte,
        bm,
        frames: Mutex::new(vec![frame]),
    })
}

impl Nfa {
    /// Does the pattern match anywhere in `text`?
    pub fn is_match(&self, text: &[u8]) -> bool {
        if self.match_all {
            return true;
        }
        let mut frame = {
            let mut pool = self.frames.lock();
            pool.pop()
                .unwrap_or_else(|| Frame::new(self.states.len()))
        };
        let matched = self.search(text, &mut frame);
        self.frames.lock().push(frame);
        matched
    }

    fn search(&self, text: &[u8], frame: &mut Frame) -> bool {
        let len = text.len();
        let Frame {
            current,
            next,
            stack,
        } = frame;
        current.clear();

        let mut pos = 0;
        let mut seed = if self.anchored_start {
            Some(0)
        } else {
            self.next_candidate(text, 0)
        };

        loop {
            if seed == Some(pos) {
                add_thread(&self.states, current, stack, self.start, pos, len);
                seed = self.next_candidate(text, pos + 1);
            }

            if current.contains(self.accept.raw()) {
                return true;
            }
            if pos >= len {
                return false;
            }
            if current.is_empty() {
                // No live threads; jump to the next viable start.
                match seed {
                    Some(k) => {
                        pos = k;
                        continue;
                    }
                    None => return false,
                }
            }

            let byte = text[pos];
            next.clear();
            for i in 0..current.len() {
                let id = current.get(i);
                let state = &self.states[id as usize];
                let advances = match &state.kind {
                    StateKind::Byte(b) => *b == byte,
                    StateKind::Any => true,
                    StateKind::Class(class) => class.contains(byte),
                    _ => false,
                };
                if advances {
                    add_thread(&self.states, next, stack, state.out, pos + 1, len);
                }
            }
            std::mem::swap(current, next);
            pos += 1;
        }
    }

    /// Next offset at which a match could possibly begin, at or after
    /// `from`. None for anchored patterns (offset 0 is seeded up front).
    fn next_candidate(&self, text: &[u8], from: usize) -> Option<usize> {
        if self.anchored_start {
            return None;
        }
        if let Some(bm) = &self.bm {
            return bm.find(text, from);
        }
        if let Some(fb) = self.first_byte {
            if from >= text.len() {
                return None;
            }
            return memchr::memchr(fb, &text[from..]).map(|off| from + off);
        }
        if from <= text.len() {
            Some(from)
        } else {
            None
        }
    }
}

/// Insert a state and its position-aware epsilon closure into `set`.
///
/// Split arms are always followed; anchor arrows only when the position
/// condition holds. The sparse set doubles as the per-step dedup, bounding
/// closure work even though splits form cycles.
fn add_thread(
    states: &[State],
    set: &mut SparseSet,
    stack: &mut Vec<StateId>,
    sid: StateId,
    pos: usize,
    len: usize,
) {
    if sid.is_none() || !set.insert(sid.raw()) {
        return;
    }
    stack.push(sid);

    while let Some(id) = stack.pop() {
        let state = &states[id.index()];
        match state.kind {
            StateKind::Split => {
                for target in [state.out, state.out1] {
                    if !target.is_none() && set.insert(target.raw()) {
                        stack.push(target);
                    }
                }
            }
            StateKind::StartAnchor => {
                if pos == 0 {
                    let target = state.out;
                    if !target.is_none() && set.insert(target.raw()) {
                        stack.push(target);
                    }
                }
            }
            StateKind::EndAnchor => {
                if pos == len {
                    let target = state.out;
                    if !target.is_none() && set.insert(target.raw()) {
                        stack.push(target);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, text: &str) -> bool {
        compile(pattern).unwrap().is_match(text.as_bytes())
    }

    #[test]
    fn test_literal_and_dot() {
        assert!(m("h.llo", "hello"));
        assert!(m("h.llo", "h@llo"));
        assert!(m("h.llo", "say hello"));
        assert!(!m("h.llo", "hllo"));
    }

    #[test]
    fn test_quantifiers() {
        assert!(m("ab*c", "ac"));
        assert!(m("ab*c", "abbbc"));
        assert!(!m("ab*c", "axc"));

        assert!(m("ab+c", "abc"));
        assert!(m("ab+c", "xabcy"));
        assert!(!m("ab+c", "ac"));

        assert!(m("ab?c", "ac"));
        assert!(m("ab?c", "abc"));
        assert!(!m("ab?c", "abbc"));
    }

    #[test]
    fn test_anchors() {
        assert!(m("^hello$", "hello"));
        assert!(!m("^hello$", "hello world"));
        assert!(!m("^hello$", "say hello"));
        assert!(m("^a*b", "aaab"));
        assert!(!m("^a*b", "cab"));
        assert!(m("ab*$", "abbb"));
        assert!(!m("ab*$", "abc"));
    }

    #[test]
    fn test_anchor_inside_alternation() {
        assert!(m("^a|b", "axx"));
        assert!(m("^a|b", "xxb"));
        assert!(!m("^a|b", "xxa"));
    }

    #[test]
    fn test_classes() {
        assert!(m("[a-z]+", "HELLO world"));
        assert!(!m("[a-z]+", "HELLO WORLD"));
        assert!(m("[^0-9]+", "abc"));
        assert!(!m("[^0-9]+", "123"));
        assert!(m("[^0-9]+", "a1b2"));
    }

    #[test]
    fn test_groups_and_alternation() {
        assert!(m("(ab)+", "xababy"));
        assert!(m("(a|b)c", "bc"));
        assert!(!m("(a|b)c", "cc"));
        assert!(m("(?:ab)?c", "c"));
    }

    #[test]
    fn test_empty_branch_matches_empty() {
        assert!(m("a|", "zzz"));
        assert!(m("(a|)b", "b"));
        assert!(m("(a|)b", "ab"));
        assert!(m("^(a|)$", ""));
        assert!(m("^(a|)$", "a"));
        assert!(!m("^(a|)$", "b"));
    }

    #[test]
    fn test_boyer_moore_gated_search() {
        // prefix "hello" >= 3 bytes triggers the Boyer-Moore gate
        assert!(m("hello.", "xxxxxxxxxxhelloZyyy"));
        assert!(!m("hello.", "xxxxxxxxxxhello"));
        assert!(m("hello.$", "hell hello!"));
    }

    #[test]
    fn test_no_catastrophic_backtracking() {
        let text = format!("{}X", "a".repeat(30));
        assert!(m("(a+)+", &text));

        let text = format!("{}!", "a".repeat(2000));
        assert!(!m("^(a|aa)+$", &text));
    }

    #[test]
    fn test_match_all_fast_path() {
        let nfa = compile(".*").unwrap();
        assert!(nfa.is_match(b""));
        assert!(nfa.is_match(b"anything"));
    }

    #[test]
    fn test_shared_handle_across_threads() {
        use std::sync::Arc;

        let nfa = Arc::new(compile("ab+c").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let nfa = Arc::clone(&nfa);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        assert!(nfa.is_match(b"xxabbbcxx"));
                        assert!(!nfa.is_match(b"xxabxx"));
                    }
                    i
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
