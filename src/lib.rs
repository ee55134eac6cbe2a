//! linrex: a limited-feature, linear-time regular expression engine.
//!
//! Compiles a pattern once, then answers "does it match anywhere in this
//! text" with a single boolean. The supported syntax:
//!
//! - `.` any byte
//! - `*` `+` `?` greedy quantifiers on the previous atom
//! - `^` `$` anchors
//! - `|` alternation (also inside groups)
//! - `\x` literal byte x
//! - `[...]` `[^...]` `[a-z]` byte classes
//! - `(...)` and `(?:...)` non-capturing groups
//!
//! There is no capture-group reporting, no lazy quantifiers, no
//! back-references, and no Unicode awareness: text is compared byte by
//! byte. In exchange, matching is immune to catastrophic backtracking —
//! the general path is an automaton simulation whose work is bounded by
//! state-count × text-length — and common pattern shapes are recognized
//! at compile time and routed to matchers that beat the general
//! simulation outright.
//!
//! ```
//! use linrex::Pattern;
//!
//! let p = Pattern::compile("ab+c").unwrap();
//! assert!(p.is_match("xxabbbcxx"));
//! assert!(!p.is_match("abx"));
//! ```
//!
//! A compiled [`Pattern`] is immutable and `Send + Sync`; one handle can
//! serve concurrent matches from many threads.

mod automaton;
mod literal;
mod optimize;
mod parser;

use optimize::{
    AdvancedAlternation, BothAnchorsLiteral, LiteralAlternation, LiteralDfa, UrlShape,
};

pub use parser::{MAX_ALTERNATION_BRANCHES, MAX_PATTERN_LEN, MAX_RECURSION_DEPTH};

/// Why a pattern failed to compile.
#[derive(Debug)]
pub enum Error {
    /// Pattern longer than [`MAX_PATTERN_LEN`] bytes.
    PatternTooLong,
    /// Group nesting deeper than [`MAX_RECURSION_DEPTH`].
    RecursionTooDeep,
    /// One alternation with more than [`MAX_ALTERNATION_BRANCHES`] branches.
    TooManyAlternatives,
    /// The automaton state pool was exhausted.
    TooManyStates,
    /// Malformed pattern syntax.
    Syntax { message: String, offset: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PatternTooLong => write!(f, "pattern too long (exceeds security limit)"),
            Error::RecursionTooDeep => write!(f, "pattern nesting too deep"),
            Error::TooManyAlternatives => write!(f, "too many alternation branches"),
            Error::TooManyStates => write!(f, "pattern requires too many automaton states"),
            Error::Syntax { message, offset } => write!(f, "{} at offset {}", message, offset),
        }
    }
}

impl std::error::Error for Error {}

/// A compiled pattern.
///
/// Built by [`Pattern::compile`]; queried with [`Pattern::is_match`];
/// everything it owns is released on drop.
#[derive(Debug)]
pub struct Pattern {
    matcher: Matcher,
}

/// Exactly one matcher branch is active per handle, chosen at compile
/// time in fixed priority order.
#[derive(Debug)]
enum Matcher {
    BothAnchors(BothAnchorsLiteral),
    Url(UrlShape),
    LiteralAlt(LiteralAlternation),
    AdvancedAlt(AdvancedAlternation),
    Dfa(LiteralDfa),
    General(automaton::Nfa),
}

impl Pattern {
    /// Compile a pattern, trying each specialized matcher in priority
    /// order and falling back to the general automaton.
    pub fn compile(pattern: &str) -> Result<Pattern, Error> {
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(Error::PatternTooLong);
        }
        if optimize::split_top_level(pattern).len() > MAX_ALTERNATION_BRANCHES {
            return Err(Error::TooManyAlternatives);
        }

        if let Some(m) = BothAnchorsLiteral::recognize(pattern) {
            log::debug!("compiled {:?} as both-anchors literal", pattern);
            return Ok(Pattern {
                matcher: Matcher::BothAnchors(m),
            });
        }
        if let Some(m) = UrlShape::recognize(pattern) {
            log::debug!("compiled {:?} as URL shape", pattern);
            return Ok(Pattern {
                matcher: Matcher::Url(m),
            });
        }
        if let Some(m) = LiteralAlternation::recognize(pattern) {
            log::debug!("compiled {:?} as literal alternation", pattern);
            return Ok(Pattern {
                matcher: Matcher::LiteralAlt(m),
            });
        }
        if let Some(m) = AdvancedAlternation::try_compile(pattern)? {
            log::debug!("compiled {:?} as advanced alternation", pattern);
            return Ok(Pattern {
                matcher: Matcher::AdvancedAlt(m),
            });
        }
        if let Some(m) = LiteralDfa::recognize(pattern) {
            log::debug!("compiled {:?} as literal DFA", pattern);
            return Ok(Pattern {
                matcher: Matcher::Dfa(m),
            });
        }

        let nfa = automaton::compile(pattern)?;
        Ok(Pattern {
            matcher: Matcher::General(nfa),
        })
    }

    /// Does the pattern match anywhere in `text` (subject to anchors)?
    pub fn is_match(&self, text: &str) -> bool {
        self.matches(text.as_bytes())
    }

    pub(crate) fn matches(&self, text: &[u8]) -> bool {
        match &self.matcher {
            Matcher::BothAnchors(m) => m.is_match(text),
            Matcher::Url(m) => m.is_match(text),
            Matcher::LiteralAlt(m) => m.is_match(text),
            Matcher::AdvancedAlt(m) => m.is_match(text),
            Matcher::Dfa(m) => m.is_match(text),
            Matcher::General(m) => m.is_match(text),
        }
    }

    #[cfg(test)]
    fn matcher_kind(&self) -> &'static str {
        match &self.matcher {
            Matcher::BothAnchors(_) => "both-anchors",
            Matcher::Url(_) => "url",
            Matcher::LiteralAlt(_) => "literal-alt",
            Matcher::AdvancedAlt(_) => "advanced-alt",
            Matcher::Dfa(_) => "dfa",
            Matcher::General(_) => "general",
        }
    }
}
