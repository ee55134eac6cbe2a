//! Recursive-descent compiler from pattern syntax to automaton fragments.
//!
//! Grammar:
//!
//! ```text
//! alt   -> cat ('|' cat)*
//! cat   -> piece*
//! piece -> atom quant?
//! atom  -> '.' | '^' | '$' | literal | '\' byte | '[' class ']' | '(' alt ')'
//! quant -> '*' | '+' | '?'
//! ```
//!
//! Groups never capture; `(?:...)` is accepted as an alias for `(...)`.
//! An empty branch (empty pattern, `a|`, `(x|)`) matches the empty string.
//!
//! The parser builds fragments directly on the state arena using the
//! Thompson constructions: `X*` is a split whose loop arm enters X and
//! whose exit arm dangles, `X+` is the same split entered through X, and
//! `X?` is a split whose exits are X's exits plus the bypass arm. The
//! caller patches whatever still dangles onto the accept state.

use crate::automaton::{ByteClass, Fragment, OutArm, OutList, OutRef, StateArena, StateId, StateKind};
use crate::Error;

/// Patterns longer than this are rejected outright.
pub const MAX_PATTERN_LEN: usize = 65_536;

/// Cap on group-nesting depth.
pub const MAX_RECURSION_DEPTH: usize = 1_000;

/// Cap on the number of branches in one alternation.
pub const MAX_ALTERNATION_BRANCHES: usize = 1_000;

struct Parser<'a> {
    bytes: &'a [u8],
    index: usize,
    arena: StateArena,
}

/// Parse a pattern into (states, start, accept).
pub(crate) fn parse(pattern: &str) -> Result<(StateArena, StateId, StateId), Error> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(Error::PatternTooLong);
    }

    let mut p = Parser {
        bytes: pattern.as_bytes(),
        index: 0,
        arena: StateArena::new(),
    };

    let fragment = p.parse_alternation(0)?;
    if p.index < p.bytes.len() {
        // The only way the top-level parse stops early is a stray ')'.
        return Err(p.syntax("unmatched ')'"));
    }

    let accept = p.arena.alloc(StateKind::Accept)?;
    p.arena.patch(&fragment.outs, accept);

    log::trace!(
        "parsed {:?} into {} automaton states",
        pattern,
        p.arena.len()
    );

    Ok((p.arena, fragment.start, accept))
}

impl<'a> Parser<'a> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.index += 1;
        Some(b)
    }

    fn syntax(&self, message: &str) -> Error {
        Error::Syntax {
            message: message.to_string(),
            offset: self.index,
        }
    }

    fn parse_alternation(&mut self, depth: usize) -> Result<Fragment, Error> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(Error::RecursionTooDeep);
        }

        let mut fragment = self.parse_concat(depth)?;
        let mut branches = 1;

        while self.peek() == Some(b'|') {
            self.index += 1;
            branches += 1;
            if branches > MAX_ALTERNATION_BRANCHES {
                return Err(Error::TooManyAlternatives);
            }
            let rhs = self.parse_concat(depth)?;
            fragment = self.alt(fragment, rhs)?;
        }

        Ok(fragment)
    }

    fn parse_concat(&mut self, depth: usize) -> Result<Fragment, Error> {
        let mut fragment: Option<Fragment> = None;

        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }
            let piece = self.parse_piece(depth)?;
            fragment = Some(match fragment {
                Some(lhs) => self.cat(lhs, piece),
                None => piece,
            });
        }

        match fragment {
            Some(f) => Ok(f),
            // Empty branch: matches the empty string.
            None => self.empty_fragment(),
        }
    }

    fn parse_piece(&mut self, depth: usize) -> Result<Fragment, Error> {
        let atom = self.parse_atom(depth)?;

        let fragment = match self.peek() {
            Some(b'*') => {
                self.index += 1;
                self.apply_star(atom)?
            }
            Some(b'+') => {
                self.index += 1;
                self.apply_plus(atom)?
            }
            Some(b'?') => {
                self.index += 1;
                self.apply_question(atom)?
            }
            _ => return Ok(atom),
        };

        if matches!(self.peek(), Some(b'*') | Some(b'+') | Some(b'?')) {
            return Err(self.syntax("stacked quantifier"));
        }

        Ok(fragment)
    }

    fn parse_atom(&mut self, depth: usize) -> Result<Fragment, Error> {
        let b = match self.bump() {
            Some(b) => b,
            None => return Err(self.syntax("unexpected end of pattern")),
        };

        match b {
            b'.' => self.single(StateKind::Any),
            b'^' => self.single(StateKind::StartAnchor),
            b'$' => self.single(StateKind::EndAnchor),
            b'[' => {
                let class = read_class(self.bytes, &mut self.index)?;
                self.single(StateKind::Class(class))
            }
            b'(' => {
                if self.peek() == Some(b'?') {
                    self.index += 1;
                    if self.bump() != Some(b':') {
                        return Err(self.syntax("unsupported group extension"));
                    }
                }
                let inner = self.parse_alternation(depth + 1)?;
                if self.bump() != Some(b')') {
                    return Err(self.syntax("unbalanced '('"));
                }
                Ok(inner)
            }
            b'\\' => match self.bump() {
                Some(lit) => self.single(StateKind::Byte(lit)),
                None => Err(self.syntax("trailing escape")),
            },
            b'*' | b'+' | b'?' => Err(self.syntax("quantifier without preceding atom")),
            b']' => Err(self.syntax("unmatched ']'")),
            lit => self.single(StateKind::Byte(lit)),
        }
    }

    /// One-state fragment with a single dangling out-arrow.
    fn single(&mut self, kind: StateKind) -> Result<Fragment, Error> {
        let id = self.arena.alloc(kind)?;
        let mut outs = OutList::new();
        outs.push(OutRef {
            state: id,
            arm: OutArm::Out,
        });
        Ok(Fragment { start: id, outs })
    }

    /// Pure-epsilon fragment for an empty branch.
    fn empty_fragment(&mut self) -> Result<Fragment, Error> {
        let id = self.arena.alloc(StateKind::Split)?;
        let mut outs = OutList::new();
        outs.push(OutRef {
            state: id,
            arm: OutArm::Out,
        });
        Ok(Fragment { start: id, outs })
    }

    /// Splice: lhs's dangling arrows enter rhs.
    fn cat(&mut self, lhs: Fragment, rhs: Fragment) -> Fragment {
        self.arena.patch(&lhs.outs, rhs.start);
        Fragment {
            start: lhs.start,
            outs: rhs.outs,
        }
    }

    /// Split whose branches are the two alternatives; the combined
    /// out-arrow list is the union of both.
    fn alt(&mut self, lhs: Fragment, rhs: Fragment) -> Result<Fragment, Error> {
        let split = self.arena.alloc(StateKind::Split)?;
        self.arena[split].out = lhs.start;
        self.arena[split].out1 = rhs.start;

        let mut outs = lhs.outs;
        outs.extend(rhs.outs);
        Ok(Fragment { start: split, outs })
    }

    /// `X*`: split enters X or exits; X loops back into the split.
    fn apply_star(&mut self, f: Fragment) -> Result<Fragment, Error> {
        let split = self.arena.alloc(StateKind::Split)?;
        self.arena[split].out = f.start;
        self.arena.patch(&f.outs, split);

        let mut outs = OutList::new();
        outs.push(OutRef {
            state: split,
            arm: OutArm::Out1,
        });
        Ok(Fragment { start: split, outs })
    }

    /// `X+`: same loop as `X*` but entry bypasses the split.
    fn apply_plus(&mut self, f: Fragment) -> Result<Fragment, Error> {
        let split = self.arena.alloc(StateKind::Split)?;
        self.arena[split].out = f.start;
        self.arena.patch(&f.outs, split);

        let mut outs = OutList::new();
        outs.push(OutRef {
            state: split,
            arm: OutArm::Out1,
        });
        Ok(Fragment {
            start: f.start,
            outs,
        })
    }

    /// `X?`: split enters X or bypasses it; both exits dangle together.
    fn apply_question(&mut self, f: Fragment) -> Result<Fragment, Error> {
        let split = self.arena.alloc(StateKind::Split)?;
        self.arena[split].out = f.start;

        let mut outs = f.outs;
        outs.push(OutRef {
            state: split,
            arm: OutArm::Out1,
        });
        Ok(Fragment { start: split, outs })
    }
}

/// Read a `[...]` class body. On entry `*index` points just past the `[`;
/// on success it points just past the `]`.
///
/// A leading `^` negates. `-` at the first or last position is literal.
/// `[]` and `[^]` are errors, as is a reversed range.
pub(crate) fn read_class(bytes: &[u8], index: &mut usize) -> Result<ByteClass, Error> {
    let mut class = ByteClass::new();

    let negated = bytes.get(*index) == Some(&b'^');
    if negated {
        *index += 1;
    }

    match bytes.get(*index) {
        None => {
            return Err(Error::Syntax {
                message: "unclosed character class".to_string(),
                offset: *index,
            })
        }
        Some(&b']') => {
            return Err(Error::Syntax {
                message: "empty character class".to_string(),
                offset: *index,
            })
        }
        _ => {}
    }

    loop {
        let lo = match bytes.get(*index) {
            None => {
                return Err(Error::Syntax {
                    message: "unclosed character class".to_string(),
                    offset: *index,
                })
            }
            Some(&b']') => break,
            Some(&c) => c,
        };
        *index += 1;

        // A range, unless the '-' is last in the class.
        let is_range = bytes.get(*index) == Some(&b'-')
            && bytes.get(*index + 1).is_some()
            && bytes[*index + 1] != b']';
        if is_range {
            let hi = bytes[*index + 1];
            *index += 2;
            if hi < lo {
                return Err(Error::Syntax {
                    message: format!(
                        "invalid range {}-{}",
                        lo.escape_ascii(),
                        hi.escape_ascii()
                    ),
                    offset: *index,
                });
            }
            class.insert_range(lo, hi);
        } else {
            class.insert(lo);
        }
    }
    *index += 1; // consume ']'

    if negated {
        class.negate();
    }

    Ok(class)
}
