//! The advanced-alternation matcher: alternations whose branches share
//! literal structure, or are dotstar-shaped, reduced to cheap byte
//! compares with nested sub-patterns only where a branch is genuinely a
//! regex.
//!
//! Branches are stripped of uniform anchors, then classified into
//! pattern types: literal, `.*core`, `core.*`, `.*core.*`, or regex.
//! Uniform dotstar sets become starts-with / ends-with / contains over
//! the branch cores. Start-anchored sets with a shared literal prefix
//! (or suffix) of three or more bytes verify the prefix once and try
//! each branch middle against the remainder; everything else that is
//! start-anchored dispatches branch by branch. Nested sub-patterns are
//! owned by this record and released with it.

use memchr::memmem;

use crate::{Error, Pattern};

use super::{escape_map, is_metachar, literal_run, split_top_level, strip_end_anchor};

/// Shared prefixes/suffixes shorter than this are not worth a dedicated
/// form.
const MIN_COMMON_LEN: usize = 3;

#[derive(Debug)]
pub struct AdvancedAlternation {
    anchored_start: bool,
    anchored_end: bool,
    form: AltForm,
}

#[derive(Debug)]
enum AltForm {
    /// Every branch is `.*core`, `core.*`, or `.*core.*` with one shape.
    Dotstar { kind: DotstarKind, cores: Vec<Core> },
    /// Branches share a literal prefix and/or suffix; middles are tried
    /// against the span after the prefix.
    PrefixSuffix {
        prefix: Vec<u8>,
        suffix: Vec<u8>,
        branches: Vec<AltBranch>,
    },
    /// Start-anchored set dispatched branch by branch on its tag.
    Mixed { branches: Vec<MixedBranch> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DotstarKind {
    /// `.*core`
    Prefix,
    /// `core.*`
    Suffix,
    /// `.*core.*`
    Wrapper,
}

/// A literal branch core plus its prebuilt substring finder.
#[derive(Debug)]
struct Core {
    bytes: Vec<u8>,
    finder: memmem::Finder<'static>,
}

impl Core {
    fn new(bytes: Vec<u8>) -> Self {
        let finder = memmem::Finder::new(&bytes).into_owned();
        Core { bytes, finder }
    }
}

/// A branch middle in the prefix/suffix form. Non-literal middles are
/// compiled with the suffix and end anchor folded in.
#[derive(Debug)]
enum AltBranch {
    Literal(Vec<u8>),
    Compiled(Box<Pattern>),
}

/// A branch in the mixed form, tagged by its pattern type.
#[derive(Debug)]
enum MixedBranch {
    Literal(Vec<u8>),
    DotstarPrefix(Core),
    DotstarSuffix(Core),
    DotstarWrapper(Core),
    Regex(Box<Pattern>),
}

/// Classification of one branch before a form is chosen.
enum Tag {
    Literal(Vec<u8>),
    Dotstar(DotstarKind, Vec<u8>),
    Regex,
}

impl AdvancedAlternation {
    /// Claims alternations of at least two branches (three if the
    /// pattern is not start-anchored) whose branches share a dotstar
    /// shape, a literal prefix/suffix, or are uniformly start-anchored.
    /// Anchors must be consistent across branches.
    pub fn try_compile(pattern: &str) -> Result<Option<Self>, Error> {
        let raw = split_top_level(pattern);
        if raw.len() < 2 {
            return Ok(None);
        }

        let anchored_start = raw.iter().all(|b| b.starts_with('^'));
        if !anchored_start && raw.iter().any(|b| b.starts_with('^')) {
            return Ok(None);
        }

        let mut branches = Vec::with_capacity(raw.len());
        let mut end_flags = Vec::with_capacity(raw.len());
        for branch in raw {
            let branch = if anchored_start { &branch[1..] } else { branch };
            let (branch, end) = strip_end_anchor(branch);
            branches.push(branch);
            end_flags.push(end);
        }
        let anchored_end = end_flags.iter().all(|&e| e);
        if !anchored_end && end_flags.iter().any(|&e| e) {
            return Ok(None);
        }

        if !anchored_start && branches.len() < 3 {
            return Ok(None);
        }

        let tags: Vec<Tag> = branches.iter().map(|b| classify(b)).collect();

        // Uniform dotstar shape reduces to core compares.
        if let Some(kind) = uniform_dotstar(&tags) {
            let cores = tags
                .into_iter()
                .map(|t| match t {
                    Tag::Dotstar(_, core) => Core::new(core),
                    _ => unreachable!(),
                })
                .collect();
            log::debug!("advanced alternation: uniform {:?} form", kind);
            return Ok(Some(AdvancedAlternation {
                anchored_start,
                anchored_end,
                form: AltForm::Dotstar { kind, cores },
            }));
        }

        // The remaining forms only pay off when every match is pinned to
        // the start of the text.
        if !anchored_start {
            return Ok(None);
        }

        let (prefix, prefix_text_len) = common_literal_prefix(&branches);
        let suffix = common_literal_suffix(&branches, prefix_text_len);

        if prefix.len() >= MIN_COMMON_LEN || suffix.len() >= MIN_COMMON_LEN {
            // The suffix is made of plain unescaped characters, so its
            // pattern text is the tail of any branch.
            let suffix_text = &branches[0][branches[0].len() - suffix.len()..];
            let mut compiled = Vec::with_capacity(branches.len());
            for &branch in &branches {
                let middle = &branch[prefix_text_len..branch.len() - suffix.len()];
                match literal_run(middle) {
                    Some(lit) => compiled.push(AltBranch::Literal(lit)),
                    None => {
                        // Fold the suffix and end anchor into the
                        // sub-pattern.
                        let mut sub = String::with_capacity(middle.len() + suffix.len() + 2);
                        sub.push('^');
                        sub.push_str(middle);
                        sub.push_str(suffix_text);
                        if anchored_end {
                            sub.push('$');
                        }
                        compiled.push(AltBranch::Compiled(Box::new(Pattern::compile(&sub)?)));
                    }
                }
            }
            log::debug!(
                "advanced alternation: prefix/suffix form, prefix {} bytes, suffix {} bytes",
                prefix.len(),
                suffix.len()
            );
            return Ok(Some(AdvancedAlternation {
                anchored_start,
                anchored_end,
                form: AltForm::PrefixSuffix {
                    prefix,
                    suffix,
                    branches: compiled,
                },
            }));
        }

        // Mixed start-anchored set: dispatch per branch tag.
        let mut mixed = Vec::with_capacity(branches.len());
        for (tag, branch) in tags.into_iter().zip(&branches) {
            mixed.push(match tag {
                Tag::Literal(lit) => MixedBranch::Literal(lit),
                Tag::Dotstar(DotstarKind::Prefix, core) => MixedBranch::DotstarPrefix(Core::new(core)),
                Tag::Dotstar(DotstarKind::Suffix, core) => MixedBranch::DotstarSuffix(Core::new(core)),
                Tag::Dotstar(DotstarKind::Wrapper, core) => {
                    MixedBranch::DotstarWrapper(Core::new(core))
                }
                Tag::Regex => {
                    let mut sub = String::with_capacity(branch.len() + 2);
                    sub.push('^');
                    sub.push_str(branch);
                    if anchored_end {
                        sub.push('$');
                    }
                    MixedBranch::Regex(Box::new(Pattern::compile(&sub)?))
                }
            });
        }
        log::debug!("advanced alternation: mixed form, {} branches", mixed.len());
        Ok(Some(AdvancedAlternation {
            anchored_start,
            anchored_end,
            form: AltForm::Mixed { branches: mixed },
        }))
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        match &self.form {
            AltForm::Dotstar { kind, cores } => match kind {
                DotstarKind::Prefix => {
                    if self.anchored_end {
                        cores.iter().any(|c| text.ends_with(&c.bytes))
                    } else {
                        cores.iter().any(|c| c.finder.find(text).is_some())
                    }
                }
                DotstarKind::Suffix => {
                    if self.anchored_start {
                        cores.iter().any(|c| text.starts_with(&c.bytes))
                    } else {
                        cores.iter().any(|c| c.finder.find(text).is_some())
                    }
                }
                DotstarKind::Wrapper => cores.iter().any(|c| c.finder.find(text).is_some()),
            },
            AltForm::PrefixSuffix {
                prefix,
                suffix,
                branches,
            } => {
                if !text.starts_with(prefix) {
                    return false;
                }
                let rest = &text[prefix.len()..];
                branches.iter().any(|branch| match branch {
                    AltBranch::Literal(middle) => {
                        literal_tail_match(rest, middle, suffix, self.anchored_end)
                    }
                    AltBranch::Compiled(sub) => sub.matches(rest),
                })
            }
            AltForm::Mixed { branches } => branches.iter().any(|branch| match branch {
                MixedBranch::Literal(lit) => {
                    if self.anchored_end {
                        text == &lit[..]
                    } else {
                        text.starts_with(lit)
                    }
                }
                MixedBranch::DotstarPrefix(core) => {
                    if self.anchored_end {
                        text.ends_with(&core.bytes)
                    } else {
                        core.finder.find(text).is_some()
                    }
                }
                MixedBranch::DotstarSuffix(core) => text.starts_with(&core.bytes),
                MixedBranch::DotstarWrapper(core) => core.finder.find(text).is_some(),
                MixedBranch::Regex(sub) => sub.matches(text),
            }),
        }
    }
}

/// middle then suffix at the start of `rest`, exactly filling it when
/// end-anchored.
fn literal_tail_match(rest: &[u8], middle: &[u8], suffix: &[u8], anchored_end: bool) -> bool {
    if anchored_end {
        rest.len() == middle.len() + suffix.len()
            && rest.starts_with(middle)
            && rest.ends_with(suffix)
    } else {
        rest.starts_with(middle) && rest[middle.len()..].starts_with(suffix)
    }
}

fn classify(branch: &str) -> Tag {
    if let Some(lit) = literal_run(branch) {
        return Tag::Literal(lit);
    }

    let escaped = escape_map(branch.as_bytes());
    let lead = branch.starts_with(".*");
    let mut core = if lead { &branch[2..] } else { branch };
    let trail = core.ends_with(".*") && {
        let dot = (if lead { 2 } else { 0 }) + core.len() - 2;
        !escaped[dot]
    };
    if trail {
        core = &core[..core.len() - 2];
    }

    let kind = match (lead, trail) {
        (true, true) => DotstarKind::Wrapper,
        (true, false) => DotstarKind::Prefix,
        (false, true) => DotstarKind::Suffix,
        (false, false) => return Tag::Regex,
    };

    match literal_run(core) {
        Some(core) => Tag::Dotstar(kind, core),
        None => Tag::Regex,
    }
}

fn uniform_dotstar(tags: &[Tag]) -> Option<DotstarKind> {
    let mut kind = None;
    for tag in tags {
        match tag {
            Tag::Dotstar(k, _) => match kind {
                None => kind = Some(*k),
                Some(prev) if prev == *k => {}
                _ => return None,
            },
            _ => return None,
        }
    }
    kind
}

/// Longest literal run every branch begins with, token-aware: escapes are
/// taken whole, and a token quantified in any branch is excluded. Returns
/// the decoded bytes and the prefix length in pattern text.
fn common_literal_prefix(branches: &[&str]) -> (Vec<u8>, usize) {
    let first = branches[0].as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    'outer: loop {
        let c = match first.get(i) {
            Some(&c) => c,
            None => break,
        };
        let (lit, token_len) = if c == b'\\' {
            match first.get(i + 1) {
                Some(&next) if next.is_ascii() => (next, 2),
                _ => break,
            }
        } else if is_metachar(c) || !c.is_ascii() {
            break;
        } else {
            (c, 1)
        };

        for branch in branches {
            let bytes = branch.as_bytes();
            if bytes.len() < i + token_len || bytes[i..i + token_len] != first[i..i + token_len] {
                break 'outer;
            }
            if matches!(bytes.get(i + token_len).copied(), Some(b'*' | b'+' | b'?')) {
                break 'outer;
            }
        }

        out.push(lit);
        i += token_len;
    }

    (out, i)
}

/// Longest run of plain literal characters every branch ends with, never
/// crossing an escape or overlapping the common prefix. A lone trailing
/// `]` or `)` is not a real common suffix — it would be the tail of a
/// class or group.
fn common_literal_suffix(branches: &[&str], prefix_len: usize) -> Vec<u8> {
    let escapes: Vec<Vec<bool>> = branches.iter().map(|b| escape_map(b.as_bytes())).collect();
    let first = branches[0].as_bytes();
    let mut collected = Vec::new();
    let mut k = 1;

    'outer: loop {
        if first.len() < prefix_len + k {
            break;
        }
        let c = first[first.len() - k];
        if is_metachar(c) || !c.is_ascii() {
            break;
        }
        for (bi, branch) in branches.iter().enumerate() {
            let bytes = branch.as_bytes();
            if bytes.len() < prefix_len + k {
                break 'outer;
            }
            let pos = bytes.len() - k;
            if bytes[pos] != c || escapes[bi][pos] {
                break 'outer;
            }
        }
        collected.push(c);
        k += 1;
    }

    collected.reverse();
    if collected.len() == 1 && (collected[0] == b')' || collected[0] == b']') {
        return Vec::new();
    }
    collected
}
