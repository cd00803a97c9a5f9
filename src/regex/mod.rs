//! A small regex dialect compiled to an [`crate::fsm::Nfsm`] via Thompson's
//! construction.
//!
//! Parsing produces a DAG of [`Op`] nodes addressed by [`Handle`], stored in
//! a [`Regex`] arena and deduplicated through [`Cached`] so that repeated
//! subexpressions share one node. [`compile`] ties the whole pipeline
//! together: tokenize, ε-fill degenerate alternations/stars, bubble union
//! tokens past trailing stars, build the arena, then lower it.
mod parser;

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::fsm::Nfsm;
use crate::Alphabet;

/// A handle into a [`Regex`] arena. Cheap to copy, meaningless on its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op<A: Alphabet> {
    Epsilon,
    Match(A),
    Star(Handle),
    Or(Handle, Handle),
    Concat(Handle, Handle),
}

/// An arena of regex subexpressions forming a DAG (shared subexpressions
/// are possible through [`Cached`]).
pub struct Regex<A: Alphabet> {
    subs: Vec<Op<A>>,
}

impl<A: Alphabet> Regex<A> {
    pub fn new() -> Self {
        Regex { subs: Vec::new() }
    }

    /// Push a new node as the (tentative) root. All handles referenced by
    /// `op` must already exist in the arena.
    pub fn push(&mut self, op: Op<A>) -> Handle {
        match op {
            Op::Epsilon | Op::Match(_) => (),
            Op::Star(Handle(i)) => assert!(i < self.subs.len()),
            Op::Or(Handle(i), Handle(j)) | Op::Concat(Handle(i), Handle(j)) => {
                assert!(i < self.subs.len() && j < self.subs.len())
            }
        }
        let handle = Handle(self.subs.len());
        self.subs.push(op);
        handle
    }

    pub fn get(&self, Handle(index): Handle) -> Op<A> {
        self.subs[index]
    }

    pub fn root(&self) -> Option<Handle> {
        self.subs.len().checked_sub(1).map(Handle)
    }

    pub fn cached(self) -> Cached<A> {
        Cached {
            regex: self,
            cache: HashMap::new(),
        }
    }
}

impl<A: Alphabet> Default for Regex<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Alphabet> Regex<A> {
    /// A debug rendering of a subtree, not a round-trippable dialect string.
    pub fn render(&self, handle: Handle) -> String {
        let mut out = String::new();
        self.render_into(handle, &mut out);
        out
    }

    fn render_into(&self, handle: Handle, out: &mut String) {
        match self.get(handle) {
            Op::Epsilon => out.push_str("{eps}"),
            Op::Match(a) => {
                write!(out, "{a:?}").unwrap();
            }
            Op::Star(inner) => {
                out.push('(');
                self.render_into(inner, out);
                out.push_str(")*");
            }
            Op::Or(a, b) => {
                out.push('(');
                self.render_into(a, out);
                out.push('|');
                self.render_into(b, out);
                out.push(')');
            }
            Op::Concat(a, b) => {
                self.render_into(a, out);
                self.render_into(b, out);
            }
        }
    }
}

/// Wraps [`Regex`] with a cache so that structurally identical
/// subexpressions (e.g. repeated literals bubbled by the same union) share
/// one arena slot instead of being duplicated.
pub struct Cached<A: Alphabet> {
    regex: Regex<A>,
    cache: HashMap<Op<A>, Handle>,
}

impl<A: Alphabet> Cached<A> {
    pub fn new() -> Self {
        Regex::new().cached()
    }

    pub fn insert(&mut self, op: Op<A>) -> Handle {
        let regex = &mut self.regex;
        *self.cache.entry(op).or_insert_with(|| regex.push(op))
    }

    pub fn into_inner(self) -> Regex<A> {
        self.regex
    }
}

impl<A: Alphabet> Default for Cached<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("unexpected ')' with no matching '('")]
    UnexpectedClose,
    #[error("unterminated group: missing ')'")]
    UnterminatedGroup,
    #[error("'\\' at end of pattern has nothing to escape")]
    DanglingEscape,
}

/// Tokenize, ε-fill, bubble stars past union, build the arena, then lower
/// the tree into an NFSM via Thompson's construction.
pub fn compile(pattern: &str) -> Result<Nfsm<char>, RegexError> {
    let tokens = parser::tokenize(pattern)?;
    let mut tokens = parser::apply_epsilon_fill(tokens);
    parser::to_postfix(&mut tokens);
    let mut arena = Cached::new();
    let root = parser::build_tree(&tokens, &mut arena);
    let regex = arena.into_inner();
    Ok(lower(&regex, root))
}

fn lower(regex: &Regex<char>, handle: Handle) -> Nfsm<char> {
    match regex.get(handle) {
        Op::Epsilon => Nfsm::epsilon_matcher(),
        Op::Match(c) => Nfsm::atom_matcher(c),
        Op::Star(inner) => lower(regex, inner).kleene_star(),
        Op::Or(a, b) => lower(regex, a).union(&lower(regex, b)),
        Op::Concat(a, b) => lower(regex, a).concat(&lower(regex, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, word: &str) -> bool {
        compile(pattern).unwrap().accepts(word.chars())
    }

    #[test]
    fn literal_matches_exactly() {
        assert!(matches("a", "a"));
        assert!(!matches("a", "b"));
        assert!(!matches("a", "aa"));
    }

    #[test]
    fn concatenation_matches_sequence() {
        assert!(matches("ab", "ab"));
        assert!(!matches("ab", "a"));
        assert!(!matches("ab", "ba"));
    }

    #[test]
    fn star_binds_tighter_than_concat() {
        assert!(matches("ab*", "a"));
        assert!(matches("ab*", "abbb"));
        assert!(!matches("ab*", "ababab"));
    }

    #[test]
    fn union_is_lowest_precedence() {
        assert!(matches("ab|c", "ab"));
        assert!(matches("ab|c", "c"));
        assert!(!matches("ab|c", "abc"));
    }

    #[test]
    fn star_binds_tighter_than_union() {
        // a|b* is a|(b*), not (a|b)*
        assert!(matches("a|b*", "a"));
        assert!(matches("a|b*", ""));
        assert!(matches("a|b*", "bbbb"));
        assert!(!matches("a|b*", "ab"));
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert!(matches("(a|b)*", ""));
        assert!(matches("(a|b)*", "aabbab"));
        assert!(!matches("(a|b)*", "aabc"));
    }

    #[test]
    fn escapes_treat_metacharacters_as_literals() {
        assert!(matches("a\\*b", "a*b"));
        assert!(!matches("a\\*b", "ab"));
    }

    #[test]
    fn degenerate_alternations_map_to_epsilon() {
        assert!(matches("|a", ""));
        assert!(matches("|a", "a"));
        assert!(matches("a|", ""));
        assert!(matches("a|", "a"));
    }

    #[test]
    fn leading_star_matches_only_empty_string() {
        assert!(matches("*", ""));
        assert!(!matches("*", "a"));
    }

    #[test]
    fn empty_pattern_matches_only_empty_string() {
        assert!(matches("", ""));
        assert!(!matches("", "a"));
    }

    #[test]
    fn unbalanced_parens_are_rejected() {
        assert_eq!(compile("(a"), Err(RegexError::UnterminatedGroup));
        assert_eq!(compile("a)"), Err(RegexError::UnexpectedClose));
    }

    #[test]
    fn dangling_escape_is_rejected() {
        assert_eq!(compile("a\\"), Err(RegexError::DanglingEscape));
    }

    #[test]
    fn cached_arena_deduplicates_identical_subexpressions() {
        let mut cached: Cached<char> = Cached::new();
        let a = cached.insert(Op::Match('a'));
        let a_again = cached.insert(Op::Match('a'));
        assert_eq!(a, a_again);
        let b = cached.insert(Op::Match('b'));
        assert_ne!(a, b);
    }
}
