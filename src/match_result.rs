//! A single match produced by the [`crate::runner::Runner`] driver loops.
use std::rc::Rc;

/// `{start, stop, source}` where `0 <= start <= stop <= source.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match<A> {
    pub start: usize,
    pub stop: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    source: Rc<[A]>,
}

impl<A> Match<A> {
    pub(crate) fn new(start: usize, stop: usize, source: Rc<[A]>) -> Self {
        debug_assert!(start <= stop);
        debug_assert!(stop <= source.len());
        Match { start, stop, source }
    }

    /// Length of the consumed span, in symbols.
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// The symbols this match consumed.
    pub fn matched(&self) -> &[A] {
        &self.source[self.start..self.stop]
    }

    pub(crate) fn shift(self, offset: usize) -> Self {
        Match {
            start: self.start + offset,
            stop: self.stop + offset,
            source: self.source,
        }
    }
}

impl Match<char> {
    /// Convenience accessor for character-alphabet matches (the common case
    /// of regex matching over strings).
    pub fn matched_string(&self) -> String {
        self.matched().iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_slices_the_source() {
        let source: Rc<[char]> = "hello".chars().collect::<Vec<_>>().into();
        let m = Match::new(1, 4, source);
        assert_eq!(m.matched_string(), "ell");
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn shift_offsets_both_bounds() {
        let source: Rc<[char]> = "hello".chars().collect::<Vec<_>>().into();
        let m = Match::new(0, 2, source).shift(3);
        assert_eq!((m.start, m.stop), (3, 5));
    }
}
