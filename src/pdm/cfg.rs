//! The CFG hook: a plain data structure describing a context-free grammar,
//! plus a minimal, textbook translation into a [`super::Pdm`].
//!
//! Grammar *normalization* (noncontracting form, chain-rule elimination,
//! usefulness pruning) is a separate, much larger concern and is not
//! implemented here — callers that need a noncontracting or productive
//! grammar before translating it are expected to produce one themselves.
use std::collections::HashSet;

use crate::alphabet::Symbol;
use crate::frozen::MultiMap;
use crate::state::State;

use super::Pdm;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CfgError {
    #[error("nonterminal {0:?} must be exactly one character")]
    NonterminalNotSingleChar(String),
    #[error("start symbol {0:?} is not among the grammar's nonterminals")]
    UnknownStart(String),
    #[error("rule symbol {0:?} is neither a declared nonterminal nor a declared terminal")]
    UnknownRuleSymbol(char),
}

/// A context-free grammar over single-character nonterminals: `(A, w)`
/// pairs where `A` is a nonterminal and `w` is a (possibly empty) string
/// of terminals and nonterminals.
#[derive(Clone, Debug)]
pub struct ContextFreeGrammar {
    nonterminals: HashSet<String>,
    terminals: HashSet<char>,
    rules: Vec<(String, String)>,
    start: String,
}

impl ContextFreeGrammar {
    pub fn new(
        nonterminals: HashSet<String>,
        terminals: HashSet<char>,
        rules: Vec<(String, String)>,
        start: String,
    ) -> Result<Self, CfgError> {
        for nonterminal in nonterminals.iter().chain(std::iter::once(&start)) {
            if nonterminal.chars().count() != 1 {
                return Err(CfgError::NonterminalNotSingleChar(nonterminal.clone()));
            }
        }
        if !nonterminals.contains(&start) {
            return Err(CfgError::UnknownStart(start));
        }

        let nonterminal_chars: HashSet<char> =
            nonterminals.iter().map(|nt| nt.chars().next().unwrap()).collect();
        for (lhs, rhs) in &rules {
            if lhs.chars().count() != 1 {
                return Err(CfgError::NonterminalNotSingleChar(lhs.clone()));
            }
            let head = lhs.chars().next().unwrap();
            if !nonterminal_chars.contains(&head) {
                return Err(CfgError::UnknownRuleSymbol(head));
            }
            for symbol in rhs.chars() {
                if !nonterminal_chars.contains(&symbol) && !terminals.contains(&symbol) {
                    return Err(CfgError::UnknownRuleSymbol(symbol));
                }
            }
        }

        Ok(ContextFreeGrammar {
            nonterminals,
            terminals,
            rules,
            start,
        })
    }

    pub fn nonterminals(&self) -> &HashSet<String> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &HashSet<char> {
        &self.terminals
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn start(&self) -> &str {
        &self.start
    }
}

/// The bottom-of-stack marker, distinct from any grammar symbol since
/// grammars are validated to use single printable characters as
/// nonterminals and `from_cfg` restricts terminals the same way in
/// practice (nothing enforces it, but a grammar using `'\0'` as a terminal
/// would collide with it).
const BOTTOM: char = '\0';

impl Pdm<char, char> {
    /// The textbook single-state-loop top-down construction: push the start
    /// symbol over a bottom marker, then loop expanding the nonterminal on
    /// top of the stack or matching a terminal against the next input
    /// symbol, accepting once the bottom marker is uncovered.
    ///
    /// `grammar` was already validated by [`ContextFreeGrammar::new`] (every
    /// rule's LHS is a declared nonterminal, every RHS symbol is a declared
    /// nonterminal or terminal), so this never fails; it still returns a
    /// `Result` to match the rest of the CFG hook's fallible surface.
    pub fn from_cfg(grammar: &ContextFreeGrammar) -> Result<Self, CfgError> {
        let start_symbol = grammar.start.chars().next().expect("validated by ContextFreeGrammar::new");

        let entry = State::fresh();
        let expand = State::fresh();
        let accept = State::fresh();

        let mut transitions = MultiMap::new();
        transitions.insert(
            (entry, Symbol::Epsilon, Symbol::Epsilon),
            (expand, vec![BOTTOM, start_symbol]),
        );

        for (nonterminal, expansion) in &grammar.rules {
            let head = nonterminal.chars().next().expect("validated by ContextFreeGrammar::new");
            let mut push: Vec<char> = expansion.chars().collect();
            push.reverse();
            transitions.insert((expand, Symbol::Epsilon, Symbol::Char(head)), (expand, push));
        }

        for &terminal in &grammar.terminals {
            transitions.insert(
                (expand, Symbol::Char(terminal), Symbol::Char(terminal)),
                (expand, Vec::new()),
            );
        }

        transitions.insert(
            (expand, Symbol::Epsilon, Symbol::Char(BOTTOM)),
            (accept, Vec::new()),
        );

        let mut stack_alphabet: HashSet<char> = grammar
            .nonterminals
            .iter()
            .filter_map(|nt| nt.chars().next())
            .collect();
        stack_alphabet.extend(grammar.terminals.iter().copied());
        stack_alphabet.insert(BOTTOM);

        Ok(Pdm::new(
            HashSet::from([entry, expand, accept]),
            grammar.terminals.clone(),
            stack_alphabet,
            transitions,
            entry,
            HashSet::from([accept]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_parens_grammar() -> ContextFreeGrammar {
        // S -> aSb | ε
        ContextFreeGrammar::new(
            HashSet::from(["S".to_string()]),
            HashSet::from(['a', 'b']),
            vec![
                ("S".to_string(), "aSb".to_string()),
                ("S".to_string(), String::new()),
            ],
            "S".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_multi_character_nonterminal() {
        let err = ContextFreeGrammar::new(
            HashSet::from(["Expr".to_string()]),
            HashSet::new(),
            Vec::new(),
            "Expr".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, CfgError::NonterminalNotSingleChar("Expr".to_string()));
    }

    #[test]
    fn rejects_start_outside_nonterminals() {
        let err = ContextFreeGrammar::new(
            HashSet::from(["A".to_string()]),
            HashSet::new(),
            Vec::new(),
            "S".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, CfgError::UnknownStart("S".to_string()));
    }

    #[test]
    fn rejects_multi_character_rule_lhs() {
        let err = ContextFreeGrammar::new(
            HashSet::from(["S".to_string()]),
            HashSet::from(['a']),
            vec![("AB".to_string(), "a".to_string())],
            "S".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, CfgError::NonterminalNotSingleChar("AB".to_string()));
    }

    #[test]
    fn rejects_rule_lhs_not_a_declared_nonterminal() {
        let err = ContextFreeGrammar::new(
            HashSet::from(["S".to_string()]),
            HashSet::from(['a']),
            vec![("A".to_string(), "a".to_string())],
            "S".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, CfgError::UnknownRuleSymbol('A'));
    }

    #[test]
    fn rejects_rule_rhs_symbol_not_declared() {
        let err = ContextFreeGrammar::new(
            HashSet::from(["S".to_string()]),
            HashSet::from(['a']),
            vec![("S".to_string(), "ab".to_string())],
            "S".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, CfgError::UnknownRuleSymbol('b'));
    }

    #[test]
    fn from_cfg_recognizes_the_grammars_language() {
        let grammar = balanced_parens_grammar();
        let pdm = Pdm::from_cfg(&grammar).unwrap();
        assert!(pdm.accepts(Vec::<char>::new()));
        assert!(pdm.accepts(['a', 'b']));
        assert!(pdm.accepts(['a', 'a', 'b', 'b']));
        assert!(!pdm.accepts(['a', 'b', 'b']));
        assert!(!pdm.accepts(['a', 'a', 'b']));
    }
}
