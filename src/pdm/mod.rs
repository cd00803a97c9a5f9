//! Pushdown machines: the same configuration-graph runner abstraction as
//! [`crate::fsm::Fsm`], extended with a stack.
//!
//! `Pdm` deliberately shares no inheritance with `Fsm` — both just
//! implement [`Runner`] against their own configuration type — but its
//! algebra (`concat`, `union`, `kleene_star`, `to_normal_form`) mirrors the
//! NFSM operations closely, since both are built by gluing submachines
//! together with fresh ε-transitions.
pub mod cfg;

use std::collections::HashSet;
use std::rc::Rc;

use crate::alphabet::Symbol;
use crate::frozen::MultiMap;
use crate::match_result::Match;
use crate::runner::{Runner, Verdict};
use crate::state::State;
use crate::Alphabet;

pub use cfg::{CfgError, ContextFreeGrammar};

type Key<A, G> = (State, Symbol<A>, Symbol<G>);
type Target<G> = (State, Vec<G>);

/// `(Q, Σ, Γ, δ, q0, F)` where `δ: (state, input ∪ {ε}, stack-top ∪ {ε}) ->
/// {(state, push-string)}`.
#[derive(Clone, Debug)]
pub struct Pdm<A: Alphabet, G: Alphabet> {
    states: HashSet<State>,
    alphabet: HashSet<A>,
    stack_alphabet: HashSet<G>,
    transitions: MultiMap<Key<A, G>, Target<G>>,
    start: State,
    accepting: HashSet<State>,
}

impl<A: Alphabet, G: Alphabet> Pdm<A, G> {
    pub fn new(
        states: HashSet<State>,
        alphabet: HashSet<A>,
        stack_alphabet: HashSet<G>,
        transitions: MultiMap<Key<A, G>, Target<G>>,
        start: State,
        accepting: HashSet<State>,
    ) -> Self {
        debug_assert!(states.contains(&start), "start state not in states");
        debug_assert!(
            accepting.is_subset(&states),
            "accepting states not a subset of states"
        );
        debug_assert!(
            transitions.keys().all(|(from, input, pop)| {
                states.contains(from)
                    && (input.is_epsilon() || input.as_char().is_some_and(|a| alphabet.contains(&a)))
                    && (pop.is_epsilon() || pop.as_char().is_some_and(|g| stack_alphabet.contains(&g)))
            }),
            "transition key references an unknown state or symbol"
        );
        debug_assert!(
            transitions.iter().all(|(_, targets)| targets.iter().all(|(to, pushed)| {
                states.contains(to) && pushed.iter().all(|g| stack_alphabet.contains(g))
            })),
            "transition target references an unknown state or stack symbol"
        );
        Pdm {
            states,
            alphabet,
            stack_alphabet,
            transitions,
            start,
            accepting,
        }
    }

    pub fn states(&self) -> &HashSet<State> {
        &self.states
    }

    pub fn alphabet(&self) -> &HashSet<A> {
        &self.alphabet
    }

    pub fn stack_alphabet(&self) -> &HashSet<G> {
        &self.stack_alphabet
    }

    pub fn transitions(&self) -> &MultiMap<Key<A, G>, Target<G>> {
        &self.transitions
    }

    pub fn start(&self) -> State {
        self.start
    }

    pub fn accepting(&self) -> &HashSet<State> {
        &self.accepting
    }

    pub fn accepts(&self, word: impl IntoIterator<Item = A>) -> bool {
        let word: Rc<[A]> = word.into_iter().collect::<Vec<_>>().into();
        self.run_with(word) == Verdict::Accept
    }

    /// Render this machine to Graphviz `dot` source.
    #[cfg(feature = "visualization")]
    pub fn render(&self) -> std::io::Result<String> {
        let state_ids: Vec<String> = self.states.iter().map(|s| format!("{s:?}")).collect();
        let start_id = format!("{:?}", self.start);
        let accepting_ids: HashSet<String> = self.accepting.iter().map(|s| format!("{s:?}")).collect();
        let edges = self
            .transitions
            .iter()
            .flat_map(|(key, targets)| targets.iter().map(move |target| (key.clone(), target.clone())));
        crate::formatter::render_dot::<_, _, PdmFormatter>(&state_ids, &start_id, &accepting_ids, edges)
    }

    fn has_any_incoming(&self, state: State) -> bool {
        self.transitions
            .iter()
            .any(|(_, targets)| targets.iter().any(|(to, _)| *to == state))
    }

    fn has_any_outgoing(&self, state: State) -> bool {
        self.transitions.keys().any(|(from, _, _)| *from == state)
    }

    fn add_epsilon(transitions: &mut MultiMap<Key<A, G>, Target<G>>, from: State, to: State) {
        transitions.insert((from, Symbol::Epsilon, Symbol::Epsilon), (to, Vec::new()));
    }

    fn merge(a: &MultiMap<Key<A, G>, Target<G>>, b: &MultiMap<Key<A, G>, Target<G>>) -> MultiMap<Key<A, G>, Target<G>> {
        let mut merged = a.clone();
        for (key, targets) in b.iter() {
            merged.union_insert(key.clone(), targets.iter().cloned());
        }
        merged
    }

    /// A single accepting state with no outgoing transitions, or a sole
    /// unreachable start: the shape [`Pdm::concat`]/[`Pdm::union`]/
    /// [`Pdm::kleene_star`] depend on to splice machines via ε-edges without
    /// accidentally reintroducing acceptance mid-machine.
    pub fn to_normal_form(&self) -> Self {
        let mut transitions = self.transitions.clone();

        let start = if self.has_any_incoming(self.start) {
            let fresh = State::fresh();
            Self::add_epsilon(&mut transitions, fresh, self.start);
            fresh
        } else {
            self.start
        };

        let single_sink_accept = self.accepting.len() == 1 && {
            let only = *self.accepting.iter().next().unwrap();
            !self.has_any_outgoing(only)
        };
        let accept = if single_sink_accept {
            *self.accepting.iter().next().unwrap()
        } else {
            let fresh = State::fresh();
            for &state in &self.accepting {
                Self::add_epsilon(&mut transitions, state, fresh);
            }
            fresh
        };

        let mut states = self.states.clone();
        states.insert(start);
        states.insert(accept);

        Pdm {
            states,
            alphabet: self.alphabet.clone(),
            stack_alphabet: self.stack_alphabet.clone(),
            transitions,
            start,
            accepting: HashSet::from([accept]),
        }
    }

    pub fn concat(&self, other: &Self) -> Self {
        let a = self.to_normal_form();
        let b = other.to_normal_form();
        let mut transitions = Self::merge(&a.transitions, &b.transitions);
        let a_accept = *a.accepting.iter().next().unwrap();
        Self::add_epsilon(&mut transitions, a_accept, b.start);

        let mut states = a.states.clone();
        states.extend(b.states.iter().copied());

        Pdm {
            states,
            alphabet: a.alphabet.union(&b.alphabet).copied().collect(),
            stack_alphabet: a.stack_alphabet.union(&b.stack_alphabet).copied().collect(),
            transitions,
            start: a.start,
            accepting: b.accepting,
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let a = self.to_normal_form();
        let b = other.to_normal_form();
        let mut transitions = Self::merge(&a.transitions, &b.transitions);
        let start = State::fresh();
        let accept = State::fresh();
        Self::add_epsilon(&mut transitions, start, a.start);
        Self::add_epsilon(&mut transitions, start, b.start);
        for &state in &a.accepting {
            Self::add_epsilon(&mut transitions, state, accept);
        }
        for &state in &b.accepting {
            Self::add_epsilon(&mut transitions, state, accept);
        }

        let mut states = a.states.clone();
        states.extend(b.states.iter().copied());
        states.insert(start);
        states.insert(accept);

        Pdm {
            states,
            alphabet: a.alphabet.union(&b.alphabet).copied().collect(),
            stack_alphabet: a.stack_alphabet.union(&b.stack_alphabet).copied().collect(),
            transitions,
            start,
            accepting: HashSet::from([accept]),
        }
    }

    pub fn kleene_star(&self) -> Self {
        let x = self.to_normal_form();
        let mut transitions = x.transitions.clone();
        let start = State::fresh();
        let accept = State::fresh();
        Self::add_epsilon(&mut transitions, start, x.start);
        for &state in &x.accepting {
            Self::add_epsilon(&mut transitions, state, start);
        }
        Self::add_epsilon(&mut transitions, start, accept);

        let mut states = x.states.clone();
        states.insert(start);
        states.insert(accept);

        Pdm {
            states,
            alphabet: x.alphabet.clone(),
            stack_alphabet: x.stack_alphabet.clone(),
            transitions,
            start,
            accepting: HashSet::from([accept]),
        }
    }
}

/// `(remaining-input, stack, current-state)`. `word` is shared, `Rc`-backed
/// storage rather than part of the logical configuration, so it is excluded
/// from equality and hashing (see `FsmConfig` for the same reasoning).
#[derive(Clone, Debug)]
pub struct PdmConfig<A: Alphabet, G: Alphabet> {
    word: Rc<[A]>,
    position: usize,
    stack: Vec<G>,
    state: State,
}

impl<A: Alphabet, G: Alphabet> PartialEq for PdmConfig<A, G> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.stack == other.stack && self.state == other.state
    }
}

impl<A: Alphabet, G: Alphabet> Eq for PdmConfig<A, G> {}

impl<A: Alphabet, G: Alphabet> std::hash::Hash for PdmConfig<A, G> {
    fn hash<H: std::hash::Hasher>(&self, hasher: &mut H) {
        self.position.hash(hasher);
        self.stack.hash(hasher);
        self.state.hash(hasher);
    }
}

impl<A: Alphabet, G: Alphabet> Runner for Pdm<A, G> {
    type Symbol = A;
    type Config = PdmConfig<A, G>;
    type Key = Key<A, G>;
    type Target = Target<G>;

    fn initial_config(&self, word: Rc<[A]>) -> PdmConfig<A, G> {
        PdmConfig {
            word,
            position: 0,
            stack: Vec::new(),
            state: self.start,
        }
    }

    fn keys(&self, config: &PdmConfig<A, G>) -> Vec<Self::Key> {
        let mut keys = vec![(config.state, Symbol::Epsilon, Symbol::Epsilon)];
        let next_input = config.word.get(config.position).copied();
        let stack_top = config.stack.last().copied();
        if let Some(symbol) = next_input {
            keys.push((config.state, Symbol::Char(symbol), Symbol::Epsilon));
            if let Some(top) = stack_top {
                keys.push((config.state, Symbol::Char(symbol), Symbol::Char(top)));
            }
        }
        if let Some(top) = stack_top {
            keys.push((config.state, Symbol::Epsilon, Symbol::Char(top)));
        }
        keys
    }

    fn targets(&self, key: &Self::Key) -> Vec<Self::Target> {
        self.transitions.get(key).cloned().collect()
    }

    fn next_config(&self, config: &PdmConfig<A, G>, key: &Self::Key, target: &Self::Target) -> PdmConfig<A, G> {
        let (_, consumed, popped) = key;
        let (state, pushed) = target;
        let mut stack = config.stack.clone();
        if !matches!(popped, Symbol::Epsilon) {
            stack.pop();
        }
        stack.extend(pushed.iter().copied());
        let position = if matches!(consumed, Symbol::Epsilon) {
            config.position
        } else {
            config.position + 1
        };
        PdmConfig {
            word: config.word.clone(),
            position,
            stack,
            state: *state,
        }
    }

    fn check_accept(&self, config: &PdmConfig<A, G>) -> Verdict {
        let fully_consumed = config.position == config.word.len() && config.stack.is_empty();
        if fully_consumed && self.accepting.contains(&config.state) {
            Verdict::Accept
        } else {
            Verdict::Continue
        }
    }

    /// Substring scanning a context-free language is rarely meaningful
    /// (popping the stack below empty to "skip" a prefix isn't something a
    /// PDA can undo), so the sliding check is simply the full-match check.
    fn check_accept_sliding(&self, config: &PdmConfig<A, G>) -> Verdict {
        self.check_accept(config)
    }

    fn make_match(&self, config: &PdmConfig<A, G>) -> Match<A> {
        Match::new(0, config.position, config.word.clone())
    }
}

#[cfg(feature = "visualization")]
pub struct PdmFormatter;

#[cfg(feature = "visualization")]
impl<A: Alphabet, G: Alphabet> crate::formatter::Formatter<Key<A, G>, Target<G>> for PdmFormatter {
    fn source_id(key: &Key<A, G>) -> String {
        format!("{:?}", key.0)
    }

    fn target_id(value: &Target<G>) -> String {
        format!("{:?}", value.0)
    }

    fn label(key: &Key<A, G>, value: &Target<G>) -> String {
        let symbol = match key.1 {
            Symbol::Epsilon => "\u{3b5}".to_string(),
            Symbol::Char(c) => format!("{c:?}"),
        };
        let pop = match key.2 {
            Symbol::Epsilon => "\u{3b5}".to_string(),
            Symbol::Char(c) => format!("{c:?}"),
        };
        let push: String = value.1.iter().map(|c| format!("{c:?}")).collect();
        format!("{symbol}{pop}/{push}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(symbol: char) -> Pdm<char, char> {
        let start = State::fresh();
        let accept = State::fresh();
        let mut transitions = MultiMap::new();
        transitions.insert(
            (start, Symbol::Char(symbol), Symbol::Epsilon),
            (accept, Vec::new()),
        );
        Pdm::new(
            HashSet::from([start, accept]),
            HashSet::from([symbol]),
            HashSet::new(),
            transitions,
            start,
            HashSet::from([accept]),
        )
    }

    /// `S -> a S b | ε` built directly as a PDM: push a marker per `a`,
    /// pop one per `b`, accept only once the stack and input both empty.
    fn balanced_parens() -> Pdm<char, char> {
        let state = State::fresh();
        let mut transitions = MultiMap::new();
        transitions.insert(
            (state, Symbol::Char('a'), Symbol::Epsilon),
            (state, vec!['x']),
        );
        transitions.insert(
            (state, Symbol::Char('b'), Symbol::Char('x')),
            (state, Vec::new()),
        );
        Pdm::new(
            HashSet::from([state]),
            HashSet::from(['a', 'b']),
            HashSet::from(['x']),
            transitions,
            state,
            HashSet::from([state]),
        )
    }

    #[test]
    fn atom_matches_single_symbol() {
        let m = atom('a');
        assert!(m.accepts(['a']));
        assert!(!m.accepts(['b']));
        assert!(!m.accepts(['a', 'a']));
    }

    #[test]
    fn concat_matches_sequence() {
        let m = atom('a').concat(&atom('b'));
        assert!(m.accepts(['a', 'b']));
        assert!(!m.accepts(['a']));
        assert!(!m.accepts(['b', 'a']));
    }

    #[test]
    fn union_matches_either_branch() {
        let m = atom('a').union(&atom('b'));
        assert!(m.accepts(['a']));
        assert!(m.accepts(['b']));
        assert!(!m.accepts(['a', 'b']));
    }

    #[test]
    fn kleene_star_matches_any_repetition() {
        let m = atom('a').kleene_star();
        assert!(m.accepts(Vec::<char>::new()));
        assert!(m.accepts(['a', 'a', 'a']));
        assert!(!m.accepts(['a', 'b']));
    }

    #[test]
    fn stack_discipline_recognizes_balanced_counts() {
        let m = balanced_parens();
        assert!(m.accepts(Vec::<char>::new()));
        assert!(m.accepts(['a', 'b']));
        assert!(m.accepts(['a', 'a', 'b', 'b']));
        assert!(!m.accepts(['a', 'a', 'b']));
        assert!(!m.accepts(['a', 'b', 'b']));
        assert!(!m.accepts(['b', 'a']));
    }

    #[cfg(feature = "visualization")]
    #[test]
    fn render_emits_dot_source_with_an_edge_per_transition() {
        let m = balanced_parens();
        let dot = m.render().unwrap();
        assert!(dot.starts_with("digraph"));
        let edge_count: usize = m.transitions.iter().map(|(_, targets)| targets.len()).sum();
        assert_eq!(dot.matches("->").count(), edge_count + 1);
    }
}
