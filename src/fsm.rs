//! Finite-state machines: the `Fsm<A, K>` data model and its algebra.
//!
//! Rather than modeling DFSMs and NFSMs as two unrelated structs (or NFSM as
//! a subclass of DFSM), a single generic type is parameterized by a
//! zero-sized marker that says whether ε-transitions are present. This
//! keeps the storage and the generic-over-epsilon algorithms (reachability,
//! the BFS runner) shared, while algebra that only makes sense for one side
//! (subset construction, complement-by-totalization, state elimination)
//! lives in `impl` blocks scoped to the relevant marker.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::alphabet::Symbol;
use crate::frozen::MultiMap;
use crate::match_result::Match;
use crate::runner::{Runner, Verdict};
use crate::state::State;
use crate::Alphabet;

mod sealed {
    pub trait Sealed {}
}

/// Whether a [`Fsm`] may contain ε-transitions and multi-valued steps.
pub trait Kind: sealed::Sealed + Copy + 'static {
    const ALLOWS_EPSILON: bool;
}

/// No ε-edges; at most one target per `(state, symbol)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deterministic;

/// ε-edges allowed; any number of targets per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonDeterministic;

impl sealed::Sealed for Deterministic {}
impl sealed::Sealed for NonDeterministic {}

impl Kind for Deterministic {
    const ALLOWS_EPSILON: bool = false;
}

impl Kind for NonDeterministic {
    const ALLOWS_EPSILON: bool = true;
}

pub type Dfsm<A> = Fsm<A, Deterministic>;
pub type Nfsm<A> = Fsm<A, NonDeterministic>;

/// `(Q, Σ, δ, q0, F)`. Immutable once built; every operation below returns
/// a new machine rather than mutating in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Fsm<A: Alphabet, K: Kind> {
    states: HashSet<State>,
    alphabet: HashSet<A>,
    transitions: MultiMap<(State, Symbol<A>), State>,
    start: State,
    accepting: HashSet<State>,
    _kind: PhantomData<K>,
}

impl<A: Alphabet, K: Kind> Fsm<A, K> {
    /// Build a machine from its five components. Consistency (every state
    /// referenced by `transitions`/`start`/`accepting` is in `states`, every
    /// symbol is in `alphabet`, and — for a [`Deterministic`] machine — no
    /// ε-edges and at most one target per key) is only checked in debug
    /// builds; callers are trusted in release.
    pub fn new(
        states: HashSet<State>,
        alphabet: HashSet<A>,
        transitions: MultiMap<(State, Symbol<A>), State>,
        start: State,
        accepting: HashSet<State>,
    ) -> Self {
        debug_assert!(states.contains(&start), "start state not in states");
        debug_assert!(
            accepting.is_subset(&states),
            "accepting states not a subset of states"
        );
        debug_assert!(
            transitions.keys().all(|(from, symbol)| states.contains(from)
                && (symbol.is_epsilon() || symbol.as_char().is_some_and(|a| alphabet.contains(&a)))),
            "transition key references an unknown state or symbol"
        );
        debug_assert!(
            transitions
                .iter()
                .all(|(_, targets)| targets.iter().all(|to| states.contains(to))),
            "transition target references an unknown state"
        );
        debug_assert!(
            K::ALLOWS_EPSILON
                || transitions
                    .keys()
                    .all(|(_, symbol)| !symbol.is_epsilon()),
            "deterministic machine has an epsilon transition"
        );
        debug_assert!(
            K::ALLOWS_EPSILON || transitions.iter().all(|(_, targets)| targets.len() <= 1),
            "deterministic machine has a multi-valued transition"
        );
        Fsm {
            states,
            alphabet,
            transitions,
            start,
            accepting,
            _kind: PhantomData,
        }
    }

    pub fn states(&self) -> &HashSet<State> {
        &self.states
    }

    pub fn alphabet(&self) -> &HashSet<A> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &MultiMap<(State, Symbol<A>), State> {
        &self.transitions
    }

    pub fn start(&self) -> State {
        self.start
    }

    pub fn accepting(&self) -> &HashSet<State> {
        &self.accepting
    }

    /// Run to completion and report whether the whole word is accepted.
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
            .flat_map(|(&key, targets)| targets.iter().map(move |&target| (key, target)));
        crate::formatter::render_dot::<_, _, FsmFormatter>(&state_ids, &start_id, &accepting_ids, edges)
    }

    fn has_outgoing(&self, state: State) -> bool {
        self.transitions.contains_key(&(state, Symbol::Epsilon))
            || self
                .alphabet
                .iter()
                .any(|&a| self.transitions.contains_key(&(state, Symbol::Char(a))))
    }

    fn has_any_incoming(&self, state: State) -> bool {
        self.transitions.iter().any(|(_, targets)| targets.contains(&state))
    }
}

/// Canonicalize a set of states into a sorted vector, so that two
/// structurally identical superstates always hash and compare equal
/// regardless of the hash-set iteration order that produced them. This is
/// what keeps subset construction from minting two different DFSM states
/// for what is really one superstate.
fn canonical(states: HashSet<State>) -> Vec<State> {
    let mut ordered: Vec<State> = states.into_iter().collect();
    ordered.sort();
    ordered
}

impl<A: Alphabet> Fsm<A, NonDeterministic> {
    /// Two states, one edge: the Thompson atom for a single literal symbol.
    pub fn atom_matcher(symbol: A) -> Self {
        let start = State::fresh();
        let accept = State::fresh();
        let mut transitions = MultiMap::new();
        transitions.insert((start, Symbol::Char(symbol)), accept);
        Fsm::new(
            [start, accept].into_iter().collect(),
            [symbol].into_iter().collect(),
            transitions,
            start,
            [accept].into_iter().collect(),
        )
    }

    /// Two states linked by a single ε-edge: matches only the empty word.
    pub fn epsilon_matcher() -> Self {
        let start = State::fresh();
        let accept = State::fresh();
        let mut transitions = MultiMap::new();
        transitions.insert((start, Symbol::Epsilon), accept);
        Fsm::new(
            [start, accept].into_iter().collect(),
            HashSet::new(),
            transitions,
            start,
            [accept].into_iter().collect(),
        )
    }

    fn epsilon_closure(&self, state: State) -> HashSet<State> {
        let mut closure = HashSet::new();
        let mut frontier = vec![state];
        while let Some(s) = frontier.pop() {
            if closure.insert(s) {
                for t in self.transitions.get(&(s, Symbol::Epsilon)) {
                    frontier.push(*t);
                }
            }
        }
        closure
    }

    fn construct_superset(&self, current: &[State], symbol: A) -> HashSet<State> {
        let mut out = HashSet::new();
        for &s in current {
            let targets: Vec<State> = self.transitions.get(&(s, Symbol::Char(symbol))).copied().collect();
            for t in targets {
                out.extend(self.epsilon_closure(t));
            }
        }
        out
    }

    /// Subset construction: the standard ε-closure worklist algorithm,
    /// keyed by a sorted canonical superstate so each distinct superstate
    /// maps to one stable DFSM state across the whole worklist.
    pub fn to_dfsm(&self) -> Fsm<A, Deterministic> {
        let initial_closure = canonical(self.epsilon_closure(self.start));
        let initial = State::fresh();
        let mut supersets: HashMap<Vec<State>, State> = HashMap::new();
        supersets.insert(initial_closure.clone(), initial);
        let mut accepting = HashSet::new();
        if initial_closure.iter().any(|s| self.accepting.contains(s)) {
            accepting.insert(initial);
        }
        let mut transitions = MultiMap::new();
        let mut stack = vec![initial_closure];
        while let Some(current) = stack.pop() {
            let current_state = supersets[&current];
            for &symbol in &self.alphabet {
                let superset = canonical(self.construct_superset(&current, symbol));
                if superset.is_empty() {
                    continue;
                }
                let is_new = !supersets.contains_key(&superset);
                let target = *supersets.entry(superset.clone()).or_insert_with(State::fresh);
                if is_new {
                    if superset.iter().any(|s| self.accepting.contains(s)) {
                        accepting.insert(target);
                    }
                    stack.push(superset);
                }
                transitions.insert((current_state, Symbol::Char(symbol)), target);
            }
        }
        let states: HashSet<State> = supersets.values().copied().collect();
        Fsm::new(states, self.alphabet.clone(), transitions, initial, accepting)
    }

    /// Exactly one initial state with no incoming edges, exactly one
    /// accepting state with no outgoing edges of any kind.
    pub fn to_normal_form(&self) -> Self {
        let mut transitions = self.transitions.clone();
        let start = if self.has_any_incoming(self.start) {
            let fresh = State::fresh();
            transitions.insert((fresh, Symbol::Epsilon), self.start);
            fresh
        } else {
            self.start
        };
        let single_clean_accept = self.accepting.len() == 1
            && !self.has_outgoing(*self.accepting.iter().next().unwrap());
        let accept = if single_clean_accept {
            *self.accepting.iter().next().unwrap()
        } else {
            let fresh = State::fresh();
            for &a in &self.accepting {
                transitions.insert((a, Symbol::Epsilon), fresh);
            }
            fresh
        };
        let mut states = self.states.clone();
        states.insert(start);
        states.insert(accept);
        Fsm::new(states, self.alphabet.clone(), transitions, start, std::iter::once(accept).collect())
    }

    pub fn concat(&self, other: &Self) -> Self {
        let a = self.to_normal_form();
        let b = other.to_normal_form();
        let mut transitions = a.transitions.clone();
        for (key, targets) in b.transitions.iter() {
            transitions.union_insert(key.clone(), targets.iter().copied());
        }
        let a_accept = *a.accepting.iter().next().unwrap();
        transitions.insert((a_accept, Symbol::Epsilon), b.start);
        let states: HashSet<State> = a.states.union(&b.states).copied().collect();
        let alphabet: HashSet<A> = a.alphabet.union(&b.alphabet).copied().collect();
        Fsm::new(states, alphabet, transitions, a.start, b.accepting.clone())
    }

    pub fn union(&self, other: &Self) -> Self {
        let a = self.to_normal_form();
        let b = other.to_normal_form();
        let mut transitions = a.transitions.clone();
        for (key, targets) in b.transitions.iter() {
            transitions.union_insert(key.clone(), targets.iter().copied());
        }
        let start = State::fresh();
        let accept = State::fresh();
        transitions.union_insert((start, Symbol::Epsilon), [a.start, b.start]);
        let a_accept = *a.accepting.iter().next().unwrap();
        let b_accept = *b.accepting.iter().next().unwrap();
        transitions.insert((a_accept, Symbol::Epsilon), accept);
        transitions.insert((b_accept, Symbol::Epsilon), accept);
        let mut states: HashSet<State> = a.states.union(&b.states).copied().collect();
        states.insert(start);
        states.insert(accept);
        let alphabet: HashSet<A> = a.alphabet.union(&b.alphabet).copied().collect();
        Fsm::new(states, alphabet, transitions, start, std::iter::once(accept).collect())
    }

    pub fn kleene_star(&self) -> Self {
        let x = self.to_normal_form();
        let state = State::fresh();
        let accept = *x.accepting.iter().next().unwrap();
        let mut transitions = x.transitions.clone();
        transitions.insert((state, Symbol::Epsilon), x.start);
        transitions.insert((accept, Symbol::Epsilon), state);
        let mut states = x.states.clone();
        states.insert(state);
        Fsm::new(states, x.alphabet.clone(), transitions, state, std::iter::once(state).collect())
            .to_normal_form()
    }

    /// Complement requires a total, deterministic machine, so this routes
    /// through subset construction first.
    pub fn complement(&self) -> Fsm<A, Deterministic> {
        self.to_dfsm().complement()
    }

    pub fn intersection(&self, other: &Self) -> Fsm<A, Deterministic> {
        let not_self = self.complement().to_nfsm();
        let not_other = other.complement().to_nfsm();
        not_self.union(&not_other).complement()
    }

    pub fn difference(&self, other: &Self) -> Fsm<A, Deterministic> {
        let not_other = other.complement().to_nfsm();
        self.intersection(&not_other)
    }
}

impl<A: Alphabet + fmt::Display> Fsm<A, NonDeterministic> {
    /// State elimination: normalize, then repeatedly fold a non-terminal
    /// state's in/out edges into its neighbors until only `start -> accept`
    /// is left.
    pub fn to_regex(&self) -> String {
        let machine = self.to_normal_form();
        let accept = *machine.accepting.iter().next().unwrap();
        let mut regexes: HashMap<(State, State), String> = HashMap::new();
        for (key, targets) in machine.transitions.iter() {
            let (old, symbol) = key;
            let label = match symbol {
                Symbol::Epsilon => String::new(),
                Symbol::Char(c) => c.to_string(),
            };
            for &new in targets {
                regexes
                    .entry((*old, new))
                    .and_modify(|existing| *existing = format!("({existing})|({label})"))
                    .or_insert_with(|| label.clone());
            }
        }
        let mut eliminate: Vec<State> = machine
            .states
            .iter()
            .copied()
            .filter(|s| *s != machine.start && !machine.accepting.contains(s))
            .collect();
        eliminate.sort();
        let mut pool: HashSet<State> = machine.states.clone();
        for q in eliminate {
            pool.remove(&q);
            let incoming: Vec<State> = pool.iter().copied().filter(|r| regexes.contains_key(&(*r, q))).collect();
            let outgoing: Vec<State> = pool.iter().copied().filter(|s| regexes.contains_key(&(q, *s))).collect();
            let loop_factor = regexes.get(&(q, q)).map(|m| format!("{m}*")).unwrap_or_default();
            for &r in &incoming {
                for &s in &outgoing {
                    let regex = format!("{}{}{}", regexes[&(r, q)], loop_factor, regexes[&(q, s)]);
                    regexes
                        .entry((r, s))
                        .and_modify(|existing| *existing = format!("({existing})|({regex})"))
                        .or_insert(regex);
                }
            }
        }
        regexes.get(&(machine.start, accept)).cloned().unwrap_or_default()
    }
}

impl<A: Alphabet> Fsm<A, Deterministic> {
    pub fn to_nfsm(&self) -> Fsm<A, NonDeterministic> {
        Fsm::new(
            self.states.clone(),
            self.alphabet.clone(),
            self.transitions.clone(),
            self.start,
            self.accepting.clone(),
        )
    }

    pub fn is_total(&self) -> bool {
        self.states
            .iter()
            .all(|&s| self.alphabet.iter().all(|&a| self.transitions.contains_key(&(s, Symbol::Char(a)))))
    }

    pub fn make_total(&self) -> Self {
        if self.is_total() {
            return self.clone();
        }
        let trash = State::fresh();
        let mut transitions = self.transitions.clone();
        for &s in &self.states {
            for &a in &self.alphabet {
                let key = (s, Symbol::Char(a));
                if !transitions.contains_key(&key) {
                    transitions.insert(key, trash);
                }
            }
        }
        for &a in &self.alphabet {
            transitions.insert((trash, Symbol::Char(a)), trash);
        }
        let mut states = self.states.clone();
        states.insert(trash);
        Fsm::new(states, self.alphabet.clone(), transitions, self.start, self.accepting.clone())
    }

    pub fn complement(&self) -> Self {
        let total = self.make_total();
        let accepting: HashSet<State> = total.states.difference(&total.accepting).copied().collect();
        Fsm::new(total.states.clone(), total.alphabet.clone(), total.transitions.clone(), total.start, accepting)
    }

    fn all_next_states(&self, state: State) -> impl Iterator<Item = State> + '_ {
        self.alphabet
            .iter()
            .flat_map(move |&a| self.transitions.get(&(state, Symbol::Char(a))).copied())
    }

    fn all_prev_states(&self, state: State) -> impl Iterator<Item = State> + '_ {
        self.transitions
            .iter()
            .filter(move |(_, targets)| targets.contains(&state))
            .map(|(key, _)| key.0)
    }

    fn unreachable_states(&self) -> HashSet<State> {
        let mut reachable = HashSet::new();
        let mut frontier = vec![self.start];
        while let Some(s) = frontier.pop() {
            if reachable.insert(s) {
                frontier.extend(self.all_next_states(s));
            }
        }
        self.states.difference(&reachable).copied().collect()
    }

    fn useless_states(&self) -> HashSet<State> {
        let mut useful: HashSet<State> = HashSet::new();
        let mut frontier: Vec<State> = self.accepting.iter().copied().collect();
        while let Some(s) = frontier.pop() {
            if useful.insert(s) {
                frontier.extend(self.all_prev_states(s));
            }
        }
        self.states.difference(&useful).copied().collect()
    }

    fn empty_machine(alphabet: HashSet<A>) -> Self {
        let state = State::fresh();
        Fsm::new([state].into_iter().collect(), alphabet, MultiMap::new(), state, HashSet::new())
    }

    /// Drop unreachable and non-co-reachable states. If the start state
    /// itself turns out useless, the whole machine collapses to the
    /// canonical empty-language machine.
    pub fn simplify(&self) -> Self {
        let useless = self.useless_states();
        if useless.contains(&self.start) {
            return Self::empty_machine(self.alphabet.clone());
        }
        let unreachable = self.unreachable_states();
        let remove: HashSet<State> = unreachable.union(&useless).copied().collect();
        let mut transitions = MultiMap::new();
        for (key, targets) in self.transitions.iter() {
            if remove.contains(&key.0) {
                continue;
            }
            for &target in targets {
                if !remove.contains(&target) {
                    transitions.insert(key.clone(), target);
                }
            }
        }
        let states: HashSet<State> = self.states.difference(&remove).copied().collect();
        let accepting: HashSet<State> = self.accepting.difference(&remove).copied().collect();
        Fsm::new(states, self.alphabet.clone(), transitions, self.start, accepting)
    }
}

impl<A: Alphabet + fmt::Display> Fsm<A, Deterministic> {
    pub fn to_regex(&self) -> String {
        self.to_nfsm().to_regex()
    }
}

/// A runner configuration for either flavor of FSM: the cursor into a
/// shared word plus the current state. Equality and hashing ignore the
/// shared word buffer (it never changes within one run), so lineage
/// seen-sets compare in constant time.
#[derive(Clone)]
pub struct FsmConfig<A: Alphabet> {
    word: Rc<[A]>,
    position: usize,
    state: State,
}

impl<A: Alphabet> PartialEq for FsmConfig<A> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.state == other.state
    }
}

impl<A: Alphabet> Eq for FsmConfig<A> {}

impl<A: Alphabet> Hash for FsmConfig<A> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.position.hash(hasher);
        self.state.hash(hasher);
    }
}

impl<A: Alphabet, K: Kind> Runner for Fsm<A, K> {
    type Symbol = A;
    type Config = FsmConfig<A>;
    type Key = (State, Symbol<A>);
    type Target = State;

    fn initial_config(&self, word: Rc<[A]>) -> FsmConfig<A> {
        FsmConfig { word, position: 0, state: self.start }
    }

    fn keys(&self, config: &FsmConfig<A>) -> Vec<Self::Key> {
        let mut out = Vec::new();
        if config.position < config.word.len() {
            out.push((config.state, Symbol::Char(config.word[config.position])));
        } else {
            out.push((config.state, Symbol::Epsilon));
        }
        if K::ALLOWS_EPSILON && !out.contains(&(config.state, Symbol::Epsilon)) {
            out.push((config.state, Symbol::Epsilon));
        }
        out
    }

    fn targets(&self, key: &Self::Key) -> Vec<State> {
        self.transitions.get(key).copied().collect()
    }

    fn next_config(&self, config: &FsmConfig<A>, key: &Self::Key, target: &State) -> FsmConfig<A> {
        let position = if key.1.is_epsilon() { config.position } else { config.position + 1 };
        FsmConfig {
            word: config.word.clone(),
            position,
            state: *target,
        }
    }

    fn check_accept(&self, config: &FsmConfig<A>) -> Verdict {
        if config.position < config.word.len() {
            return Verdict::Continue;
        }
        if self.accepting.contains(&config.state) {
            return Verdict::Accept;
        }
        if K::ALLOWS_EPSILON && self.transitions.contains_key(&(config.state, Symbol::Epsilon)) {
            return Verdict::Continue;
        }
        Verdict::Reject
    }

    fn check_accept_sliding(&self, config: &FsmConfig<A>) -> Verdict {
        Verdict::from_bool(self.accepting.contains(&config.state))
    }

    fn make_match(&self, config: &FsmConfig<A>) -> Match<A> {
        Match::new(0, config.position, config.word.clone())
    }
}

#[cfg(feature = "visualization")]
pub struct FsmFormatter;

#[cfg(feature = "visualization")]
impl<A: Alphabet> crate::formatter::Formatter<(State, Symbol<A>), State> for FsmFormatter {
    fn source_id(key: &(State, Symbol<A>)) -> String {
        format!("{:?}", key.0)
    }

    fn target_id(value: &State) -> String {
        format!("{value:?}")
    }

    fn label(key: &(State, Symbol<A>), _value: &State) -> String {
        match key.1 {
            Symbol::Epsilon => "\u{3b5}".to_string(),
            Symbol::Char(c) => format!("{c:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Rc<[char]> {
        s.chars().collect::<Vec<_>>().into()
    }

    #[test]
    fn atom_matches_single_symbol() {
        let m = Nfsm::atom_matcher('a');
        assert!(m.accepts("a".chars()));
        assert!(!m.accepts("b".chars()));
        assert!(!m.accepts("".chars()));
    }

    #[test]
    fn concat_matches_sequence() {
        let m = Nfsm::atom_matcher('a').concat(&Nfsm::atom_matcher('b'));
        assert!(m.accepts("ab".chars()));
        assert!(!m.accepts("a".chars()));
        assert!(!m.accepts("ba".chars()));
    }

    #[test]
    fn union_matches_either_branch() {
        let m = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b'));
        assert!(m.accepts("a".chars()));
        assert!(m.accepts("b".chars()));
        assert!(!m.accepts("ab".chars()));
        assert!(!m.accepts("".chars()));
    }

    #[test]
    fn kleene_star_matches_any_repetition() {
        let m = Nfsm::atom_matcher('a').kleene_star();
        assert!(m.accepts("".chars()));
        assert!(m.accepts("a".chars()));
        assert!(m.accepts("aaaa".chars()));
        assert!(!m.accepts("aab".chars()));
    }

    #[test]
    fn alternation_star_matches_mixed_runs() {
        let m = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b')).kleene_star();
        for good in ["", "a", "b", "ab", "ba", "aabbab"] {
            assert!(m.accepts(good.chars()), "expected {good:?} to match");
        }
        assert!(!m.accepts("abc".chars()));
    }

    #[test]
    fn to_dfsm_preserves_language() {
        let nfsm = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b')).kleene_star();
        let dfsm = nfsm.to_dfsm();
        for candidate in ["", "a", "b", "ab", "ba", "aabbab", "abc"] {
            assert_eq!(
                dfsm.accepts(candidate.chars()),
                nfsm.accepts(candidate.chars()),
                "mismatch on {candidate:?}"
            );
        }
    }

    #[test]
    fn to_dfsm_does_not_duplicate_equal_superstates() {
        // (a|a)* forces the same superstate to be reachable along two
        // different epsilon paths; subset construction must still collapse
        // it to a single DFSM state.
        let nfsm = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('a')).kleene_star();
        let dfsm = nfsm.to_dfsm();
        assert!(dfsm.states().len() <= 3);
    }

    #[test]
    fn complement_flips_acceptance() {
        let dfsm = Nfsm::atom_matcher('a').to_dfsm();
        let complement = dfsm.complement();
        assert!(!complement.accepts("a".chars()));
        assert!(complement.accepts("".chars()));
        assert!(complement.accepts("aa".chars()));
    }

    #[test]
    fn intersection_and_difference_compose_languages() {
        let a_star = Nfsm::atom_matcher('a').kleene_star();
        let a_or_b_star = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b')).kleene_star();
        let intersected = a_star.intersection(&a_or_b_star);
        assert!(intersected.accepts("aaa".chars()));
        assert!(!intersected.accepts("ab".chars()));

        let difference = a_or_b_star.difference(&a_star);
        assert!(difference.accepts("ab".chars()));
        assert!(!difference.accepts("aaa".chars()));
    }

    #[test]
    fn make_total_adds_trash_state_with_self_loops() {
        let dfsm = Nfsm::atom_matcher('a').to_dfsm();
        assert!(!dfsm.is_total());
        let total = dfsm.make_total();
        assert!(total.is_total());
        assert!(total.make_total().states().len() == total.states().len());
    }

    #[test]
    fn simplify_preserves_language_and_drops_dead_states() {
        let dfsm = Nfsm::atom_matcher('a').to_dfsm().make_total();
        let simplified = dfsm.simplify();
        for candidate in ["", "a", "aa", "b"] {
            assert_eq!(simplified.accepts(candidate.chars()), dfsm.accepts(candidate.chars()));
        }
        assert!(simplified.states().len() <= dfsm.states().len());
    }

    #[test]
    fn simplify_of_empty_language_is_canonical() {
        let empty = Nfsm::atom_matcher('a').intersection(&Nfsm::atom_matcher('b').to_dfsm().to_nfsm());
        let simplified = empty.simplify();
        assert!(simplified.accepting().is_empty());
        assert!(!simplified.accepts("a".chars()));
    }

    #[test]
    fn to_regex_of_concat_chain_is_exact() {
        let abc = Nfsm::atom_matcher('a')
            .concat(&Nfsm::atom_matcher('b'))
            .concat(&Nfsm::atom_matcher('c'));
        assert_eq!(abc.to_regex(), "abc");
    }

    #[test]
    fn to_regex_after_subset_construction_matches_union() {
        let machine = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b')).to_dfsm();
        let regex = machine.to_regex();
        assert!(regex == "(a)|(b)" || regex == "(b)|(a)", "got {regex:?}");
    }

    #[test]
    fn runner_find_first_reports_consumed_span() {
        let m = Nfsm::atom_matcher('a').concat(&Nfsm::atom_matcher('b'));
        let found = m.find_first(word("ab")).expect("should match");
        assert_eq!((found.start, found.stop), (0, 2));
    }

    #[cfg(feature = "visualization")]
    #[test]
    fn render_emits_dot_source_with_an_edge_per_transition() {
        let m = Nfsm::atom_matcher('a').union(&Nfsm::atom_matcher('b'));
        let dot = m.render().unwrap();
        assert!(dot.starts_with("digraph"));
        let edge_count: usize = m.transitions.iter().map(|(_, targets)| targets.len()).sum();
        // one extra edge for the synthetic start-state arrow
        assert_eq!(dot.matches("->").count(), edge_count + 1);
    }
}
