//! The generic configuration-graph runner.
//!
//! One `Runner` trait supplies the BFS drivers (`run_with`, `find_first`,
//! `find_last`, `find_all`, `search_*`) over a configuration graph whose
//! shape is described by a handful of required hooks. The drivers are
//! provided default methods; the hooks are implemented separately by
//! [`crate::fsm::Fsm`] and [`crate::pdm::Pdm`], which share no inheritance
//! relationship. Each configuration type carries its own (shared,
//! `Rc`-backed) view of the remaining word, so the driver loops never need
//! the original word passed back in.
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

use crate::match_result::Match;

/// The three-valued verdict a configuration can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Accept,
    Reject,
}

impl Verdict {
    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }
}

/// Per-call BFS scratch state: the work queue and the precursor-lineage
/// seen-sets used to guarantee termination in the presence of ε-cycles.
/// Each enqueued configuration carries the id of the lineage that produced
/// it; a configuration already seen along its own lineage is dropped, but
/// sibling lineages explore independently.
struct Backlog<C: Clone + Eq + Hash> {
    queue: VecDeque<(u64, C)>,
    seen: HashMap<u64, HashSet<C>>,
    next_id: u64,
}

impl<C: Clone + Eq + Hash> Backlog<C> {
    fn new(initial: C) -> Self {
        let mut backlog = Backlog {
            queue: VecDeque::new(),
            seen: HashMap::new(),
            next_id: 0,
        };
        let id = backlog.mint_id();
        backlog.queue.push_back((id, initial));
        backlog
    }

    fn mint_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Enqueue `config` as a child of `precursor`, unless it was already
    /// seen along that lineage. A fresh id is minted for the child so
    /// sibling lineages stay independent.
    fn push(&mut self, precursor: u64, config: C) {
        let already_seen = self
            .seen
            .get(&precursor)
            .map(|set| set.contains(&config))
            .unwrap_or(false);
        if already_seen {
            return;
        }
        let mut lineage = self.seen.get(&precursor).cloned().unwrap_or_default();
        lineage.insert(config.clone());
        let id = self.mint_id();
        self.seen.insert(id, lineage);
        self.queue.push_back((id, config));
    }
}

/// Enqueue every successor of `current` reachable through one transition.
fn advance<R: Runner + ?Sized>(
    runner: &R,
    current: &R::Config,
    precursor: u64,
    backlog: &mut Backlog<R::Config>,
) {
    for key in runner.keys(current) {
        for target in runner.targets(&key) {
            let next = runner.next_config(current, &key, &target);
            backlog.push(precursor, next);
        }
    }
}

/// The machine-specific protocol the BFS drivers run over, plus the
/// provided BFS drivers themselves.
pub trait Runner {
    /// The alphabet symbols a word over this machine is made of.
    type Symbol: Clone;
    /// A full runtime configuration: remaining input, current state, and
    /// whatever auxiliary structure the machine needs (e.g. a stack). Each
    /// configuration carries its own view of the word, so the driver loops
    /// never thread the word through separately.
    type Config: Clone + Eq + Hash;
    /// A lookup key identifying an applicable transition from a
    /// configuration (e.g. `(state, symbol)`).
    type Key: Clone + Eq + Hash;
    /// The transition-table value a key resolves to (e.g. a target state,
    /// or `(state, push string)` for pushdown machines).
    type Target: Clone;

    fn initial_config(&self, word: Rc<[Self::Symbol]>) -> Self::Config;
    fn keys(&self, config: &Self::Config) -> Vec<Self::Key>;
    fn targets(&self, key: &Self::Key) -> Vec<Self::Target>;
    fn next_config(&self, config: &Self::Config, key: &Self::Key, target: &Self::Target) -> Self::Config;
    fn check_accept(&self, config: &Self::Config) -> Verdict;
    fn check_accept_sliding(&self, config: &Self::Config) -> Verdict;
    fn make_match(&self, config: &Self::Config) -> Match<Self::Symbol>;

    /// `Accept` iff any explored configuration fully accepts; `Reject` once
    /// the queue drains.
    fn run_with(&self, word: Rc<[Self::Symbol]>) -> Verdict {
        let mut backlog = Backlog::new(self.initial_config(word));
        while let Some((precursor, current)) = backlog.queue.pop_front() {
            match self.check_accept(&current) {
                Verdict::Accept => return Verdict::Accept,
                Verdict::Reject => continue,
                Verdict::Continue => {}
            }
            advance(self, &current, precursor, &mut backlog);
        }
        Verdict::Reject
    }

    /// The first match (by BFS discovery order) accepted by
    /// `check_accept_sliding`; terminates as soon as any configuration
    /// gives a strict end-of-input verdict.
    fn find_first(&self, word: Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        let mut backlog = Backlog::new(self.initial_config(word));
        while let Some((precursor, current)) = backlog.queue.pop_front() {
            let sliding = self.check_accept_sliding(&current);
            match self.check_accept(&current) {
                Verdict::Accept => return Some(self.make_match(&current)),
                Verdict::Reject => break,
                Verdict::Continue => {}
            }
            if sliding == Verdict::Accept {
                return Some(self.make_match(&current));
            }
            advance(self, &current, precursor, &mut backlog);
        }
        None
    }

    /// The longest sliding match discovered before end-of-input
    /// termination (not after exhausting every configuration — see
    /// DESIGN.md for the rationale).
    fn find_last(&self, word: Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        let mut backlog = Backlog::new(self.initial_config(word));
        let mut best = None;
        while let Some((precursor, current)) = backlog.queue.pop_front() {
            let sliding = self.check_accept_sliding(&current);
            match self.check_accept(&current) {
                Verdict::Accept => {
                    best = Some(self.make_match(&current));
                    break;
                }
                Verdict::Reject => break,
                Verdict::Continue => {}
            }
            if sliding == Verdict::Accept {
                best = Some(self.make_match(&current));
            }
            advance(self, &current, precursor, &mut backlog);
        }
        best
    }

    fn find_all(&self, word: Rc<[Self::Symbol]>) -> Vec<Match<Self::Symbol>> {
        let mut backlog = Backlog::new(self.initial_config(word));
        let mut matches = Vec::new();
        while let Some((precursor, current)) = backlog.queue.pop_front() {
            let sliding = self.check_accept_sliding(&current);
            match self.check_accept(&current) {
                Verdict::Accept => {
                    matches.push(self.make_match(&current));
                    break;
                }
                Verdict::Reject => break,
                Verdict::Continue => {}
            }
            if sliding == Verdict::Accept {
                matches.push(self.make_match(&current));
            }
            advance(self, &current, precursor, &mut backlog);
        }
        matches
    }

    /// Try `find_first` at every offset, ascending.
    fn search_first(&self, word: &Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        for offset in 0..word.len() {
            if let Some(m) = self.find_first(suffix(word, offset)) {
                return Some(m.shift(offset));
            }
        }
        None
    }

    /// Try `find_last` at every offset, descending.
    fn search_last(&self, word: &Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        for offset in (0..word.len()).rev() {
            if let Some(m) = self.find_last(suffix(word, offset)) {
                return Some(m.shift(offset));
            }
        }
        None
    }

    fn search_longest(&self, word: &Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        self.search_best(word, |best, candidate| {
            if candidate.len() >= best.len() {
                candidate
            } else {
                best
            }
        })
    }

    fn search_shortest(&self, word: &Rc<[Self::Symbol]>) -> Option<Match<Self::Symbol>> {
        self.search_best(word, |best, candidate| {
            if candidate.len() <= best.len() {
                candidate
            } else {
                best
            }
        })
    }

    fn search_all(&self, word: &Rc<[Self::Symbol]>) -> Vec<Match<Self::Symbol>> {
        let mut out = Vec::new();
        for offset in 0..word.len() {
            for m in self.find_all(suffix(word, offset)) {
                out.push(m.shift(offset));
            }
        }
        out
    }

    /// Shared plumbing for `search_longest`/`search_shortest`: ascending
    /// offset sweep, `find_last` at each, folded with `pick`.
    fn search_best(
        &self,
        word: &Rc<[Self::Symbol]>,
        pick: impl Fn(Match<Self::Symbol>, Match<Self::Symbol>) -> Match<Self::Symbol>,
    ) -> Option<Match<Self::Symbol>> {
        let mut best: Option<Match<Self::Symbol>> = None;
        for offset in 0..word.len() {
            if let Some(m) = self.find_last(suffix(word, offset)) {
                let m = m.shift(offset);
                best = Some(match best {
                    None => m,
                    Some(existing) => pick(existing, m),
                });
            }
        }
        best
    }
}

fn suffix<A: Clone>(word: &Rc<[A]>, offset: usize) -> Rc<[A]> {
    word[offset..].to_vec().into()
}
