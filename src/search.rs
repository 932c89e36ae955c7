//  SEARCH.rs
//    by Lut99
//
//  Created:
//    15 Oct 2026, 13:48:02
//  Last edited:
//    16 Oct 2026, 15:22:39
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements planning as state-space search, using grounded rules as
//!   operators that turn one [`State`] into another.
//!
//!   The search keeps a frontier of `(state, path)`-pairs and a closed set of
//!   states seen so far. Every step, it:
//!   1. dequeues a state and returns if it equals the goal;
//!   2. stops expanding the branch if its path is as long as the depth bound;
//!   3. re-grounds the rule templates if the set of fact names differs from
//!      the one they were last grounded against;
//!   4. pushes every grounded rule whose antecedent holds onto a fresh
//!      [`Agenda`]; and
//!   5. fires every rule on the agenda, scheduling successors that aren't
//!      in the closed set yet.
//!
//!   With a FIFO frontier, this is a breadth-first search. With a frontier
//!   ordered by a [`Heuristic`], it is a greedy best-first search.
//

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet, VecDeque};
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::str::FromStr;

use crate::agenda::{self, Agenda};
use crate::bind::{bind, RuleSet};
use crate::facts::{Facts, State, Value};
use crate::log::{debug, trace};
use crate::rules::{self, ArithOp, Rule};


/***** ERRORS *****/
/// Defines errors that abort a search.
///
/// Not finding the goal is not one of them; see [`Outcome::path`] for that.
#[derive(Debug)]
pub enum Error {
    /// Failed to bind or evaluate rules.
    Rules { err: rules::Error },
    /// The agenda was misused.
    Agenda { err: agenda::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Rules { .. } => write!(f, "Failed to bind or evaluate rules"),
            Self::Agenda { .. } => write!(f, "Failed to resolve conflicting rules"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Rules { err } => Some(err),
            Self::Agenda { err } => Some(err),
        }
    }
}
impl From<rules::Error> for Error {
    #[inline]
    fn from(value: rules::Error) -> Self { Self::Rules { err: value } }
}
impl From<agenda::Error> for Error {
    #[inline]
    fn from(value: agenda::Error) -> Self { Self::Agenda { err: value } }
}

/// Represents that a string did not name a known [`Strategy`].
#[derive(Debug)]
pub struct UnknownStrategyError {
    /// The raw string given.
    pub raw: String,
}
impl Display for UnknownStrategyError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "Unknown search strategy \"{}\" (expected \"breadth-first\" or \"best-first\")", self.raw)
    }
}
impl error::Error for UnknownStrategyError {}





/***** INTERFACES *****/
/// Scores states by how far they seem to be from the goal. Lower is better.
pub trait Heuristic {
    /// Scores a state.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to score.
    /// - `goal`: The goal [`State`] of the search.
    /// - `attr`: The name of a slot to consider, if the heuristic needs one.
    ///
    /// # Returns
    /// A score, where lower means closer to the goal.
    ///
    /// # Errors
    /// This function may error if the state can't be scored, e.g., because `attr` doesn't name a
    /// numeric slot.
    fn score(&self, state: &State, goal: &State, attr: Option<&str>) -> Result<f64, rules::Error>;
}
impl<F> Heuristic for F
where
    F: Fn(&State, &State, Option<&str>) -> Result<f64, rules::Error>,
{
    #[inline]
    fn score(&self, state: &State, goal: &State, attr: Option<&str>) -> Result<f64, rules::Error> { self(state, goal, attr) }
}

/// A frontier of states still to explore.
trait Frontier {
    /// Schedules a state for exploration.
    ///
    /// # Errors
    /// This function may error if the state could not be prioritized.
    fn push(&mut self, state: State, path: Vec<Rule>) -> Result<(), Error>;

    /// Returns the next state to explore, if any.
    fn pop(&mut self) -> Option<(State, Vec<Rule>)>;
}





/***** HELPERS *****/
/// A first-in, first-out [`Frontier`].
#[derive(Debug, Default)]
struct Fifo {
    queue: VecDeque<(State, Vec<Rule>)>,
}
impl Frontier for Fifo {
    #[inline]
    fn push(&mut self, state: State, path: Vec<Rule>) -> Result<(), Error> {
        self.queue.push_back((state, path));
        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Option<(State, Vec<Rule>)> { self.queue.pop_front() }
}

/// An entry in a [`Scored`] frontier.
#[derive(Debug)]
struct ScoredEntry {
    score: f64,
    seq:   u64,
    state: State,
    path:  Vec<Rule>,
}
impl Eq for ScoredEntry {}
impl Ord for ScoredEntry {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap, so reversed: lowest score first, then first-come first-serve
        other.score.total_cmp(&self.score).then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialEq for ScoredEntry {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}
impl PartialOrd for ScoredEntry {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// A [`Frontier`] that explores the state with the lowest [`Heuristic`] score first.
struct Scored<'h> {
    heap: BinaryHeap<ScoredEntry>,
    heuristic: &'h dyn Heuristic,
    goal: &'h State,
    attr: Option<&'h str>,
    seq: u64,
}
impl<'h> Frontier for Scored<'h> {
    #[inline]
    fn push(&mut self, state: State, path: Vec<Rule>) -> Result<(), Error> {
        let score: f64 = self.heuristic.score(&state, self.goal, self.attr)?;
        trace!("--> Scored state at {score}");
        self.seq += 1;
        self.heap.push(ScoredEntry { score, seq: self.seq, state, path });
        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Option<(State, Vec<Rule>)> { self.heap.pop().map(|e| (e.state, e.path)) }
}



/// Collects the fact names of a state into an owned set.
#[inline]
fn owned_names(state: &State) -> BTreeSet<String> { state.fact_names().into_iter().map(String::from).collect() }

/// The actual search procedure, generic over the order in which states are explored.
fn search(wm: &WorkingMemory, max_depth: usize, frontier: &mut impl Frontier, mut progress: impl FnMut(usize, &State)) -> Result<Outcome, Error> {
    debug!("Starting search (max depth {max_depth}) over {} rule(s)", wm.rules.len());

    let mut closed: HashSet<State> = HashSet::from([wm.initial.clone()]);
    let mut rules: RuleSet = bind(&wm.rules, &wm.initial)?;
    // The names `rules` was grounded against, which may lag behind `prev` after a cut-off branch
    let mut bound_names: BTreeSet<String> = owned_names(&wm.initial);
    let mut visited: usize = 0;

    frontier.push(wm.initial.clone(), Vec::new())?;
    let mut prev: State = wm.initial.clone();
    while let Some((state, path)) = frontier.pop() {
        if state == wm.goal {
            debug!("Found goal at depth {} (visited {visited} state(s))", path.len());
            return Ok(Outcome { state, path: Some(path), visited });
        }
        visited += 1;
        progress(visited, &state);
        if path.len() >= max_depth {
            trace!("--> Depth bound reached; not expanding");
            prev = state;
            continue;
        }

        // Only rebind when the names change, not just the values
        if !state.names().eq(bound_names.iter().map(String::as_str)) {
            trace!("--> Fact names changed; rebinding");
            rules = bind(&wm.rules, &state)?;
            bound_names = owned_names(&state);
        }

        // Collect the rules that apply
        let mut agenda: Agenda = Agenda::new();
        for rule in rules.grounded() {
            if rule.holds(&state)? {
                agenda.push(rule.clone())?;
            }
        }

        // Fire all of them to find the successors
        while !agenda.is_empty() {
            let rule: Rule = agenda.pop()?;
            let next: State = rule.successor(&state)?;
            if !closed.contains(&next) {
                trace!("--> New state via '{rule}'");
                closed.insert(next.clone());
                let mut next_path: Vec<Rule> = path.clone();
                next_path.push(rule);
                frontier.push(next, next_path)?;
            }
        }
        prev = state;
    }

    debug!("Exhausted search space (visited {visited} state(s))");
    Ok(Outcome { state: prev, path: None, visited })
}





/***** LIBRARY FUNCTIONS *****/
/// Finds a shortest sequence of rule firings leading from the initial state to the goal.
///
/// # Arguments
/// - `wm`: The [`WorkingMemory`] describing the problem.
/// - `max_depth`: The maximum length of a path. States at this depth are visited, but not
///   expanded.
/// - `progress`: A callback called with the visited count and the state for every state visited.
///
/// # Returns
/// An [`Outcome`] that has a path if the goal was found.
///
/// # Errors
/// This function errors if binding or evaluating any rule fails.
#[inline]
pub fn breadth_first_search(wm: &WorkingMemory, max_depth: usize, progress: impl FnMut(usize, &State)) -> Result<Outcome, Error> {
    search(wm, max_depth, &mut Fifo::default(), progress)
}

/// Searches for the goal by always expanding the state with the best [`Heuristic`] score first.
///
/// Ties are broken in the order states were discovered. Unlike [`breadth_first_search()`], the
/// path found is not necessarily the shortest.
///
/// # Arguments
/// - `wm`: The [`WorkingMemory`] describing the problem.
/// - `max_depth`: The maximum length of a path.
/// - `heuristic`: The [`Heuristic`] to order states with.
/// - `attr`: The name of the slot the heuristic considers, if any.
/// - `progress`: A callback called with the visited count and the state for every state visited.
///
/// # Returns
/// An [`Outcome`] that has a path if the goal was found.
///
/// # Errors
/// This function errors if binding or evaluating any rule fails, or if the heuristic fails to
/// score a state.
#[inline]
pub fn best_first_search(
    wm: &WorkingMemory,
    max_depth: usize,
    heuristic: &dyn Heuristic,
    attr: Option<&str>,
    progress: impl FnMut(usize, &State),
) -> Result<Outcome, Error> {
    let mut frontier = Scored { heap: BinaryHeap::new(), heuristic, goal: &wm.goal, attr, seq: 0 };
    search(wm, max_depth, &mut frontier, progress)
}





/***** LIBRARY *****/
/// The problem statement of a search.
#[derive(Clone, Debug)]
pub struct WorkingMemory {
    /// The state to start from.
    pub initial: State,
    /// The rule templates acting as operators.
    pub rules:   RuleSet,
    /// The state to reach.
    pub goal:    State,
}
impl WorkingMemory {
    /// Constructor for the WorkingMemory.
    ///
    /// # Arguments
    /// - `initial`: The [`State`] to start from.
    /// - `rules`: The [`Rule`]s (or templates) to search with.
    /// - `goal`: The [`State`] to reach.
    #[inline]
    pub fn new(initial: State, rules: impl IntoIterator<Item = Rule>, goal: State) -> Self { Self { initial, rules: rules.into_iter().collect(), goal } }
}
impl Display for WorkingMemory {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}\n{}\n{}", self.initial, self.rules, self.goal) }
}

/// The result of a completed search.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// The goal state if found, or else the last state visited.
    pub state:   State,
    /// The rules fired to get from the initial state to the goal, or [`None`] if the goal wasn't
    /// found.
    pub path:    Option<Vec<Rule>>,
    /// The number of states visited (not counting the goal).
    pub visited: usize,
}
impl Outcome {
    /// Returns whether the goal was found.
    #[inline]
    pub fn is_success(&self) -> bool { self.path.is_some() }

    /// Computes the penetrance of the search, i.e., the fraction of visited states that lie on the
    /// solution path.
    ///
    /// # Returns
    /// The path length divided by the visited count, or [`None`] if there is no path or nothing
    /// was visited.
    #[inline]
    pub fn penetrance(&self) -> Option<f64> {
        match &self.path {
            Some(path) if self.visited > 0 => Some(path.len() as f64 / self.visited as f64),
            _ => None,
        }
    }
}

/// Selects how the search space is explored.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// A [breadth-first search](breadth_first_search()).
    #[default]
    BreadthFirst,
    /// A [greedy best-first search](best_first_search()).
    BestFirst,
}
impl Display for Strategy {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::BreadthFirst => write!(f, "breadth-first"),
            Self::BestFirst => write!(f, "best-first"),
        }
    }
}
impl FromStr for Strategy {
    type Err = UnknownStrategyError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breadth-first" | "bfs" => Ok(Self::BreadthFirst),
            "best-first" | "best" => Ok(Self::BestFirst),
            raw => Err(UnknownStrategyError { raw: raw.into() }),
        }
    }
}



/// A [`Heuristic`] counting how much a state differs from the goal.
///
/// Every fact that's in one but not the other counts as 1. For facts in both, if an attribute is
/// given, the absolute difference between their values for that slot is added; otherwise, any
/// difference at all counts as 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotDistance;
impl Heuristic for SlotDistance {
    fn score(&self, state: &State, goal: &State, attr: Option<&str>) -> Result<f64, rules::Error> {
        let mut score: f64 = state.names().filter(|name| !goal.contains(name)).count() as f64;
        for want in goal.iter() {
            let have = match state.get(&want.name) {
                Some(have) => have,
                None => {
                    score += 1.0;
                    continue;
                },
            };
            match attr {
                Some(attr) => match (have.get(attr), want.get(attr)) {
                    (Some(lhs), Some(rhs)) => score += (numeric(lhs)? - numeric(rhs)?).abs(),
                    (None, None) => {},
                    _ => score += 1.0,
                },
                None => score += (have != want) as u8 as f64,
            }
        }
        Ok(score)
    }
}

/// Gets a value as a number, or complains the way arithmetic would.
#[inline]
fn numeric(value: &Value) -> Result<f64, rules::Error> { value.as_f64().ok_or_else(|| rules::Error::NotNumericOperand { op: ArithOp::Sub, value: value.clone() }) }





/***** TESTS *****/
