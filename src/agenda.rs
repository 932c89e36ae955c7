//  AGENDA.rs
//    by Lut99
//
//  Created:
//    15 Oct 2026, 11:03:26
//  Last edited:
//    16 Oct 2026, 09:14:50
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the conflict-resolution agenda used by the planner.
//!
//!   The agenda holds at most one pending rule per distinct consequent.
//!   Rules reaching the same outcome through different bindings are thereby
//!   only expanded once. Amongst pending rules, the most recently pushed one
//!   is popped first.
//

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::time::{Duration, Instant};

use crate::log::trace;
use crate::rules::{Consequent, Rule};


/***** ERRORS *****/
/// Defines errors originating from the [`Agenda`].
#[derive(Debug)]
pub enum Error {
    /// Attempted to push a rule that still contains variables.
    Ungrounded { rule: String },
    /// Attempted to pop from an empty agenda.
    Empty,
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Ungrounded { rule } => write!(f, "Cannot push rule '{rule}' to the agenda because it is not grounded"),
            Self::Empty => write!(f, "Pop from empty agenda"),
        }
    }
}
impl error::Error for Error {}





/***** INTERFACES *****/
/// A monotonic source of timestamps.
pub trait Clock {
    /// Returns the current timestamp.
    ///
    /// # Returns
    /// A [`Duration`] since some fixed point in the past. Consecutive calls never go back in time.
    fn now(&mut self) -> Duration;
}

/// A [`Clock`] that reads the system's monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    /// The point all timestamps are relative to.
    start: Instant,
}
impl Default for MonotonicClock {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl MonotonicClock {
    /// Constructor for the MonotonicClock that counts from now.
    #[inline]
    pub fn new() -> Self { Self { start: Instant::now() } }
}
impl Clock for MonotonicClock {
    #[inline]
    fn now(&mut self) -> Duration { self.start.elapsed() }
}

/// A deterministic [`Clock`] that advances by a fixed step every time it is read.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepClock {
    /// The current time.
    time: Duration,
    /// How much to advance per read.
    step: Duration,
}
impl StepClock {
    /// Constructor for the StepClock.
    ///
    /// # Arguments
    /// - `step`: How much time passes between two reads.
    #[inline]
    pub fn new(step: Duration) -> Self { Self { time: Duration::ZERO, step } }
}
impl Clock for StepClock {
    #[inline]
    fn now(&mut self) -> Duration {
        self.time += self.step;
        self.time
    }
}





/***** HELPERS *****/
/// A pending rule on the [`Agenda`].
#[derive(Debug)]
struct Entry {
    /// The negated timestamp at which the rule was pushed. Lower pops first.
    priority: i128,
    /// Insertion counter, for when the clock didn't advance between two pushes.
    seq:      u64,
    /// The rule itself.
    rule:     Rule,
}
impl Eq for Entry {}
impl Ord for Entry {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: The heap is a max-heap, so we invert the priority. Ties go to the latest push.
        other.priority.cmp(&self.priority).then_with(|| self.seq.cmp(&other.seq))
    }
}
impl PartialEq for Entry {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.priority == other.priority && self.seq == other.seq }
}
impl PartialOrd for Entry {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}





/***** LIBRARY *****/
/// A priority queue of grounded rules with at most one pending rule per [`Consequent`].
#[derive(Debug)]
pub struct Agenda<C = MonotonicClock> {
    /// The pending rules.
    queue: BinaryHeap<Entry>,
    /// The consequents of the pending rules.
    consequents: HashSet<Consequent>,
    /// The clock providing push timestamps.
    clock: C,
    /// The number of pushes so far.
    seq: u64,
}
impl Default for Agenda<MonotonicClock> {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl Agenda<MonotonicClock> {
    /// Constructor for an empty Agenda that uses the system's monotonic clock.
    #[inline]
    pub fn new() -> Self { Self::with_clock(MonotonicClock::new()) }
}
impl<C> Agenda<C> {
    /// Constructor for an empty Agenda that uses the given clock.
    ///
    /// # Arguments
    /// - `clock`: Some [`Clock`] to timestamp pushes with.
    #[inline]
    pub fn with_clock(clock: C) -> Self { Self { queue: BinaryHeap::new(), consequents: HashSet::new(), clock, seq: 0 } }

    /// Returns the number of pending rules.
    #[inline]
    pub fn len(&self) -> usize { self.queue.len() }

    /// Returns whether there are no pending rules.
    #[inline]
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// Checks whether a rule with the given consequent is pending.
    #[inline]
    pub fn contains(&self, consequent: &Consequent) -> bool { self.consequents.contains(consequent) }

    /// Returns an iterator over the pending rules, in no particular order.
    #[inline]
    pub fn iter(&self) -> impl '_ + Iterator<Item = &Rule> { self.queue.iter().map(|e| &e.rule) }

    /// Pops the most recently pushed rule.
    ///
    /// # Errors
    /// This function errors if the agenda is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<Rule, Error> {
        let entry: Entry = self.queue.pop().ok_or(Error::Empty)?;
        self.consequents.remove(&entry.rule.consequent);
        Ok(entry.rule)
    }

    /// Removes all pending rules.
    #[inline]
    pub fn clear(&mut self) {
        self.queue.clear();
        self.consequents.clear();
    }
}
impl<C: Clock> Agenda<C> {
    /// Pushes a rule onto the agenda, unless a rule with the same consequent is already pending.
    ///
    /// # Arguments
    /// - `rule`: The grounded [`Rule`] to push.
    ///
    /// # Returns
    /// Whether the rule was actually added.
    ///
    /// # Errors
    /// This function errors if the rule isn't grounded.
    pub fn push(&mut self, rule: Rule) -> Result<bool, Error> {
        if !rule.is_grounded() {
            return Err(Error::Ungrounded { rule: rule.to_string() });
        }
        if self.consequents.contains(&rule.consequent) {
            trace!("--> Rule '{rule}' has a pending consequent; skipping");
            return Ok(false);
        }

        let priority: i128 = -(self.clock.now().as_nanos() as i128);
        self.seq += 1;
        self.consequents.insert(rule.consequent.clone());
        self.queue.push(Entry { priority, seq: self.seq, rule });
        Ok(true)
    }
}
impl<C> Display for Agenda<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        writeln!(f, "Agenda:")?;
        for rule in self.iter() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Antecedent, Condition, Conclusion};


    fn make(name: &str, concl: &str) -> Rule { Rule::new(name, Antecedent::all([Condition::exists("a")]), [Conclusion::assert(concl)]) }


    #[test]
    fn test_agenda_uniqueness() {
        let mut agenda = Agenda::with_clock(StepClock::new(Duration::from_millis(1)));
        assert!(agenda.push(make("first", "b")).unwrap());
        assert!(!agenda.push(make("second", "b")).unwrap());
        assert_eq!(agenda.len(), 1);
        assert!(agenda.contains(&make("x", "b").consequent));

        // The first one stays
        assert_eq!(agenda.pop().unwrap().name, "first");
        assert!(agenda.is_empty());
        assert!(!agenda.contains(&make("x", "b").consequent));

        // Once popped, it can be pushed again
        assert!(agenda.push(make("third", "b")).unwrap());
    }

    #[test]
    fn test_agenda_recency() {
        let mut agenda = Agenda::with_clock(StepClock::new(Duration::from_millis(1)));
        agenda.push(make("a", "x")).unwrap();
        agenda.push(make("b", "y")).unwrap();
        agenda.push(make("c", "z")).unwrap();
        assert_eq!(agenda.pop().unwrap().name, "c");
        assert_eq!(agenda.pop().unwrap().name, "b");
        assert_eq!(agenda.pop().unwrap().name, "a");
    }

    #[test]
    fn test_agenda_recency_stopped_clock() {
        // Even if the clock doesn't advance, the latest push wins
        let mut agenda = Agenda::with_clock(StepClock::new(Duration::ZERO));
        agenda.push(make("a", "x")).unwrap();
        agenda.push(make("b", "y")).unwrap();
        assert_eq!(agenda.pop().unwrap().name, "b");
        assert_eq!(agenda.pop().unwrap().name, "a");
    }

    #[test]
    fn test_agenda_errors() {
        let mut agenda: Agenda = Agenda::new();
        assert!(matches!(agenda.pop(), Err(Error::Empty)));
        let rule = Rule::new("r", Antecedent::all([Condition::exists("?x")]), [Conclusion::assert("b")]);
        assert!(matches!(agenda.push(rule), Err(Error::Ungrounded { .. })));
        assert!(agenda.is_empty());
    }

    #[test]
    fn test_agenda_clear() {
        let mut agenda: Agenda = Agenda::new();
        agenda.push(make("a", "x")).unwrap();
        agenda.push(make("b", "y")).unwrap();
        agenda.clear();
        assert!(agenda.is_empty());
        assert!(agenda.push(make("c", "x")).unwrap());
    }
}
