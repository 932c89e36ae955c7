//  ENGINE.rs
//    by Lut99
//
//  Created:
//    15 Oct 2026, 16:02:19
//  Last edited:
//    16 Oct 2026, 15:40:03
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`Engine`], which runs a search strategy over a
//!   [`WorkingMemory`], times it and reports on the result.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use itertools::Itertools as _;

use crate::facts::State;
use crate::log::{debug, info};
use crate::search::{self, best_first_search, breadth_first_search, Heuristic, Outcome, SlotDistance, Strategy, WorkingMemory};


/***** ERRORS *****/
/// Defines errors that may occur when running the [`Engine`].
#[derive(Debug)]
pub enum Error {
    /// The search itself failed.
    Engine { cause: search::Error },
    /// Failed to write progress or the report.
    Io { err: io::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Engine { .. } => write!(f, "Error with inference engine"),
            Self::Io { .. } => write!(f, "Failed to write search report"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Engine { cause } => Some(cause),
            Self::Io { err } => Some(err),
        }
    }
}
impl From<search::Error> for Error {
    #[inline]
    fn from(value: search::Error) -> Self { Self::Engine { cause: value } }
}
impl From<io::Error> for Error {
    #[inline]
    fn from(value: io::Error) -> Self { Self::Io { err: value } }
}





/***** AUXILLARY *****/
/// Configures a run of the [`Engine`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// How to explore the search space.
    pub strategy: Strategy,
    /// The maximum length of a path.
    pub max_depth: usize,
    /// The slot the heuristic considers, if any. Only used by [`Strategy::BestFirst`].
    pub heuristic_attr: Option<String>,
    /// Reports progress every this many visited states. `0` disables progress reports.
    pub progress_every: usize,
}
impl Default for RunOptions {
    #[inline]
    fn default() -> Self { Self { strategy: Strategy::BreadthFirst, max_depth: 10, heuristic_attr: None, progress_every: 100 } }
}

/// Formats the wall-clock time a search took.
///
/// Only whole seconds are shown, and anything over a minute is shown as minutes and seconds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Elapsed(pub Duration);
impl Display for Elapsed {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        let secs: u64 = self.0.as_secs();
        if secs > 60 { write!(f, "{} minutes, {} seconds", secs / 60, secs % 60) } else { write!(f, "{secs} seconds") }
    }
}

/// Reports on a completed run of the [`Engine`].
#[derive(Clone, Debug)]
pub struct Report {
    /// The state the search started from.
    pub initial: State,
    /// What the search found.
    pub outcome: Outcome,
    /// How long it took.
    pub elapsed: Elapsed,
}
impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "Initial state:\n{}\n\n", self.initial)?;
        if let Some(path) = &self.outcome.path {
            write!(f, "Rule applied:\n\n{}\n\n", path.iter().join("\n\n"))?;
        }
        write!(f, "Arrival state:\n{}\n", self.outcome.state)?;
        match &self.outcome.path {
            Some(path) => {
                write!(f, "\nSUCCESS\nPath length: {}\nPenetrance: ", path.len())?;
                match self.outcome.penetrance() {
                    Some(pen) => write!(f, "{pen:?}")?,
                    None => write!(f, "n/a")?,
                }
                write!(f, "\nVisited nodes count: {}\nTime elapsed: {}", self.outcome.visited, self.elapsed)
            },
            None => write!(f, "\nFAILURE\nVisited nodes count: {}\nTime elapsed: {}", self.outcome.visited, self.elapsed),
        }
    }
}





/***** LIBRARY *****/
/// Runs searches and reports on them.
pub struct Engine {
    /// The options for every run.
    pub opts: RunOptions,
    /// The heuristic used by [`Strategy::BestFirst`].
    heuristic: Box<dyn Heuristic>,
}
impl Default for Engine {
    #[inline]
    fn default() -> Self { Self::new(RunOptions::default()) }
}
impl Engine {
    /// Constructor for the Engine that uses the [`SlotDistance`] heuristic.
    ///
    /// # Arguments
    /// - `opts`: The [`RunOptions`] to run with.
    #[inline]
    pub fn new(opts: RunOptions) -> Self { Self { opts, heuristic: Box::new(SlotDistance) } }

    /// Replaces the heuristic used by [`Strategy::BestFirst`].
    ///
    /// # Arguments
    /// - `heuristic`: The new [`Heuristic`].
    #[inline]
    pub fn with_heuristic(mut self, heuristic: impl 'static + Heuristic) -> Self {
        self.heuristic = Box::new(heuristic);
        self
    }

    /// Runs the configured search strategy and times it.
    ///
    /// # Arguments
    /// - `wm`: The [`WorkingMemory`] to search.
    /// - `progress`: Called with the number of visited states every
    ///   [`RunOptions::progress_every`] states.
    ///
    /// # Returns
    /// A [`Report`] on the search. Not finding the goal is still an `Ok`.
    ///
    /// # Errors
    /// This function errors if the search fails, e.g., because a rule could not be evaluated. The
    /// original error is kept as the [`source()`](error::Error::source()).
    pub fn search(&self, wm: &WorkingMemory, mut progress: impl FnMut(usize)) -> Result<Report, Error> {
        info!("Running {} search (max depth {})", self.opts.strategy, self.opts.max_depth);
        let every: usize = self.opts.progress_every;
        let on_visit = |visited: usize, _: &State| {
            if every > 0 && visited % every == 0 {
                progress(visited);
            }
        };

        let start = Instant::now();
        let outcome: Outcome = match self.opts.strategy {
            Strategy::BreadthFirst => breadth_first_search(wm, self.opts.max_depth, on_visit)?,
            Strategy::BestFirst => best_first_search(wm, self.opts.max_depth, &*self.heuristic, self.opts.heuristic_attr.as_deref(), on_visit)?,
        };
        let elapsed = Elapsed(start.elapsed());
        debug!("Search completed in {:?} (success: {})", elapsed.0, outcome.is_success());

        Ok(Report { initial: wm.initial.clone(), outcome, elapsed })
    }

    /// Runs the configured search strategy, writing progress and the final [`Report`] to the given
    /// writer.
    ///
    /// # Arguments
    /// - `wm`: The [`WorkingMemory`] to search.
    /// - `out`: The [`Write`]r to write to.
    ///
    /// # Returns
    /// The [`Report`] that was also written.
    ///
    /// # Errors
    /// This function errors if the [search](Engine::search()) fails or if writing fails.
    pub fn run(&self, wm: &WorkingMemory, out: &mut impl Write) -> Result<Report, Error> {
        let mut write_err: Option<io::Error> = None;
        let report: Report = self.search(wm, |visited| {
            if write_err.is_none() {
                if let Err(err) = writeln!(out, "Search in progress, visited nodes counter: {visited}") {
                    write_err = Some(err);
                }
            }
        })?;
        if let Some(err) = write_err {
            return Err(Error::Io { err });
        }

        writeln!(out, "{report}")?;
        Ok(report)
    }

    /// Convenience wrapper around [`Engine::run()`] that writes to stdout.
    #[inline]
    pub fn run_stdout(&self, wm: &WorkingMemory) -> Result<Report, Error> { self.run(wm, &mut io::stdout().lock()) }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Fact;
    use crate::rules::{self, CmpOp, Condition, Conclusion, Expr, Ident, Rule, Var};
    use crate::tests::{make_rule, make_state};


    fn a_to_b() -> WorkingMemory {
        WorkingMemory::new(
            make_state([Fact::new("A")]),
            [make_rule("produce", [Condition::exists("A")], [Conclusion::retract("A"), Conclusion::assert("B")])],
            make_state([Fact::new("B")]),
        )
    }


    #[test]
    fn test_elapsed_display() {
        assert_eq!(Elapsed(Duration::from_millis(2700)).to_string(), "2 seconds");
        assert_eq!(Elapsed(Duration::from_secs(60)).to_string(), "60 seconds");
        assert_eq!(Elapsed(Duration::from_secs(125)).to_string(), "2 minutes, 5 seconds");
    }

    #[test]
    fn test_report_success() {
        let wm: WorkingMemory = a_to_b();
        let rule: Rule = wm.rules.iter().next().cloned().unwrap();
        let report = Report {
            initial: wm.initial.clone(),
            outcome: Outcome { state: wm.goal.clone(), path: Some(vec![rule.clone()]), visited: 1 },
            elapsed: Elapsed(Duration::from_secs(3)),
        };
        assert_eq!(
            report.to_string(),
            format!(
                "Initial state:\n{}\n\nRule applied:\n\n{}\n\nArrival state:\n{}\n\nSUCCESS\nPath length: 1\nPenetrance: 1.0\nVisited nodes count: \
                 1\nTime elapsed: 3 seconds",
                wm.initial, rule, wm.goal
            )
        );
    }

    #[test]
    fn test_report_failure() {
        let wm: WorkingMemory = a_to_b();
        let report = Report {
            initial: wm.initial.clone(),
            outcome: Outcome { state: wm.initial.clone(), path: None, visited: 1 },
            elapsed: Elapsed(Duration::from_secs(61)),
        };
        assert_eq!(
            report.to_string(),
            format!(
                "Initial state:\n{}\n\nArrival state:\n{}\n\nFAILURE\nVisited nodes count: 1\nTime elapsed: 1 minutes, 1 seconds",
                wm.initial, wm.initial
            )
        );
    }

    #[test]
    fn test_report_penetrance() {
        let wm: WorkingMemory = a_to_b();
        let rule: Rule = wm.rules.iter().next().cloned().unwrap();
        let report = Report {
            initial: wm.initial.clone(),
            outcome: Outcome { state: wm.goal.clone(), path: Some(vec![rule.clone(), rule]), visited: 6 },
            elapsed: Elapsed::default(),
        };
        assert!(report.to_string().contains("\nPenetrance: 0.3333333333333333\n"));

        // Nothing visited means the initial state was the goal
        let report = Report { initial: wm.goal.clone(), outcome: Outcome { state: wm.goal.clone(), path: Some(vec![]), visited: 0 }, elapsed: Elapsed::default() };
        assert!(report.to_string().contains("\nPath length: 0\nPenetrance: n/a\n"));
    }

    #[test]
    fn test_engine_run() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let engine = Engine::new(RunOptions { progress_every: 1, ..Default::default() });
        let mut out: Vec<u8> = Vec::new();
        let report: Report = engine.run(&a_to_b(), &mut out).unwrap();
        assert!(report.outcome.is_success());

        let out: String = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Search in progress, visited nodes counter: 1\nInitial state:\n"));
        assert!(out.contains("\nSUCCESS\nPath length: 1\nPenetrance: 1.0\nVisited nodes count: 1\n"));
        assert!(out.ends_with(" seconds\n"));
    }

    #[test]
    fn test_engine_progress_interval() {
        // Counts up to 250 one step at a time
        let wm = WorkingMemory::new(
            make_state([Fact::new("c").with("n", 0)]),
            [make_rule("inc", [Condition::exists("?x")], [Conclusion::set("?x", "n", Expr::slot("?x", "n") + Expr::lit(1))])],
            make_state([Fact::new("c").with("n", 250)]),
        );
        let engine = Engine::new(RunOptions { max_depth: 300, ..Default::default() });
        let mut reported: Vec<usize> = Vec::new();
        let report: Report = engine.search(&wm, |visited| reported.push(visited)).unwrap();
        assert_eq!(report.outcome.visited, 250);
        assert_eq!(reported, vec![100, 200]);
    }

    #[test]
    fn test_engine_failure_is_ok() {
        let engine = Engine::new(RunOptions { max_depth: 0, ..Default::default() });
        let report: Report = engine.search(&a_to_b(), |_| {}).unwrap();
        assert!(!report.outcome.is_success());
        assert_eq!(report.outcome.visited, 1);
    }

    #[test]
    fn test_engine_error_keeps_cause() {
        let wm = WorkingMemory::new(
            make_state([Fact::new("jug").with("amount", "full")]),
            [],
            make_state([Fact::new("jug").with("amount", 3)]),
        );
        let engine = Engine::new(RunOptions { strategy: Strategy::BestFirst, heuristic_attr: Some("amount".into()), ..Default::default() });
        let err: Error = engine.search(&wm, |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "Error with inference engine");

        // The original problem is still there
        let cause = error::Error::source(&err).unwrap();
        let root = cause.source().unwrap();
        assert!(root.downcast_ref::<rules::Error>().is_some_and(|err| matches!(err, rules::Error::NotNumericOperand { .. })));
    }

    #[test]
    fn test_engine_malformed_variable_keeps_cause() {
        let wm = WorkingMemory::new(
            make_state([Fact::new("A")]),
            [make_rule("bad", [Condition::exists(Ident::Var(Var::new("x")))], [Conclusion::assert("B")])],
            make_state([Fact::new("B")]),
        );
        let mut out: Vec<u8> = Vec::new();
        let err: Error = Engine::default().run(&wm, &mut out).unwrap_err();
        assert!(matches!(err, Error::Engine { cause: search::Error::Rules { .. } }));
        assert!(out.is_empty());

        let root = error::Error::source(&err).and_then(|cause| cause.source()).unwrap();
        assert!(root.downcast_ref::<rules::Error>().is_some_and(|err| matches!(err, rules::Error::MalformedVariable { token } if token == "x")));
    }

    #[test]
    fn test_engine_custom_heuristic() {
        let wm = WorkingMemory::new(
            make_state([Fact::new("A")]),
            [make_rule("produce", [Condition::new("A", "n", CmpOp::Eq, Expr::lit(1))], [Conclusion::assert("B")])],
            make_state([Fact::new("B")]),
        );
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        let engine = Engine::new(RunOptions { strategy: Strategy::BestFirst, ..Default::default() }).with_heuristic(
            move |_: &State, _: &State, _: Option<&str>| -> Result<f64, rules::Error> {
                counter.set(counter.get() + 1);
                Ok(0.0)
            },
        );
        let report: Report = engine.search(&wm, |_| {}).unwrap();
        assert!(!report.outcome.is_success());
        assert_eq!(calls.get(), 1);
        assert_eq!(report.outcome.state, make_state([Fact::new("A")]));
    }
}
