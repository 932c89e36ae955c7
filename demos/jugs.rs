//  JUGS.rs
//    by Lut99
//
//  Created:
//    16 Oct 2026, 10:21:56
//  Last edited:
//    16 Oct 2026, 16:03:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Solves the classic two-jug puzzle by planning over rule templates.
//!
//!   There is a jug of 4 litres and a jug of 3 litres, both empty. Jugs can
//!   be filled, emptied, or poured into one another (one litre at a time).
//!   The goal is to end up with exactly 2 litres in the big jug and nothing
//!   in the small one.
//

use clap::Parser;
use console::style;
use error_trace::toplevel;
use ess::engine::{Engine, Report, RunOptions};
use ess::facts::{Fact, State};
use ess::rules::{Antecedent, CmpOp, Conclusion, Condition, Expr, Rule};
use ess::search::{Strategy, WorkingMemory};
use humanlog::{DebugMode, HumanLogger};
use log::{debug, error, info};


/***** ARGUMENTS *****/
/// Defines arguments to the demo.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// If given, enables more verbose logging.
    #[clap(long, global = true)]
    debug: bool,

    /// The maximum number of rules to fire before giving up on a branch.
    #[clap(short, long, default_value = "12")]
    depth: usize,
    /// The search strategy to use. Either `breadth-first` or `best-first`.
    #[clap(short, long, default_value = "breadth-first")]
    strategy: Strategy,
    /// The slot the best-first heuristic compares states on.
    #[clap(short, long)]
    attr: Option<String>,
}





/***** HELPERS *****/
/// Makes a jug fact.
fn jug(name: &str, amount: i64, capacity: i64) -> Fact { Fact::new(name).with("amount", amount).with("capacity", capacity) }

/// Builds the puzzle.
fn puzzle() -> WorkingMemory {
    let initial: State = [jug("jug_a", 0, 4), jug("jug_b", 0, 3)].into_iter().collect();
    let goal: State = [jug("jug_a", 2, 4), jug("jug_b", 0, 3)].into_iter().collect();
    let rules: [Rule; 3] = [
        Rule::new("fill", Antecedent::all([Condition::new("?x", "amount", CmpOp::Lt, Expr::slot("?x", "capacity"))]), [Conclusion::set(
            "?x",
            "amount",
            Expr::slot("?x", "capacity"),
        )]),
        Rule::new("empty", Antecedent::all([Condition::new("?x", "amount", CmpOp::Gt, Expr::lit(0))]), [Conclusion::set(
            "?x",
            "amount",
            Expr::lit(0),
        )]),
        Rule::new(
            "pour",
            Antecedent::all([
                Condition::new("?x", "amount", CmpOp::Gt, Expr::lit(0)),
                Condition::new("?y", "amount", CmpOp::Lt, Expr::slot("?y", "capacity")),
            ]),
            [
                Conclusion::set("?x", "amount", Expr::slot("?x", "amount") - Expr::lit(1)),
                Conclusion::set("?y", "amount", Expr::slot("?y", "amount") + Expr::lit(1)),
            ],
        ),
    ];
    WorkingMemory::new(initial, rules, goal)
}





/***** ENTRYPOINT *****/
fn main() {
    // Parse the CLI arguments
    let args = Arguments::parse();

    // Setup the logger
    if let Err(err) = HumanLogger::terminal(if args.debug { DebugMode::Full } else { DebugMode::HumanFriendly }).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("ess {} - v{}", env!("CARGO_CRATE_NAME"), env!("CARGO_PKG_VERSION"));

    // Build the problem
    let wm: WorkingMemory = puzzle();
    debug!("Working memory:\n{wm}");

    // Run it
    let engine = Engine::new(RunOptions { strategy: args.strategy, max_depth: args.depth, heuristic_attr: args.attr, ..Default::default() });
    let report: Report = match engine.run_stdout(&wm) {
        Ok(report) => report,
        Err(err) => {
            error!("{}", toplevel!(("Failed to solve the jugs puzzle using {} search", args.strategy), err));
            std::process::exit(1);
        },
    };

    // Summarize
    if report.outcome.is_success() {
        println!("\n{}", style("Puzzle solved").bold().green());
    } else {
        println!("\n{}", style(format!("No solution within {} steps", args.depth)).bold().red());
        std::process::exit(1);
    }
}
