//  TESTS.rs
//    by Lut99
//
//  Created:
//    03 Dec 2024, 14:32:43
//  Last edited:
//    16 Oct 2026, 15:51:08
//  Auto updated?
//    Yes
//
//  Description:
//!   Contains some common test functions.
//

#![allow(unused)]

use crate::facts::{Fact, State};
use crate::rules::{Antecedent, Conclusion, Condition, Rule};


/***** LIBRARY *****/
/// Sets up a logger if wanted.
#[cfg(feature = "log")]
pub fn setup_logger() {
    use humanlog::{DebugMode, HumanLogger};

    // Check if the envs tell us to
    if let Ok(logger) = std::env::var("LOGGER") {
        if logger == "1" || logger == "true" {
            // Create the logger
            if let Err(err) = HumanLogger::terminal(DebugMode::Full).init() {
                eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
            }
        }
    }
}



/// Makes a [`State`] conveniently.
pub fn make_state(facts: impl IntoIterator<Item = Fact>) -> State { facts.into_iter().collect() }

/// Makes a [`Rule`] conveniently, with the conditions as one conjunction.
pub fn make_rule(
    name: &'static str,
    conditions: impl IntoIterator<Item = Condition>,
    conclusions: impl IntoIterator<Item = Conclusion>,
) -> Rule {
    Rule::new(name, Antecedent::all(conditions), conclusions)
}
