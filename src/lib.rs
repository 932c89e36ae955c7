//  LIB.rs
//    by Lut99
//
//  Created:
//    13 Oct 2026, 16:43:01
//  Last edited:
//    16 Oct 2026, 15:52:30
//  Auto updated?
//    Yes
//
//  Description:
//!   A small rule-based inference engine.
//!
//!   Rules are written as templates with `?`-variables, which are grounded
//!   against the facts at hand by the [binder](bind). Grounded rules can
//!   then either be [run directly](eval) against a mutable fact base, or be
//!   used as operators by a [planner](search) that looks for a sequence of
//!   rule firings turning an initial state into a goal state. The
//!   [`Engine`](engine::Engine) wraps the latter with timing and reporting.
//

// Declare modules
pub mod agenda;
pub mod bind;
pub mod engine;
pub mod eval;
pub mod facts;
mod log;
pub mod rules;
pub mod search;
#[cfg(test)]
mod tests;
