//  EVAL.rs
//    by Lut99
//
//  Created:
//    15 Oct 2026, 09:27:44
//  Last edited:
//    16 Oct 2026, 10:58:21
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements direct forward-chaining execution of grounded rules.
//!
//!   Here, rules are not used as operators to search with, but simply fire
//!   straight into a single, mutable [`FactBase`]. There is no conflict
//!   resolution: every rule whose antecedent holds fires, in the order the
//!   rules are given.
//

use crate::bind::{bind, RuleSet};
use crate::facts::FactBase;
use crate::log::{debug, trace};
use crate::rules::{Error, Rule};


/***** AUXILLARY *****/
/// Reports what happened during a single [`run_ruleset()`].
#[derive(Clone, Debug)]
pub struct Pass<'r> {
    /// The rules whose antecedent held, in the order they fired.
    pub activated: Vec<&'r Rule>,
    /// Whether firing them changed the fact base.
    pub changed:   bool,
}

/// Reports what happened during a [`forward_chain()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Saturation {
    /// The number of passes made over the rules.
    pub passes:    usize,
    /// The total number of rule firings.
    pub fired:     usize,
    /// Whether the fact base stopped changing before the pass limit was hit.
    pub saturated: bool,
}





/***** LIBRARY FUNCTIONS *****/
/// Runs a set of grounded rules once against a fact base.
///
/// First, all antecedents are evaluated against the fact base as it is. Only then do the
/// activated rules fire, in the order given. As such, rules don't see each other's effects while
/// being tested.
///
/// # Arguments
/// - `rules`: The grounded [`Rule`]s to run.
/// - `base`: The [`FactBase`] to test against and fire into.
///
/// # Returns
/// A [`Pass`] describing which rules fired.
///
/// # Errors
/// This function errors if any rule is not grounded, or if any of its conditions or conclusions
/// fails to evaluate. In the latter case, rules that fired before the failing one keep their
/// effects.
pub fn run_ruleset<'r>(rules: impl IntoIterator<Item = &'r Rule>, base: &mut FactBase) -> Result<Pass<'r>, Error> {
    // Find the activated rules first
    let mut activated: Vec<&'r Rule> = Vec::new();
    for rule in rules {
        if rule.holds(&*base)? {
            activated.push(rule);
        }
    }

    // Then fire them
    let mut changed: bool = false;
    for rule in &activated {
        trace!("--> Firing '{rule}'");
        changed |= rule.fire(base)?;
    }
    Ok(Pass { activated, changed })
}

/// Runs rule templates against a fact base until it doesn't change anymore.
///
/// Every pass grounds the templates against the facts currently in the base (re-using the previous
/// grounding if the set of fact names didn't change) and then does a [`run_ruleset()`].
///
/// Unlike a Datalog derivation, rules may retract facts or count upwards, so saturation is not
/// guaranteed. Hence the `max_passes`.
///
/// # Arguments
/// - `rules`: The [`RuleSet`] to run.
/// - `base`: The [`FactBase`] to derive in.
/// - `max_passes`: The maximum number of passes to make.
///
/// # Returns
/// A [`Saturation`] describing the run.
///
/// # Errors
/// This function errors if binding or [running](run_ruleset()) the rules fails.
pub fn forward_chain(rules: &RuleSet, base: &mut FactBase, max_passes: usize) -> Result<Saturation, Error> {
    let mut res: Saturation = Saturation { passes: 0, fired: 0, saturated: false };
    let mut names: Vec<String> = Vec::new();
    let mut bound: RuleSet = RuleSet::new();
    while res.passes < max_passes {
        res.passes += 1;
        trace!("Forward chaining pass {} starting", res.passes);

        // Rebind if the facts changed names
        let new_names: Vec<String> = base.iter().map(|f| f.name.clone()).collect();
        if res.passes == 1 || new_names != names {
            bound = bind(rules, &*base)?;
            names = new_names;
        }

        let pass: Pass = run_ruleset(bound.grounded(), base)?;
        res.fired += pass.activated.len();
        if !pass.changed {
            res.saturated = true;
            break;
        }
    }

    debug!("Done forward chaining (took {} passes, fired {} rules, saturated: {})", res.passes, res.fired, res.saturated);
    Ok(res)
}





/***** TESTS *****/
