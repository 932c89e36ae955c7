//  BIND.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 13:12:09
//  Last edited:
//    16 Oct 2026, 14:40:57
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the binding procedure that grounds rule templates against the
//!   facts in a state.
//!
//!   Grounding works one variable at a time. A template is taken off the
//!   worklist, its first unbound variable is picked, and one copy of the
//!   template is made for every known fact, with that variable substituted
//!   by the fact's name. Copies that are grounded land in the pool; the rest
//!   go back onto the worklist. This terminates because every round removes
//!   a variable from the template.
//!
//!   For a template with `k` variable occurrences and `n` facts, this yields
//!   up to `n^k` instances. That is intended; callers keep it in check by
//!   bounding how deep they search.
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::IndexSet;

use crate::facts::Facts;
use crate::log::{debug, trace};
use crate::rules::{Action, Condition, Conclusion, Error, Expr, Ident, Rule, Var};


/***** LIBRARY FUNCTIONS *****/
/// Grounds all templates in a [`RuleSet`] against the facts in a state.
///
/// # Arguments
/// - `rules`: A [`RuleSet`] with templates to ground, and possibly some already-grounded rules.
/// - `facts`: The [`Facts`] whose names the variables are bound to.
///
/// # Returns
/// A new RuleSet with no templates left in it. Its grounded pool contains the given set's
/// grounded rules, followed by every instance derived from its templates.
///
/// # Errors
/// This function errors if a template contains a [malformed variable](Error::MalformedVariable).
/// That is a defect in the template and not something to recover from.
pub fn bind(rules: &RuleSet, facts: &impl Facts) -> Result<RuleSet, Error> {
    let names: Vec<&str> = facts.names().collect();
    debug!("Binding {} template(s) against {} fact(s)", rules.unbound.len(), names.len());

    let mut rules: RuleSet = rules.clone();
    while let Some(template) = rules.unbound.pop() {
        let var: Var = match template.next_var() {
            Some(var) => var.clone(),
            None => {
                rules.grounded.insert(template);
                continue;
            },
        };
        if !var.is_well_formed() {
            return Err(Error::MalformedVariable { token: var.as_str().into() });
        }
        trace!("--> Binding '{var}' in '{template}'");

        for name in &names {
            let mut instance: Rule = template.clone();
            Substitution::single(var.clone(), *name)?.apply_rule(&mut instance);
            rules.add(instance);
        }
    }

    debug!("Bound into {} grounded rule(s)", rules.grounded.len());
    Ok(rules)
}





/***** LIBRARY *****/
/// A collection of rules, partitioned into templates that still have variables in them and a
/// pool of grounded rules.
///
/// The pool is deduplicated and keeps insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RuleSet {
    /// Rules that still contain variables.
    unbound:  Vec<Rule>,
    /// Rules without any variables.
    grounded: IndexSet<Rule>,
}
impl RuleSet {
    /// Constructor for an empty RuleSet.
    #[inline]
    pub fn new() -> Self { Self { unbound: Vec::new(), grounded: IndexSet::new() } }

    /// Adds a rule to the appropriate partition.
    ///
    /// # Returns
    /// False if the rule was grounded and already in the pool, or true otherwise.
    #[inline]
    pub fn add(&mut self, rule: Rule) -> bool {
        if rule.is_grounded() {
            self.grounded.insert(rule)
        } else {
            self.unbound.push(rule);
            true
        }
    }

    /// Returns the total number of rules in this set.
    #[inline]
    pub fn len(&self) -> usize { self.unbound.len() + self.grounded.len() }

    /// Returns whether there are no rules in this set.
    #[inline]
    pub fn is_empty(&self) -> bool { self.unbound.is_empty() && self.grounded.is_empty() }

    /// Returns whether there are no templates left in this set.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.unbound.is_empty() }

    /// Returns an iterator over the templates in this set.
    #[inline]
    pub fn unbound(&self) -> impl '_ + ExactSizeIterator<Item = &Rule> { self.unbound.iter() }

    /// Returns an iterator over the grounded rules in this set, in insertion order.
    #[inline]
    pub fn grounded(&self) -> impl '_ + ExactSizeIterator<Item = &Rule> { self.grounded.iter() }

    /// Returns an iterator over all rules, templates first.
    #[inline]
    pub fn iter(&self) -> impl '_ + Iterator<Item = &Rule> { self.unbound.iter().chain(self.grounded.iter()) }
}
impl FromIterator<Rule> for RuleSet {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        let mut set: Self = Self::new();
        set.extend(iter);
        set
    }
}
impl Extend<Rule> for RuleSet {
    #[inline]
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, iter: T) {
        for rule in iter {
            self.add(rule);
        }
    }
}
impl Display for RuleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        writeln!(f, "Rules {{")?;
        for rule in &self.unbound {
            writeln!(f, "    ? {rule}")?;
        }
        for rule in &self.grounded {
            writeln!(f, "    + {rule}")?;
        }
        write!(f, "}}")
    }
}



/// Maps pattern variables to the fact names they are bound to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Substitution {
    map: HashMap<Var, String>,
}
impl Substitution {
    /// Constructor for an empty Substitution.
    #[inline]
    pub fn new() -> Self { Self { map: HashMap::new() } }

    /// Constructor for a Substitution binding a single variable.
    ///
    /// # Errors
    /// This function errors if `var` is malformed.
    #[inline]
    pub fn single(var: Var, name: impl Into<String>) -> Result<Self, Error> {
        let mut subst: Self = Self::new();
        subst.insert(var, name)?;
        Ok(subst)
    }

    /// Binds a variable to a fact name.
    ///
    /// # Returns
    /// The name the variable was bound to before, if any.
    ///
    /// # Errors
    /// This function errors if `var` is malformed, i.e., it doesn't start with the variable marker.
    #[inline]
    pub fn insert(&mut self, var: Var, name: impl Into<String>) -> Result<Option<String>, Error> {
        if !var.is_well_formed() {
            return Err(Error::MalformedVariable { token: var.as_str().into() });
        }
        Ok(self.map.insert(var, name.into()))
    }

    /// Returns the name bound to a variable, if any.
    #[inline]
    pub fn get(&self, var: &Var) -> Option<&str> { self.map.get(var).map(String::as_str) }

    /// Substitutes an identifier, if it is a bound variable.
    #[inline]
    pub fn apply_ident(&self, ident: &mut Ident) {
        if let Ident::Var(var) = ident {
            if let Some(name) = self.get(var) {
                *ident = Ident::Const(name.into());
            }
        }
    }

    /// Substitutes all bound variables in an expression.
    #[inline]
    pub fn apply_expr(&self, expr: &mut Expr) {
        for ident in expr.idents_mut() {
            self.apply_ident(ident);
        }
    }

    /// Substitutes all bound variables in a condition, unless it is already grounded.
    #[inline]
    pub fn apply_condition(&self, cond: &mut Condition) {
        if cond.is_grounded() {
            return;
        }
        self.apply_ident(&mut cond.fact);
        self.apply_expr(&mut cond.value);
    }

    /// Substitutes all bound variables in a conclusion, unless it is already grounded.
    #[inline]
    pub fn apply_conclusion(&self, concl: &mut Conclusion) {
        if concl.is_grounded() {
            return;
        }
        self.apply_ident(&mut concl.fact);
        if let Action::Set { value, .. } = &mut concl.action {
            self.apply_expr(value);
        }
    }

    /// Substitutes all bound variables in every unbound condition and conclusion of a rule.
    pub fn apply_rule(&self, rule: &mut Rule) {
        for cond in rule.antecedent.disjunctions.iter_mut().flat_map(|d| d.conditions.iter_mut()) {
            self.apply_condition(cond);
        }
        for concl in &mut rule.consequent.conclusions {
            self.apply_conclusion(concl);
        }
    }
}





/***** IMPLEMENTATIONS *****/
impl Rule {
    /// Returns the variable the binder resolves next in this rule.
    ///
    /// While the antecedent has unbound conditions, this is the first variable of the first such
    /// condition. After that, it is the first variable of the first unbound conclusion.
    ///
    /// # Returns
    /// A [`Var`], or [`None`] if the rule is grounded.
    #[inline]
    pub fn next_var(&self) -> Option<&Var> {
        if !self.antecedent.is_grounded() {
            self.antecedent.conditions().find_map(Condition::first_var)
        } else {
            self.consequent.conclusions.iter().find_map(Conclusion::first_var)
        }
    }

    /// Convenient way to ground this rule against the facts in a state.
    ///
    /// # Returns
    /// All grounded instances of this rule, in the order they were derived.
    ///
    /// # Errors
    /// See [`bind()`].
    #[inline]
    pub fn ground(&self, facts: &impl Facts) -> Result<Vec<Rule>, Error> {
        let set: RuleSet = bind(&[self.clone()].into_iter().collect(), facts)?;
        Ok(set.grounded.into_iter().collect())
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Fact, State};
    use crate::rules::{Antecedent, CmpOp};
    use crate::tests::make_state;


    fn abc() -> State { make_state([Fact::new("a").with("n", 1), Fact::new("b").with("n", 2), Fact::new("c").with("n", 3)]) }

    fn occurrences(rule: &Rule) -> usize {
        let conds: usize = rule.antecedent.conditions().map(|c| c.fact.var().iter().count() + c.value.vars().count()).sum();
        let concls: usize = rule
            .consequent
            .conclusions
            .iter()
            .map(|c| {
                c.fact.var().iter().count()
                    + match &c.action {
                        Action::Set { value, .. } => value.vars().count(),
                        _ => 0,
                    }
            })
            .sum();
        conds + concls
    }


    #[test]
    fn test_bind_completeness() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let template = Rule::new("less", Antecedent::all([Condition::new("?x", "n", CmpOp::Lt, Expr::slot("?y", "n"))]), [Conclusion::assert("?y")]);
        let k: u32 = occurrences(&template) as u32;
        assert_eq!(k, 3);

        let state: State = abc();
        let bound: RuleSet = bind(&[template].into_iter().collect(), &state).unwrap();
        assert!(bound.is_grounded());
        assert_eq!(bound.unbound().len(), 0);
        assert!(bound.grounded().len() <= state.len().pow(k));
        // Two distinct variables, so exactly one instance per assignment
        assert_eq!(bound.grounded().len(), 9);
        assert!(bound.grounded().all(|r| r.name == "less" && r.is_grounded()));
    }

    #[test]
    fn test_bind_substitutes_everywhere() {
        let template = Rule::new("inc", Antecedent::all([Condition::exists("?x")]), [Conclusion::set("?x", "n", Expr::slot("?x", "n") + Expr::lit(1))]);
        let instances: Vec<Rule> = template.ground(&abc()).unwrap();
        assert_eq!(instances.len(), 3);
        for rule in &instances {
            let name: &str = rule.antecedent.conditions().next().unwrap().fact.name().unwrap();
            assert_eq!(rule.to_string(), format!("inc: ({name} == true) => set {name}.n = ({name}.n + 1)"));
        }
    }

    #[test]
    fn test_bind_consequent_only() {
        // Antecedent is grounded, the variable only lives in the second argument of a conclusion
        let template = Rule::new("copy", Antecedent::all([Condition::exists("a")]), [Conclusion::set("a", "n", Expr::slot("?y", "n"))]);
        assert_eq!(template.next_var(), Some(&Var::new("?y")));

        let instances: Vec<Rule> = template.ground(&abc()).unwrap();
        assert_eq!(instances.len(), 3);
        assert!(instances.iter().all(Rule::is_grounded));
    }

    #[test]
    fn test_bind_idempotent() {
        let rules: RuleSet = [
            Rule::new("r1", Antecedent::all([Condition::exists("a")]), [Conclusion::assert("b")]),
            Rule::new("r2", Antecedent::any([Condition::exists("b"), Condition::exists("c")]), [Conclusion::retract("a")]),
        ]
        .into_iter()
        .collect();
        assert_eq!(bind(&rules, &abc()).unwrap(), rules);

        // And binding twice changes nothing either
        let templates: RuleSet = [Rule::new("r", Antecedent::all([Condition::exists("?x")]), [Conclusion::retract("?x")])].into_iter().collect();
        let once: RuleSet = bind(&templates, &abc()).unwrap();
        assert_eq!(bind(&once, &abc()).unwrap(), once);
    }

    #[test]
    fn test_bind_no_facts() {
        let templates: RuleSet = [Rule::new("r", Antecedent::all([Condition::exists("?x")]), [Conclusion::retract("?x")])].into_iter().collect();
        let bound: RuleSet = bind(&templates, &State::new()).unwrap();
        assert!(bound.is_empty());
    }

    #[test]
    fn test_bind_malformed_variable() {
        let template = Rule::new("bad", Antecedent::all([Condition::exists(Ident::Var(Var::new("x")))]), [Conclusion::assert("a")]);
        assert!(matches!(bind(&[template].into_iter().collect(), &abc()), Err(Error::MalformedVariable { token }) if token == "x"));
        assert!(matches!(Substitution::single(Var::new("?"), "a"), Err(Error::MalformedVariable { .. })));
    }

    #[test]
    fn test_substitution_skips_grounded() {
        let mut rule = Rule::new("r", Antecedent::all([Condition::exists("a"), Condition::exists("?x")]), [Conclusion::assert("?x")]);
        let subst: Substitution = Substitution::single(Var::new("?x"), "b").unwrap();
        assert_eq!(subst.get(&Var::new("?x")), Some("b"));
        assert_eq!(subst.get(&Var::new("?y")), None);
        subst.apply_rule(&mut rule);
        assert!(rule.is_grounded());
        assert_eq!(rule.to_string(), "r: (a == true & b == true) => assert b");
    }
}
