//  RULES.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 10:40:52
//  Last edited:
//    16 Oct 2026, 14:05:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines rule templates and their grounded instances.
//!
//!   A [`Rule`] pairs an [`Antecedent`] with a [`Consequent`]. Either side
//!   may contain _pattern variables_ (tokens like `?x`) that stand for fact
//!   names not yet known. Such a rule is a template; the
//!   [binder](crate::bind) grounds it by substituting variables with the
//!   names of facts. Only grounded rules can be evaluated or fired.
//!
//!   Rules are in disjunctive normal form: an antecedent holds if any of its
//!   [`Disjunction`]s holds, and a disjunction holds if all of its
//!   [`Condition`]s hold.
//

use std::cmp::Ordering;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use enum_debug::EnumDebug as _;

use crate::facts::{FactBase, Facts, State, Value};
use crate::log::trace;


/***** ERRORS *****/
/// Defines the binding failures that can occur when grounding or evaluating rules.
#[derive(Debug)]
pub enum Error {
    /// A pattern variable did not start with the variable marker.
    MalformedVariable { token: String },
    /// A value could not be evaluated against the given facts.
    ValueEvaluation { what: String, reason: String },
    /// An arithmetic operation was given a non-numeric operand.
    NotNumericOperand { op: ArithOp, value: Value },
    /// Something that had to be grounded still contained a pattern variable.
    Ungrounded { what: String },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::MalformedVariable { token } => write!(f, "Malformed pattern variable \"{token}\" (variables must start with '{VAR_MARKER}')"),
            Self::ValueEvaluation { what, reason } => write!(f, "Failed to evaluate \"{what}\": {reason}"),
            Self::NotNumericOperand { op, value } => {
                write!(f, "Operator '{op}' expects numeric operands, but got {value} (a {:?})", value.variant())
            },
            Self::Ungrounded { what } => write!(f, "\"{what}\" still contains pattern variables"),
        }
    }
}
impl error::Error for Error {}





/***** CONSTANTS *****/
/// The character that every pattern variable token starts with.
pub const VAR_MARKER: char = '?';





/***** AUXILLARY *****/
/// Describes to what extent a [`Rule`] has been grounded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Binding {
    /// None of its conditions or conclusions are grounded.
    Unbound,
    /// Some, but not all, of its conditions and conclusions are grounded.
    PartiallyBound,
    /// All of its conditions and conclusions are grounded.
    Ground,
}

/// How the conditions of a flat rule are combined.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Combinator {
    /// All conditions must hold.
    And,
    /// At least one condition must hold.
    Or,
}

/// Arithmetic operators that may occur in an [`Expr`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}
impl ArithOp {
    /// Applies this operator to two values.
    ///
    /// Two [`Value::Int`]s produce an [`Value::Int`], except for division that doesn't come out
    /// even, which produces a [`Value::Float`]. Anything involving a float produces a float.
    ///
    /// # Arguments
    /// - `lhs`: The left-hand side operand.
    /// - `rhs`: The right-hand side operand.
    ///
    /// # Returns
    /// The resulting [`Value`].
    ///
    /// # Errors
    /// This function errors if either operand isn't numeric, or if the operation isn't defined
    /// (division by zero, integer overflow).
    pub fn apply(&self, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
        for value in [lhs, rhs] {
            if !value.is_numeric() {
                return Err(Error::NotNumericOperand { op: *self, value: value.clone() });
            }
        }
        let what = || format!("{lhs} {self} {rhs}");

        match (lhs, rhs) {
            (Value::Int(l), Value::Int(r)) => {
                let res: Option<Value> = match self {
                    Self::Add => l.checked_add(*r).map(Value::Int),
                    Self::Sub => l.checked_sub(*r).map(Value::Int),
                    Self::Mul => l.checked_mul(*r).map(Value::Int),
                    Self::Div => {
                        if *r == 0 {
                            return Err(Error::ValueEvaluation { what: what(), reason: "division by zero".into() });
                        }
                        match l.checked_rem(*r) {
                            Some(0) => l.checked_div(*r).map(Value::Int),
                            Some(_) => Some(Value::Float(*l as f64 / *r as f64)),
                            None => None,
                        }
                    },
                };
                res.ok_or_else(|| Error::ValueEvaluation { what: what(), reason: "integer overflow".into() })
            },
            (l, r) => {
                // Both are numeric, checked above
                let (l, r): (f64, f64) = (l.as_f64().unwrap_or_default(), r.as_f64().unwrap_or_default());
                match self {
                    Self::Add => Ok(Value::Float(l + r)),
                    Self::Sub => Ok(Value::Float(l - r)),
                    Self::Mul => Ok(Value::Float(l * r)),
                    Self::Div if r == 0.0 => Err(Error::ValueEvaluation { what: what(), reason: "division by zero".into() }),
                    Self::Div => Ok(Value::Float(l / r)),
                }
            },
        }
    }
}
impl Display for ArithOp {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
        }
    }
}

/// Comparison operators used by [`Condition`]s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}
impl CmpOp {
    /// Tests two values with this operator.
    ///
    /// Equality between values that can't be compared (e.g., a string and a number) is simply
    /// false; ordering them is an error.
    ///
    /// # Errors
    /// This function errors if an ordering operator is applied to incomparable values.
    pub fn test(&self, lhs: &Value, rhs: &Value) -> Result<bool, Error> {
        let ord: Ordering = match (self, lhs.compare(rhs)) {
            (_, Some(ord)) => ord,
            (Self::Eq, None) => return Ok(false),
            (Self::Ne, None) => return Ok(true),
            (_, None) => {
                return Err(Error::ValueEvaluation {
                    what:   format!("{lhs} {self} {rhs}"),
                    reason: format!("cannot order a {:?} and a {:?}", lhs.variant(), rhs.variant()),
                });
            },
        };
        Ok(match self {
            Self::Eq => ord.is_eq(),
            Self::Ne => ord.is_ne(),
            Self::Lt => ord.is_lt(),
            Self::Le => ord.is_le(),
            Self::Gt => ord.is_gt(),
            Self::Ge => ord.is_ge(),
        })
    }
}
impl Display for CmpOp {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}





/***** LIBRARY *****/
/// A pattern variable, e.g., `?x`.
///
/// The token is kept verbatim. Whether it is well-formed (i.e., starts with [`VAR_MARKER`]) is
/// only checked once something tries to substitute it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Var(String);
impl Var {
    /// Constructor for the Var.
    ///
    /// # Arguments
    /// - `token`: The variable's token, including its marker.
    #[inline]
    pub fn new(token: impl Into<String>) -> Self { Self(token.into()) }

    /// Returns whether this variable's token is well-formed.
    #[inline]
    pub fn is_well_formed(&self) -> bool { self.0.len() > VAR_MARKER.len_utf8() && self.0.starts_with(VAR_MARKER) }

    /// Returns the token of this variable.
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}
impl Display for Var {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.0) }
}

/// Refers to a fact, either by name or through a pattern variable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Ident {
    /// A concrete fact name.
    Const(String),
    /// A pattern variable standing in for a fact name.
    Var(Var),
}
impl Ident {
    /// Returns whether this identifier is a concrete name.
    #[inline]
    pub fn is_grounded(&self) -> bool { matches!(self, Self::Const(_)) }

    /// Returns the variable of this identifier, if it is one.
    #[inline]
    pub fn var(&self) -> Option<&Var> {
        match self {
            Self::Var(v) => Some(v),
            Self::Const(_) => None,
        }
    }

    /// Returns the concrete fact name this identifier refers to.
    ///
    /// # Errors
    /// This function errors if this identifier is still a variable.
    #[inline]
    pub fn name(&self) -> Result<&str, Error> {
        match self {
            Self::Const(name) => Ok(name),
            Self::Var(v) => Err(Error::Ungrounded { what: v.to_string() }),
        }
    }
}
impl Display for Ident {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Const(name) => write!(f, "{name}"),
            Self::Var(v) => v.fmt(f),
        }
    }
}
impl From<&str> for Ident {
    /// Tokens starting with [`VAR_MARKER`] become variables, anything else a concrete name.
    #[inline]
    fn from(value: &str) -> Self { if value.starts_with(VAR_MARKER) { Self::Var(Var::new(value)) } else { Self::Const(value.into()) } }
}
impl From<Var> for Ident {
    #[inline]
    fn from(value: Var) -> Self { Self::Var(value) }
}



/// A value expression, as it occurs on the right-hand side of conditions and in conclusions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expr {
    /// A literal value.
    Lit(Value),
    /// The name of a fact, as a [`Value::Str`].
    Fact(Ident),
    /// The value of a slot of a fact.
    Slot(Ident, String),
    /// An arithmetic operation over two expressions.
    Arith(ArithOp, Box<Expr>, Box<Expr>),
}
impl Expr {
    /// Convenience constructor for a literal.
    #[inline]
    pub fn lit(value: impl Into<Value>) -> Self { Self::Lit(value.into()) }

    /// Convenience constructor for a fact name reference.
    #[inline]
    pub fn fact(fact: impl Into<Ident>) -> Self { Self::Fact(fact.into()) }

    /// Convenience constructor for a slot reference.
    #[inline]
    pub fn slot(fact: impl Into<Ident>, slot: impl Into<String>) -> Self { Self::Slot(fact.into(), slot.into()) }

    /// Returns whether this expression is free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.vars().next().is_none() }

    /// Returns the variables in this expression, left to right.
    ///
    /// # Returns
    /// An [`Iterator`] over [`Var`] (references), which may repeat.
    pub fn vars<'s>(&'s self) -> Box<dyn 's + Iterator<Item = &'s Var>> {
        match self {
            Self::Lit(_) => Box::new(None.into_iter()),
            Self::Fact(ident) | Self::Slot(ident, _) => Box::new(ident.var().into_iter()),
            Self::Arith(_, lhs, rhs) => Box::new(lhs.vars().chain(rhs.vars())),
        }
    }

    /// Returns mutable references to all identifiers in this expression.
    pub(crate) fn idents_mut<'s>(&'s mut self) -> Box<dyn 's + Iterator<Item = &'s mut Ident>> {
        match self {
            Self::Lit(_) => Box::new(None.into_iter()),
            Self::Fact(ident) | Self::Slot(ident, _) => Box::new(Some(ident).into_iter()),
            Self::Arith(_, lhs, rhs) => Box::new(lhs.idents_mut().chain(rhs.idents_mut())),
        }
    }

    /// Evaluates this expression against some facts.
    ///
    /// # Arguments
    /// - `facts`: The [`Facts`] to look up referenced facts in.
    ///
    /// # Returns
    /// The [`Value`] of the expression, or [`None`] if it refers to a fact or slot that doesn't
    /// exist.
    ///
    /// # Errors
    /// This function errors if the expression isn't grounded or an arithmetic operation fails.
    pub fn eval(&self, facts: &impl Facts) -> Result<Option<Value>, Error> {
        match self {
            Self::Lit(value) => Ok(Some(value.clone())),
            Self::Fact(ident) => {
                let name: &str = ident.name()?;
                Ok(facts.get(name).map(|fact| Value::Str(fact.name.clone())))
            },
            Self::Slot(ident, slot) => Ok(facts.get(ident.name()?).and_then(|fact| fact.get(slot)).cloned()),
            Self::Arith(op, lhs, rhs) => match (lhs.eval(facts)?, rhs.eval(facts)?) {
                (Some(lhs), Some(rhs)) => op.apply(&lhs, &rhs).map(Some),
                _ => Ok(None),
            },
        }
    }
}
impl Display for Expr {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Lit(value) => value.fmt(f),
            Self::Fact(ident) => ident.fmt(f),
            Self::Slot(ident, slot) => write!(f, "{ident}.{slot}"),
            Self::Arith(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}
impl From<Value> for Expr {
    #[inline]
    fn from(value: Value) -> Self { Self::Lit(value) }
}
impl std::ops::Add for Expr {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output { Self::Arith(ArithOp::Add, Box::new(self), Box::new(rhs)) }
}
impl std::ops::Sub for Expr {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output { Self::Arith(ArithOp::Sub, Box::new(self), Box::new(rhs)) }
}
impl std::ops::Mul for Expr {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output { Self::Arith(ArithOp::Mul, Box::new(self), Box::new(rhs)) }
}
impl std::ops::Div for Expr {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self::Output { Self::Arith(ArithOp::Div, Box::new(self), Box::new(rhs)) }
}



/// A single test of a fact against a value.
///
/// Without a slot, the target evaluates to whether the fact exists at all. So "`A` is present" is
/// written `A == true`, see [`Condition::exists()`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Condition {
    /// The fact under test.
    pub fact:  Ident,
    /// The slot under test, if any.
    pub slot:  Option<String>,
    /// How to compare.
    pub op:    CmpOp,
    /// What to compare with.
    pub value: Expr,
}
impl Condition {
    /// Constructor for a Condition on a slot.
    ///
    /// # Arguments
    /// - `fact`: The fact (or variable) under test.
    /// - `slot`: The slot under test.
    /// - `op`: The [`CmpOp`] to compare with.
    /// - `value`: The [`Expr`] to compare to.
    #[inline]
    pub fn new(fact: impl Into<Ident>, slot: impl Into<String>, op: CmpOp, value: impl Into<Expr>) -> Self {
        Self { fact: fact.into(), slot: Some(slot.into()), op, value: value.into() }
    }

    /// Constructor for a Condition that holds if the given fact exists.
    #[inline]
    pub fn exists(fact: impl Into<Ident>) -> Self { Self { fact: fact.into(), slot: None, op: CmpOp::Eq, value: Expr::lit(true) } }

    /// Constructor for a Condition that holds if the given fact does not exist.
    #[inline]
    pub fn absent(fact: impl Into<Ident>) -> Self { Self { fact: fact.into(), slot: None, op: CmpOp::Eq, value: Expr::lit(false) } }

    /// Returns whether this condition is free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.fact.is_grounded() && self.value.is_grounded() }

    /// Returns the variable that should be bound first to ground this condition.
    ///
    /// # Returns
    /// The tested fact if it is a variable, else the first variable in the value, else [`None`].
    #[inline]
    pub fn first_var(&self) -> Option<&Var> { self.fact.var().or_else(|| self.value.vars().next()) }

    /// Evaluates this condition against some facts.
    ///
    /// If the tested fact or slot, or any fact or slot referenced by the value, doesn't exist, the
    /// condition simply doesn't hold.
    ///
    /// # Errors
    /// This function errors if the condition isn't grounded or its values could not be computed
    /// or compared.
    pub fn evaluate(&self, facts: &impl Facts) -> Result<bool, Error> {
        let name: &str = self.fact.name()?;
        let lhs: Option<Value> = match &self.slot {
            Some(slot) => facts.get(name).and_then(|fact| fact.get(slot)).cloned(),
            None => Some(Value::Bool(facts.contains(name))),
        };
        let rhs: Option<Value> = self.value.eval(facts)?;
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => self.op.test(&lhs, &rhs),
            _ => Ok(false),
        }
    }
}
impl Display for Condition {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}", self.fact)?;
        if let Some(slot) = &self.slot {
            write!(f, ".{slot}")?;
        }
        write!(f, " {} {}", self.op, self.value)
    }
}

/// A conjunction of [`Condition`]s, which holds if all of them hold.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Disjunction {
    pub conditions: Vec<Condition>,
}
impl Disjunction {
    /// Returns whether all conditions are free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.conditions.iter().all(Condition::is_grounded) }

    /// Evaluates all conditions against some facts.
    ///
    /// # Errors
    /// This function errors if any of the [conditions](Condition::evaluate()) errors.
    #[inline]
    pub fn holds(&self, facts: &impl Facts) -> Result<bool, Error> {
        for cond in &self.conditions {
            if !cond.evaluate(facts)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
impl Display for Disjunction {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "(")?;
        for (i, cond) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            cond.fmt(f)?;
        }
        write!(f, ")")
    }
}
impl FromIterator<Condition> for Disjunction {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self { Self { conditions: iter.into_iter().collect() } }
}

/// The left-hand side of a rule, which holds if any of its [`Disjunction`]s holds.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Antecedent {
    pub disjunctions: Vec<Disjunction>,
}
impl Antecedent {
    /// Builds an antecedent that holds if all the given conditions hold.
    #[inline]
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self { Self { disjunctions: vec![conditions.into_iter().collect()] } }

    /// Builds an antecedent that holds if any of the given conditions holds.
    #[inline]
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self { disjunctions: conditions.into_iter().map(|c| Disjunction { conditions: vec![c] }).collect() }
    }

    /// Builds an antecedent from a flat list of conditions and a [`Combinator`].
    #[inline]
    pub fn combine(combinator: Combinator, conditions: impl IntoIterator<Item = Condition>) -> Self {
        match combinator {
            Combinator::And => Self::all(conditions),
            Combinator::Or => Self::any(conditions),
        }
    }

    /// Returns an iterator over all conditions, in order.
    #[inline]
    pub fn conditions(&self) -> impl '_ + Iterator<Item = &Condition> { self.disjunctions.iter().flat_map(|d| d.conditions.iter()) }

    /// Returns whether all conditions are free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.disjunctions.iter().all(Disjunction::is_grounded) }

    /// Evaluates this antecedent against some facts.
    ///
    /// Note that an antecedent without any disjunctions never holds, whereas one with an empty
    /// disjunction always does.
    ///
    /// # Errors
    /// This function errors if any of the [conditions](Condition::evaluate()) errors.
    #[inline]
    pub fn holds(&self, facts: &impl Facts) -> Result<bool, Error> {
        for disj in &self.disjunctions {
            if disj.holds(facts)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
impl Display for Antecedent {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        for (i, disj) in self.disjunctions.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            disj.fmt(f)?;
        }
        Ok(())
    }
}



/// What a [`Conclusion`] does to its fact.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    /// Makes sure the fact exists.
    Assert,
    /// Removes the fact.
    Retract,
    /// Sets a slot of the fact (creating the fact if necessary).
    Set { slot: String, value: Expr },
}

/// A single effect of a rule on a fact.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Conclusion {
    /// The fact affected.
    pub fact:   Ident,
    /// What happens to it.
    pub action: Action,
}
impl Conclusion {
    /// Constructor for a Conclusion that asserts a fact.
    #[inline]
    pub fn assert(fact: impl Into<Ident>) -> Self { Self { fact: fact.into(), action: Action::Assert } }

    /// Constructor for a Conclusion that retracts a fact.
    #[inline]
    pub fn retract(fact: impl Into<Ident>) -> Self { Self { fact: fact.into(), action: Action::Retract } }

    /// Constructor for a Conclusion that sets a slot of a fact.
    #[inline]
    pub fn set(fact: impl Into<Ident>, slot: impl Into<String>, value: impl Into<Expr>) -> Self {
        Self { fact: fact.into(), action: Action::Set { slot: slot.into(), value: value.into() } }
    }

    /// Returns whether this conclusion is free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.fact.is_grounded()
            && match &self.action {
                Action::Assert | Action::Retract => true,
                Action::Set { value, .. } => value.is_grounded(),
            }
    }

    /// Returns the variable that should be bound first to ground this conclusion.
    ///
    /// # Returns
    /// The output fact if it is a variable, else the first variable in the set value, else
    /// [`None`].
    #[inline]
    pub fn first_var(&self) -> Option<&Var> {
        self.fact.var().or_else(|| match &self.action {
            Action::Assert | Action::Retract => None,
            Action::Set { value, .. } => value.vars().next(),
        })
    }

    /// Applies this conclusion to a mutable set of facts.
    ///
    /// # Returns
    /// Whether the facts have changed.
    ///
    /// # Errors
    /// This function errors if the conclusion isn't grounded, or its value could not be computed.
    pub fn apply(&self, base: &mut FactBase) -> Result<bool, Error> {
        let name: &str = self.fact.name()?;
        match &self.action {
            Action::Assert => Ok(base.assert(name)),
            Action::Retract => Ok(base.remove(name).is_some()),
            Action::Set { slot, value } => match value.eval(&*base)? {
                Some(value) => Ok(base.set(name, slot, value)),
                None => Err(Error::ValueEvaluation { what: value.to_string(), reason: "it refers to an unknown fact or slot".into() }),
            },
        }
    }
}
impl Display for Conclusion {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match &self.action {
            Action::Assert => write!(f, "assert {}", self.fact),
            Action::Retract => write!(f, "retract {}", self.fact),
            Action::Set { slot, value } => write!(f, "set {}.{slot} = {value}", self.fact),
        }
    }
}

/// The right-hand side of a rule: a sequence of [`Conclusion`]s applied in order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Consequent {
    pub conclusions: Vec<Conclusion>,
}
impl Consequent {
    /// Returns whether all conclusions are free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.conclusions.iter().all(Conclusion::is_grounded) }

    /// Applies all conclusions, in order, to a mutable set of facts.
    ///
    /// Later conclusions observe the effects of earlier ones.
    ///
    /// # Returns
    /// Whether the facts have changed.
    ///
    /// # Errors
    /// This function errors if any [conclusion](Conclusion::apply()) fails.
    #[inline]
    pub fn apply(&self, base: &mut FactBase) -> Result<bool, Error> {
        let mut changed: bool = false;
        for concl in &self.conclusions {
            changed |= concl.apply(base)?;
        }
        Ok(changed)
    }

    /// Computes the state that results from applying this consequent to another one.
    ///
    /// # Returns
    /// A new [`State`]. The given one is left untouched.
    ///
    /// # Errors
    /// This function errors if any [conclusion](Conclusion::apply()) fails.
    #[inline]
    pub fn successor(&self, state: &State) -> Result<State, Error> {
        let mut base: FactBase = state.thaw();
        self.apply(&mut base)?;
        Ok(base.freeze())
    }
}
impl Display for Consequent {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        for (i, concl) in self.conclusions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            concl.fmt(f)?;
        }
        Ok(())
    }
}
impl FromIterator<Conclusion> for Consequent {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Conclusion>>(iter: T) -> Self { Self { conclusions: iter.into_iter().collect() } }
}



/// A rule, or rule template, acting as an operator over facts.
///
/// Cloning a rule deep-copies all its conditions and conclusions, so copies can be bound
/// independently.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rule {
    /// A human-readable name for the rule. Instances keep the name of their template.
    pub name:       String,
    /// The conditions under which the rule fires.
    pub antecedent: Antecedent,
    /// What happens when the rule fires.
    pub consequent: Consequent,
}
impl Rule {
    /// Constructor for the Rule.
    ///
    /// # Arguments
    /// - `name`: A human-readable name for the rule.
    /// - `antecedent`: The [`Antecedent`] of the rule.
    /// - `conclusions`: The [`Conclusion`]s making up its [`Consequent`].
    #[inline]
    pub fn new(name: impl Into<String>, antecedent: Antecedent, conclusions: impl IntoIterator<Item = Conclusion>) -> Self {
        Self { name: name.into(), antecedent, consequent: conclusions.into_iter().collect() }
    }

    /// Returns to what extent this rule is grounded.
    pub fn binding(&self) -> Binding {
        let (mut grounded, mut total): (usize, usize) = (0, 0);
        for ground in self.antecedent.conditions().map(Condition::is_grounded).chain(self.consequent.conclusions.iter().map(Conclusion::is_grounded)) {
            total += 1;
            grounded += ground as usize;
        }
        if grounded == total {
            Binding::Ground
        } else if grounded == 0 {
            Binding::Unbound
        } else {
            Binding::PartiallyBound
        }
    }

    /// Returns whether this rule is free of variables.
    #[inline]
    pub fn is_grounded(&self) -> bool { self.antecedent.is_grounded() && self.consequent.is_grounded() }

    /// Checks whether this rule's antecedent holds in the given facts.
    ///
    /// # Errors
    /// This function errors if the rule isn't grounded, or any condition fails to evaluate.
    pub fn holds(&self, facts: &impl Facts) -> Result<bool, Error> {
        if !self.is_grounded() {
            return Err(Error::Ungrounded { what: self.to_string() });
        }
        let holds: bool = self.antecedent.holds(facts)?;
        trace!("Rule '{self}' {}", if holds { "HOLDS" } else { "does not hold" });
        Ok(holds)
    }

    /// Fires this rule's consequent into a mutable set of facts.
    ///
    /// # Returns
    /// Whether the facts have changed.
    ///
    /// # Errors
    /// This function errors if the rule isn't grounded, or any conclusion fails.
    pub fn fire(&self, base: &mut FactBase) -> Result<bool, Error> {
        if !self.consequent.is_grounded() {
            return Err(Error::Ungrounded { what: self.to_string() });
        }
        trace!("Firing rule '{self}'");
        self.consequent.apply(base)
    }

    /// Computes the state resulting from firing this rule in another.
    ///
    /// # Errors
    /// This function errors if the rule isn't grounded, or any conclusion fails.
    pub fn successor(&self, state: &State) -> Result<State, Error> {
        if !self.consequent.is_grounded() {
            return Err(Error::Ungrounded { what: self.to_string() });
        }
        self.consequent.successor(state)
    }
}
impl Display for Rule {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}: {} => {}", self.name, self.antecedent, self.consequent) }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Fact;
    use crate::tests::make_state;


    #[test]
    fn test_condition_evaluate() {
        let state: State = make_state([Fact::new("a").with("x", 3), Fact::new("b").with("x", 5)]);

        assert!(Condition::exists("a").evaluate(&state).unwrap());
        assert!(!Condition::exists("c").evaluate(&state).unwrap());
        assert!(Condition::absent("c").evaluate(&state).unwrap());
        assert!(Condition::new("a", "x", CmpOp::Lt, Expr::slot("b", "x")).evaluate(&state).unwrap());
        assert!(Condition::new("b", "x", CmpOp::Eq, Expr::slot("a", "x") + Expr::lit(2)).evaluate(&state).unwrap());
        assert!(Condition::new("b", "x", CmpOp::Eq, Expr::lit(5.0)).evaluate(&state).unwrap());

        // Missing facts or slots simply don't hold
        assert!(!Condition::new("a", "y", CmpOp::Eq, Expr::lit(3)).evaluate(&state).unwrap());
        assert!(!Condition::new("a", "x", CmpOp::Eq, Expr::slot("c", "x")).evaluate(&state).unwrap());
        assert!(!Condition::new("c", "x", CmpOp::Ne, Expr::lit(3)).evaluate(&state).unwrap());
    }

    #[test]
    fn test_condition_errors() {
        let state: State = make_state([Fact::new("a").with("x", 3).with("s", "text")]);

        assert!(matches!(
            Condition::new("a", "x", CmpOp::Eq, Expr::slot("a", "s") + Expr::lit(1)).evaluate(&state),
            Err(Error::NotNumericOperand { op: ArithOp::Add, .. })
        ));
        assert!(matches!(Condition::new("a", "x", CmpOp::Lt, Expr::slot("a", "s")).evaluate(&state), Err(Error::ValueEvaluation { .. })));
        assert!(matches!(
            Condition::new("a", "x", CmpOp::Eq, Expr::slot("a", "x") / Expr::lit(0)).evaluate(&state),
            Err(Error::ValueEvaluation { .. })
        ));
        assert!(matches!(Condition::exists("?x").evaluate(&state), Err(Error::Ungrounded { .. })));

        // Equality between incomparable values is fine though
        assert!(!Condition::new("a", "x", CmpOp::Eq, Expr::slot("a", "s")).evaluate(&state).unwrap());
    }

    #[test]
    fn test_arith() {
        assert_eq!(ArithOp::Div.apply(&Value::Int(6), &Value::Int(3)).unwrap(), Value::Int(2));
        assert_eq!(ArithOp::Div.apply(&Value::Int(3), &Value::Int(2)).unwrap(), Value::Float(1.5));
        assert_eq!(ArithOp::Mul.apply(&Value::Int(3), &Value::Float(0.5)).unwrap(), Value::Float(1.5));
        assert!(matches!(ArithOp::Add.apply(&Value::Int(i64::MAX), &Value::Int(1)), Err(Error::ValueEvaluation { .. })));
        assert!(matches!(ArithOp::Sub.apply(&Value::Bool(true), &Value::Int(1)), Err(Error::NotNumericOperand { .. })));
    }

    #[test]
    fn test_antecedent_combinators() {
        let state: State = make_state([Fact::new("a")]);
        let conds = || [Condition::exists("a"), Condition::exists("b")];

        assert!(!Antecedent::combine(Combinator::And, conds()).holds(&state).unwrap());
        assert!(Antecedent::combine(Combinator::Or, conds()).holds(&state).unwrap());
        assert!(Antecedent::all([]).holds(&state).unwrap());
        assert!(!Antecedent::any([]).holds(&state).unwrap());
    }

    #[test]
    fn test_rule_binding() {
        let unbound = Rule::new("r", Antecedent::all([Condition::exists("?x")]), [Conclusion::assert("?y")]);
        let partial = Rule::new("r", Antecedent::all([Condition::exists("a")]), [Conclusion::assert("?y")]);
        let ground = Rule::new("r", Antecedent::all([Condition::exists("a")]), [Conclusion::assert("b")]);
        assert_eq!(unbound.binding(), Binding::Unbound);
        assert_eq!(partial.binding(), Binding::PartiallyBound);
        assert_eq!(ground.binding(), Binding::Ground);
        assert!(!partial.is_grounded());
        assert!(ground.is_grounded());
    }

    #[test]
    fn test_rule_successor() {
        let state: State = make_state([Fact::new("a").with("n", 1)]);
        let rule = Rule::new("inc", Antecedent::all([Condition::exists("a")]), [
            Conclusion::set("a", "n", Expr::slot("a", "n") + Expr::lit(1)),
            Conclusion::set("b", "n", Expr::slot("a", "n") * Expr::lit(10)),
            Conclusion::retract("a"),
        ]);

        assert!(rule.holds(&state).unwrap());
        let next: State = rule.successor(&state).unwrap();
        // Conclusions are applied in order
        assert_eq!(next, make_state([Fact::new("b").with("n", 20)]));
        // The original is untouched
        assert_eq!(state, make_state([Fact::new("a").with("n", 1)]));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::new("move", Antecedent::all([Condition::exists("?x"), Condition::new("?x", "n", CmpOp::Gt, Expr::lit(0))]), [
            Conclusion::set("?x", "n", Expr::slot("?x", "n") - Expr::lit(1)),
            Conclusion::assert("done"),
        ]);
        assert_eq!(rule.to_string(), "move: (?x == true & ?x.n > 0) => set ?x.n = (?x.n - 1), assert done");
    }
}
