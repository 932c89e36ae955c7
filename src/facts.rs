//  FACTS.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 10:02:17
//  Last edited:
//    16 Oct 2026, 11:48:03
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the facts that rules reason about, and the two containers
//!   that hold them.
//!
//!   There are two containers on purpose: a [`State`] is an immutable value
//!   used by the planner, which compares states structurally to build its
//!   closed set; whereas a [`FactBase`] is a mutable handle used during
//!   direct execution, where rules fire straight into the facts. One can be
//!   turned into the other with [`State::thaw()`] and [`FactBase::freeze()`].
//

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};

use enum_debug::EnumDebug;


/***** INTERFACES *****/
/// Abstracts over containers of [`Fact`]s that conditions can be evaluated against.
pub trait Facts {
    /// Finds a fact by name.
    ///
    /// # Arguments
    /// - `name`: The name of the fact to find.
    ///
    /// # Returns
    /// The [`Fact`] with that name, or [`None`] if it isn't known.
    fn get(&self, name: &str) -> Option<&Fact>;

    /// Returns the names of all the facts in this container, in lexicographical order.
    ///
    /// # Returns
    /// An [`Iterator`] over fact names.
    fn names<'s>(&'s self) -> impl 's + Iterator<Item = &'s str>;

    /// Checks whether a fact with the given name exists.
    #[inline]
    fn contains(&self, name: &str) -> bool { self.get(name).is_some() }
}





/***** LIBRARY *****/
/// A value that a fact's slot may take.
#[derive(Clone, Debug, EnumDebug)]
pub enum Value {
    /// A whole number.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// Some text.
    Str(String),
    /// A truth value.
    Bool(bool),
}
impl Value {
    /// Returns this value as a float if it is numeric.
    ///
    /// # Returns
    /// The numeric value as an [`f64`], or [`None`] if this is a [`Value::Str`] or [`Value::Bool`].
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(_) | Self::Bool(_) => None,
        }
    }

    /// Returns whether this value is a number.
    #[inline]
    pub fn is_numeric(&self) -> bool { matches!(self, Self::Int(_) | Self::Float(_)) }

    /// Compares two values the way a condition does.
    ///
    /// Unlike [`PartialEq`], which is structural, this considers `Int(2)` and `Float(2.0)` equal.
    ///
    /// # Arguments
    /// - `other`: The value to compare with.
    ///
    /// # Returns
    /// The [`Ordering`](std::cmp::Ordering) between the two, or [`None`] if they aren't
    /// comparable (e.g., a string and a number).
    pub fn compare(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(lhs), Self::Int(rhs)) => Some(lhs.cmp(rhs)),
            (Self::Str(lhs), Self::Str(rhs)) => Some(lhs.cmp(rhs)),
            (Self::Bool(lhs), Self::Bool(rhs)) => Some(lhs.cmp(rhs)),
            (lhs, rhs) => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
        }
    }
}
impl Eq for Value {}
impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(lhs), Self::Int(rhs)) => lhs == rhs,
            // Bitwise, so that states holding floats can still be hashed consistently
            (Self::Float(lhs), Self::Float(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Str(lhs), Self::Str(rhs)) => lhs == rhs,
            (Self::Bool(lhs), Self::Bool(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}
impl Hash for Value {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
            Self::Bool(b) => b.hash(state),
        }
    }
}
impl Display for Value {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self { Self::Int(value) }
}
impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self { Self::Int(value as i64) }
}
impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self { Self::Float(value) }
}
impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self { Self::Bool(value) }
}
impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self { Self::Str(value.into()) }
}
impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self { Self::Str(value) }
}



/// A named record of slot values.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Fact {
    /// The name of the fact. Unique within a [`State`] or [`FactBase`].
    pub name:  String,
    /// The slots of the fact, ordered by name.
    pub slots: BTreeMap<String, Value>,
}
impl Fact {
    /// Constructor for a Fact without any slots.
    ///
    /// # Arguments
    /// - `name`: The name of the fact.
    ///
    /// # Returns
    /// A new Fact with no slots.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), slots: BTreeMap::new() } }

    /// Builder-style method to add a slot to this fact.
    ///
    /// # Arguments
    /// - `slot`: The name of the slot.
    /// - `value`: The [`Value`] it takes.
    ///
    /// # Returns
    /// Self, for chaining.
    #[inline]
    pub fn with(mut self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slots.insert(slot.into(), value.into());
        self
    }

    /// Returns the value of one of this fact's slots.
    #[inline]
    pub fn get(&self, slot: &str) -> Option<&Value> { self.slots.get(slot) }

    /// Sets one of this fact's slots.
    ///
    /// # Returns
    /// Whether the fact has changed.
    #[inline]
    pub fn set(&mut self, slot: impl Into<String>, value: Value) -> bool { self.slots.insert(slot.into(), value.clone()).as_ref() != Some(&value) }
}
impl Display for Fact {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}", self.name)?;
        if !self.slots.is_empty() {
            write!(f, "(")?;
            for (i, (slot, value)) in self.slots.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{slot}={value}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}



/// An immutable snapshot of facts, used as a node in the planner's search space.
///
/// Equality and hashing are purely structural: two states are the same if they contain the same
/// fact names with the same slot values, regardless of how they were built.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct State {
    /// The facts, keyed by name.
    facts: BTreeMap<String, Fact>,
}
impl State {
    /// Constructor for an empty State.
    #[inline]
    pub fn new() -> Self { Self { facts: BTreeMap::new() } }

    /// Returns the number of facts in this state.
    #[inline]
    pub fn len(&self) -> usize { self.facts.len() }

    /// Returns whether there are no facts in this state.
    #[inline]
    pub fn is_empty(&self) -> bool { self.facts.is_empty() }

    /// Returns an iterator over the facts in this state, ordered by name.
    #[inline]
    pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = &Fact> { self.facts.values() }

    /// Returns the set of names of the facts in this state.
    ///
    /// # Returns
    /// A [`BTreeSet`] of names borrowed from this state.
    #[inline]
    pub fn fact_names(&self) -> BTreeSet<&str> { self.facts.keys().map(String::as_str).collect() }

    /// Checks whether this state and another contain exactly the same fact names, regardless of
    /// their slot values.
    #[inline]
    pub fn same_names(&self, other: &Self) -> bool { self.facts.len() == other.facts.len() && self.facts.keys().eq(other.facts.keys()) }

    /// Copies this state into a mutable [`FactBase`].
    ///
    /// # Returns
    /// A new FactBase that owns a copy of this state's facts.
    #[inline]
    pub fn thaw(&self) -> FactBase { FactBase { facts: self.facts.clone() } }
}
impl Facts for State {
    #[inline]
    fn get(&self, name: &str) -> Option<&Fact> { self.facts.get(name) }

    #[inline]
    fn names<'s>(&'s self) -> impl 's + Iterator<Item = &'s str> { self.facts.keys().map(String::as_str) }
}
impl FromIterator<Fact> for State {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Fact>>(iter: T) -> Self { Self { facts: iter.into_iter().map(|f| (f.name.clone(), f)).collect() } }
}
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "State {{")?;
        if self.facts.is_empty() {
            return write!(f, " <none> }}");
        }
        writeln!(f)?;
        for fact in self.facts.values() {
            writeln!(f, "    + {fact}")?;
        }
        write!(f, "}}")
    }
}



/// A mutable collection of facts, used when rules fire directly into the facts.
#[derive(Clone, Debug, Default)]
pub struct FactBase {
    /// The facts, keyed by name.
    facts: BTreeMap<String, Fact>,
}
impl FactBase {
    /// Constructor for an empty FactBase.
    #[inline]
    pub fn new() -> Self { Self { facts: BTreeMap::new() } }

    /// Returns the number of facts in this base.
    #[inline]
    pub fn len(&self) -> usize { self.facts.len() }

    /// Returns whether there are no facts in this base.
    #[inline]
    pub fn is_empty(&self) -> bool { self.facts.is_empty() }

    /// Returns an iterator over the facts in this base, ordered by name.
    #[inline]
    pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = &Fact> { self.facts.values() }

    /// Adds a fact, replacing any existing fact with the same name.
    ///
    /// # Returns
    /// The fact that was replaced, if any.
    #[inline]
    pub fn insert(&mut self, fact: Fact) -> Option<Fact> { self.facts.insert(fact.name.clone(), fact) }

    /// Removes a fact.
    ///
    /// # Returns
    /// The removed fact, or [`None`] if it didn't exist.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<Fact> { self.facts.remove(name) }

    /// Makes sure a fact with the given name exists, creating an empty one if it didn't.
    ///
    /// # Returns
    /// Whether the base has changed.
    #[inline]
    pub fn assert(&mut self, name: &str) -> bool {
        if self.facts.contains_key(name) {
            return false;
        }
        self.facts.insert(name.into(), Fact::new(name));
        true
    }

    /// Sets a slot of a fact, creating the fact if it didn't exist yet.
    ///
    /// # Returns
    /// Whether the base has changed.
    #[inline]
    pub fn set(&mut self, name: &str, slot: &str, value: Value) -> bool {
        let created: bool = self.assert(name);
        match self.facts.get_mut(name) {
            Some(fact) => fact.set(slot, value) || created,
            None => created,
        }
    }

    /// Turns this base into an immutable [`State`].
    #[inline]
    pub fn freeze(self) -> State { State { facts: self.facts } }
}
impl Facts for FactBase {
    #[inline]
    fn get(&self, name: &str) -> Option<&Fact> { self.facts.get(name) }

    #[inline]
    fn names<'s>(&'s self) -> impl 's + Iterator<Item = &'s str> { self.facts.keys().map(String::as_str) }
}
impl FromIterator<Fact> for FactBase {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Fact>>(iter: T) -> Self { Self { facts: iter.into_iter().map(|f| (f.name.clone(), f)).collect() } }
}
impl Display for FactBase {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        // Same as the state, but mutable
        write!(f, "Fact base {{")?;
        if self.facts.is_empty() {
            return write!(f, " <none> }}");
        }
        writeln!(f)?;
        for fact in self.facts.values() {
            writeln!(f, "    + {fact}")?;
        }
        write!(f, "}}")
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;


    fn hash_of(state: &State) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }


    #[test]
    fn test_state_structural_equality() {
        let lhs: State = [Fact::new("a").with("x", 1), Fact::new("b")].into_iter().collect();
        let rhs: State = [Fact::new("b"), Fact::new("a").with("x", 1)].into_iter().collect();
        assert_eq!(lhs, rhs);
        assert_eq!(hash_of(&lhs), hash_of(&rhs));

        let other: State = [Fact::new("a").with("x", 2), Fact::new("b")].into_iter().collect();
        assert_ne!(lhs, other);
        assert!(lhs.same_names(&other));
    }

    #[test]
    fn test_value_compare() {
        use std::cmp::Ordering;

        assert_eq!(Value::Int(2).compare(&Value::Float(2.0)), Some(Ordering::Equal));
        assert_eq!(Value::Int(1).compare(&Value::Int(3)), Some(Ordering::Less));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from("a").compare(&Value::Int(1)), None);
        // Structurally, they're different though
        assert_ne!(Value::Int(2), Value::Float(2.0));
    }

    #[test]
    fn test_fact_base_freeze_thaw() {
        let state: State = [Fact::new("a")].into_iter().collect();
        let mut base: FactBase = state.thaw();
        assert!(base.set("b", "x", Value::Int(4)));
        assert!(!base.set("b", "x", Value::Int(4)));
        assert!(!base.assert("a"));
        assert!(base.remove("a").is_some());

        // The original state is untouched
        assert!(state.contains("a"));
        assert!(!state.contains("b"));

        let next: State = base.freeze();
        assert_eq!(next.fact_names().into_iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(next.get("b").and_then(|f| f.get("x")), Some(&Value::Int(4)));
    }

    #[test]
    fn test_state_display() {
        let state: State = [Fact::new("a").with("x", 1).with("y", "z")].into_iter().collect();
        assert_eq!(state.to_string(), "State {\n    + a(x=1, y=\"z\")\n}");
        assert_eq!(State::new().to_string(), "State { <none> }");
    }
}
