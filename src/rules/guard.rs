//! Guard predicates gating rule evaluation.
//!
//! A guard is a pure function over an instance's state. The conditional
//! attacher builds a membership guard per profile declaration and composes
//! it with any guard the rule already carried; composition is logical AND
//! with left-to-right short-circuit, so a rule's own condition is consulted
//! before the profile membership test.

use crate::core::record::Record;
use crate::core::types::ProfileName;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A boolean predicate deciding whether a rule applies to a record.
#[derive(Clone)]
pub struct Guard(Rc<dyn Fn(&dyn Record) -> bool>);

impl Guard {
    /// Create a guard from a predicate.
    ///
    /// Predicates must be pure: evaluation may happen any number of times,
    /// in any order, before every validation pass.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Record) -> bool + 'static,
    {
        Self(Rc::new(predicate))
    }

    /// Guard that always applies.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Guard that never applies.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Membership guard: applies while the record's active profile is one of
    /// `names`. An instance with no active profile never matches.
    pub fn profile_in<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ProfileName>,
    {
        let names: HashSet<ProfileName> = names.into_iter().map(Into::into).collect();
        Self::new(move |record| {
            record
                .active_profile()
                .map_or(false, |active| names.contains(&active))
        })
    }

    /// Combine two guards; the result applies only when both apply.
    ///
    /// `self` is evaluated first and short-circuits.
    pub fn and(self, other: Guard) -> Guard {
        Guard::new(move |record| (self.0)(record) && (other.0)(record))
    }

    /// Evaluate the guard against a record.
    pub fn evaluate(&self, record: &dyn Record) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guard(..)")
    }
}
