//! The embedding contract between the engine and a host record layer.
//!
//! The engine is agnostic to how records store fields, persist themselves,
//! or evaluate rules. It needs exactly five things from an instance: its
//! model name, a stable identity, the active-profile slot, its persistence
//! state, and the current materialization state of its relations. Hosts
//! implement [`Record`] and invoke the engine's lifecycle entry points at
//! their own interception points (construction, pre-validation, lazy load).

use crate::core::types::{ProfileName, RecordId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a record instance in an in-memory object graph.
///
/// The engine is single-threaded and synchronous; instance graphs are plain
/// `Rc<RefCell<_>>` structures accessed by one logical thread of control.
pub type SharedRecord = Rc<RefCell<dyn Record>>;

/// Materialization state of a relation on a record instance.
///
/// "Not loaded" and "loaded but empty" are distinct states: propagation
/// skips not-yet-loaded relations on persisted instances rather than forcing
/// a fetch, while a loaded empty collection simply has nothing to visit.
#[derive(Clone)]
pub enum RelationTarget {
    /// The relation has not been materialized; reading through it would
    /// force a fetch in the host layer.
    NotLoaded,
    /// A singular relation: one related record, or none.
    Singular(Option<SharedRecord>),
    /// A plural relation: the currently materialized collection.
    Plural(Vec<SharedRecord>),
}

impl RelationTarget {
    /// Whether the relation has been materialized.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, RelationTarget::NotLoaded)
    }

    /// The currently materialized records; empty when not loaded.
    pub fn records(&self) -> Vec<SharedRecord> {
        match self {
            RelationTarget::NotLoaded => Vec::new(),
            RelationTarget::Singular(record) => record.iter().cloned().collect(),
            RelationTarget::Plural(records) => records.clone(),
        }
    }
}

impl fmt::Debug for RelationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationTarget::NotLoaded => write!(f, "RelationTarget::NotLoaded"),
            RelationTarget::Singular(record) => f
                .debug_tuple("RelationTarget::Singular")
                .field(&record.as_ref().map(|r| r.borrow().record_id()))
                .finish(),
            RelationTarget::Plural(records) => f
                .debug_tuple("RelationTarget::Plural")
                .field(&records.len())
                .finish(),
        }
    }
}

/// Contract a host record type satisfies so the engine can drive it.
///
/// Implementations are expected to keep `active_profile` private to the
/// engine: the slot is mutated only through the switch engine and the
/// lifecycle entry points, never by application code directly.
pub trait Record {
    /// Name of the model type this instance belongs to.
    fn model_name(&self) -> &str;

    /// Stable identity of this instance within its graph.
    ///
    /// Used to terminate cascades over cyclic graphs; two handles to the
    /// same logical record must report the same ID.
    fn record_id(&self) -> RecordId;

    /// Currently active validation profile, if any.
    fn active_profile(&self) -> Option<ProfileName>;

    /// Engine-private setter for the active profile.
    fn set_active_profile(&mut self, profile: Option<ProfileName>);

    /// Whether the instance has been persisted by the host.
    ///
    /// New (unpersisted) instances are assumed to hold their relation graph
    /// in memory, so hosts should never report `NotLoaded` relations for
    /// them; construction-time graphs are safe to traverse.
    fn is_persisted(&self) -> bool;

    /// Current materialization state of a relation, or `None` when no such
    /// relation exists on this instance.
    fn relation_target(&self, name: &str) -> Option<RelationTarget>;
}
