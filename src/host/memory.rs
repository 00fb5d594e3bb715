//! Reference in-memory host.
//!
//! [`MemoryRecord`] is a minimal implementation of the embedding contract:
//! fields in a map, relations materialized in memory, and the engine's
//! lifecycle entry points invoked where a real record layer would intercept
//! construction, lazy loads, and validation. It also interprets a tiny rule
//! vocabulary (presence, prefix format, numericality) so validation outcomes
//! can be observed end to end. The vocabulary is fixture-grade; the engine
//! itself never interprets rule identifiers.

use crate::core::error::{SwitchError, SwitchResult};
use crate::core::record::{Record, RelationTarget, SharedRecord};
use crate::core::types::{ProfileName, RecordId, RelationKind, Value};
use crate::engine::ProfileEngine;
use crate::rules::rule::AttachedRule;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Concretely typed handle to a memory record.
pub type MemoryHandle = Rc<RefCell<MemoryRecord>>;

/// Upcast a memory handle to the engine's shared-record type.
pub fn shared(record: &MemoryHandle) -> SharedRecord {
    record.clone()
}

/// An in-memory record instance.
///
/// New records report every declared relation as loaded and empty:
/// construction-time graphs live in memory, so `NotLoaded` only appears
/// through [`unload_relation`](Self::unload_relation) on persisted records.
#[derive(Debug)]
pub struct MemoryRecord {
    model: String,
    id: RecordId,
    active: Option<ProfileName>,
    persisted: bool,
    fields: IndexMap<String, Value>,
    relations: IndexMap<String, RelationTarget>,
}

impl MemoryRecord {
    /// Create a record of `model` and run the construction entry point, so
    /// the model's default profile (if any) is active on return.
    pub fn create(engine: &ProfileEngine, model: &str) -> SwitchResult<MemoryHandle> {
        if !engine.catalog().contains(model) {
            return Err(SwitchError::UnknownModel {
                model: model.to_string(),
            });
        }

        let mut relations = IndexMap::new();
        for relation in engine.catalog().relations(model) {
            let empty = match relation.kind {
                RelationKind::Singular => RelationTarget::Singular(None),
                RelationKind::Plural => RelationTarget::Plural(Vec::new()),
            };
            relations.insert(relation.name.clone(), empty);
        }

        let record = Rc::new(RefCell::new(MemoryRecord {
            model: model.to_string(),
            id: RecordId::new(),
            active: None,
            persisted: false,
            fields: IndexMap::new(),
            relations,
        }));
        engine.record_initialized(&shared(&record))?;
        Ok(record)
    }

    /// Set a field value.
    pub fn put(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Read a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assign a singular relation in memory.
    pub fn put_one(&mut self, relation: impl Into<String>, record: Option<SharedRecord>) {
        self.relations
            .insert(relation.into(), RelationTarget::Singular(record));
    }

    /// Assign a plural relation in memory.
    pub fn put_many(&mut self, relation: impl Into<String>, records: Vec<SharedRecord>) {
        self.relations
            .insert(relation.into(), RelationTarget::Plural(records));
    }

    /// Mark the record as persisted by the host.
    pub fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    /// Forget a relation's materialization, as after reloading a persisted
    /// record from storage. Meaningless on a new record, whose graph is
    /// in-memory by definition.
    pub fn unload_relation(&mut self, relation: &str) {
        debug_assert!(self.persisted, "only persisted records have unloaded relations");
        self.relations
            .insert(relation.to_string(), RelationTarget::NotLoaded);
    }

    /// Finish a lazy load of a plural relation and fire the load entry point.
    pub fn load_many(
        engine: &ProfileEngine,
        record: &MemoryHandle,
        relation: &str,
        records: Vec<SharedRecord>,
    ) -> SwitchResult<()> {
        record.borrow_mut().put_many(relation, records);
        engine.relation_loaded(&shared(record), relation)
    }

    /// Finish a lazy load of a singular relation and fire the load entry
    /// point.
    pub fn load_one(
        engine: &ProfileEngine,
        record: &MemoryHandle,
        relation: &str,
        loaded: Option<SharedRecord>,
    ) -> SwitchResult<()> {
        record.borrow_mut().put_one(relation, loaded);
        engine.relation_loaded(&shared(record), relation)
    }

    /// Run a validation pass: re-broadcast the current profile, then evaluate
    /// every rule whose guard currently applies.
    pub fn validate(engine: &ProfileEngine, record: &MemoryHandle) -> SwitchResult<Vec<Failure>> {
        engine.before_validation(&shared(record))?;

        let instance = record.borrow();
        let mut failures = Vec::new();
        for rule in engine.active_rules(&*instance) {
            check(&instance, rule, &mut failures);
        }
        Ok(failures)
    }
}

impl Record for MemoryRecord {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn active_profile(&self) -> Option<ProfileName> {
        self.active.clone()
    }

    fn set_active_profile(&mut self, profile: Option<ProfileName>) {
        self.active = profile;
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn relation_target(&self, name: &str) -> Option<RelationTarget> {
        self.relations.get(name).cloned()
    }
}

/// One failed check from the memory host's rule vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Field the failed check was declared on.
    pub field: String,
    /// What the field should have satisfied.
    pub message: String,
}

impl Failure {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Evaluate one attached rule against a record.
///
/// Symbol arguments name the checked fields; `validates_format_of` reads its
/// required prefix from the first string argument. Identifiers outside the
/// vocabulary are skipped.
fn check(record: &MemoryRecord, rule: &AttachedRule, failures: &mut Vec<Failure>) {
    match rule.identifier.as_str() {
        "validates_presence_of" => {
            for field in symbol_args(rule) {
                if record.field(field).map_or(true, Value::is_blank) {
                    failures.push(Failure::new(field, "must be present"));
                }
            }
        }
        "validates_format_of" => {
            let prefix = rule
                .arguments
                .iter()
                .find_map(|argument| match argument {
                    Value::String(prefix) => Some(prefix.as_str()),
                    _ => None,
                })
                .unwrap_or("");
            for field in symbol_args(rule) {
                let ok = matches!(
                    record.field(field),
                    Some(Value::String(text)) if !text.trim().is_empty() && text.starts_with(prefix)
                );
                if !ok {
                    failures.push(Failure::new(field, format!("must start with `{}`", prefix)));
                }
            }
        }
        "validates_numericality_of" => {
            for field in symbol_args(rule) {
                if record.field(field).and_then(Value::as_float).is_none() {
                    failures.push(Failure::new(field, "must be a number"));
                }
            }
        }
        other => log::debug!("memory host has no check for `{}`, skipping", other),
    }
}

fn symbol_args(rule: &AttachedRule) -> impl Iterator<Item = &str> {
    rule.arguments.iter().filter_map(|argument| match argument {
        Value::Symbol(name) => Some(name.as_str()),
        _ => None,
    })
}
