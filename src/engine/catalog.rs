//! Model reflection and per-model engine state.
//!
//! The catalog is the engine's view of the host's schema: which model types
//! exist, how they derive from each other, and what relations they carry.
//! It also owns each model's profile registry slot and the guarded rules
//! produced by conditional attachment. It is written during the declaration
//! phase (process startup) and read-only afterwards.

use crate::core::types::RelationKind;
use crate::profile::registry::ProfileRegistry;
use crate::rules::rule::AttachedRule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Definition of a relation on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name.
    pub name: String,
    /// Multiplicity.
    pub kind: RelationKind,
    /// Model name of the related record type.
    pub target: String,
}

/// Host-supplied description of a model type.
///
/// Deserializable, so hosts can describe their schema in data instead of
/// code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name, unique within the catalog.
    pub name: String,
    /// Name of the model this one derives from, if any.
    #[serde(default)]
    pub parent: Option<String>,
    /// Relations declared on this model.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl ModelDef {
    /// Start a model definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            relations: Vec::new(),
        }
    }

    /// Derive from a parent model.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parent = Some(name.into());
        self
    }

    /// Add a singular relation.
    pub fn relation_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name: name.into(),
            kind: RelationKind::Singular,
            target: target.into(),
        });
        self
    }

    /// Add a plural relation.
    pub fn relation_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name: name.into(),
            kind: RelationKind::Plural,
            target: target.into(),
        });
        self
    }
}

/// Catalog entry for one registered model.
#[derive(Debug, Clone)]
pub(crate) struct ModelEntry {
    pub(crate) def: ModelDef,
    /// Own registry; `None` until the first declaration touches this model.
    /// Reads fall through the parent chain instead.
    pub(crate) registry: Option<ProfileRegistry>,
    /// Rules after conditional attachment, in attachment order.
    pub(crate) attached: Vec<AttachedRule>,
}

/// Catalog of registered model types.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    /// Models keyed by name, in registration order.
    models: IndexMap<String, ModelEntry>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type. Re-registering a name replaces its definition
    /// and resets its engine state.
    pub fn register(&mut self, def: ModelDef) {
        let name = def.name.clone();
        self.models.insert(
            name,
            ModelEntry {
                def,
                registry: None,
                attached: Vec::new(),
            },
        );
    }

    /// Whether a model is registered.
    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Registered model names, in registration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Look up a relation on a model, walking the parent chain.
    pub fn relation(&self, model: &str, name: &str) -> Option<&RelationDef> {
        for entry in self.chain(model) {
            if let Some(relation) = entry.def.relations.iter().find(|r| r.name == name) {
                return Some(relation);
            }
        }
        None
    }

    /// All relations visible on a model: its own declarations first, then
    /// inherited ones not shadowed by name.
    pub fn relations(&self, model: &str) -> Vec<&RelationDef> {
        let mut out: Vec<&RelationDef> = Vec::new();
        for entry in self.chain(model) {
            for relation in &entry.def.relations {
                if !out.iter().any(|seen| seen.name == relation.name) {
                    out.push(relation);
                }
            }
        }
        out
    }

    /// The registry governing a model: its own if it has one, else the
    /// nearest ancestor's. Reading never copies.
    pub fn effective_registry(&self, model: &str) -> Option<&ProfileRegistry> {
        self.chain(model)
            .into_iter()
            .find_map(|entry| entry.registry.as_ref())
    }

    /// The model's own registry, for mutation. The first write copies the
    /// nearest ancestor's registry so declarations on a derived model never
    /// leak into the ancestor.
    pub(crate) fn registry_mut(&mut self, model: &str) -> Option<&mut ProfileRegistry> {
        if !self.models.contains_key(model) {
            return None;
        }
        let needs_copy = self
            .models
            .get(model)
            .map_or(false, |entry| entry.registry.is_none());
        if needs_copy {
            let inherited = self
                .chain(model)
                .into_iter()
                .skip(1)
                .find_map(|entry| entry.registry.as_ref())
                .cloned()
                .unwrap_or_default();
            if let Some(entry) = self.models.get_mut(model) {
                entry.registry = Some(inherited);
            }
        }
        self.models
            .get_mut(model)
            .and_then(|entry| entry.registry.as_mut())
    }

    /// Append attached rules to a model's guarded-rule store.
    pub(crate) fn append_attached(&mut self, model: &str, rules: Vec<AttachedRule>) {
        if let Some(entry) = self.models.get_mut(model) {
            entry.attached.extend(rules);
        }
    }

    /// Guarded rules for a model, ancestors first, in attachment order.
    pub fn guarded_rules(&self, model: &str) -> Vec<&AttachedRule> {
        let mut chain = self.chain(model);
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|entry| entry.attached.iter())
            .collect()
    }

    /// The model and its ancestors, nearest first. Tolerates malformed
    /// parent cycles by stopping at the first repeated name.
    fn chain(&self, model: &str) -> Vec<&ModelEntry> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(model);

        while let Some(name) = current {
            if !visited.insert(name) {
                break;
            }
            match self.models.get(name) {
                Some(entry) => {
                    current = entry.def.parent.as_deref();
                    out.push(entry);
                }
                None => break,
            }
        }

        out
    }
}
