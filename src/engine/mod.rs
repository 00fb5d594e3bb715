//! The profile engine: declaration, switching, and lifecycle entry points.
//!
//! [`ProfileEngine`] is the single object a host embeds. Declarations run
//! once at startup; afterwards the engine is read-only except for the
//! per-instance profile slot it mutates through the host's [`Record`]
//! contract.
//!
//! [`Record`]: crate::core::record::Record

pub mod attacher;
pub mod catalog;
pub mod declare;
pub mod hooks;
pub mod switch;

use crate::core::error::{DeclareResult, SwitchResult};
use crate::core::record::{Record, SharedRecord};
use crate::core::types::ProfileName;
use crate::engine::catalog::{ModelCatalog, ModelDef};
use crate::engine::declare::ProfileDeclaration;
use crate::profile::profile::NestedSpec;
use crate::rules::capture::RuleSet;
use crate::rules::rule::AttachedRule;

/// The validation-profile engine.
///
/// Owns the model catalog (reflection, per-model registries, attached
/// guarded rules) and exposes the public operations: profile declaration,
/// nested defaults, switching, and the lifecycle entry points hosts invoke
/// from their interception machinery.
#[derive(Debug, Clone, Default)]
pub struct ProfileEngine {
    catalog: ModelCatalog,
}

impl ProfileEngine {
    /// Create an engine with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type with the engine.
    pub fn register_model(&mut self, def: ModelDef) {
        self.catalog.register(def);
    }

    /// The engine's model catalog.
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Start a profile declaration on a model.
    ///
    /// Returns a builder; the declaration takes effect when
    /// [`apply`](ProfileDeclaration::apply) runs.
    pub fn declare_profile(
        &mut self,
        model: impl Into<String>,
        name: impl Into<ProfileName>,
    ) -> ProfileDeclaration<'_> {
        ProfileDeclaration::new(&mut self.catalog, model, name)
    }

    /// Install a model-level default nested-target set.
    ///
    /// Deep entries recurse into the named relation's target model. Fails if
    /// a default nested set was already declared on any model it reaches.
    pub fn declare_nested_default(
        &mut self,
        model: &str,
        specs: &[NestedSpec],
    ) -> DeclareResult<()> {
        declare::declare_nested_default(&mut self.catalog, model, specs)
    }

    /// Attach a rule set's rules directly to a model, outside any profile.
    pub fn apply_rule_set(&mut self, model: &str, rules: &RuleSet) -> DeclareResult<()> {
        declare::apply_rule_set(&mut self.catalog, model, rules)
    }

    /// Whether a model has a profile with this name, walking the model's
    /// parent chain.
    pub fn has_profile(&self, model: &str, name: impl Into<ProfileName>) -> bool {
        let name = name.into();
        self.catalog
            .effective_registry(model)
            .map_or(false, |registry| registry.contains(&name))
    }

    // ========================================================================
    // Switching
    // ========================================================================

    /// Switch the record's active profile and cascade through its currently
    /// materialized nested targets.
    pub fn switch_to(
        &self,
        record: &SharedRecord,
        name: impl Into<ProfileName>,
    ) -> SwitchResult<()> {
        switch::switch_to(&self.catalog, record, &name.into())
    }

    /// Clear the record's active profile. Only unguarded rules apply
    /// afterwards. Does not cascade.
    pub fn clear_profile(&self, record: &SharedRecord) {
        switch::clear_profile(record);
    }

    // ========================================================================
    // Rule access
    // ========================================================================

    /// All guarded rules attached to a model, ancestors first.
    pub fn guarded_rules(&self, model: &str) -> Vec<&AttachedRule> {
        self.catalog.guarded_rules(model)
    }

    /// The rules whose guards currently apply to `record`.
    pub fn active_rules(&self, record: &dyn Record) -> Vec<&AttachedRule> {
        self.catalog
            .guarded_rules(record.model_name())
            .into_iter()
            .filter(|rule| rule.applies_to(record))
            .collect()
    }

    // ========================================================================
    // Lifecycle entry points
    // ========================================================================

    /// Construction hook: apply the model's default profile, if any.
    pub fn record_initialized(&self, record: &SharedRecord) -> SwitchResult<()> {
        hooks::record_initialized(&self.catalog, record)
    }

    /// Pre-validation hook: re-broadcast the current state down the relation
    /// graph.
    pub fn before_validation(&self, record: &SharedRecord) -> SwitchResult<()> {
        hooks::before_validation(&self.catalog, record)
    }

    /// Relation-load hook: tag a freshly materialized relation with the
    /// owner's profile.
    pub fn relation_loaded(&self, record: &SharedRecord, relation: &str) -> SwitchResult<()> {
        hooks::relation_loaded(&self.catalog, record, relation)
    }
}
