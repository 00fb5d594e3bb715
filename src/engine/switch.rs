//! The profile switch state machine.
//!
//! An instance's validation state is a single slot: the active profile name,
//! or nothing. `switch_to` validates the requested transition against the
//! model's registry and reflection before mutating anything, then cascades
//! the new name through the instance's nested targets. `clear_profile` is
//! terminal and per-instance: it never cascades.

use crate::core::error::{SwitchError, SwitchResult};
use crate::core::record::SharedRecord;
use crate::core::types::{ProfileName, RecordId};
use crate::engine::catalog::ModelCatalog;
use crate::profile::registry::ProfileRegistry;
use std::collections::HashSet;

/// Resolve the nested targets a profile propagates through: the profile's
/// own override when present, else the model-level default.
pub(crate) fn effective_nested(
    registry: &ProfileRegistry,
    profile: &ProfileName,
) -> Option<Vec<String>> {
    let declared = registry.get(profile).and_then(|p| p.nested.clone());
    match declared {
        Some(targets) => Some(targets.names()),
        None => registry.default_nested().map(<[String]>::to_vec),
    }
}

/// Switch the record's active profile and cascade through its currently
/// materialized nested targets.
pub(crate) fn switch_to(
    catalog: &ModelCatalog,
    record: &SharedRecord,
    name: &ProfileName,
) -> SwitchResult<()> {
    let mut visited = HashSet::new();
    switch_inner(catalog, record, name, &mut visited)
}

/// Clear the record's active profile. Does not cascade: opting out of
/// validation is a per-instance choice, not a broadcast.
pub(crate) fn clear_profile(record: &SharedRecord) {
    record.borrow_mut().set_active_profile(None);
}

fn switch_inner(
    catalog: &ModelCatalog,
    record: &SharedRecord,
    name: &ProfileName,
    visited: &mut HashSet<RecordId>,
) -> SwitchResult<()> {
    // Read phase: validate the transition and collect cascade targets
    // before mutating, so a failed switch leaves the record untouched.
    let (id, children) = {
        let instance = record.borrow();
        let model = instance.model_name();

        if !catalog.contains(model) {
            return Err(SwitchError::UnknownModel {
                model: model.to_string(),
            });
        }
        let registry = catalog
            .effective_registry(model)
            .filter(|registry| registry.contains(name))
            .ok_or_else(|| SwitchError::UnknownProfile {
                model: model.to_string(),
                name: name.clone(),
            })?;

        let mut children = Vec::new();
        if let Some(targets) = effective_nested(registry, name) {
            for target in &targets {
                if catalog.relation(model, target).is_none() {
                    return Err(SwitchError::NotAnAssociation {
                        model: model.to_string(),
                        relation: target.clone(),
                    });
                }
                // Unloaded relations on persisted instances stay untouched;
                // a load would be forced just to re-tag records the
                // relation-load hook will tag anyway.
                if let Some(state) = instance.relation_target(target) {
                    children.extend(state.records());
                }
            }
        }

        (instance.record_id(), children)
    };

    // A record reached twice in one cascade is already being switched;
    // cyclic graphs terminate here.
    if !visited.insert(id) {
        return Ok(());
    }

    record.borrow_mut().set_active_profile(Some(name.clone()));
    log::trace!("record {} switched to profile `{}`", id, name);

    for child in children {
        switch_inner(catalog, &child, name, visited)?;
    }
    Ok(())
}
