//! Lifecycle entry points.
//!
//! The engine does not patch itself into a host's object model; the host
//! invokes these entry points from its own interception machinery:
//!
//! - instance construction -> [`record_initialized`]: apply the model's
//!   default profile,
//! - before each validation pass -> [`before_validation`]: re-broadcast the
//!   current profile so relations materialized since the last explicit
//!   switch are brought in line,
//! - relation lazy-load completion -> [`relation_loaded`]: tag freshly
//!   materialized records with the owner's profile.

use crate::core::error::SwitchResult;
use crate::core::record::SharedRecord;
use crate::engine::catalog::ModelCatalog;
use crate::engine::switch;

/// Construction hook: start the record on its model's default profile.
///
/// A full switch, so construction-time relation graphs are tagged along
/// with the new record. A model without a default leaves the record with no
/// active profile.
pub(crate) fn record_initialized(
    catalog: &ModelCatalog,
    record: &SharedRecord,
) -> SwitchResult<()> {
    let default = {
        let instance = record.borrow();
        catalog
            .effective_registry(instance.model_name())
            .and_then(|registry| registry.default_profile().cloned())
    };

    match default {
        Some(name) => switch::switch_to(catalog, record, &name),
        None => Ok(()),
    }
}

/// Pre-validation hook: re-issue the current state down the relation graph.
///
/// Catches relations materialized after the last explicit switch, e.g.
/// assigned between the switch and the validation pass.
pub(crate) fn before_validation(catalog: &ModelCatalog, record: &SharedRecord) -> SwitchResult<()> {
    let active = record.borrow().active_profile();
    match active {
        Some(name) => switch::switch_to(catalog, record, &name),
        None => {
            switch::clear_profile(record);
            Ok(())
        }
    }
}

/// Relation-load hook: tag a freshly materialized relation.
///
/// Fires after the host finishes loading `relation` on `record`. When the
/// owner has an active profile and the relation is among its effective
/// nested targets, every newly loaded record receives a full recursive
/// switch, so a lazily loaded subtree comes up consistent in one step.
pub(crate) fn relation_loaded(
    catalog: &ModelCatalog,
    record: &SharedRecord,
    relation: &str,
) -> SwitchResult<()> {
    let (active, children) = {
        let instance = record.borrow();
        let Some(active) = instance.active_profile() else {
            return Ok(());
        };
        let Some(registry) = catalog.effective_registry(instance.model_name()) else {
            return Ok(());
        };
        let Some(targets) = switch::effective_nested(registry, &active) else {
            return Ok(());
        };
        if !targets.iter().any(|target| target == relation) {
            return Ok(());
        }

        let children = instance
            .relation_target(relation)
            .map(|state| state.records())
            .unwrap_or_default();
        (active, children)
    };

    for child in children {
        switch::switch_to(catalog, &child, &active)?;
    }
    Ok(())
}
