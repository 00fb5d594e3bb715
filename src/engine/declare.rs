//! Profile declaration.
//!
//! A declaration runs in two phases: validation (nothing mutated, so a bad
//! declaration leaves the registry untouched) and registration (profiles
//! upserted, guarded rules attached, default bookkeeping). The tolerated
//! conflicts — re-declared names and a second default — are resolved here:
//! rules accumulate, the first default wins with a logged warning.

use crate::core::error::{DeclareError, DeclareResult};
use crate::core::types::ProfileName;
use crate::engine::attacher::{self, AttachProxy};
use crate::engine::catalog::ModelCatalog;
use crate::profile::profile::{NestedSpec, NestedTargets, Profile};
use crate::rules::capture::RuleSet;
use crate::rules::guard::Guard;
use crate::rules::rule::{AttachedRule, Rule};

/// Builder for a profile declaration.
///
/// Created by [`ProfileEngine::declare_profile`]; nothing happens until
/// [`apply`](Self::apply) runs.
///
/// [`ProfileEngine::declare_profile`]: crate::engine::ProfileEngine::declare_profile
pub struct ProfileDeclaration<'a> {
    catalog: &'a mut ModelCatalog,
    model: String,
    names: Vec<ProfileName>,
    rules: Option<RuleSet>,
    default: bool,
    nested: Option<NestedTargets>,
    builder: Option<Box<dyn FnOnce(&mut AttachProxy) + 'a>>,
}

impl<'a> ProfileDeclaration<'a> {
    pub(crate) fn new(
        catalog: &'a mut ModelCatalog,
        model: impl Into<String>,
        name: impl Into<ProfileName>,
    ) -> Self {
        Self {
            catalog,
            model: model.into(),
            names: vec![name.into()],
            rules: None,
            default: false,
            nested: None,
            builder: None,
        }
    }

    /// Declare the same rules under an additional name.
    pub fn also_named(mut self, name: impl Into<ProfileName>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Attach the rules captured in a rule set.
    pub fn rules(mut self, source: &RuleSet) -> Self {
        match &mut self.rules {
            Some(existing) => existing.merge(source),
            None => self.rules = Some(source.clone()),
        }
        self
    }

    /// Make this the model's default profile, applied at construction.
    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Override the model-level nested targets for this profile.
    pub fn nested(mut self, targets: impl Into<NestedTargets>) -> Self {
        self.nested = Some(targets.into());
        self
    }

    /// Declare additional rules inline through an [`AttachProxy`].
    pub fn define<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&mut AttachProxy) + 'a,
    {
        self.builder = Some(Box::new(block));
        self
    }

    /// Validate and register the declaration.
    pub fn apply(self) -> DeclareResult<()> {
        let Self {
            catalog,
            model,
            names,
            rules,
            default,
            nested,
            builder,
        } = self;

        // Validation phase.
        if !catalog.contains(&model) {
            return Err(DeclareError::UnknownModel { model });
        }
        if names.iter().any(ProfileName::is_blank) {
            return Err(DeclareError::MissingProfileName);
        }
        if default && names.len() > 1 {
            return Err(DeclareError::MultipleDefaults { names });
        }

        let membership = Guard::profile_in(names.iter().cloned());
        let mut captured: Vec<Rule> = Vec::new();
        let mut attached: Vec<AttachedRule> = Vec::new();

        if let Some(source) = &rules {
            for rule in source.rules() {
                captured.push(rule.clone());
                attached.push(attacher::compose(rule, &membership));
            }
        }
        if let Some(block) = builder {
            let mut proxy = AttachProxy::new(membership);
            block(&mut proxy);
            let (extra_captured, extra_attached) = proxy.finish()?;
            captured.extend(extra_captured);
            attached.extend(extra_attached);
        }

        // Registration phase.
        let registry = catalog
            .registry_mut(&model)
            .ok_or_else(|| DeclareError::UnknownModel {
                model: model.clone(),
            })?;

        for name in &names {
            let profile = Profile {
                name: name.clone(),
                rules: captured.clone(),
                default: false,
                nested: nested.clone(),
            };
            if !registry.upsert(profile) {
                log::debug!("profile `{}` on `{}` re-declared, rules merged", name, model);
            }
        }

        if default {
            if let Err(existing) = registry.try_set_default(&names[0]) {
                log::warn!(
                    "profile `{}` is already the default on `{}`; keeping it",
                    existing,
                    model
                );
            }
        }

        catalog.append_attached(&model, attached);
        Ok(())
    }
}

/// Attach a rule set's rules directly to a model, outside any profile.
///
/// The rules keep whatever conditionals they already carry; rules without
/// one run unconditionally.
pub(crate) fn apply_rule_set(
    catalog: &mut ModelCatalog,
    model: &str,
    rules: &RuleSet,
) -> DeclareResult<()> {
    if !catalog.contains(model) {
        return Err(DeclareError::UnknownModel {
            model: model.to_string(),
        });
    }

    let always = Guard::always();
    let attached = rules
        .rules()
        .iter()
        .map(|rule| attacher::compose(rule, &always))
        .collect();
    catalog.append_attached(model, attached);
    Ok(())
}

/// Install a model-level default nested-target set, recursing into target
/// models for deep entries.
pub(crate) fn declare_nested_default(
    catalog: &mut ModelCatalog,
    model: &str,
    specs: &[NestedSpec],
) -> DeclareResult<()> {
    if !catalog.contains(model) {
        return Err(DeclareError::UnknownModel {
            model: model.to_string(),
        });
    }

    // Resolve every relation before mutating anything at this level.
    let mut names = Vec::new();
    let mut deep = Vec::new();
    for spec in specs {
        let relation = catalog.relation(model, &spec.relation).ok_or_else(|| {
            DeclareError::NotAnAssociation {
                model: model.to_string(),
                relation: spec.relation.clone(),
            }
        })?;
        names.push(spec.relation.clone());
        if !spec.deeper.is_empty() {
            deep.push((relation.target.clone(), spec.deeper.clone()));
        }
    }

    if !names.is_empty() {
        let registry = catalog
            .registry_mut(model)
            .ok_or_else(|| DeclareError::UnknownModel {
                model: model.to_string(),
            })?;
        registry
            .try_set_default_nested(names)
            .map_err(|existing| DeclareError::NestedDefaultAlreadyDeclared {
                model: model.to_string(),
                existing,
            })?;
    }

    for (target, deeper) in deep {
        declare_nested_default(catalog, &target, &deeper)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CaptureError;
    use crate::core::types::Value;
    use crate::engine::catalog::ModelDef;
    use crate::engine::ProfileEngine;

    fn presence_rules(field: &str) -> RuleSet {
        let mut rules = RuleSet::new();
        rules
            .declare("validates_presence_of", vec![Value::symbol(field)])
            .unwrap();
        rules
    }

    #[test]
    fn test_declaration_registers_profile() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        engine
            .declare_profile("book", "soft")
            .rules(&presence_rules("name"))
            .apply()
            .unwrap();

        assert!(engine.has_profile("book", "soft"));
        assert!(!engine.has_profile("book", "hard"));
        assert_eq!(engine.guarded_rules("book").len(), 1);
    }

    #[test]
    fn test_multi_name_declaration() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        engine
            .declare_profile("book", "soft")
            .also_named("draft")
            .rules(&presence_rules("name"))
            .apply()
            .unwrap();

        assert!(engine.has_profile("book", "soft"));
        assert!(engine.has_profile("book", "draft"));
        // One attachment serves both names through the membership guard.
        assert_eq!(engine.guarded_rules("book").len(), 1);
    }

    #[test]
    fn test_name_only_profile_is_allowed() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        engine.declare_profile("book", "none_at_all").apply().unwrap();
        assert!(engine.has_profile("book", "none_at_all"));
        assert!(engine.guarded_rules("book").is_empty());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        let result = engine.declare_profile("book", "  ").apply();
        assert_eq!(result, Err(DeclareError::MissingProfileName));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let mut engine = ProfileEngine::new();
        let result = engine.declare_profile("ghost", "soft").apply();
        assert_eq!(
            result,
            Err(DeclareError::UnknownModel {
                model: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_default_across_multiple_names_is_rejected() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        let result = engine
            .declare_profile("book", "soft")
            .also_named("hard")
            .default(true)
            .apply();

        assert_eq!(
            result,
            Err(DeclareError::MultipleDefaults {
                names: vec!["soft".into(), "hard".into()]
            })
        );
        // The failed declaration registered nothing.
        assert!(!engine.has_profile("book", "soft"));
    }

    #[test]
    fn test_second_default_keeps_first_and_warns() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        engine
            .declare_profile("book", "soft")
            .default(true)
            .apply()
            .unwrap();
        engine
            .declare_profile("book", "hard")
            .default(true)
            .apply()
            .unwrap();

        let registry = engine.catalog().effective_registry("book").unwrap();
        assert_eq!(registry.default_profile(), Some(&"soft".into()));
    }

    #[test]
    fn test_redeclared_profile_accumulates_rules() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        engine
            .declare_profile("book", "soft")
            .rules(&presence_rules("name"))
            .apply()
            .unwrap();
        engine
            .declare_profile("book", "soft")
            .rules(&presence_rules("author"))
            .apply()
            .unwrap();

        let registry = engine.catalog().effective_registry("book").unwrap();
        let profile = registry.get(&"soft".into()).unwrap();
        assert_eq!(profile.rules.len(), 2);
        assert_eq!(engine.guarded_rules("book").len(), 2);
    }

    #[test]
    fn test_inline_block_capture_error_aborts() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("book"));

        let result = engine
            .declare_profile("book", "soft")
            .define(|v| {
                v.rule("ensure_present", vec![Value::symbol("name")]);
            })
            .apply();

        assert_eq!(
            result,
            Err(DeclareError::Capture(CaptureError::UnknownOperation {
                identifier: "ensure_present".to_string()
            }))
        );
        assert!(!engine.has_profile("book", "soft"));
    }

    #[test]
    fn test_nested_default_cannot_be_redeclared() {
        let mut engine = ProfileEngine::new();
        engine.register_model(
            ModelDef::new("author")
                .relation_many("articles", "article")
                .relation_many("reviews", "review"),
        );
        engine.register_model(ModelDef::new("article"));
        engine.register_model(ModelDef::new("review"));

        engine
            .declare_nested_default("author", &[NestedSpec::leaf("articles")])
            .unwrap();
        let result = engine.declare_nested_default("author", &[NestedSpec::leaf("reviews")]);

        assert_eq!(
            result,
            Err(DeclareError::NestedDefaultAlreadyDeclared {
                model: "author".to_string(),
                existing: vec!["articles".to_string()],
            })
        );
    }

    #[test]
    fn test_nested_default_rejects_unknown_relation() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("author"));

        let result = engine.declare_nested_default("author", &[NestedSpec::leaf("ghosts")]);
        assert_eq!(
            result,
            Err(DeclareError::NotAnAssociation {
                model: "author".to_string(),
                relation: "ghosts".to_string(),
            })
        );
    }

    #[test]
    fn test_deep_nested_default_recurses_into_target_models() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("author").relation_many("articles", "article"));
        engine.register_model(ModelDef::new("article").relation_many("comments", "comment"));
        engine.register_model(ModelDef::new("comment"));

        engine
            .declare_nested_default(
                "author",
                &[NestedSpec::deep("articles", vec![NestedSpec::leaf("comments")])],
            )
            .unwrap();

        let catalog = engine.catalog();
        let author = catalog.effective_registry("author").unwrap();
        assert_eq!(author.default_nested(), Some(&["articles".to_string()][..]));
        let article = catalog.effective_registry("article").unwrap();
        assert_eq!(article.default_nested(), Some(&["comments".to_string()][..]));
    }
}
