//! Conditional rule attachment.
//!
//! Every rule that reaches a model through a profile declaration is rewired
//! with a guard: the profile-membership test, ANDed with whatever conditional
//! the rule already carried. The [`AttachProxy`] exposes the same guarded
//! attachment to inline declaration blocks.

use crate::core::error::CaptureResult;
use crate::core::types::Value;
use crate::rules::capture::{check_identifier, RuleSet};
use crate::rules::guard::Guard;
use crate::rules::rule::{AttachedRule, Rule};

/// Compose a captured rule with a membership guard.
///
/// The rule's own guard, when present, is evaluated first and short-circuits
/// the membership test.
pub(crate) fn compose(rule: &Rule, membership: &Guard) -> AttachedRule {
    let guard = match &rule.guard {
        Some(own) => own.clone().and(membership.clone()),
        None => membership.clone(),
    };
    AttachedRule {
        identifier: rule.identifier.clone(),
        arguments: rule.arguments.clone(),
        guard,
    }
}

/// Guarded-attachment proxy handed to inline declaration blocks.
///
/// Declarations made through the proxy go through the same identifier
/// recognition and guard composition as a rule set attached up front. Errors
/// are deferred: the block keeps a fluent surface, and the first capture
/// error aborts the whole declaration when the block finishes.
pub struct AttachProxy {
    membership: Guard,
    captured: Vec<Rule>,
    error: Option<crate::core::error::CaptureError>,
}

impl AttachProxy {
    pub(crate) fn new(membership: Guard) -> Self {
        Self {
            membership,
            captured: Vec::new(),
            error: None,
        }
    }

    /// Declare a rule through the profile's guard.
    pub fn rule(&mut self, identifier: impl Into<String>, arguments: Vec<Value>) -> &mut Self {
        self.push(Rule::new(identifier, arguments));
        self
    }

    /// Declare a rule carrying its own conditional; the profile guard is
    /// composed on top.
    pub fn rule_guarded(
        &mut self,
        identifier: impl Into<String>,
        arguments: Vec<Value>,
        guard: Guard,
    ) -> &mut Self {
        self.push(Rule::new(identifier, arguments).with_guard(guard));
        self
    }

    /// Attach every rule from a rule set through the profile's guard.
    pub fn include(&mut self, rules: &RuleSet) -> &mut Self {
        for rule in rules.rules() {
            self.captured.push(rule.clone());
        }
        self
    }

    fn push(&mut self, rule: Rule) {
        if self.error.is_some() {
            return;
        }
        match check_identifier(rule.identifier.clone()) {
            Ok(_) => self.captured.push(rule),
            Err(error) => self.error = Some(error),
        }
    }

    /// The captured rules, or the first capture error.
    pub(crate) fn finish(self) -> CaptureResult<(Vec<Rule>, Vec<AttachedRule>)> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let attached = self
            .captured
            .iter()
            .map(|rule| compose(rule, &self.membership))
            .collect();
        Ok((self.captured, attached))
    }
}
