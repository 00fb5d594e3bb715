//! Rule capture into reusable rule sets.
//!
//! A [`RuleSet`] is the engine's stand-in for a validation module: rule
//! declarations are captured in order without being interpreted, then
//! attached to models through a profile declaration (guarded) or directly
//! (unguarded). Capture recognizes declarations by naming pattern; anything
//! else fails immediately instead of passing through silently.

use crate::core::error::{CaptureError, CaptureResult};
use crate::core::types::Value;
use crate::rules::guard::Guard;
use crate::rules::rule::Rule;

/// Naming pattern a rule-declaration identifier must match.
const RULE_PREFIX: &str = "validates";

/// Whether an identifier is a recognized rule declaration.
pub fn recognized(identifier: &str) -> bool {
    identifier.starts_with(RULE_PREFIX)
}

pub(crate) fn check_identifier(identifier: String) -> CaptureResult<String> {
    if recognized(&identifier) {
        Ok(identifier)
    } else {
        Err(CaptureError::UnknownOperation { identifier })
    }
}

/// An ordered, reusable set of captured rules.
///
/// Rule sets compose: merging one set into another concatenates the captured
/// rules, so shared rule modules can be assembled before being attached to a
/// model.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a rule declaration.
    ///
    /// The identifier must match the `validates` naming pattern; any other
    /// identifier fails with [`CaptureError::UnknownOperation`].
    pub fn declare(
        &mut self,
        identifier: impl Into<String>,
        arguments: Vec<Value>,
    ) -> CaptureResult<&mut Self> {
        let identifier = check_identifier(identifier.into())?;
        self.rules.push(Rule::new(identifier, arguments));
        Ok(self)
    }

    /// Capture a rule declaration carrying a pre-existing conditional.
    pub fn declare_guarded(
        &mut self,
        identifier: impl Into<String>,
        arguments: Vec<Value>,
        guard: Guard,
    ) -> CaptureResult<&mut Self> {
        let identifier = check_identifier(identifier.into())?;
        self.rules.push(Rule::new(identifier, arguments).with_guard(guard));
        Ok(self)
    }

    /// Concatenate another set's rules into this one.
    pub fn merge(&mut self, other: &RuleSet) {
        self.rules.extend(other.rules.iter().cloned());
    }

    /// The captured rules, in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of captured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules have been captured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
