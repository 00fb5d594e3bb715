//! Captured rule declarations.

use crate::core::record::Record;
use crate::core::types::Value;
use crate::rules::guard::Guard;

/// A single captured validation-rule declaration.
///
/// Immutable once captured. The engine never interprets the identifier or
/// arguments; it carries them verbatim for the host's validation mechanism.
/// A rule may carry its own pre-existing conditional guard, kept as an
/// explicit field rather than buried in the argument list.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Rule identifier, e.g. `validates_presence_of`.
    pub identifier: String,
    /// Ordered arguments as declared.
    pub arguments: Vec<Value>,
    /// Pre-existing conditional carried by the declaration, if any.
    pub guard: Option<Guard>,
}

impl Rule {
    /// Create an unguarded rule.
    pub fn new(identifier: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            identifier: identifier.into(),
            arguments,
            guard: None,
        }
    }

    /// Attach a pre-existing conditional to the rule.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// A rule after conditional attachment.
///
/// Carries the original declaration plus exactly one composed guard: the
/// rule's own conditional (if any) ANDed with the profile-membership test.
#[derive(Debug, Clone)]
pub struct AttachedRule {
    /// Rule identifier, unchanged from the captured declaration.
    pub identifier: String,
    /// Ordered arguments, unchanged from the captured declaration.
    pub arguments: Vec<Value>,
    /// The composed guard.
    pub guard: Guard,
}

impl AttachedRule {
    /// Whether this rule currently applies to `record`.
    pub fn applies_to(&self, record: &dyn Record) -> bool {
        self.guard.evaluate(record)
    }
}
