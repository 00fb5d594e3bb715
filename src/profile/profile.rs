//! Profile definitions.

use crate::core::types::ProfileName;
use crate::rules::rule::Rule;
use serde::{Deserialize, Serialize};

/// Nested-propagation targets declared on a profile.
///
/// Names relations whose related instances should receive the owner's
/// profile when it switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestedTargets {
    /// A single relation.
    One(String),
    /// An ordered set of relations.
    Many(Vec<String>),
}

impl NestedTargets {
    /// The target relation names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        match self {
            NestedTargets::One(name) => vec![name.clone()],
            NestedTargets::Many(names) => names.clone(),
        }
    }
}

impl From<&str> for NestedTargets {
    fn from(name: &str) -> Self {
        NestedTargets::One(name.to_string())
    }
}

impl From<Vec<&str>> for NestedTargets {
    fn from(names: Vec<&str>) -> Self {
        NestedTargets::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for NestedTargets {
    fn from(names: Vec<String>) -> Self {
        NestedTargets::Many(names)
    }
}

/// A named, switchable bundle of validation rules.
///
/// A profile may own zero rules: it then exists purely as a name instances
/// can switch to.
#[derive(Debug, Clone)]
pub struct Profile {
    /// The profile's name, unique within its model's registry.
    pub name: ProfileName,
    /// Rules contributed by this profile, in declaration order.
    pub rules: Vec<Rule>,
    /// Whether instances of the model start with this profile active.
    pub default: bool,
    /// Per-profile override of the model-level nested targets.
    ///
    /// `None` means "use the model-level default nested targets".
    pub nested: Option<NestedTargets>,
}

impl Profile {
    /// Create an empty, non-default profile.
    pub fn new(name: impl Into<ProfileName>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            default: false,
            nested: None,
        }
    }
}

/// One level of a nested-default declaration.
///
/// Leaf entries name a relation on the declaring model; deep entries also
/// carry specs that are re-applied to the relation's target model, so one
/// declaration can describe propagation through several levels of the
/// relation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedSpec {
    /// Relation name on the declaring model.
    pub relation: String,
    /// Specs applied recursively to the relation's target model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deeper: Vec<NestedSpec>,
}

impl NestedSpec {
    /// A leaf entry: name the relation, recurse no further.
    pub fn leaf(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            deeper: Vec::new(),
        }
    }

    /// A deep entry: name the relation and the specs to apply to its target
    /// model.
    pub fn deep(relation: impl Into<String>, deeper: Vec<NestedSpec>) -> Self {
        Self {
            relation: relation.into(),
            deeper,
        }
    }
}
