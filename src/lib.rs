//! # Kavach - Switchable Validation Profiles
//!
//! Kavach lets a data model declare multiple named bundles of validation
//! rules ("profiles") and switch which bundle is active on a per-instance
//! basis at runtime, cascading the active profile through in-memory relation
//! graphs.
//!
//! ## Features
//!
//! - **Profile Registry**: Named, per-model profile declarations with
//!   default-profile resolution and copy-on-write registry inheritance
//! - **Conditional Attachment**: Every rule a profile contributes is guarded
//!   by a profile-membership predicate, composed with any conditional the
//!   rule already carried
//! - **Cascading Switches**: Switching an instance propagates the new
//!   profile through its nested targets, singular and plural, skipping
//!   relations a persisted record has not materialized
//! - **Lifecycle Entry Points**: Construction applies the default profile,
//!   validation re-broadcasts the current one, and lazy loads tag freshly
//!   materialized subtrees
//! - **Host-agnostic**: The engine reaches records only through the
//!   [`Record`] contract; rule identifiers and arguments are carried verbatim
//!   for the host's validation mechanism
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kavach::prelude::*;
//!
//! // Describe the schema the engine reflects over.
//! let mut engine = ProfileEngine::new();
//! engine.register_model(ModelDef::new("author").relation_many("articles", "article"));
//! engine.register_model(ModelDef::new("article"));
//!
//! // Declare a profile with rules, cascading into `articles`.
//! let mut soft = RuleSet::new();
//! soft.declare("validates_presence_of", vec![Value::symbol("name")])?;
//! engine
//!     .declare_profile("author", "soft")
//!     .rules(&soft)
//!     .nested("articles")
//!     .apply()?;
//! engine.declare_profile("article", "soft").apply()?;
//!
//! // Switch an instance; loaded articles follow.
//! let author = MemoryRecord::create(&engine, "author")?;
//! engine.switch_to(&shared(&author), "soft")?;
//!
//! // Only rules guarded by the active profile apply.
//! let failures = MemoryRecord::validate(&engine, &author)?;
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`core`]: Core types, the embedding contract, and error handling
//! - [`rules`]: Rule capture, guard predicates, and captured-rule types
//! - [`profile`]: Profile definitions and the per-model registry
//! - [`engine`]: Declaration, conditional attachment, switching, lifecycle
//! - [`host`]: A reference in-memory host implementing the contract
//!
//! ## Embedding
//!
//! Implement the [`Record`] trait on the host's instance type and invoke the
//! engine's lifecycle entry points from the host's own interception
//! machinery:
//!
//! ```rust,ignore
//! use kavach::prelude::*;
//!
//! // construction           -> engine.record_initialized(&record)?;
//! // before each validation -> engine.before_validation(&record)?;
//! // relation lazy-load     -> engine.relation_loaded(&record, "articles")?;
//! ```
//!
//! [`Record`]: crate::core::record::Record

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod engine;
pub mod host;
pub mod profile;
pub mod rules;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use kavach::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{ProfileName, RecordId, RelationKind, Value};

    // Embedding contract
    pub use crate::core::record::{Record, RelationTarget, SharedRecord};

    // Errors
    pub use crate::core::error::{
        CaptureError, DeclareError, KavachError, KavachResult, SwitchError,
    };

    // Rules
    pub use crate::rules::capture::RuleSet;
    pub use crate::rules::guard::Guard;
    pub use crate::rules::rule::{AttachedRule, Rule};

    // Profiles
    pub use crate::profile::profile::{NestedSpec, NestedTargets, Profile};
    pub use crate::profile::registry::ProfileRegistry;

    // Engine
    pub use crate::engine::attacher::AttachProxy;
    pub use crate::engine::catalog::{ModelCatalog, ModelDef, RelationDef};
    pub use crate::engine::declare::ProfileDeclaration;
    pub use crate::engine::ProfileEngine;

    // Memory host
    pub use crate::host::memory::{shared, Failure, MemoryHandle, MemoryRecord};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "kavach");
    }

    #[test]
    fn test_declare_and_switch_round_trip() {
        let mut engine = ProfileEngine::new();
        engine.register_model(ModelDef::new("note"));
        engine.declare_profile("note", "draft").apply().unwrap();

        let note = MemoryRecord::create(&engine, "note").unwrap();
        assert_eq!(note.borrow().active_profile(), None);

        engine.switch_to(&shared(&note), "draft").unwrap();
        assert_eq!(note.borrow().active_profile(), Some("draft".into()));

        engine.clear_profile(&shared(&note));
        assert_eq!(note.borrow().active_profile(), None);
    }
}
