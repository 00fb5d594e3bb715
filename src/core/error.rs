//! Error types for Kavach.
//!
//! Uses thiserror for structured errors with context. Errors are grouped by
//! the phase that raises them: rule capture, profile declaration, and
//! profile switching. All errors are raised synchronously at the point of
//! misuse and are not retried by the engine; callers fix the declaration or
//! the switch argument.

use crate::core::types::ProfileName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for Kavach.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KavachError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Declaration error: {0}")]
    Declare(#[from] DeclareError),

    #[error("Switch error: {0}")]
    Switch(#[from] SwitchError),
}

/// Errors raised while capturing rules into a rule set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureError {
    #[error("`{identifier}` is not a recognized rule declaration")]
    UnknownOperation { identifier: String },
}

/// Errors raised at profile declaration time.
///
/// Declaration errors indicate a configuration mistake; a failed declaration
/// leaves the model's registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclareError {
    #[error("Model `{model}` is not registered")]
    UnknownModel { model: String },

    #[error("Profile name must not be blank")]
    MissingProfileName,

    #[error("Cannot declare a default across multiple profiles: {names:?}")]
    MultipleDefaults { names: Vec<ProfileName> },

    #[error("Default nested targets already declared on `{model}`: {existing:?}")]
    NestedDefaultAlreadyDeclared { model: String, existing: Vec<String> },

    #[error("`{relation}` is not a relation on `{model}`")]
    NotAnAssociation { model: String, relation: String },

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Errors raised when switching an instance's active profile.
///
/// A failed switch leaves the instance's active profile unchanged; the
/// engine validates the requested transition before mutating anything.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwitchError {
    #[error("Model `{model}` is not registered")]
    UnknownModel { model: String },

    #[error("Unknown validation profile `{name}` for `{model}`")]
    UnknownProfile { model: String, name: ProfileName },

    #[error("`{relation}` is not a relation on `{model}`")]
    NotAnAssociation { model: String, relation: String },
}

impl SwitchError {
    /// The model the failed switch was aimed at.
    pub fn model(&self) -> &str {
        match self {
            SwitchError::UnknownModel { model }
            | SwitchError::UnknownProfile { model, .. }
            | SwitchError::NotAnAssociation { model, .. } => model,
        }
    }
}

/// Result type alias for Kavach operations.
pub type KavachResult<T> = Result<T, KavachError>;

/// Result type alias for rule capture.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type alias for profile declaration.
pub type DeclareResult<T> = Result<T, DeclareError>;

/// Result type alias for profile switching.
pub type SwitchResult<T> = Result<T, SwitchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_error_model() {
        let error = SwitchError::UnknownProfile {
            model: "book".to_string(),
            name: ProfileName::new("bogus"),
        };
        assert_eq!(error.model(), "book");
        assert!(format!("{}", error).contains("bogus"));
    }

    #[test]
    fn test_error_conversion() {
        let capture = CaptureError::UnknownOperation {
            identifier: "ensure_present".to_string(),
        };
        let declare: DeclareError = capture.into();
        let top: KavachError = declare.into();
        assert!(matches!(
            top,
            KavachError::Declare(DeclareError::Capture(CaptureError::UnknownOperation { .. }))
        ));
    }
}
