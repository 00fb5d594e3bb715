//! Per-model profile registry.
//!
//! Each model type owns one registry. Derived model types never mutate an
//! ancestor's registry: the catalog hands a derived type its own copy the
//! first time a declaration touches it, while reads fall through the parent
//! chain untouched.

use crate::core::types::ProfileName;
use crate::profile::profile::Profile;
use indexmap::IndexMap;

/// Registry of declared profiles for one model type.
///
/// Maintains declaration order and two invariants: at most one profile is
/// the default, and the default nested-target set is installed at most once.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    /// Profiles keyed by name, in declaration order.
    profiles: IndexMap<ProfileName, Profile>,
    /// Name of the default profile, if one was declared.
    default_profile: Option<ProfileName>,
    /// Model-level default nested targets, if declared.
    default_nested: Option<Vec<String>>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a profile with this name is declared.
    pub fn contains(&self, name: &ProfileName) -> bool {
        self.profiles.contains_key(name)
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &ProfileName) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Insert a profile, or merge it into an existing one with the same
    /// name. Merging accumulates rules; the first declaration wins for the
    /// `default` and `nested` flags. Returns `true` when the name was new.
    pub fn upsert(&mut self, profile: Profile) -> bool {
        match self.profiles.get_mut(&profile.name) {
            Some(existing) => {
                existing.rules.extend(profile.rules);
                false
            }
            None => {
                self.profiles.insert(profile.name.clone(), profile);
                true
            }
        }
    }

    /// Name of the default profile, if any.
    pub fn default_profile(&self) -> Option<&ProfileName> {
        self.default_profile.as_ref()
    }

    /// Install the default profile. The first installation wins: a second
    /// attempt with a different name returns the existing default as the
    /// error value and changes nothing.
    pub(crate) fn try_set_default(&mut self, name: &ProfileName) -> Result<(), ProfileName> {
        match &self.default_profile {
            Some(existing) if existing != name => Err(existing.clone()),
            _ => {
                self.default_profile = Some(name.clone());
                if let Some(profile) = self.profiles.get_mut(name) {
                    profile.default = true;
                }
                Ok(())
            }
        }
    }

    /// Model-level default nested targets, if declared.
    pub fn default_nested(&self) -> Option<&[String]> {
        self.default_nested.as_deref()
    }

    /// Install the default nested-target set. Installed at most once: a
    /// second attempt returns the existing set as the error value and
    /// changes nothing.
    pub(crate) fn try_set_default_nested(
        &mut self,
        targets: Vec<String>,
    ) -> Result<(), Vec<String>> {
        match &self.default_nested {
            Some(existing) => Err(existing.clone()),
            None => {
                self.default_nested = Some(targets);
                Ok(())
            }
        }
    }

    /// Declared profile names, in declaration order.
    pub fn profile_names(&self) -> impl Iterator<Item = &ProfileName> {
        self.profiles.keys()
    }

    /// Number of declared profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profiles are declared.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
