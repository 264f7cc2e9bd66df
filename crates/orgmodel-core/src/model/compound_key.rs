//! Compound primary keys of association entities

use crate::errors::Result;

/// An association identified by the identities of the entities it links.
///
/// The key is an explicit value held by the association. It starts absent and
/// is filled by [`CompoundKeyed::synchronize_key_values`], which the store runs
/// immediately before the association is first stored. Afterwards every key
/// component equals the identity of the referenced entity.
///
/// Texts within a `TextSuite` follow the same contract but take the suite's
/// identity as an argument, since they do not hold a reference to their suite.
pub trait CompoundKeyed {
    type Key: Ord + Clone + std::fmt::Debug;

    /// The synchronized key, if synchronization has run.
    fn key(&self) -> Option<&Self::Key>;

    /// Copy the referenced identities into the key, creating it if absent.
    ///
    /// # Errors
    ///
    /// [`crate::errors::OrgError::UnassignedIdentity`] naming the referenced
    /// entity that has not been persisted.
    fn synchronize_key_values(&mut self) -> Result<Self::Key>;
}
