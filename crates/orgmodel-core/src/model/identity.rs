use serde::{Deserialize, Serialize};

use crate::errors::{OrgError, Result};

/// Surrogate identity of a stored entity
///
/// Entities are created `Unassigned`; the owning `Store` draws the value from
/// the entity's sequence when it is first persisted. An assigned identity never
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Identity {
    #[default]
    Unassigned,
    Assigned(i64),
}

impl Identity {
    pub fn id(&self) -> Option<i64> {
        match self {
            Identity::Unassigned => None,
            Identity::Assigned(id) => Some(*id),
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Identity::Assigned(_))
    }

    /// Return the id, or fail naming the entity that was not persisted.
    ///
    /// # Errors
    ///
    /// [`OrgError::UnassignedIdentity`] if no id has been assigned.
    pub fn require(&self, entity: &'static str) -> Result<i64> {
        self.id().ok_or(OrgError::UnassignedIdentity { entity })
    }

    /// Assign an id. Only the first assignment succeeds.
    ///
    /// # Errors
    ///
    /// [`OrgError::IdentityAlreadyAssigned`] if the identity already holds a value.
    pub(crate) fn assign(&mut self, id: i64, entity: &'static str) -> Result<()> {
        match self {
            Identity::Assigned(existing) => Err(OrgError::IdentityAlreadyAssigned {
                entity,
                id: *existing,
            }),
            Identity::Unassigned => {
                *self = Identity::Assigned(id);
                Ok(())
            }
        }
    }

    /// Value used where an ordering needs a number for unpersisted entities.
    pub fn sort_value(&self) -> i64 {
        self.id().unwrap_or(0)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Unassigned => write!(f, "<unassigned>"),
            Identity::Assigned(id) => write!(f, "{}", id),
        }
    }
}
