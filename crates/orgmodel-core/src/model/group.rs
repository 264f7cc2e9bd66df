//! Groups, guilds and the memberships within them
//!
//! A guild is a group with [`GroupKind::Guild`]; a guild membership is a group
//! membership with [`GroupMembershipKind::Guild`].

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::{OrgError, Result};
use crate::model::compound_key::CompoundKeyed;
use crate::model::identity::Identity;
use crate::model::membership::Membership;
use crate::model::ordering::{compare_named_descriptions, NamedDescription, NaturalOrder, Organisational};
use crate::model::organisation::Organisation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Plain,
    Guild {
        quenya_name: String,
        quenya_prefix: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
    pub email_list: Option<String>,
    pub organisation: Arc<Organisation>,
    parent: Option<Arc<Group>>,
    kind: GroupKind,
}

impl Group {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        organisation: Arc<Organisation>,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            description: description.into(),
            email_list: None,
            organisation,
            parent: None,
            kind: GroupKind::Plain,
        }
    }

    /// A top-level guild.
    pub fn guild(
        name: impl Into<String>,
        description: impl Into<String>,
        organisation: Arc<Organisation>,
        quenya_name: impl Into<String>,
        quenya_prefix: impl Into<String>,
    ) -> Self {
        Self {
            kind: GroupKind::Guild {
                quenya_name: quenya_name.into(),
                quenya_prefix: quenya_prefix.into(),
            },
            ..Self::new(name, description, organisation)
        }
    }

    /// Attach this group below `parent`.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if this group is a guild; guilds are always
    /// top-level.
    pub fn with_parent(mut self, parent: Arc<Group>) -> Result<Self> {
        if self.is_guild() {
            return Err(OrgError::invalid_input(format!(
                "guild [{}] cannot have a parent group",
                self.name
            )));
        }
        self.parent = Some(parent);
        Ok(self)
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn parent(&self) -> Option<&Arc<Group>> {
        self.parent.as_ref()
    }

    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    pub fn is_guild(&self) -> bool {
        matches!(self.kind, GroupKind::Guild { .. })
    }
}

impl NamedDescription for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Organisational for Group {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for Group {
    /// Top-level groups first, then organisation, then name.
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.parent
            .is_some()
            .cmp(&other.parent.is_some())
            .then_with(|| self.organisation.natural_cmp(&other.organisation))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Role a member holds within a guild, e.g. master or apprentice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMembershipType {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
}

impl GuildMembershipType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NamedDescription for GuildMembershipType {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl NaturalOrder for GuildMembershipType {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        compare_named_descriptions(self, other)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupMembershipKind {
    Plain,
    Guild {
        membership_type: Arc<GuildMembershipType>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupMembershipKey {
    pub group_id: i64,
    pub membership_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMembership {
    key: Option<GroupMembershipKey>,
    pub group: Arc<Group>,
    pub membership: Arc<Membership>,
    pub joined: DateTime<Utc>,
    kind: GroupMembershipKind,
}

impl GroupMembership {
    pub fn new(group: Arc<Group>, membership: Arc<Membership>, joined: DateTime<Utc>) -> Self {
        Self {
            key: None,
            group,
            membership,
            joined,
            kind: GroupMembershipKind::Plain,
        }
    }

    /// Membership in a guild with the given role.
    ///
    /// # Errors
    ///
    /// [`OrgError::NotAGuild`] if `group` is a plain group.
    pub fn guild(
        group: Arc<Group>,
        membership: Arc<Membership>,
        joined: DateTime<Utc>,
        membership_type: Arc<GuildMembershipType>,
    ) -> Result<Self> {
        if !group.is_guild() {
            return Err(OrgError::NotAGuild {
                group: group.name.clone(),
            });
        }
        Ok(Self {
            kind: GroupMembershipKind::Guild { membership_type },
            ..Self::new(group, membership, joined)
        })
    }

    pub fn kind(&self) -> &GroupMembershipKind {
        &self.kind
    }

    pub fn guild_membership_type(&self) -> Option<&Arc<GuildMembershipType>> {
        match &self.kind {
            GroupMembershipKind::Guild { membership_type } => Some(membership_type),
            GroupMembershipKind::Plain => None,
        }
    }
}

impl CompoundKeyed for GroupMembership {
    type Key = GroupMembershipKey;

    fn key(&self) -> Option<&GroupMembershipKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<GroupMembershipKey> {
        let key = GroupMembershipKey {
            group_id: self.group.id.require("Group")?,
            membership_id: self.membership.id.require("Membership")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl NaturalOrder for GroupMembership {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.group
            .natural_cmp(&other.group)
            .then_with(|| self.membership.natural_cmp(&other.membership))
            .then_with(|| self.joined.cmp(&other.joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Address;
    use crate::model::user::InternalUser;
    use chrono::TimeZone;

    fn org() -> Arc<Organisation> {
        Arc::new(Organisation::new("Mithlond", "mithlond.se", Address::default()))
    }

    fn member(org: Arc<Organisation>) -> Arc<Membership> {
        let user = Arc::new(InternalUser::new("Bilbo", "Baggins", Address::default()));
        Arc::new(Membership::new("Bilbo", user, org))
    }

    fn joined() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_guild_cannot_have_parent() {
        let o = org();
        let parent = Arc::new(Group::new("Council", "", o.clone()));
        let guild = Group::guild("Smiths", "Smithing", o.clone(), "Aulendili", "aul");

        assert!(matches!(
            guild.with_parent(parent.clone()),
            Err(OrgError::InvalidInput { .. })
        ));
        let child = Group::new("Subcouncil", "", o).with_parent(parent).unwrap();
        assert!(child.parent().is_some());
    }

    #[test]
    fn test_guild_membership_requires_guild() {
        let o = org();
        let plain = Arc::new(Group::new("Council", "", o.clone()));
        let role = Arc::new(GuildMembershipType::new("Master", "Guild master"));

        let err = GroupMembership::guild(plain, member(o.clone()), joined(), role.clone()).unwrap_err();
        assert_eq!(
            err,
            OrgError::NotAGuild {
                group: "Council".to_string()
            }
        );

        let guild = Arc::new(Group::guild("Smiths", "", o.clone(), "Aulendili", "aul"));
        let gm = GroupMembership::guild(guild, member(o), joined(), role).unwrap();
        assert_eq!(gm.guild_membership_type().map(|t| t.name.as_str()), Some("Master"));
    }

    #[test]
    fn test_top_level_groups_sort_first() {
        let o = org();
        let top = Arc::new(Group::new("Zeta", "", o.clone()));
        let child = Group::new("Alpha", "", o.clone()).with_parent(top.clone()).unwrap();
        let other_top = Group::new("Beta", "", o);

        assert_eq!(top.as_ref().natural_cmp(&child), Ordering::Less);
        assert_eq!(other_top.natural_cmp(&top), Ordering::Less);
    }

    #[test]
    fn test_synchronize_names_unpersisted_group() {
        let o = org();
        let group = Arc::new(Group::new("Council", "", o.clone()));
        let mut gm = GroupMembership::new(group, member(o), joined());
        assert!(matches!(
            gm.synchronize_key_values(),
            Err(OrgError::UnassignedIdentity { entity: "Group" })
        ));
    }
}
