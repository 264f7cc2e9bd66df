//! Awards (orders, medals) and their graded levels

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::Result;
use crate::model::compound_key::CompoundKeyed;
use crate::model::identity::Identity;
use crate::model::membership::Membership;
use crate::model::ordering::{compare_named_descriptions, NamedDescription, NaturalOrder, Organisational};
use crate::model::organisation::Organisation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardType {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
}

impl AwardType {
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

impl NamedDescription for AwardType {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl NaturalOrder for AwardType {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        compare_named_descriptions(self, other)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
    pub award_type: Arc<AwardType>,
    pub organisation: Arc<Organisation>,
}

impl Award {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        award_type: Arc<AwardType>,
        organisation: Arc<Organisation>,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            description: description.into(),
            award_type,
            organisation,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NamedDescription for Award {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Organisational for Award {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for Award {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .natural_cmp(&other.organisation)
            .then_with(|| self.award_type.natural_cmp(&other.award_type))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// One grade of an award; `index` ranks the grades within the award.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardLevel {
    pub(crate) id: Identity,
    pub index: i32,
    pub name: String,
    pub description: String,
    pub award: Arc<Award>,
}

impl AwardLevel {
    pub fn new(
        index: i32,
        name: impl Into<String>,
        description: impl Into<String>,
        award: Arc<Award>,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            index,
            name: name.into(),
            description: description.into(),
            award,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NamedDescription for AwardLevel {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl NaturalOrder for AwardLevel {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.award
            .natural_cmp(&other.award)
            .then_with(|| self.index.cmp(&other.index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AwardLevelGrantKey {
    pub award_level_id: i64,
    pub membership_id: i64,
}

/// An award level granted to a membership.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardLevelGrant {
    key: Option<AwardLevelGrantKey>,
    pub award_level: Arc<AwardLevel>,
    pub membership: Arc<Membership>,
    pub date_granted: NaiveDate,
    pub note: Option<String>,
}

impl AwardLevelGrant {
    pub fn new(award_level: Arc<AwardLevel>, membership: Arc<Membership>, date_granted: NaiveDate) -> Self {
        Self {
            key: None,
            award_level,
            membership,
            date_granted,
            note: None,
        }
    }
}

impl CompoundKeyed for AwardLevelGrant {
    type Key = AwardLevelGrantKey;

    fn key(&self) -> Option<&AwardLevelGrantKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<AwardLevelGrantKey> {
        let key = AwardLevelGrantKey {
            award_level_id: self.award_level.id.require("AwardLevel")?,
            membership_id: self.membership.id.require("Membership")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl NaturalOrder for AwardLevelGrant {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.award_level
            .natural_cmp(&other.award_level)
            .then_with(|| self.membership.natural_cmp(&other.membership))
    }
}
