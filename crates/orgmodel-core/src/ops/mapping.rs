//! Table mapping of every entity and association: sequences, named
//! constraints, cascades and validation.

use super::store::{Association, AssociationTable, Entity, EntityTable, Store, UniqueKey};
use crate::errors::{OrgError, Result};
use crate::model::category::MAX_CATEGORY_FIELD_LENGTH;
use crate::model::membership::MAX_ALIAS_LENGTH;
use crate::model::{
    Activity, Admission, AdmissionKey, Allergy, AllergyKey, AllergySeverity, Award, AwardLevel,
    AwardLevelGrant, AwardLevelGrantKey, AwardType, CategorizedAddress, Category, Dresscode,
    EventCalendar, Food, FoodPreference, FoodPreferenceKey, Group, GroupMembership,
    GroupMembershipKey, GroupMembershipKind, GuildMembershipType, Identity, InternalUser,
    LocaleDefinition, LocalizedCategory, Membership, MembershipYear, Organisation, TextSuite,
    YearlyMembership, YearlyMembershipKey,
};

/// Column length limits of the locale table.
pub const MAX_LANGUAGE_LENGTH: usize = 6;
pub const MAX_COUNTRY_LENGTH: usize = 6;
pub const MAX_VARIANT_LENGTH: usize = 16;

macro_rules! entity_table {
    ($table:ident) => {
        fn identity(&self) -> Identity {
            self.id
        }

        fn identity_mut(&mut self) -> &mut Identity {
            &mut self.id
        }

        fn table(store: &Store) -> &EntityTable<Self> {
            &store.$table
        }

        fn table_mut(store: &mut Store) -> &mut EntityTable<Self> {
            &mut store.$table
        }
    };
}

macro_rules! association_table {
    ($key:ty, $table:ident) => {
        fn table(store: &Store) -> &AssociationTable<$key, Self> {
            &store.$table
        }

        fn table_mut(store: &mut Store) -> &mut AssociationTable<$key, Self> {
            &mut store.$table
        }
    };
}

fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length > max {
        return Err(OrgError::invalid_input(format!(
            "{} is {} characters; at most {} are stored",
            field, length, max
        )));
    }
    Ok(())
}

fn check_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrgError::invalid_input(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// Identity of a referenced entity as it appears in a unique key.
fn ref_id(identity: Identity) -> i64 {
    identity.sort_value()
}

impl Entity for LocaleDefinition {
    const ENTITY: &'static str = "LocaleDefinition";
    const SEQUENCE: &'static str = "seq_LocaleDefinition";

    entity_table!(locale_definitions);

    fn validate(&self) -> Result<()> {
        if self.language().len() > MAX_LANGUAGE_LENGTH
            || self.country().len() > MAX_COUNTRY_LENGTH
            || self.variant().len() > MAX_VARIANT_LENGTH
        {
            return Err(OrgError::InvalidLocale {
                tag: self.to_language_tag(),
            });
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_language_country_variant",
            format!("{}|{}|{}", self.language(), self.country(), self.variant()),
        )]
    }
}

impl Entity for TextSuite {
    const ENTITY: &'static str = "TextSuite";
    const SEQUENCE: &'static str = "seq_TextSuite";

    entity_table!(text_suites);

    fn validate(&self) -> Result<()> {
        check_not_blank("suite identifier", self.suite_identifier())
    }

    fn cascade(&mut self, store: &mut Store) -> Result<()> {
        for locale in self.locale_definitions_mut() {
            store.cascade_locale(locale)?;
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_textsuite_std_locale", self.standard_locale())?;
        for text in self.texts() {
            store.require_ref("fk_localizedtext_locale", text.locale())?;
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_suite_identifier",
            self.suite_identifier(),
        )]
    }

    fn pre_persist(&mut self) -> Result<()> {
        self.synchronize_key_values()
    }
}

impl Entity for Category {
    const ENTITY: &'static str = "Category";
    const SEQUENCE: &'static str = "seq_Category";

    entity_table!(categories);

    fn validate(&self) -> Result<()> {
        check_not_blank("category name", &self.name)?;
        check_length("category name", &self.name, MAX_CATEGORY_FIELD_LENGTH)?;
        check_length(
            "category classification",
            &self.classification,
            MAX_CATEGORY_FIELD_LENGTH,
        )
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_classification_per_name",
            format!("{}|{}", self.name, self.classification),
        )]
    }
}

impl Entity for LocalizedCategory {
    const ENTITY: &'static str = "LocalizedCategory";
    const SEQUENCE: &'static str = "seq_LocalizedCategory";

    entity_table!(localized_categories);

    fn cascade(&mut self, store: &mut Store) -> Result<()> {
        store.cascade_suite(&mut self.texts)
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_category_texts", self.texts.as_ref())?;
        Ok(())
    }
}

impl Entity for Organisation {
    const ENTITY: &'static str = "Organisation";
    const SEQUENCE: &'static str = "seq_Organisation";

    entity_table!(organisations);

    fn validate(&self) -> Result<()> {
        check_not_blank("organisation name", &self.name)?;
        check_length("organisation suffix", &self.suffix, 1024)?;
        check_length("organisation phone", &self.phone, 64)?;
        check_length("organisation email suffix", &self.email_suffix, 64)?;
        check_length("organisation time zone", &self.time_zone_id, 64)
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("unq_name_per_org", self.name.clone())]
    }
}

impl Entity for InternalUser {
    const ENTITY: &'static str = "InternalUser";
    const SEQUENCE: &'static str = "seq_InternalUser";

    entity_table!(users);

    fn validate(&self) -> Result<()> {
        check_not_blank("user identifier token", self.identifier_token())?;
        check_length("first name", &self.first_name, 64)?;
        check_length("last name", &self.last_name, 64)
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_user_identifier_token",
            self.identifier_token(),
        )]
    }
}

impl Entity for Membership {
    const ENTITY: &'static str = "Membership";
    const SEQUENCE: &'static str = "seq_Membership";

    entity_table!(memberships);

    fn validate(&self) -> Result<()> {
        check_not_blank("alias", &self.alias)?;
        check_length("alias", &self.alias, MAX_ALIAS_LENGTH)?;
        check_length("sub alias", &self.sub_alias, 1024)?;
        if let Some(email_alias) = &self.email_alias {
            check_length("email alias", email_alias, 64)?;
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_membership_user", self.user.as_ref())?;
        store.require_ref("fk_membership_organisation", self.organisation.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        let org = ref_id(self.organisation.id());
        let mut keys = vec![
            UniqueKey::new("unq_alias_per_org", format!("{}|{}", self.alias, org)),
            UniqueKey::new(
                "unq_user_per_org",
                format!("{}|{}", ref_id(self.user.id()), org),
            ),
        ];
        if let Some(email_alias) = &self.email_alias {
            keys.push(UniqueKey::new(
                "unq_emailalias_per_org",
                format!("{}|{}", email_alias, org),
            ));
        }
        keys
    }
}

impl Entity for MembershipYear {
    const ENTITY: &'static str = "MembershipYear";
    const SEQUENCE: &'static str = "seq_MembershipYear";

    entity_table!(membership_years);

    /// All fees share the standard fee's currency.
    fn validate(&self) -> Result<()> {
        let currency = self.standard_fee.currency();
        for fee in [&self.reduced_fee, &self.expanded_fee].into_iter().flatten() {
            if fee.currency() != currency {
                return Err(OrgError::CurrencyMismatch {
                    left: fee.currency().to_string(),
                    right: currency.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_membershipyear_organisation", self.organisation.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_year_per_org",
            format!("{}|{}", self.year, ref_id(self.organisation.id())),
        )]
    }
}

impl Entity for Group {
    const ENTITY: &'static str = "Group";
    const SEQUENCE: &'static str = "seq_Group";

    entity_table!(groups);

    fn validate(&self) -> Result<()> {
        check_not_blank("group name", &self.name)?;
        if self.is_guild() && self.parent().is_some() {
            return Err(OrgError::invalid_input(format!(
                "guild [{}] cannot have a parent group",
                self.name
            )));
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_group_organisation", self.organisation.as_ref())?;
        if let Some(parent) = self.parent() {
            store.require_ref("fk_group_parent", parent.as_ref())?;
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_groupname_per_org",
            format!("{}|{}", self.name, ref_id(self.organisation.id())),
        )]
    }
}

impl Entity for GuildMembershipType {
    const ENTITY: &'static str = "GuildMembershipType";
    const SEQUENCE: &'static str = "seq_GuildMembershipType";

    entity_table!(guild_membership_types);

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_name_per_guildmemshiptype",
            self.name.clone(),
        )]
    }
}

impl Entity for AwardType {
    const ENTITY: &'static str = "AwardType";
    const SEQUENCE: &'static str = "seq_AwardType";

    entity_table!(award_types);

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("unq_name_per_awardtype", self.name.clone())]
    }
}

impl Entity for Award {
    const ENTITY: &'static str = "Award";
    const SEQUENCE: &'static str = "seq_Award";

    entity_table!(awards);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_award_awardtype", self.award_type.as_ref())?;
        store.require_ref("fk_award_organisation", self.organisation.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_name_per_organisation",
            format!("{}|{}", self.name, ref_id(self.organisation.id())),
        )]
    }
}

impl Entity for AwardLevel {
    const ENTITY: &'static str = "AwardLevel";
    const SEQUENCE: &'static str = "seq_AwardLevel";

    entity_table!(award_levels);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_awardlevel_award", self.award.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        let award = ref_id(self.award.id());
        vec![
            UniqueKey::new("unq_name_per_award", format!("{}|{}", self.name, award)),
            UniqueKey::new("unq_index_per_award", format!("{}|{}", self.index, award)),
        ]
    }
}

impl Entity for Dresscode {
    const ENTITY: &'static str = "Dresscode";
    const SEQUENCE: &'static str = "seq_Dresscode";

    entity_table!(dresscodes);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_dresscode_organisation", self.organisation.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_dresscode_per_organisation",
            format!("{}|{}", self.dress_code, ref_id(self.organisation.id())),
        )]
    }
}

impl Entity for EventCalendar {
    const ENTITY: &'static str = "EventCalendar";
    const SEQUENCE: &'static str = "seq_EventCalendar";

    entity_table!(event_calendars);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_eventcalendar_organisation", self.organisation.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_ec_name_per_organisation",
            format!("{}|{}", self.name, ref_id(self.organisation.id())),
        )]
    }
}

impl Entity for Activity {
    const ENTITY: &'static str = "Activity";
    const SEQUENCE: &'static str = "seq_Activity";

    entity_table!(activities);

    fn validate(&self) -> Result<()> {
        check_not_blank("activity name", &self.name)?;
        if self.end_time < self.start_time {
            return Err(OrgError::invalid_input("activity ends before it starts"));
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_activity_organisation", self.organisation.as_ref())?;
        store.require_ref("fk_activity_address_category", self.address_category.as_ref())?;
        if let Some(dresscode) = &self.dresscode {
            store.require_ref("fk_activity_dresscode", dresscode.as_ref())?;
        }
        if let Some(responsible) = &self.responsible {
            store.require_ref("fk_activity_responsible", responsible.as_ref())?;
        }
        Ok(())
    }
}

impl Entity for CategorizedAddress {
    const ENTITY: &'static str = "CategorizedAddress";
    const SEQUENCE: &'static str = "seq_CategorizedAddress";

    entity_table!(categorized_addresses);

    fn validate(&self) -> Result<()> {
        check_not_blank("short description", &self.short_desc)
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_cataddress_organisation", self.organisation.as_ref())?;
        store.require_ref("fk_cataddress_category", self.category.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_shortdesc_per_category_org",
            format!(
                "{}|{}|{}",
                self.short_desc,
                ref_id(self.category.id()),
                ref_id(self.organisation.id())
            ),
        )]
    }
}

impl Entity for AllergySeverity {
    const ENTITY: &'static str = "AllergySeverity";
    const SEQUENCE: &'static str = "seq_AllergySeverity";

    entity_table!(allergy_severities);

    fn cascade(&mut self, store: &mut Store) -> Result<()> {
        store.cascade_suite(&mut self.names)?;
        store.cascade_suite(&mut self.descriptions)
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_allergyseverity_names", self.names.as_ref())?;
        store.require_ref("fk_allergyseverity_descriptions", self.descriptions.as_ref())?;
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "unq_severity_sort_order",
            self.severity_sort_order.to_string(),
        )]
    }
}

impl Entity for Food {
    const ENTITY: &'static str = "Food";
    const SEQUENCE: &'static str = "seq_Food";

    entity_table!(foods);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_food_category", self.category.as_ref())?;
        store.require_ref("fk_food_subcategory", self.sub_category.as_ref())?;
        Ok(())
    }
}

impl Association for YearlyMembership {
    const ENTITY: &'static str = "YearlyMembership";
    const PRIMARY_KEY: &'static str = "pk_yearly_membership";

    association_table!(YearlyMembershipKey, yearly_memberships);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_yearlymembership_membership", self.membership.as_ref())?;
        store.require_ref("fk_yearlymembership_template", self.template.as_ref())?;
        Ok(())
    }
}

impl Association for GroupMembership {
    const ENTITY: &'static str = "GroupMembership";
    const PRIMARY_KEY: &'static str = "pk_group_membership";

    association_table!(GroupMembershipKey, group_memberships);

    fn validate(&self) -> Result<()> {
        if matches!(self.kind(), GroupMembershipKind::Guild { .. }) && !self.group.is_guild() {
            return Err(OrgError::NotAGuild {
                group: self.group.name.clone(),
            });
        }
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_groupmembership_group", self.group.as_ref())?;
        store.require_ref("fk_groupmembership_membership", self.membership.as_ref())?;
        if let Some(membership_type) = self.guild_membership_type() {
            store.require_ref("fk_guildmembership_type", membership_type.as_ref())?;
        }
        Ok(())
    }
}

impl Association for AwardLevelGrant {
    const ENTITY: &'static str = "AwardLevelGrant";
    const PRIMARY_KEY: &'static str = "pk_award_level_grant";

    association_table!(AwardLevelGrantKey, award_level_grants);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_awardlevelgrant_awardlevel", self.award_level.as_ref())?;
        store.require_ref("fk_awardlevelgrant_membership", self.membership.as_ref())?;
        Ok(())
    }
}

impl Association for Admission {
    const ENTITY: &'static str = "Admission";
    const PRIMARY_KEY: &'static str = "pk_admission";

    association_table!(AdmissionKey, admissions);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_admission_activity", self.activity.as_ref())?;
        store.require_ref("fk_admission_membership", self.admitted.as_ref())?;
        if let Some(admitter) = &self.admitted_by {
            store.require_ref("fk_admission_admitter", admitter.as_ref())?;
        }
        Ok(())
    }
}

impl Association for Allergy {
    const ENTITY: &'static str = "Allergy";
    const PRIMARY_KEY: &'static str = "pk_allergy";

    association_table!(AllergyKey, allergies);

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_allergy_food", self.food.as_ref())?;
        store.require_ref("fk_allergy_user", self.user.as_ref())?;
        store.require_ref("fk_allergy_severity", self.severity.as_ref())?;
        Ok(())
    }
}

impl Association for FoodPreference {
    const ENTITY: &'static str = "FoodPreference";
    const PRIMARY_KEY: &'static str = "pk_food_preference";

    association_table!(FoodPreferenceKey, food_preferences);

    fn cascade(&mut self, store: &mut Store) -> Result<()> {
        store.cascade_suite(&mut self.names)?;
        store.cascade_suite(&mut self.descriptions)
    }

    fn check_references(&self, store: &Store) -> Result<()> {
        store.require_ref("fk_food_preference_name", self.names.as_ref())?;
        store.require_ref("fk_food_preference_description", self.descriptions.as_ref())?;
        store.require_ref("fk_food_preference_user", self.user.as_ref())?;
        Ok(())
    }
}
