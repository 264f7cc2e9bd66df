#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use common::*;
use orgmodel_core::model::{
    Activity, Admission, AdmissionKey, Allergy, AllergySeverity, Amount, CategoryProducer,
    CompoundKeyed, Food, FoodPreference, Group, GroupMembership, GuildMembershipType,
    MembershipYear, WellKnownAddressType, WellKnownCurrency, YearlyMembership,
};
use orgmodel_core::{OrgError, TextSuite};

fn sek(major: i64) -> Amount {
    Amount::of(major, WellKnownCurrency::Sek.into()).unwrap()
}

fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn test_association_key_follows_linked_identities() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let member = persist_member(&mut store, "Frodo", &org);
    let year = store
        .persist(MembershipYear::new(2024, sek(250), org).unwrap())
        .unwrap();

    let stored = store
        .persist_association(YearlyMembership::new(member.clone(), year.clone()))
        .unwrap();

    let key = stored.key().copied().unwrap();
    assert_eq!(Some(key.membership_id), member.id().id());
    assert_eq!(Some(key.membership_year_id), year.id().id());
    assert!(store.get_association::<YearlyMembership>(&key).is_some());
}

#[test]
fn test_association_with_unpersisted_entity_fails() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let member = persist_member(&mut store, "Frodo", &org);
    let year = Arc::new(MembershipYear::new(2024, sek(250), org).unwrap());

    let err = store
        .persist_association(YearlyMembership::new(member, year))
        .unwrap_err();
    assert_eq!(
        err,
        OrgError::UnassignedIdentity {
            entity: "MembershipYear"
        }
    );
}

#[test]
fn test_duplicate_pair_violates_primary_key() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let member = persist_member(&mut store, "Frodo", &org);
    let group = store
        .persist(Group::new("Council", "", org.clone()))
        .unwrap();
    let joined = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    store
        .persist_association(GroupMembership::new(group.clone(), member.clone(), joined))
        .unwrap();
    let err = store
        .persist_association(GroupMembership::new(group.clone(), member, joined))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgError::UniqueViolation {
            constraint: "pk_group_membership",
            ..
        }
    ));

    let group_id = group.id().id().unwrap();
    assert_eq!(store.group_members(group_id).len(), 1);
}

#[test]
fn test_guild_membership_requires_guild() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let member = persist_member(&mut store, "Frodo", &org);
    let plain = store.persist(Group::new("Council", "", org.clone())).unwrap();
    let role = store
        .persist(GuildMembershipType::new("Master", "Teaches apprentices"))
        .unwrap();
    let joined = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    let err = GroupMembership::guild(plain, member.clone(), joined, role.clone()).unwrap_err();
    assert!(matches!(err, OrgError::NotAGuild { .. }));

    let guild = store
        .persist(Group::guild("Brewers", "", org, "Sambeleg", "Sam"))
        .unwrap();
    let stored = store
        .persist_association(GroupMembership::guild(guild, member, joined, role).unwrap())
        .unwrap();
    assert_eq!(
        stored.guild_membership_type().map(|t| t.name.as_str()),
        Some("Master")
    );
}

#[test]
fn test_admissions_listed_per_activity_and_removable() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let pub_category = store
        .persist(WellKnownAddressType::PubRestaurant.category())
        .unwrap();
    let feast = store
        .persist(
            Activity::new(
                "Midsummer feast",
                "",
                org.clone(),
                at(21, 18),
                at(21, 23),
                sek(100),
                pub_category.clone(),
                stockholm(),
            )
            .unwrap(),
        )
        .unwrap();
    let walk = store
        .persist(
            Activity::new(
                "Morning walk",
                "",
                org.clone(),
                at(22, 8),
                at(22, 10),
                sek(0),
                pub_category,
                stockholm(),
            )
            .unwrap(),
        )
        .unwrap();

    let frodo = persist_member(&mut store, "Frodo", &org);
    let sam = persist_member(&mut store, "Sam", &org);
    let early = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();

    store
        .persist_association(Admission::new(feast.clone(), sam.clone(), late))
        .unwrap();
    store
        .persist_association(Admission::new(feast.clone(), frodo.clone(), early))
        .unwrap();
    store
        .persist_association(Admission::new(walk, sam, early))
        .unwrap();

    let feast_id = feast.id().id().unwrap();
    let admitted: Vec<String> = store
        .admissions_for(feast_id)
        .iter()
        .map(|a| a.admitted.alias.clone())
        .collect();
    assert_eq!(admitted, vec!["Frodo", "Sam"]);

    let key = AdmissionKey {
        activity_id: feast_id,
        membership_id: frodo.id().id().unwrap(),
    };
    store.remove_association::<Admission>(&key).unwrap();
    assert_eq!(store.admissions_for(feast_id).len(), 1);
    assert!(matches!(
        store.remove_association::<Admission>(&key),
        Err(OrgError::NotFound { .. })
    ));
}

#[test]
fn test_update_association_replaces_row() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let member = persist_member(&mut store, "Frodo", &org);
    let year = store
        .persist(MembershipYear::new(2024, sek(250), org).unwrap())
        .unwrap();
    let stored = store
        .persist_association(YearlyMembership::new(member.clone(), year))
        .unwrap();
    assert!(!stored.is_paid());

    let mut paid = YearlyMembership::clone(&stored);
    paid.register_payment(sek(250), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        .unwrap();
    store.update_association(paid).unwrap();

    let enrolments = store.yearly_memberships_of(member.id().id().unwrap());
    assert_eq!(enrolments.len(), 1);
    assert!(enrolments[0].is_paid());
    assert_eq!(enrolments[0].amount_paid(), sek(250));
}

#[test]
fn test_food_preference_cascades_text_suites() {
    let mut store = new_store();
    let user = persist_user(&mut store, "Samwise", "Gamgee");
    let names = Arc::new(bilingual_suite("pref.potatoes", "Potatoes", "Potatis"));
    let descriptions = Arc::new(bilingual_suite("pref.potatoes.desc", "Boiled", "Kokt"));

    let stored = store
        .persist_association(FoodPreference::new(names, descriptions, user.clone()))
        .unwrap();

    assert!(stored.names().id().is_assigned());
    assert!(stored.descriptions().id().is_assigned());
    assert_eq!(store.count::<TextSuite>(), 2);
    assert_eq!(stored.name(Some(sv_se().locale())).unwrap(), "Potatis");
}

#[test]
fn test_allergies_of_user() {
    let mut store = new_store();
    let user = persist_user(&mut store, "Bilbo", "Baggins");
    let food_category = store
        .persist(orgmodel_core::model::Category::new("nuts", "food", ""))
        .unwrap();
    let sub_category = store
        .persist(orgmodel_core::model::Category::new("peanut", "food", ""))
        .unwrap();
    let food = store
        .persist(Food::new(food_category, sub_category))
        .unwrap();
    let severity = store
        .persist(AllergySeverity::new(
            1,
            Arc::new(bilingual_suite("severity.mild", "Mild", "Mild")),
            Arc::new(bilingual_suite("severity.mild.desc", "Itching", "Klåda")),
        ))
        .unwrap();

    store
        .persist_association(Allergy::new(food, user.clone(), severity))
        .unwrap();

    let allergies = store.allergies_of(user.id().id().unwrap());
    assert_eq!(allergies.len(), 1);
    assert_eq!(allergies[0].severity.severity_sort_order, 1);
}
