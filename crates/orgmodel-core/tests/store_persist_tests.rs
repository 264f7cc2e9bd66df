mod common;

use std::sync::Arc;

use common::*;
use orgmodel_core::model::{
    AllergySeverity, Amount, Category, CategoryProducer, FoodPreference, Group, Identity,
    InternalUser, LocalizedCategory, Membership, MembershipYear, Organisation, TextSuite,
    WellKnownAddressType, WellKnownCurrency,
};
use orgmodel_core::{Entity, LocaleDefinition, OrgError, Store};

#[test]
fn test_sequences_start_at_one_and_are_per_entity() {
    let mut store = new_store();
    let first = persist_organisation(&mut store, "Mithlond");
    let second = persist_organisation(&mut store, "Fjodjim");
    let user = persist_user(&mut store, "Bilbo", "Baggins");

    assert_eq!(first.id(), Identity::Assigned(1));
    assert_eq!(second.id(), Identity::Assigned(2));
    assert_eq!(user.id(), Identity::Assigned(1));
    assert_eq!(store.sequence_next("seq_Organisation"), 3);
    assert_eq!(store.sequence_next("seq_InternalUser"), 2);
    assert_eq!(store.sequence_next("seq_Award"), 1);
}

#[test]
fn test_persisting_twice_fails() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");

    let err = store.persist(Organisation::clone(&org)).unwrap_err();
    assert_eq!(
        err,
        OrgError::IdentityAlreadyAssigned {
            entity: "Organisation",
            id: 1
        }
    );
}

#[test]
fn test_unique_constraint_is_named() {
    let mut store = new_store();
    persist_organisation(&mut store, "Mithlond");

    let err = store
        .persist(Organisation::new("Mithlond", "other.se", stockholm()))
        .unwrap_err();
    match err {
        OrgError::UniqueViolation {
            constraint, entity, ..
        } => {
            assert_eq!(constraint, "unq_name_per_org");
            assert_eq!(entity, "Organisation");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.count::<Organisation>(), 1);
    // a failed persist does not consume a sequence value
    assert_eq!(store.sequence_next("seq_Organisation"), 2);
}

#[test]
fn test_alias_unique_per_organisation_only() {
    let mut store = new_store();
    let mithlond = persist_organisation(&mut store, "Mithlond");
    let fjodjim = persist_organisation(&mut store, "Fjodjim");
    persist_member(&mut store, "Gandalf", &mithlond);
    persist_member(&mut store, "Gandalf", &fjodjim);

    let user = persist_user(&mut store, "Another", "Wizard");
    let err = store
        .persist(Membership::new("Gandalf", user, mithlond))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgError::UniqueViolation {
            constraint: "unq_alias_per_org",
            ..
        }
    ));
}

#[test]
fn test_user_may_join_organisation_once() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let user = persist_user(&mut store, "Bilbo", "Baggins");
    store
        .persist(Membership::new("Bilbo", user.clone(), org.clone()))
        .unwrap();

    let err = store
        .persist(Membership::new("Burglar", user, org))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgError::UniqueViolation {
            constraint: "unq_user_per_org",
            ..
        }
    ));
}

#[test]
fn test_email_alias_unique_when_present() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");

    let mut first = Membership::new("Bilbo", persist_user(&mut store, "Bilbo", "B"), org.clone());
    first.email_alias = Some("ringbearer".to_string());
    store.persist(first).unwrap();

    // absent email aliases never collide
    let sam = persist_user(&mut store, "Sam", "G");
    store
        .persist(Membership::new("Sam", sam, org.clone()))
        .unwrap();
    let pippin = persist_user(&mut store, "Pippin", "T");
    store
        .persist(Membership::new("Pippin", pippin, org.clone()))
        .unwrap();

    let mut clash = Membership::new("Frodo", persist_user(&mut store, "Frodo", "B"), org);
    clash.email_alias = Some("ringbearer".to_string());
    assert!(matches!(
        store.persist(clash),
        Err(OrgError::UniqueViolation {
            constraint: "unq_emailalias_per_org",
            ..
        })
    ));
}

#[test]
fn test_reference_to_unpersisted_entity_fails() {
    let mut store = new_store();
    let org = Arc::new(Organisation::new("Ghost", "ghost.se", stockholm()));

    let err = store
        .persist(Group::new("Council", "", org))
        .unwrap_err();
    assert_eq!(
        err,
        OrgError::UnassignedIdentity {
            entity: "Organisation"
        }
    );
}

#[test]
fn test_reference_to_foreign_store_fails_with_named_constraint() {
    let mut other = Store::new();
    let foreign_org = persist_organisation(&mut other, "Elsewhere");

    let mut store = new_store();
    let err = store
        .persist(Group::new("Council", "", foreign_org))
        .unwrap_err();
    assert_eq!(
        err,
        OrgError::ForeignKeyViolation {
            constraint: "fk_group_organisation",
            entity: "Organisation",
            id: 1
        }
    );
}

#[test]
fn test_update_reruns_unique_checks_excluding_itself() {
    let mut store = new_store();
    let mithlond = persist_organisation(&mut store, "Mithlond");
    persist_organisation(&mut store, "Fjodjim");

    let mut renamed = Organisation::clone(&mithlond);
    renamed.phone = "+46 8 123 456".to_string();
    let updated = store.update(renamed).unwrap();
    assert_eq!(updated.phone, "+46 8 123 456");
    assert_eq!(store.get::<Organisation>(1).unwrap().phone, "+46 8 123 456");

    let mut clash = Organisation::clone(&mithlond);
    clash.name = "Fjodjim".to_string();
    assert!(matches!(
        store.update(clash),
        Err(OrgError::UniqueViolation { .. })
    ));
}

#[test]
fn test_update_requires_stored_entity() {
    let mut store = new_store();
    let err = store
        .update(Organisation::new("Mithlond", "mithlond.se", stockholm()))
        .unwrap_err();
    assert!(matches!(err, OrgError::UnassignedIdentity { .. }));

    let err = store.get::<Organisation>(42).unwrap_err();
    assert!(matches!(err, OrgError::NotFound { entity: "Organisation", .. }));
}

#[test]
fn test_text_suite_cascades_locales_once() {
    let mut store = new_store();
    let suite = store
        .persist(bilingual_suite("greetings", "Hello", "Hej"))
        .unwrap();

    // standard locale and the en-US text share one stored definition
    assert_eq!(store.count::<LocaleDefinition>(), 2);
    assert!(suite.standard_locale().id().is_assigned());
    for text in suite.texts() {
        let key = text.key().unwrap();
        assert_eq!(Some(key.suite_id), suite.id().id());
        assert_eq!(Some(key.locale_id), text.locale().id().id());
    }

    // a second suite reuses the stored locales
    store
        .persist(bilingual_suite("farewells", "Bye", "Hej då"))
        .unwrap();
    assert_eq!(store.count::<LocaleDefinition>(), 2);
    assert!(store.find_text_suite("farewells").is_some());
}

#[test]
fn test_suite_identifier_is_unique() {
    let mut store = new_store();
    store.persist(bilingual_suite("greetings", "Hello", "Hej")).unwrap();
    assert!(matches!(
        store.persist(TextSuite::new("greetings", en_us())),
        Err(OrgError::UniqueViolation {
            constraint: "unq_suite_identifier",
            ..
        })
    ));
}

#[test]
fn test_locale_column_lengths() {
    let mut store = new_store();
    let too_long = LocaleDefinition::new("en", "US", "averyveryverylongvariant");
    assert!(matches!(
        store.persist(too_long),
        Err(OrgError::InvalidLocale { .. })
    ));
}

#[test]
fn test_localized_category_cascades_its_suite() {
    let mut store = new_store();
    let category = store
        .persist(LocalizedCategory::new(Arc::new(bilingual_suite(
            "category.pub",
            "Pub",
            "Krog",
        ))))
        .unwrap();

    assert!(category.texts().id().is_assigned());
    assert_eq!(store.count::<TextSuite>(), 1);
    assert_eq!(category.name(Some(sv_se().locale())).unwrap(), "Krog");
}

#[test]
fn test_plain_category_unique_per_name_and_classification() {
    let mut store = new_store();
    store
        .persist(WellKnownAddressType::Cafe.category())
        .unwrap();
    assert!(store
        .persist(WellKnownAddressType::Cafe.create_category_with_description("other"))
        .is_err());
    store
        .persist(Category::new("cafe", "food_place", ""))
        .unwrap();
    assert_eq!(store.count::<Category>(), 2);
}

#[test]
fn test_membership_year_unique_per_organisation() {
    let mut store = new_store();
    let org = persist_organisation(&mut store, "Mithlond");
    let fee = Amount::of(250, WellKnownCurrency::Sek.into()).unwrap();

    store
        .persist(MembershipYear::new(2024, fee.clone(), org.clone()).unwrap())
        .unwrap();
    assert!(matches!(
        store.persist(MembershipYear::new(2024, fee, org).unwrap()),
        Err(OrgError::UniqueViolation {
            constraint: "unq_year_per_org",
            ..
        })
    ));
}

#[test]
fn test_restore_advances_sequence() {
    let mut store = new_store();
    let mut org = Organisation::new("Mithlond", "mithlond.se", stockholm());
    *org.identity_mut() = Identity::Assigned(5);
    store.restore(org).unwrap();

    assert_eq!(store.sequence_next("seq_Organisation"), 6);
    let next = persist_organisation(&mut store, "Fjodjim");
    assert_eq!(next.id(), Identity::Assigned(6));
    assert_eq!(store.get::<Organisation>(5).unwrap().name, "Mithlond");
}

#[test]
fn test_restore_sequence_never_moves_backwards() {
    let mut store = new_store();
    store.restore_sequence("seq_Group", 10).unwrap();
    store.restore_sequence("seq_Group", 3).unwrap();
    assert_eq!(store.sequence_next("seq_Group"), 10);
    assert!(store.restore_sequence("seq_Group", 0).is_err());
}

#[test]
fn test_memberships_of_lists_in_natural_order() {
    let mut store = new_store();
    let mithlond = persist_organisation(&mut store, "Mithlond");
    let fjodjim = persist_organisation(&mut store, "Fjodjim");
    persist_member(&mut store, "Sam", &mithlond);
    persist_member(&mut store, "Frodo", &mithlond);
    persist_member(&mut store, "Merry", &fjodjim);

    let org_id = mithlond.id().id().unwrap();
    let aliases: Vec<String> = store
        .memberships_of(org_id)
        .iter()
        .map(|m| m.alias.clone())
        .collect();
    assert_eq!(aliases, vec!["Frodo", "Sam"]);
}

#[test]
fn test_rejected_persist_leaves_no_cascaded_suites() {
    let mut store = new_store();
    store
        .persist(AllergySeverity::new(
            1,
            Arc::new(bilingual_suite("severity.mild", "Mild", "Lindrig")),
            Arc::new(bilingual_suite("severity.mild.description", "Discomfort", "Obehag")),
        ))
        .unwrap();
    let suites_before = store.count::<TextSuite>();
    let sequence_before = store.sequence_next("seq_TextSuite");

    let names = Arc::new(bilingual_suite("severity.other", "Other", "Annan"));
    let descriptions = Arc::new(bilingual_suite("severity.other.description", "Other", "Annan"));
    let clash = AllergySeverity::new(1, names.clone(), descriptions.clone());
    assert!(matches!(
        store.persist(clash),
        Err(OrgError::UniqueViolation {
            constraint: "unq_severity_sort_order",
            ..
        })
    ));
    assert_eq!(store.count::<TextSuite>(), suites_before);
    assert_eq!(store.sequence_next("seq_TextSuite"), sequence_before);
    assert!(store.find_text_suite("severity.other").is_none());

    // the same suites go through once the conflict is resolved
    let stored = store
        .persist(AllergySeverity::new(2, names, descriptions))
        .unwrap();
    assert!(stored.names().id().is_assigned());
    assert_eq!(store.count::<TextSuite>(), suites_before + 2);
}

#[test]
fn test_rejected_association_leaves_no_cascaded_suites() {
    let mut store = new_store();
    let names = Arc::new(bilingual_suite("preference.vegan", "Vegan", "Vegan"));
    let descriptions = Arc::new(bilingual_suite("preference.vegan.description", "No animal products", "Inga animaliska produkter"));
    let unsaved_user = Arc::new(InternalUser::new("Radagast", "Brown", stockholm()));

    let err = store
        .persist_association(FoodPreference::new(names.clone(), descriptions.clone(), unsaved_user))
        .unwrap_err();
    assert!(matches!(err, OrgError::UnassignedIdentity { .. }));
    assert_eq!(store.count::<TextSuite>(), 0);
    assert_eq!(store.count::<LocaleDefinition>(), 0);

    let user = persist_user(&mut store, "Radagast", "Brown");
    store
        .persist_association(FoodPreference::new(names, descriptions, user))
        .unwrap();
    assert_eq!(store.count::<TextSuite>(), 2);
    assert_eq!(store.associations::<FoodPreference>().count(), 1);
}
