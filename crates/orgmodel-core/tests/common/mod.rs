use std::sync::Arc;

use orgmodel_core::model::{
    Address, InternalUser, LocaleDefinition, Membership, Organisation, TextSuite, DEFAULT_CLASSIFIER,
};
use orgmodel_core::Store;

/// Create a new empty Store for testing
#[allow(dead_code)]
pub fn new_store() -> Store {
    Store::new()
}

#[allow(dead_code)]
pub fn en_us() -> LocaleDefinition {
    LocaleDefinition::new("en", "US", "")
}

#[allow(dead_code)]
pub fn sv_se() -> LocaleDefinition {
    LocaleDefinition::new("sv", "SE", "")
}

#[allow(dead_code)]
pub fn stockholm() -> Address {
    Address::new("Storgatan", "1", "Stockholm", "111 22", "Sweden")
}

/// Unpersisted suite with English (standard) and Swedish default texts
#[allow(dead_code)]
pub fn bilingual_suite(identifier: &str, en: &str, sv: &str) -> TextSuite {
    let mut suite = TextSuite::new(identifier, en_us());
    suite.set_text(en_us(), DEFAULT_CLASSIFIER, en).unwrap();
    suite.set_text(sv_se(), DEFAULT_CLASSIFIER, sv).unwrap();
    suite
}

/// Persist an organisation with the given name
#[allow(dead_code)]
pub fn persist_organisation(store: &mut Store, name: &str) -> Arc<Organisation> {
    let suffix = format!("{}.se", name.to_lowercase());
    store
        .persist(Organisation::new(name, suffix, stockholm()))
        .unwrap()
}

#[allow(dead_code)]
pub fn persist_user(store: &mut Store, first: &str, last: &str) -> Arc<InternalUser> {
    store
        .persist(InternalUser::new(first, last, stockholm()))
        .unwrap()
}

/// Persist a user and a membership for them in `organisation`
#[allow(dead_code)]
pub fn persist_member(
    store: &mut Store,
    alias: &str,
    organisation: &Arc<Organisation>,
) -> Arc<Membership> {
    let user = persist_user(store, alias, "Tester");
    store
        .persist(Membership::new(alias, user, organisation.clone()))
        .unwrap()
}
