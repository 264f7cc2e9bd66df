//! Seed importer orchestration
//!
//! Imports seeds by applying them to the core `Store` loaded from the database
//! and persisting the result to SQLite in one transaction. Entities already
//! present under the same natural key are updated, so importing a seed twice
//! leaves the data unchanged.

use crate::errors::{from_rusqlite, io_error, seed_validation, Result};
use crate::repo::{load_store, SqliteRepo};
use crate::seed::format_v0::{SeedOrganisation, SeedV0};
use crate::seed::parser::{parse_seed_str_with_db, seed_locale};
use crate::seed::{compute_seed_digest, provenance};
use orgmodel_core::model::{
    Address, AllergySeverity, Category, Currency, LocalizedCategory, Organisation,
    DEFAULT_CLASSIFIER,
};
use orgmodel_core::{log_op_end, log_op_error, log_op_start};
use orgmodel_core::{Entity, LocaleDefinition, Store, TextSuite};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Entity name and natural key of everything a seed created or updated
type Applied = Vec<(&'static str, String)>;

/// Import a seed file into the database
///
/// Returns the seed digest on success
pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error("seed_read", e))?;
    import_seed_str(&content, conn)
}

/// Import seed YAML into the database
///
/// This is the main entry point for seed import. It:
/// 1. Parses and validates the seed, resolving references against the database
/// 2. Computes the seed digest
/// 3. Loads the stored model and applies the seed through the core `Store`
/// 4. Persists the store to SQLite within a transaction
/// 5. Emits provenance events
pub fn import_seed_str(content: &str, conn: &mut Connection) -> Result<String> {
    log_op_start!("seed_import");
    let start = Instant::now();

    let result = import_seed_impl(content, conn);

    match &result {
        Ok((digest, applied)) => {
            log_op_end!(
                "seed_import",
                duration_ms = start.elapsed().as_millis() as u64,
                seed_digest = digest.as_str(),
                applied = *applied as u64
            );
        }
        Err(e) => {
            log_op_error!(
                "seed_import",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result.map(|(digest, _)| digest)
}

fn import_seed_impl(content: &str, conn: &mut Connection) -> Result<(String, usize)> {
    let seed = parse_seed_str_with_db(content, Some(&*conn))?;
    let seed_digest = compute_seed_digest(&seed)?;

    let tx = conn.transaction().map_err(from_rusqlite)?;
    provenance::emit_started(&tx, &seed_digest)?;

    let mut store = load_store(&tx)?;
    let applied = apply_seed(&mut store, &seed)?;

    SqliteRepo::persist_store(&tx, &store)?;
    for (entity, key) in &applied {
        provenance::emit_applied(&tx, &seed_digest, entity, key)?;
    }
    provenance::emit_completed(&tx, &seed_digest, applied.len())?;

    tx.commit().map_err(from_rusqlite)?;
    Ok((seed_digest, applied.len()))
}

/// Apply a validated seed to `store`
pub fn apply_seed(store: &mut Store, seed: &SeedV0) -> Result<Applied> {
    let mut applied = Applied::new();

    for tag in &seed.locales {
        let locale = seed_locale(tag)?;
        if store.find_locale(&locale).is_none() {
            let stored = store.persist(LocaleDefinition::from_locale(locale))?;
            applied.push((LocaleDefinition::ENTITY, stored.to_language_tag()));
        }
    }

    for seed_suite in &seed.text_suites {
        let standard = LocaleDefinition::from_locale(seed_locale(&seed_suite.standard_locale)?);
        let mut suite = match store.find_text_suite(&seed_suite.identifier) {
            Some(existing) => {
                let mut suite = TextSuite::clone(existing);
                suite.set_standard_locale(standard);
                suite
            }
            None => TextSuite::new(seed_suite.identifier.clone(), standard),
        };
        for text in &seed_suite.texts {
            let locale = LocaleDefinition::from_locale(seed_locale(&text.locale)?);
            let classifier = text.classifier.as_deref().unwrap_or(DEFAULT_CLASSIFIER);
            suite.set_text(locale, classifier, text.text.clone())?;
        }
        if suite.id().is_assigned() {
            store.update(suite)?;
        } else {
            store.persist(suite)?;
        }
        applied.push((TextSuite::ENTITY, seed_suite.identifier.clone()));
    }

    for seed_category in &seed.categories {
        let existing = store
            .list::<Category>()
            .find(|c| c.name == seed_category.name && c.classification == seed_category.classification)
            .cloned();
        match existing {
            Some(category) if category.description == seed_category.description => continue,
            Some(category) => {
                let mut category = Category::clone(&category);
                category.description = seed_category.description.clone();
                store.update(category)?;
            }
            None => {
                store.persist(Category::new(
                    seed_category.name.clone(),
                    seed_category.classification.clone(),
                    seed_category.description.clone(),
                ))?;
            }
        }
        applied.push((
            Category::ENTITY,
            format!("{}/{}", seed_category.classification, seed_category.name),
        ));
    }

    for seed_category in &seed.localized_categories {
        let texts = stored_suite(store, &seed_category.texts)?;
        let exists = store
            .list::<LocalizedCategory>()
            .any(|c| c.texts().id() == texts.id());
        if !exists {
            store.persist(LocalizedCategory::new(texts))?;
            applied.push((LocalizedCategory::ENTITY, seed_category.texts.clone()));
        }
    }

    for seed_severity in &seed.allergy_severities {
        let names = stored_suite(store, &seed_severity.names)?;
        let descriptions = stored_suite(store, &seed_severity.descriptions)?;
        let existing = store
            .list::<AllergySeverity>()
            .find(|s| s.names().id() == names.id())
            .map(|s| s.id());
        let mut severity = AllergySeverity::new(seed_severity.sort_order, names, descriptions);
        match existing {
            Some(id) => {
                *severity.identity_mut() = id;
                store.update(severity)?;
            }
            None => {
                store.persist(severity)?;
            }
        }
        applied.push((AllergySeverity::ENTITY, seed_severity.names.clone()));
    }

    for seed_org in &seed.organisations {
        let org = match store.find_organisation(&seed_org.name) {
            Some(existing) => {
                let mut org = Organisation::clone(existing);
                apply_organisation(&mut org, seed_org)?;
                store.update(org)?
            }
            None => {
                let mut org = Organisation::new(
                    seed_org.name.clone(),
                    seed_org.email_suffix.clone(),
                    Address::default(),
                );
                apply_organisation(&mut org, seed_org)?;
                store.persist(org)?
            }
        };
        applied.push((Organisation::ENTITY, org.name.clone()));
    }

    Ok(applied)
}

fn stored_suite(store: &Store, identifier: &str) -> Result<Arc<TextSuite>> {
    store
        .find_text_suite(identifier)
        .cloned()
        .ok_or_else(|| seed_validation(&format!("Text suite {} is not stored", identifier)))
}

fn apply_organisation(org: &mut Organisation, seed: &SeedOrganisation) -> Result<()> {
    let address = &seed.visiting_address;
    org.email_suffix = seed.email_suffix.clone();
    org.visiting_address = Address {
        care_of_line: address.care_of.clone(),
        department_name: address.department.clone(),
        street: address.street.clone(),
        number: address.number.clone(),
        city: address.city.clone(),
        zip_code: address.zip_code.clone(),
        country: address.country.clone(),
        description: address.description.clone(),
    };
    if let Some(suffix) = &seed.suffix {
        org.suffix = suffix.clone();
    }
    if let Some(phone) = &seed.phone {
        org.phone = phone.clone();
    }
    if let Some(time_zone_id) = &seed.time_zone_id {
        org.time_zone_id = time_zone_id.clone();
    }
    if let Some(language) = &seed.language {
        org.language = language.clone();
    }
    if let Some(country) = &seed.country {
        org.country = country.clone();
    }
    if let Some(code) = &seed.currency {
        org.standard_currency = code.parse::<Currency>()?;
    }
    if seed.founding_year.is_some() {
        org.founding_year = seed.founding_year;
    }
    Ok(())
}
