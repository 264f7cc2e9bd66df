//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds. Ordering of list entries, the
//! spelling of language tags and an omitted `Default` classifier do not change
//! the digest.

use crate::errors::Result;
use crate::seed::format_v0::{SeedOrganisation, SeedTextSuite, SeedV0};
use orgmodel_core::errors::{ExError, ExErrorKind};
use orgmodel_core::model::{Locale, DEFAULT_CLASSIFIER};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize)]
struct CanonicalSeed {
    schema_version: u32,
    locales: Vec<String>,
    text_suites: Vec<CanonicalSuite>,
    categories: Vec<(String, String, String)>,
    localized_categories: Vec<String>,
    allergy_severities: Vec<(i32, String, String)>,
    organisations: Vec<CanonicalOrganisation>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct CanonicalSuite {
    identifier: String,
    standard_locale: String,
    /// (locale, classifier, text)
    texts: Vec<(String, String, String)>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct CanonicalOrganisation {
    name: String,
    email_suffix: String,
    suffix: Option<String>,
    phone: Option<String>,
    time_zone_id: Option<String>,
    language: Option<String>,
    country: Option<String>,
    currency: Option<String>,
    founding_year: Option<i32>,
    address: Vec<Option<String>>,
}

/// Compute a stable digest for a seed
///
/// Returns a SHA256 hex digest of the canonicalized seed representation
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let canonical = canonicalize_seed(seed);

    let json = serde_json::to_string(&canonical).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("seed_digest")
            .with_message(e.to_string())
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Language tags are normalized; ones that do not parse are kept verbatim
/// since validation rejects them before any digest is taken.
fn canonical_tag(tag: &str) -> String {
    Locale::from_language_tag(tag)
        .map(|locale| locale.to_language_tag())
        .unwrap_or_else(|_| tag.to_string())
}

fn canonicalize_seed(seed: &SeedV0) -> CanonicalSeed {
    let mut locales: Vec<String> = seed.locales.iter().map(|t| canonical_tag(t)).collect();
    locales.sort();

    let mut text_suites: Vec<CanonicalSuite> = seed.text_suites.iter().map(canonicalize_suite).collect();
    text_suites.sort();

    let mut categories: Vec<(String, String, String)> = seed
        .categories
        .iter()
        .map(|c| (c.name.clone(), c.classification.clone(), c.description.clone()))
        .collect();
    categories.sort();

    let mut localized_categories: Vec<String> = seed
        .localized_categories
        .iter()
        .map(|c| c.texts.clone())
        .collect();
    localized_categories.sort();

    let mut allergy_severities: Vec<(i32, String, String)> = seed
        .allergy_severities
        .iter()
        .map(|s| (s.sort_order, s.names.clone(), s.descriptions.clone()))
        .collect();
    allergy_severities.sort();

    let mut organisations: Vec<CanonicalOrganisation> =
        seed.organisations.iter().map(canonicalize_organisation).collect();
    organisations.sort();

    CanonicalSeed {
        schema_version: seed.schema_version,
        locales,
        text_suites,
        categories,
        localized_categories,
        allergy_severities,
        organisations,
    }
}

fn canonicalize_suite(suite: &SeedTextSuite) -> CanonicalSuite {
    let mut texts: Vec<(String, String, String)> = suite
        .texts
        .iter()
        .map(|t| {
            (
                canonical_tag(&t.locale),
                t.classifier.clone().unwrap_or_else(|| DEFAULT_CLASSIFIER.to_string()),
                t.text.clone(),
            )
        })
        .collect();
    texts.sort();

    CanonicalSuite {
        identifier: suite.identifier.clone(),
        standard_locale: canonical_tag(&suite.standard_locale),
        texts,
    }
}

fn canonicalize_organisation(org: &SeedOrganisation) -> CanonicalOrganisation {
    let address = &org.visiting_address;
    CanonicalOrganisation {
        name: org.name.clone(),
        email_suffix: org.email_suffix.clone(),
        suffix: org.suffix.clone(),
        phone: org.phone.clone(),
        time_zone_id: org.time_zone_id.clone(),
        language: org.language.clone(),
        country: org.country.clone(),
        currency: org.currency.as_ref().map(|c| c.to_ascii_uppercase()),
        founding_year: org.founding_year,
        address: vec![
            address.care_of.clone(),
            address.department.clone(),
            address.street.clone(),
            address.number.clone(),
            Some(address.city.clone()),
            Some(address.zip_code.clone()),
            Some(address.country.clone()),
            address.description.clone(),
        ],
    }
}
