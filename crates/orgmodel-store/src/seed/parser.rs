//! Seed parser with validation
//!
//! Parses YAML and validates schema version, declared locales, identifier
//! uniqueness and suite references

use crate::errors::{from_rusqlite, seed_validation, Result};
use crate::seed::format_v0::SeedV0;
use orgmodel_core::model::{Currency, Locale, DEFAULT_CLASSIFIER};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    parse_seed_file_with_db(path, None)
}

/// Parse a seed file, resolving references against an existing database
pub fn parse_seed_file_with_db(path: &Path, conn: Option<&Connection>) -> Result<SeedV0> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file {}: {}", path.display(), e)))?;

    parse_seed_str_with_db(&content, conn)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    parse_seed_str_with_db(content, None)
}

/// Parse a seed from a string, resolving references against an existing database
///
/// With a connection, locales and text suites stored by an earlier import
/// count as declared.
pub fn parse_seed_str_with_db(content: &str, conn: Option<&Connection>) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed, conn)?;

    Ok(seed)
}

/// Parse a language tag, reporting failures as seed validation errors
pub(crate) fn seed_locale(tag: &str) -> Result<Locale> {
    Locale::from_language_tag(tag)
        .map_err(|e| seed_validation(&format!("Invalid locale {:?}: {}", tag, e)))
}

fn locale_in_db(conn: Option<&Connection>, locale: &Locale) -> Result<bool> {
    let Some(conn) = conn else {
        return Ok(false);
    };
    let found = conn
        .query_row(
            "SELECT 1 FROM locale_definitions WHERE language = ?1 AND country = ?2 AND variant = ?3",
            [locale.language(), locale.country(), locale.variant()],
            |_| Ok(()),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

fn suite_in_db(conn: Option<&Connection>, identifier: &str) -> Result<bool> {
    let Some(conn) = conn else {
        return Ok(false);
    };
    let found = conn
        .query_row(
            "SELECT 1 FROM text_suites WHERE suite_identifier = ?1",
            [identifier],
            |_| Ok(()),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

/// Validate a parsed seed
fn validate_seed(seed: &SeedV0, conn: Option<&Connection>) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut declared = HashSet::new();
    for tag in &seed.locales {
        let locale = seed_locale(tag)?;
        if !declared.insert(locale) {
            return Err(seed_validation(&format!("Duplicate locale {}", tag)));
        }
    }
    let require_declared = |tag: &str, suite: &str| -> Result<()> {
        let locale = seed_locale(tag)?;
        if declared.contains(&locale) || locale_in_db(conn, &locale)? {
            Ok(())
        } else {
            Err(seed_validation(&format!(
                "Text suite {} uses undeclared locale {}",
                suite, tag
            )))
        }
    };

    let mut suite_ids = HashSet::new();
    for suite in &seed.text_suites {
        if suite.identifier.trim().is_empty() {
            return Err(seed_validation("Text suite identifier must not be blank"));
        }
        if !suite_ids.insert(suite.identifier.as_str()) {
            return Err(seed_validation(&format!(
                "Duplicate text suite identifier {}",
                suite.identifier
            )));
        }
        require_declared(&suite.standard_locale, &suite.identifier)?;

        let mut entries = HashSet::new();
        for text in &suite.texts {
            require_declared(&text.locale, &suite.identifier)?;
            let classifier = text.classifier.as_deref().unwrap_or(DEFAULT_CLASSIFIER);
            if classifier.trim().is_empty() {
                return Err(seed_validation(&format!(
                    "Blank classifier in text suite {}",
                    suite.identifier
                )));
            }
            if !entries.insert((seed_locale(&text.locale)?, classifier)) {
                return Err(seed_validation(&format!(
                    "Duplicate text for {} / {} in text suite {}",
                    text.locale, classifier, suite.identifier
                )));
            }
        }
    }

    let require_suite = |identifier: &str, owner: &str| -> Result<()> {
        if suite_ids.contains(identifier) || suite_in_db(conn, identifier)? {
            Ok(())
        } else {
            Err(seed_validation(&format!(
                "{} references non-existent text suite {}",
                owner, identifier
            )))
        }
    };
    for category in &seed.localized_categories {
        require_suite(&category.texts, "Localized category")?;
    }
    for severity in &seed.allergy_severities {
        require_suite(&severity.names, "Allergy severity")?;
        require_suite(&severity.descriptions, "Allergy severity")?;
    }

    let mut categories = HashSet::new();
    for category in &seed.categories {
        if !categories.insert((category.name.as_str(), category.classification.as_str())) {
            return Err(seed_validation(&format!(
                "Duplicate category {} / {}",
                category.name, category.classification
            )));
        }
    }

    let mut organisations = HashSet::new();
    for org in &seed.organisations {
        if !organisations.insert(org.name.as_str()) {
            return Err(seed_validation(&format!("Duplicate organisation {}", org.name)));
        }
        if let Some(code) = &org.currency {
            code.parse::<Currency>().map_err(|e| {
                seed_validation(&format!("Organisation {}: {}", org.name, e))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_seed() {
        let yaml = r#"
schema_version: 0
locales: [sv-SE, en-GB]
text_suites:
  - identifier: greeting
    standard_locale: sv-SE
    texts:
      - locale: sv-SE
        text: Hej
      - locale: en-GB
        text: Hello
localized_categories:
  - texts: greeting
"#;

        let result = parse_seed_str(yaml);
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[test]
    fn test_reject_invalid_schema_version() {
        let yaml = "schema_version: 99\n";

        let err = parse_seed_str(yaml).unwrap_err();
        assert!(err.to_string().contains("schema_version"));
    }

    #[test]
    fn test_reject_undeclared_standard_locale() {
        let yaml = r#"
schema_version: 0
locales: [en-GB]
text_suites:
  - identifier: greeting
    standard_locale: sv-SE
"#;

        let err = parse_seed_str(yaml).unwrap_err();
        assert!(err.to_string().contains("undeclared locale sv-SE"));
    }

    #[test]
    fn test_reject_duplicate_suite_identifier() {
        let yaml = r#"
schema_version: 0
locales: [sv-SE]
text_suites:
  - identifier: greeting
    standard_locale: sv-SE
  - identifier: greeting
    standard_locale: sv-SE
"#;

        let err = parse_seed_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate text suite identifier"));
    }

    #[test]
    fn test_reject_missing_suite_reference() {
        let yaml = r#"
schema_version: 0
allergy_severities:
  - sort_order: 1
    names: severity.mild
    descriptions: severity.mild.description
"#;

        let err = parse_seed_str(yaml).unwrap_err();
        assert!(err.to_string().contains("non-existent text suite severity.mild"));
    }

    #[test]
    fn test_default_and_explicit_classifier_collide() {
        let yaml = r#"
schema_version: 0
locales: [sv-SE]
text_suites:
  - identifier: greeting
    standard_locale: sv-SE
    texts:
      - locale: sv-SE
        text: Hej
      - locale: sv_SE
        classifier: Default
        text: Tjena
"#;

        let err = parse_seed_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate text"));
    }

    #[test]
    fn test_reject_bad_currency() {
        let yaml = r#"
schema_version: 0
organisations:
  - name: Mithlond
    email_suffix: mithlond.se
    currency: kronor
    visiting_address:
      city: Stockholm
      zip_code: "111 22"
      country: Sweden
"#;

        assert!(parse_seed_str(yaml).is_err());
    }
}
