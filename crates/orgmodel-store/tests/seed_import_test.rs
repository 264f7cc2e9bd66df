// Integration tests for seed import against a migrated database

mod common;

use common::{count_rows, fixtures_dir, setup_test_db};
use orgmodel_core::model::{sort_localized, AllergySeverity, LocalizedCategory, Organisation};
use orgmodel_core::{ExErrorKind, Locale, Localizable};
use orgmodel_store::repo::load_store;
use orgmodel_store::seed::{compute_seed_digest, import_seed, parse_seed_file};

#[test]
fn test_import_full_seed() {
    let mut conn = setup_test_db();

    import_seed(&fixtures_dir().join("seed_full.yaml"), &mut conn).unwrap();

    assert_eq!(count_rows(&conn, "locale_definitions"), 2);
    assert_eq!(count_rows(&conn, "text_suites"), 6);
    assert_eq!(count_rows(&conn, "localized_texts"), 20);
    assert_eq!(count_rows(&conn, "categories"), 2);
    assert_eq!(count_rows(&conn, "localized_categories"), 2);
    assert_eq!(count_rows(&conn, "allergy_severities"), 2);
    assert_eq!(count_rows(&conn, "organisations"), 1);

    let (name, currency, founding_year): (String, String, Option<i32>) = conn
        .query_row(
            "SELECT name, standard_currency, founding_year FROM organisations",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Mithlond");
    assert_eq!(currency, "SEK");
    assert_eq!(founding_year, Some(1997));
}

#[test]
fn test_digest_matches_parsed_seed() {
    let mut conn = setup_test_db();
    let path = fixtures_dir().join("seed_full.yaml");

    let digest = import_seed(&path, &mut conn).unwrap();
    let expected = compute_seed_digest(&parse_seed_file(&path).unwrap()).unwrap();
    assert_eq!(digest, expected);

    let correlated: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM provenance_events WHERE correlation_id = ?1",
            [&digest],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(correlated, count_rows(&conn, "provenance_events"));
}

#[test]
fn test_reimport_is_idempotent() {
    let mut conn = setup_test_db();
    let path = fixtures_dir().join("seed_full.yaml");

    let first = import_seed(&path, &mut conn).unwrap();
    let texts = count_rows(&conn, "localized_texts");
    let events = count_rows(&conn, "provenance_events");

    let second = import_seed(&path, &mut conn).unwrap();

    assert_eq!(first, second);
    assert_eq!(count_rows(&conn, "text_suites"), 6);
    assert_eq!(count_rows(&conn, "localized_texts"), texts);
    assert_eq!(count_rows(&conn, "organisations"), 1);
    assert_eq!(count_rows(&conn, "allergy_severities"), 2);
    assert!(count_rows(&conn, "provenance_events") > events);
}

#[test]
fn test_extension_seed_builds_on_stored_suites() {
    let mut conn = setup_test_db();
    import_seed(&fixtures_dir().join("seed_full.yaml"), &mut conn).unwrap();

    import_seed(&fixtures_dir().join("seed_extension.yaml"), &mut conn).unwrap();

    assert_eq!(count_rows(&conn, "locale_definitions"), 3);
    assert_eq!(count_rows(&conn, "localized_texts"), 21);

    let store = load_store(&conn).unwrap();
    let mild = store
        .list::<AllergySeverity>()
        .find(|s| s.names().suite_identifier() == "severity.mild")
        .unwrap();
    assert_eq!(mild.severity_sort_order, 5);

    let french = Locale::from_language_tag("fr-FR").unwrap();
    let swedish = Locale::from_language_tag("sv-SE").unwrap();
    assert_eq!(mild.name(Some(&french)).unwrap(), "Légère");
    assert_eq!(mild.name(Some(&swedish)).unwrap(), "Lindrig");
    // Only the names gained a French text
    assert!(mild.description(Some(&french)).is_err());
    assert_eq!(mild.description(None).unwrap(), "Obehag men ingen fara");
}

#[test]
fn test_invalid_seed_leaves_database_untouched() {
    let mut conn = setup_test_db();
    import_seed(&fixtures_dir().join("seed_minimal.yaml"), &mut conn).unwrap();
    let events = count_rows(&conn, "provenance_events");

    let err = import_seed(&fixtures_dir().join("seed_invalid.yaml"), &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.to_string().contains("category.missing"));
    assert_eq!(count_rows(&conn, "localized_categories"), 0);
    assert_eq!(count_rows(&conn, "provenance_events"), events);
}

#[test]
fn test_imported_categories_sort_per_locale() {
    let mut conn = setup_test_db();
    import_seed(&fixtures_dir().join("seed_full.yaml"), &mut conn).unwrap();
    let store = load_store(&conn).unwrap();

    let names = |tag: &str| -> Vec<String> {
        let locale = Locale::from_language_tag(tag).unwrap();
        let mut categories: Vec<LocalizedCategory> = store
            .list::<LocalizedCategory>()
            .map(|c| LocalizedCategory::clone(c))
            .collect();
        sort_localized(&mut categories, Some(&locale)).unwrap();
        categories
            .iter()
            .map(|c| c.name(Some(&locale)).unwrap())
            .collect()
    };

    assert_eq!(names("en-GB"), vec!["Bar", "Cafe"]);
    assert_eq!(names("sv-SE"), vec!["Kafé", "Ölstuga"]);
}

#[test]
fn test_imported_organisation_is_found_by_name() {
    let mut conn = setup_test_db();
    import_seed(&fixtures_dir().join("seed_full.yaml"), &mut conn).unwrap();
    let store = load_store(&conn).unwrap();

    let org: &Organisation = store.find_organisation("Mithlond").unwrap();
    assert_eq!(org.visiting_address.city, "Stockholm");
    assert_eq!(org.phone, "+46 8 123 456");

    let suite = store.find_text_suite("category.cafe").unwrap();
    assert_eq!(suite.text_for("Classification"), Some("Venue"));
}
