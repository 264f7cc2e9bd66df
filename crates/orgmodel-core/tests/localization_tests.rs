#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::*;
use orgmodel_core::model::{
    localized_comparator, required_text, sort_localized, LocalizedCategory, DEFAULT_CLASSIFIER,
};
use orgmodel_core::{ExError, ExErrorKind, Locale, Localizable, OrgError, TextSuite};

fn fr_fr() -> Locale {
    Locale::new("fr", "FR", "")
}

#[test]
fn test_lookup_falls_back_to_standard_locale_and_default_classifier() {
    let suite = bilingual_suite("greetings", "Hello", "Hej");

    assert_eq!(suite.text(None, None), Some("Hello"));
    assert_eq!(suite.text(Some(sv_se().locale()), None), Some("Hej"));
    assert_eq!(suite.text(Some(&fr_fr()), None), None);
    assert_eq!(suite.default_text(), Some("Hello"));
}

#[test]
fn test_lookup_by_language_tag() {
    let suite = bilingual_suite("greetings", "Hello", "Hej");

    assert_eq!(
        suite
            .text_for_language_tag("sv-SE", DEFAULT_CLASSIFIER)
            .unwrap(),
        Some("Hej")
    );
    assert!(matches!(
        suite.text_for_language_tag("e-SE", DEFAULT_CLASSIFIER),
        Err(OrgError::InvalidLocale { .. })
    ));
}

#[test]
fn test_classifiers_are_independent() {
    let mut suite = bilingual_suite("category.pub", "Pub", "Krog");
    suite
        .set_text(en_us(), "Description", "A place serving beer")
        .unwrap();

    assert_eq!(suite.text_for("Description"), Some("A place serving beer"));
    assert_eq!(
        suite.text(Some(sv_se().locale()), Some("Description")),
        None
    );
    assert_eq!(suite.classifiers().len(), 2);
}

#[test]
fn test_set_text_replaces_existing_entry() {
    let mut suite = bilingual_suite("greetings", "Hello", "Hej");
    let previous = suite
        .set_text(en_us(), DEFAULT_CLASSIFIER, "Howdy")
        .unwrap();

    assert_eq!(previous.as_deref(), Some("Hello"));
    assert_eq!(suite.len(), 2);
    assert_eq!(suite.text(None, None), Some("Howdy"));
}

#[test]
fn test_required_text_names_suite_and_locale() {
    let suite = bilingual_suite("greetings", "Hello", "Hej");

    assert_eq!(
        required_text(&suite, "greetings", DEFAULT_CLASSIFIER, None).unwrap(),
        "Hello"
    );

    let err = required_text(&suite, "greetings", DEFAULT_CLASSIFIER, Some(&fr_fr())).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("fr-FR"));
    assert!(message.contains("greetings"));

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::MissingText);
    assert_eq!(ex.entity_id(), Some("greetings"));
}

fn category(identifier: &str, classification: &str, en: &str, sv: &str) -> LocalizedCategory {
    let mut suite: TextSuite = bilingual_suite(identifier, en, sv);
    for locale in [en_us(), sv_se()] {
        suite
            .set_text(locale.clone(), "Classification", classification)
            .unwrap();
        suite.set_text(locale, "Description", "").unwrap();
    }
    LocalizedCategory::new(Arc::new(suite))
}

#[test]
fn test_category_order_follows_caller_locale() {
    // "Bar" sorts before "Cafe" in English; the Swedish names reverse that
    let bar = category("c.bar", "place", "Bar", "Ölstuga");
    let cafe = category("c.cafe", "place", "Cafe", "Kafé");

    let english = en_us().locale().clone();
    let swedish = sv_se().locale().clone();

    let in_english = localized_comparator::<LocalizedCategory>(Some(&english));
    assert_eq!(
        in_english(&bar, &cafe).unwrap(),
        std::cmp::Ordering::Less
    );

    let mut items = vec![bar, cafe];
    sort_localized(&mut items, Some(&swedish)).unwrap();
    let names: Vec<String> = items
        .iter()
        .map(|c| c.name(Some(&swedish)).unwrap())
        .collect();
    assert_eq!(names, vec!["Kafé", "Ölstuga"]);
}

#[test]
fn test_missing_locale_uses_each_standard_locale() {
    let bar = category("c.bar", "place", "Bar", "Ölstuga");
    let cafe = category("c.cafe", "place", "Cafe", "Kafé");

    let comparator = localized_comparator::<LocalizedCategory>(None);
    assert_eq!(comparator(&bar, &cafe).unwrap(), std::cmp::Ordering::Less);
}

#[test]
fn test_sort_with_missing_text_leaves_items_untouched() {
    let bar = category("c.bar", "place", "Bar", "Ölstuga");
    let cafe = category("c.cafe", "place", "Cafe", "Kafé");
    let mut items = vec![cafe, bar];

    let err = sort_localized(&mut items, Some(&fr_fr())).unwrap_err();
    assert!(matches!(err, OrgError::MissingText { .. }));
    assert_eq!(items[0].name(None).unwrap(), "Cafe");
    assert_eq!(items.len(), 2);
}
