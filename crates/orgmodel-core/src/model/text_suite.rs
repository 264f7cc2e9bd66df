//! Classified, locale-keyed text
//!
//! A [`TextSuite`] owns a flat list of [`ClassifiedLocalizedText`] entries and a
//! standard locale. Lookups are a linear scan: suites hold a handful of entries
//! (one per locale and classifier), so no index is kept.

use std::collections::BTreeSet;

use crate::errors::{OrgError, Result};
use crate::model::identity::Identity;
use crate::model::locale::{Locale, LocaleDefinition};
use crate::model::localization::Localizable;

/// Classifier used when none is given.
pub const DEFAULT_CLASSIFIER: &str = "Default";

/// Maximum stored length of a single text.
pub const MAX_TEXT_LENGTH: usize = 2048;

/// Compound identity of a text row: (suite, locale, classifier).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassifiedLocalizedTextKey {
    pub suite_id: i64,
    pub locale_id: i64,
    pub classifier: String,
}

/// One (locale, classifier) → text entry within a suite.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLocalizedText {
    key: Option<ClassifiedLocalizedTextKey>,
    pub(crate) locale: LocaleDefinition,
    classifier: String,
    text: String,
}

impl ClassifiedLocalizedText {
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the classifier is blank or the text is
    /// longer than [`MAX_TEXT_LENGTH`] characters.
    pub fn new(
        locale: LocaleDefinition,
        classifier: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self> {
        let classifier = classifier.into();
        let text = text.into();
        if classifier.trim().is_empty() {
            return Err(OrgError::invalid_input("classifier must not be blank"));
        }
        check_text_length(&text)?;
        Ok(Self {
            key: None,
            locale,
            classifier,
            text,
        })
    }

    pub fn key(&self) -> Option<&ClassifiedLocalizedTextKey> {
        self.key.as_ref()
    }

    pub fn locale(&self) -> &LocaleDefinition {
        &self.locale
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copy the owning suite's and the locale's identities into the key.
    ///
    /// # Errors
    ///
    /// [`OrgError::UnassignedIdentity`] if the suite or the locale has not
    /// been persisted yet.
    pub fn synchronize_key_values(&mut self, suite: Identity) -> Result<ClassifiedLocalizedTextKey> {
        let suite_id = suite.require("TextSuite")?;
        let locale_id = self.locale.id().require("LocaleDefinition")?;

        match self.key.as_mut() {
            Some(key) => {
                key.suite_id = suite_id;
                key.locale_id = locale_id;
                key.classifier.clone_from(&self.classifier);
            }
            None => {
                self.key = Some(ClassifiedLocalizedTextKey {
                    suite_id,
                    locale_id,
                    classifier: self.classifier.clone(),
                });
            }
        }

        Ok(ClassifiedLocalizedTextKey {
            suite_id,
            locale_id,
            classifier: self.classifier.clone(),
        })
    }

    fn is_for(&self, locale: &Locale, classifier: &str) -> bool {
        self.classifier == classifier && self.locale.matches(locale)
    }
}

fn check_text_length(text: &str) -> Result<()> {
    let length = text.chars().count();
    if length > MAX_TEXT_LENGTH {
        return Err(OrgError::invalid_input(format!(
            "text is {} characters; at most {} are stored",
            length, MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// Aggregate of localized texts under one identifier.
///
/// Texts are only mutated through the suite; other collaborators get read
/// access via [`TextSuite::texts`] and the lookup methods.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSuite {
    pub(crate) id: Identity,
    suite_identifier: String,
    pub(crate) standard_locale: LocaleDefinition,
    pub(crate) texts: Vec<ClassifiedLocalizedText>,
}

impl TextSuite {
    pub fn new(suite_identifier: impl Into<String>, standard_locale: LocaleDefinition) -> Self {
        Self {
            id: Identity::Unassigned,
            suite_identifier: suite_identifier.into(),
            standard_locale,
            texts: Vec::new(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn suite_identifier(&self) -> &str {
        &self.suite_identifier
    }

    pub fn standard_locale(&self) -> &LocaleDefinition {
        &self.standard_locale
    }

    pub fn set_standard_locale(&mut self, locale: LocaleDefinition) {
        self.standard_locale = locale;
    }

    pub fn texts(&self) -> &[ClassifiedLocalizedText] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Resolve a text.
    ///
    /// A missing locale means the suite's standard locale; a missing classifier
    /// means [`DEFAULT_CLASSIFIER`]. There is no further fallback: if the
    /// effective locale has no entry, the result is `None`.
    pub fn text(&self, locale: Option<&Locale>, classifier: Option<&str>) -> Option<&str> {
        let locale = locale.unwrap_or_else(|| self.standard_locale.locale());
        let classifier = classifier.unwrap_or(DEFAULT_CLASSIFIER);

        self.texts
            .iter()
            .find(|t| t.is_for(locale, classifier))
            .map(|t| t.text())
    }

    /// Insert or replace the text for `(locale, classifier)`.
    ///
    /// Returns the previous text, if any. A replaced entry keeps its key.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the classifier is blank or the text is too long.
    pub fn set_text(
        &mut self,
        locale: LocaleDefinition,
        classifier: &str,
        text: impl Into<String>,
    ) -> Result<Option<String>> {
        let text = text.into();
        check_text_length(&text)?;

        if let Some(existing) = self
            .texts
            .iter_mut()
            .find(|t| t.is_for(locale.locale(), classifier))
        {
            return Ok(Some(std::mem::replace(&mut existing.text, text)));
        }

        self.texts
            .push(ClassifiedLocalizedText::new(locale, classifier, text)?);
        Ok(None)
    }

    /// Remove the text for `(locale, classifier)`, returning it.
    pub fn remove_text(
        &mut self,
        locale: &Locale,
        classifier: &str,
    ) -> Option<ClassifiedLocalizedText> {
        let position = self.texts.iter().position(|t| t.is_for(locale, classifier))?;
        Some(self.texts.remove(position))
    }

    /// Distinct classifiers present in this suite.
    pub fn classifiers(&self) -> BTreeSet<&str> {
        self.texts.iter().map(|t| t.classifier()).collect()
    }

    /// Distinct locales present in this suite.
    pub fn locales(&self) -> BTreeSet<&LocaleDefinition> {
        self.texts.iter().map(|t| t.locale()).collect()
    }

    /// Synchronize the compound key of every owned text with this suite's identity.
    ///
    /// # Errors
    ///
    /// [`OrgError::UnassignedIdentity`] if the suite or any text locale is not persisted.
    pub fn synchronize_key_values(&mut self) -> Result<()> {
        let suite = self.id;
        for text in &mut self.texts {
            text.synchronize_key_values(suite)?;
        }
        Ok(())
    }

    /// Every locale definition the suite refers to, standard locale first.
    pub(crate) fn locale_definitions_mut(&mut self) -> impl Iterator<Item = &mut LocaleDefinition> {
        std::iter::once(&mut self.standard_locale).chain(self.texts.iter_mut().map(|t| &mut t.locale))
    }
}

impl Localizable for TextSuite {
    fn text(&self, locale: Option<&Locale>, classifier: Option<&str>) -> Option<&str> {
        TextSuite::text(self, locale, classifier)
    }
}

/// Resolve a text that must exist.
///
/// The error names the suite, the classifier and the effective locale's
/// language tag. An absent value here means the stored data is incomplete.
///
/// # Errors
///
/// [`OrgError::MissingText`] if the suite has no entry for the effective
/// locale and classifier.
pub fn required_text(
    suite: &TextSuite,
    suite_name: &str,
    classifier: &str,
    locale: Option<&Locale>,
) -> Result<String> {
    let effective = locale.unwrap_or_else(|| suite.standard_locale().locale());
    suite
        .text(Some(effective), Some(classifier))
        .map(str::to_string)
        .ok_or_else(|| OrgError::MissingText {
            suite: suite_name.to_string(),
            classifier: classifier.to_string(),
            locale: effective.to_language_tag(),
        })
}
