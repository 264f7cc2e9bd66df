//! Locale values and their persisted form

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::errors::{OrgError, Result};
use crate::model::identity::Identity;

/// Language tag used for the root locale.
const UNDETERMINED: &str = "und";

/// Standard locale value: language, country, variant.
///
/// Language is held lowercase and country uppercase; missing parts are empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: String,
    variant: String,
}

impl Locale {
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into().to_ascii_lowercase(),
            country: country.into().to_ascii_uppercase(),
            variant: variant.into(),
        }
    }

    /// The root locale (all parts empty)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Parse a language tag such as `sv`, `sv-SE`, `en_GB` or `no-NO-nynorsk`.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidLocale`] if a subtag is malformed.
    pub fn from_language_tag(tag: &str) -> Result<Self> {
        let invalid = || OrgError::InvalidLocale {
            tag: tag.to_string(),
        };

        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNDETERMINED) {
            return Ok(Self::root());
        }

        let mut parts = trimmed.split(|c: char| c == '-' || c == '_');
        let language = parts.next().unwrap_or_default();
        if !(2..=8).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(invalid());
        }

        let country = match parts.next() {
            None => "",
            Some(c)
                if (c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
                    || (c.len() == 3 && c.chars().all(|ch| ch.is_ascii_digit())) =>
            {
                c
            }
            Some(_) => return Err(invalid()),
        };

        let variant_parts: Vec<&str> = parts.collect();
        if variant_parts
            .iter()
            .any(|v| v.is_empty() || !v.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(invalid());
        }

        let language = if language.eq_ignore_ascii_case(UNDETERMINED) {
            ""
        } else {
            language
        };

        Ok(Self::new(language, country, variant_parts.join("-")))
    }

    /// Render as a language tag, e.g. `sv-SE`.
    pub fn to_language_tag(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Locale {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_language_tag(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.language.is_empty() {
            f.write_str(UNDETERMINED)?;
        } else {
            f.write_str(&self.language)?;
        }
        if !self.country.is_empty() {
            write!(f, "-{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "-{}", self.variant)?;
        }
        Ok(())
    }
}

/// Persisted locale row.
///
/// Equality, hashing and ordering use `(language, country, variant)` only, so
/// a stored definition and a fresh one built from the same [`Locale`] compare
/// equal.
#[derive(Debug, Clone, Default)]
pub struct LocaleDefinition {
    pub(crate) id: Identity,
    locale: Locale,
}

impl LocaleDefinition {
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self::from_locale(Locale::new(language, country, variant))
    }

    pub fn from_locale(locale: Locale) -> Self {
        Self {
            id: Identity::Unassigned,
            locale,
        }
    }

    /// # Errors
    ///
    /// [`OrgError::InvalidLocale`] if the tag cannot be parsed.
    pub fn from_language_tag(tag: &str) -> Result<Self> {
        Locale::from_language_tag(tag).map(Self::from_locale)
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn language(&self) -> &str {
        self.locale.language()
    }

    pub fn country(&self) -> &str {
        self.locale.country()
    }

    pub fn variant(&self) -> &str {
        self.locale.variant()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn to_language_tag(&self) -> String {
        self.locale.to_language_tag()
    }

    /// Whether this definition describes the given locale value.
    pub fn matches(&self, locale: &Locale) -> bool {
        &self.locale == locale
    }
}

impl From<Locale> for LocaleDefinition {
    fn from(locale: Locale) -> Self {
        Self::from_locale(locale)
    }
}

impl From<&LocaleDefinition> for Locale {
    fn from(definition: &LocaleDefinition) -> Self {
        definition.locale.clone()
    }
}

impl PartialEq for LocaleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale
    }
}

impl Eq for LocaleDefinition {}

impl Hash for LocaleDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locale.hash(state);
    }
}

impl PartialOrd for LocaleDefinition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LocaleDefinition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.language()
            .cmp(other.language())
            .then_with(|| self.country().cmp(other.country()))
            .then_with(|| self.variant().cmp(other.variant()))
    }
}

impl fmt::Display for LocaleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.locale.fmt(f)
    }
}
