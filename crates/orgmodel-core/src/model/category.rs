//! Categories: plain (single-language) and localized

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::errors::Result;
use crate::model::identity::Identity;
use crate::model::locale::Locale;
use crate::model::localization::LocalizedComparable;
use crate::model::ordering::{NamedDescription, NaturalOrder};
use crate::model::text_suite::{required_text, TextSuite, DEFAULT_CLASSIFIER};

/// Maximum length of a category name or classification.
pub const MAX_CATEGORY_FIELD_LENGTH: usize = 128;

/// A named category within a classification, e.g. `("pub_restaurant", "visitable_address")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub(crate) id: Identity,
    pub name: String,
    pub classification: String,
    pub description: String,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        classification: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            classification: classification.into(),
            description: description.into(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NamedDescription for Category {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl NaturalOrder for Category {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.classification
            .cmp(&other.classification)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.description.cmp(&other.description))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.classification, self.name)
    }
}

/// Source of a standard, well-known [`Category`].
pub trait CategoryProducer {
    fn category(&self) -> Category;

    /// The standard category with a custom description.
    fn create_category_with_description(&self, description: &str) -> Category {
        Category {
            description: description.to_string(),
            ..self.category()
        }
    }
}

/// Address types every organisation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownAddressType {
    Home,
    Visiting,
    Delivery,
    PubRestaurant,
    Shop,
    Outdoors,
    Cafe,
    Site,
}

impl WellKnownAddressType {
    pub const ALL: [WellKnownAddressType; 8] = [
        WellKnownAddressType::Home,
        WellKnownAddressType::Visiting,
        WellKnownAddressType::Delivery,
        WellKnownAddressType::PubRestaurant,
        WellKnownAddressType::Shop,
        WellKnownAddressType::Outdoors,
        WellKnownAddressType::Cafe,
        WellKnownAddressType::Site,
    ];

    pub fn is_mail_delivery_address(&self) -> bool {
        matches!(self, WellKnownAddressType::Delivery)
    }

    pub fn classification(&self) -> &'static str {
        if self.is_mail_delivery_address() {
            "mail_delivery_address"
        } else {
            "visitable_address"
        }
    }

    /// Lowercase constant name, e.g. `pub_restaurant`.
    pub fn category_name(&self) -> &'static str {
        match self {
            WellKnownAddressType::Home => "home",
            WellKnownAddressType::Visiting => "visiting",
            WellKnownAddressType::Delivery => "delivery",
            WellKnownAddressType::PubRestaurant => "pub_restaurant",
            WellKnownAddressType::Shop => "shop",
            WellKnownAddressType::Outdoors => "outdoors",
            WellKnownAddressType::Cafe => "cafe",
            WellKnownAddressType::Site => "site",
        }
    }
}

impl CategoryProducer for WellKnownAddressType {
    fn category(&self) -> Category {
        let classification = self.classification();
        let name = self.category_name();
        Category::new(
            name,
            classification,
            format!("Address type [{} :: {}]", classification, name),
        )
    }
}

/// Classifier holding a localized category's classification.
pub const CLASSIFICATION_CLASSIFIER: &str = "Classification";
/// Classifier holding a localized category's description.
pub const DESCRIPTION_CLASSIFIER: &str = "Description";
/// Suite name used in missing-text errors.
const CATEGORY_SUITE_NAME: &str = "category";

/// A category whose name, classification and description live in a [`TextSuite`].
///
/// The name is the suite's default-classified text.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedCategory {
    pub(crate) id: Identity,
    pub(crate) texts: Arc<TextSuite>,
}

impl LocalizedCategory {
    pub fn new(texts: Arc<TextSuite>) -> Self {
        Self {
            id: Identity::Unassigned,
            texts,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn texts(&self) -> &Arc<TextSuite> {
        &self.texts
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the suite lacks the name.
    pub fn name(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.texts, CATEGORY_SUITE_NAME, DEFAULT_CLASSIFIER, locale)
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the suite lacks the classification.
    pub fn classification(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.texts, CATEGORY_SUITE_NAME, CLASSIFICATION_CLASSIFIER, locale)
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the suite lacks the description.
    pub fn description(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.texts, CATEGORY_SUITE_NAME, DESCRIPTION_CLASSIFIER, locale)
    }
}

impl LocalizedComparable for LocalizedCategory {
    /// (classification, name, description)
    type SortKey = (String, String, String);

    fn standard_locale(&self) -> &Locale {
        self.texts.standard_locale().locale()
    }

    fn localized_key(&self, locale: &Locale) -> Result<Self::SortKey> {
        Ok((
            self.classification(Some(locale))?,
            self.name(Some(locale))?,
            self.description(Some(locale))?,
        ))
    }
}
