//! Seed Format v0 schema
//!
//! Defines the YAML structure for reference data: locales, text suites,
//! categories, allergy severities and organisations.

use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Language tags of the locales the seed uses, e.g. `sv-SE`
    #[serde(default)]
    pub locales: Vec<String>,

    #[serde(default)]
    pub text_suites: Vec<SeedTextSuite>,

    #[serde(default)]
    pub categories: Vec<SeedCategory>,

    #[serde(default)]
    pub localized_categories: Vec<SeedLocalizedCategory>,

    #[serde(default)]
    pub allergy_severities: Vec<SeedAllergySeverity>,

    #[serde(default)]
    pub organisations: Vec<SeedOrganisation>,
}

/// Text suite definition in seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTextSuite {
    /// Suite identifier (stable across imports)
    pub identifier: String,

    /// Language tag of the suite's standard locale
    pub standard_locale: String,

    #[serde(default)]
    pub texts: Vec<SeedText>,
}

/// One localized text of a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedText {
    pub locale: String,

    /// Defaults to the `Default` classifier
    #[serde(default)]
    pub classifier: Option<String>,

    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub classification: String,
    #[serde(default)]
    pub description: String,
}

/// Localized category, pointing at a text suite by identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLocalizedCategory {
    pub texts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAllergySeverity {
    pub sort_order: i32,

    /// Identifier of the suite holding the names
    pub names: String,

    /// Identifier of the suite holding the descriptions
    pub descriptions: String,
}

/// Organisation definition in seed
///
/// Omitted settings keep the organisation defaults (Swedish locale,
/// `Europe/Stockholm`, SEK).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOrganisation {
    pub name: String,
    pub email_suffix: String,
    pub visiting_address: SeedAddress,

    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub time_zone_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub founding_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAddress {
    #[serde(default)]
    pub care_of: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub description: Option<String>,
}
