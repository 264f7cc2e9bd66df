use std::cmp::Ordering;
use std::fmt;

use crate::model::address::Address;
use crate::model::finance::{Currency, WellKnownCurrency};
use crate::model::identity::Identity;
use crate::model::locale::Locale;
use crate::model::ordering::NaturalOrder;

/// An organisation: the owner of memberships, groups, activities and awards.
#[derive(Debug, Clone, PartialEq)]
pub struct Organisation {
    pub(crate) id: Identity,
    pub name: String,
    pub suffix: String,
    pub phone: String,
    pub bank_account_info: String,
    pub post_account_info: String,
    pub email_suffix: String,
    pub visiting_address: Address,
    /// IANA zone id, e.g. `Europe/Stockholm`
    pub time_zone_id: String,
    pub language: String,
    pub country: String,
    pub standard_currency: Currency,
    pub founding_year: Option<i32>,
}

impl Organisation {
    pub fn new(name: impl Into<String>, email_suffix: impl Into<String>, visiting_address: Address) -> Self {
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            suffix: String::new(),
            phone: String::new(),
            bank_account_info: String::new(),
            post_account_info: String::new(),
            email_suffix: email_suffix.into(),
            visiting_address,
            time_zone_id: "Europe/Stockholm".to_string(),
            language: "sv".to_string(),
            country: "SE".to_string(),
            standard_currency: WellKnownCurrency::Sek.currency(),
            founding_year: None,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    /// The organisation's working locale, built from its language and country.
    pub fn locale(&self) -> Locale {
        Locale::new(self.language.as_str(), self.country.as_str(), "")
    }
}

impl NaturalOrder for Organisation {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Organisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
