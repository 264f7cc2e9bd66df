//! Memberships and the yearly fee bookkeeping attached to them

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{OrgError, Result};
use crate::model::compound_key::CompoundKeyed;
use crate::model::finance::Amount;
use crate::model::identity::Identity;
use crate::model::ordering::{NaturalOrder, Organisational};
use crate::model::organisation::Organisation;
use crate::model::user::InternalUser;

/// Maximum length of a membership alias.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// A user's affiliation with one organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub(crate) id: Identity,
    pub alias: String,
    pub sub_alias: String,
    pub email_alias: Option<String>,
    pub login_permitted: bool,
    pub user: Arc<InternalUser>,
    pub organisation: Arc<Organisation>,
    personal_settings: BTreeMap<String, String>,
}

impl Membership {
    pub fn new(alias: impl Into<String>, user: Arc<InternalUser>, organisation: Arc<Organisation>) -> Self {
        Self {
            id: Identity::Unassigned,
            alias: alias.into(),
            sub_alias: String::new(),
            email_alias: None,
            login_permitted: true,
            user,
            organisation,
            personal_settings: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    /// Full email address, when an alias is set.
    pub fn email_address(&self) -> Option<String> {
        self.email_alias
            .as_ref()
            .map(|alias| format!("{}@{}", alias, self.organisation.email_suffix))
    }

    pub fn personal_settings(&self) -> &BTreeMap<String, String> {
        &self.personal_settings
    }

    pub fn personal_setting(&self, key: &str) -> Option<&str> {
        self.personal_settings.get(key).map(String::as_str)
    }

    /// One value per setting key.
    pub fn set_personal_setting(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.personal_settings.insert(key.into(), value.into())
    }
}

impl Organisational for Membership {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for Membership {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .natural_cmp(&other.organisation)
            .then_with(|| self.alias.cmp(&other.alias))
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.alias, self.organisation.name)
    }
}

/// Fee template for one calendar year of membership in an organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipYear {
    pub(crate) id: Identity,
    pub year: i32,
    pub start_date: NaiveDate,
    pub standard_fee: Amount,
    pub reduced_fee: Option<Amount>,
    pub expanded_fee: Option<Amount>,
    pub organisation: Arc<Organisation>,
}

impl MembershipYear {
    /// New template starting on January 1st of `year`.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the year is out of the calendar range, or
    /// [`OrgError::CurrencyMismatch`] if the fee is not in the organisation's
    /// standard currency.
    pub fn new(year: i32, standard_fee: Amount, organisation: Arc<Organisation>) -> Result<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| OrgError::invalid_input(format!("year {} is out of range", year)))?;
        if standard_fee.currency() != &organisation.standard_currency {
            return Err(OrgError::CurrencyMismatch {
                left: standard_fee.currency().to_string(),
                right: organisation.standard_currency.to_string(),
            });
        }
        Ok(Self {
            id: Identity::Unassigned,
            year,
            start_date,
            standard_fee,
            reduced_fee: None,
            expanded_fee: None,
            organisation,
        })
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl Organisational for MembershipYear {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for MembershipYear {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.organisation.natural_cmp(&other.organisation))
            .then_with(|| self.standard_fee.natural_cmp(&other.standard_fee))
    }
}

/// Key of a [`YearlyMembership`]: (template, membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearlyMembershipKey {
    pub membership_year_id: i64,
    pub membership_id: i64,
}

/// A membership's enrolment in one [`MembershipYear`], with payment tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyMembership {
    key: Option<YearlyMembershipKey>,
    pub membership: Arc<Membership>,
    pub template: Arc<MembershipYear>,
    amount: Option<Amount>,
    payment_date: Option<NaiveDate>,
}

impl YearlyMembership {
    pub fn new(membership: Arc<Membership>, template: Arc<MembershipYear>) -> Self {
        Self {
            key: None,
            membership,
            template,
            amount: None,
            payment_date: None,
        }
    }

    pub fn amount(&self) -> Option<&Amount> {
        self.amount.as_ref()
    }

    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    /// Paid amount in the organisation's standard currency; zero if unpaid.
    pub fn amount_paid(&self) -> Amount {
        self.amount
            .clone()
            .unwrap_or_else(|| Amount::zero(self.membership.organisation.standard_currency.clone()))
    }

    pub fn is_paid(&self) -> bool {
        self.payment_date.is_some()
    }

    /// Record a payment.
    ///
    /// # Errors
    ///
    /// [`OrgError::CurrencyMismatch`] unless the amount is in the
    /// organisation's standard currency.
    pub fn register_payment(&mut self, amount: Amount, date: NaiveDate) -> Result<()> {
        let expected = &self.membership.organisation.standard_currency;
        if amount.currency() != expected {
            return Err(OrgError::CurrencyMismatch {
                left: amount.currency().to_string(),
                right: expected.to_string(),
            });
        }
        self.amount = Some(amount);
        self.payment_date = Some(date);
        Ok(())
    }
}

impl CompoundKeyed for YearlyMembership {
    type Key = YearlyMembershipKey;

    fn key(&self) -> Option<&YearlyMembershipKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<YearlyMembershipKey> {
        let key = YearlyMembershipKey {
            membership_year_id: self.template.id.require("MembershipYear")?,
            membership_id: self.membership.id.require("Membership")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl NaturalOrder for YearlyMembership {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.template
            .natural_cmp(&other.template)
            .then_with(|| self.membership.natural_cmp(&other.membership))
    }
}
