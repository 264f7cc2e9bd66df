//! Activities, admissions to them, and the venues and calendars they use

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::{OrgError, Result};
use crate::model::address::Address;
use crate::model::category::Category;
use crate::model::compound_key::CompoundKeyed;
use crate::model::finance::Amount;
use crate::model::group::Group;
use crate::model::identity::Identity;
use crate::model::membership::Membership;
use crate::model::ordering::{
    compare_organisational_named_descriptions, Listable, NamedDescription, NaturalOrder, Organisational,
};
use crate::model::organisation::Organisation;

/// A dress code an organisation uses for its activities.
#[derive(Debug, Clone, PartialEq)]
pub struct Dresscode {
    pub(crate) id: Identity,
    pub short_desc: String,
    pub full_desc: String,
    pub organisation: Arc<Organisation>,
    pub dress_code: String,
}

impl Dresscode {
    pub fn new(
        dress_code: impl Into<String>,
        short_desc: impl Into<String>,
        full_desc: impl Into<String>,
        organisation: Arc<Organisation>,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            short_desc: short_desc.into(),
            full_desc: full_desc.into(),
            organisation,
            dress_code: dress_code.into(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl Listable for Dresscode {
    fn short_desc(&self) -> &str {
        &self.short_desc
    }

    fn full_desc(&self) -> &str {
        &self.full_desc
    }

    fn owning_organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for Dresscode {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .natural_cmp(&other.organisation)
            .then_with(|| self.dress_code.cmp(&other.dress_code))
    }
}

/// An external calendar that an organisation publishes activities to.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCalendar {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
    pub organisation: Arc<Organisation>,
    pub time_zone_id: String,
    pub first_day_of_week: Weekday,
    pub calendar_identifier: String,
    pub runtime_environment: String,
}

impl EventCalendar {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        organisation: Arc<Organisation>,
        calendar_identifier: impl Into<String>,
    ) -> Self {
        let time_zone_id = organisation.time_zone_id.clone();
        Self {
            id: Identity::Unassigned,
            name: name.into(),
            description: description.into(),
            organisation,
            time_zone_id,
            first_day_of_week: Weekday::Mon,
            calendar_identifier: calendar_identifier.into(),
            runtime_environment: "production".to_string(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NamedDescription for EventCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Organisational for EventCalendar {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for EventCalendar {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        compare_organisational_named_descriptions(self, other)
    }
}

/// An organised event with admission pricing and deadlines.
///
/// Up to and including the late admission date the regular cost applies;
/// after it the late cost. Admission closes after the last admission date.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub(crate) id: Identity,
    pub name: String,
    pub description: String,
    pub organisation: Arc<Organisation>,
    pub dresscode: Option<Arc<Dresscode>>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    cost: Amount,
    late_admission_cost: Amount,
    pub late_admission_date: NaiveDate,
    pub last_admission_date: NaiveDate,
    pub cancelled: bool,
    pub open_to_general_public: bool,
    pub address_category: Arc<Category>,
    pub address_short_description: String,
    pub location: Address,
    pub responsible: Option<Arc<Group>>,
}

impl Activity {
    /// New activity whose admission closes (without a late fee) on its start date.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the activity ends before it starts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        organisation: Arc<Organisation>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        cost: Amount,
        address_category: Arc<Category>,
        location: Address,
    ) -> Result<Self> {
        if end_time < start_time {
            return Err(OrgError::invalid_input("activity ends before it starts"));
        }
        let start_date = start_time.date();
        Ok(Self {
            id: Identity::Unassigned,
            name: name.into(),
            description: description.into(),
            organisation,
            dresscode: None,
            start_time,
            end_time,
            late_admission_cost: cost.clone(),
            cost,
            late_admission_date: start_date,
            last_admission_date: start_date,
            cancelled: false,
            open_to_general_public: false,
            address_category,
            address_short_description: String::new(),
            location,
            responsible: None,
        })
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn cost(&self) -> &Amount {
        &self.cost
    }

    pub fn late_admission_cost(&self) -> &Amount {
        &self.late_admission_cost
    }

    /// Set the cost applied after `late_admission_date`.
    ///
    /// # Errors
    ///
    /// [`OrgError::CurrencyMismatch`] unless the late cost uses the same
    /// currency as the regular cost.
    pub fn set_late_admission(&mut self, late_cost: Amount, late_admission_date: NaiveDate) -> Result<()> {
        if late_cost.currency() != self.cost.currency() {
            return Err(OrgError::CurrencyMismatch {
                left: late_cost.currency().to_string(),
                right: self.cost.currency().to_string(),
            });
        }
        self.late_admission_cost = late_cost;
        self.late_admission_date = late_admission_date;
        Ok(())
    }

    /// Cost of an admission registered on `date`.
    pub fn admission_cost_on(&self, date: NaiveDate) -> &Amount {
        if date <= self.late_admission_date {
            &self.cost
        } else {
            &self.late_admission_cost
        }
    }

    pub fn is_admission_open(&self, date: NaiveDate) -> bool {
        !self.cancelled && date <= self.last_admission_date
    }
}

impl NamedDescription for Activity {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Organisational for Activity {
    fn organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for Activity {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .natural_cmp(&other.organisation)
            .then_with(|| self.start_time.cmp(&other.start_time))
            .then_with(|| self.name.cmp(&other.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdmissionKey {
    pub activity_id: i64,
    pub membership_id: i64,
}

/// A membership's registration for an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    key: Option<AdmissionKey>,
    pub activity: Arc<Activity>,
    pub admitted: Arc<Membership>,
    pub admitted_by: Option<Arc<Membership>>,
    pub timestamp: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    pub note: Option<String>,
    /// The admitted member is responsible for the activity.
    pub responsible: bool,
}

impl Admission {
    pub fn new(activity: Arc<Activity>, admitted: Arc<Membership>, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: None,
            activity,
            admitted,
            admitted_by: None,
            timestamp,
            last_modified: None,
            note: None,
            responsible: false,
        }
    }

    /// Admission cost at the registration date.
    pub fn cost(&self) -> &Amount {
        self.activity.admission_cost_on(self.timestamp.date_naive())
    }
}

impl CompoundKeyed for Admission {
    type Key = AdmissionKey;

    fn key(&self) -> Option<&AdmissionKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<AdmissionKey> {
        let key = AdmissionKey {
            activity_id: self.activity.id.require("Activity")?,
            membership_id: self.admitted.id.require("Membership")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl NaturalOrder for Admission {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.activity
            .natural_cmp(&other.activity)
            .then_with(|| self.admitted.natural_cmp(&other.admitted))
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}

/// A named, categorized address known to an organisation (a pub, a site...).
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedAddress {
    pub(crate) id: Identity,
    pub short_desc: String,
    pub full_desc: String,
    pub organisation: Arc<Organisation>,
    pub category: Arc<Category>,
    pub address: Address,
}

impl CategorizedAddress {
    pub fn new(
        short_desc: impl Into<String>,
        full_desc: impl Into<String>,
        category: Arc<Category>,
        organisation: Arc<Organisation>,
        address: Address,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            short_desc: short_desc.into(),
            full_desc: full_desc.into(),
            organisation,
            category,
            address,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl Listable for CategorizedAddress {
    fn short_desc(&self) -> &str {
        &self.short_desc
    }

    fn full_desc(&self) -> &str {
        &self.full_desc
    }

    fn owning_organisation(&self) -> &Arc<Organisation> {
        &self.organisation
    }
}

impl NaturalOrder for CategorizedAddress {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .natural_cmp(&other.organisation)
            .then_with(|| self.category.natural_cmp(&other.category))
            .then_with(|| self.address.natural_cmp(&other.address))
    }
}
