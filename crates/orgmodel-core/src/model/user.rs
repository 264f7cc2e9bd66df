use chrono::NaiveDate;
use orgmodel_core_types::Sensitive;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::errors::{OrgError, Result};
use crate::model::address::Address;
use crate::model::identity::Identity;
use crate::model::ordering::NaturalOrder;

/// Conventional contact detail types.
pub mod contact_type {
    pub const EMAIL: &str = "email";
    pub const HOME_PHONE: &str = "home_phone";
    pub const MOBILE_PHONE: &str = "mobile_phone";
}

/// A person known to the system, independent of any organisation.
///
/// Contact details are keyed by type; one value per type.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalUser {
    pub(crate) id: Identity,
    identifier_token: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    personal_number_last4: Option<Sensitive<u16>>,
    pub home_address: Address,
    contact_details: BTreeMap<String, String>,
}

impl InternalUser {
    /// New user with a freshly generated identifier token.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, home_address: Address) -> Self {
        Self::with_identifier_token(Uuid::new_v4().to_string(), first_name, last_name, home_address)
    }

    /// New user bound to an existing external identifier token.
    pub fn with_identifier_token(
        identifier_token: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        home_address: Address,
    ) -> Self {
        Self {
            id: Identity::Unassigned,
            identifier_token: identifier_token.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday: None,
            personal_number_last4: None,
            home_address,
            contact_details: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn identifier_token(&self) -> &str {
        &self.identifier_token
    }

    pub fn personal_number_last4(&self) -> Option<&Sensitive<u16>> {
        self.personal_number_last4.as_ref()
    }

    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] unless `digits` is at most four digits.
    pub fn set_personal_number_last4(&mut self, digits: u16) -> Result<()> {
        if digits > 9999 {
            return Err(OrgError::invalid_input(
                "personal number suffix holds at most four digits",
            ));
        }
        self.personal_number_last4 = Some(Sensitive::new(digits));
        Ok(())
    }

    pub fn contact_details(&self) -> &BTreeMap<String, String> {
        &self.contact_details
    }

    pub fn contact_detail(&self, contact_type: &str) -> Option<&str> {
        self.contact_details.get(contact_type).map(String::as_str)
    }

    /// Set (or replace) the contact detail of the given type.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the type is blank.
    pub fn set_contact_detail(
        &mut self,
        contact_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        let contact_type = contact_type.into();
        if contact_type.trim().is_empty() {
            return Err(OrgError::invalid_input("contact type must not be blank"));
        }
        Ok(self.contact_details.insert(contact_type, value.into()))
    }

    pub fn remove_contact_detail(&mut self, contact_type: &str) -> Option<String> {
        self.contact_details.remove(contact_type)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl NaturalOrder for InternalUser {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.first_name
            .cmp(&other.first_name)
            .then_with(|| self.last_name.cmp(&other.last_name))
            .then_with(|| self.id.sort_value().cmp(&other.id.sort_value()))
    }
}

impl fmt::Display for InternalUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.full_name(), self.id)
    }
}
