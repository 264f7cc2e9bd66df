//! Postal and visiting addresses

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::model::ordering::{cmp_opt_str, NaturalOrder};

/// Address value embedded in organisations, users and categorized addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address {
    pub care_of_line: Option<String>,
    pub department_name: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    pub description: Option<String>,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        number: impl Into<String>,
        city: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: Some(street.into()),
            number: Some(number.into()),
            city: city.into(),
            zip_code: zip_code.into(),
            country: country.into(),
            ..Self::default()
        }
    }

    pub fn with_care_of(mut self, care_of: impl Into<String>) -> Self {
        self.care_of_line = Some(care_of.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department_name = Some(department.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True when a visitor could find the place: street and number are known.
    pub fn has_visiting_address(&self) -> bool {
        let known = |part: &Option<String>| part.as_deref().is_some_and(|p| !p.trim().is_empty());
        known(&self.street) && known(&self.number)
    }
}

impl NaturalOrder for Address {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| self.city.cmp(&other.city))
            .then_with(|| cmp_opt_str(self.street.as_deref(), other.street.as_deref()))
            .then_with(|| cmp_opt_str(self.number.as_deref(), other.number.as_deref()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(care_of) = &self.care_of_line {
            write!(f, "c/o {}, ", care_of)?;
        }
        if let Some(department) = &self.department_name {
            write!(f, "{}, ", department)?;
        }
        match (&self.street, &self.number) {
            (Some(street), Some(number)) => write!(f, "{} {}, ", street, number)?,
            (Some(street), None) => write!(f, "{}, ", street)?,
            _ => {}
        }
        write!(f, "{} {}, {}", self.zip_code, self.city, self.country)
    }
}
