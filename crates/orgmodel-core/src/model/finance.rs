//! Currencies and monetary amounts

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::{OrgError, Result};
use crate::model::ordering::NaturalOrder;

/// Minor units per major unit; amounts are stored with two decimals.
pub const MINOR_UNITS: i64 = 100;

/// ISO 4217 currency code (three uppercase ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// # Errors
    ///
    /// [`OrgError::InvalidCurrency`] unless `code` is three ASCII letters.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OrgError::InvalidCurrency {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// The well-known currency with this code, if any.
    pub fn well_known(&self) -> Option<WellKnownCurrency> {
        WellKnownCurrency::ALL
            .into_iter()
            .find(|c| c.code() == self.0)
    }
}

impl FromStr for Currency {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = OrgError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currencies the organisations commonly use, with their display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownCurrency {
    Sek,
    Dkk,
    Nok,
    Eur,
}

impl WellKnownCurrency {
    pub const ALL: [WellKnownCurrency; 4] = [
        WellKnownCurrency::Sek,
        WellKnownCurrency::Dkk,
        WellKnownCurrency::Nok,
        WellKnownCurrency::Eur,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            WellKnownCurrency::Sek => "SEK",
            WellKnownCurrency::Dkk => "DKK",
            WellKnownCurrency::Nok => "NOK",
            WellKnownCurrency::Eur => "EUR",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            WellKnownCurrency::Sek => "krona",
            WellKnownCurrency::Dkk | WellKnownCurrency::Nok => "krone",
            WellKnownCurrency::Eur => "euro",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            WellKnownCurrency::Sek | WellKnownCurrency::Dkk | WellKnownCurrency::Nok => "kronor",
            WellKnownCurrency::Eur => "euros",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WellKnownCurrency::Sek | WellKnownCurrency::Dkk | WellKnownCurrency::Nok => "kr",
            WellKnownCurrency::Eur => "€",
        }
    }

    pub fn currency(&self) -> Currency {
        Currency(self.code().to_string())
    }
}

impl From<WellKnownCurrency> for Currency {
    fn from(value: WellKnownCurrency) -> Self {
        value.currency()
    }
}

/// A sum of money in one currency, held as minor units (hundredths).
///
/// Amounts in different currencies are unordered: `partial_cmp` yields `None`
/// and [`Amount::try_cmp`] fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    minor_units: i64,
    currency: Currency,
}

impl Amount {
    pub fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Whole major units, e.g. `Amount::of(250, sek)` is 250.00 SEK.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidInput`] if the value overflows.
    pub fn of(major_units: i64, currency: Currency) -> Result<Self> {
        major_units
            .checked_mul(MINOR_UNITS)
            .map(|minor| Self::new(minor, currency))
            .ok_or_else(|| OrgError::invalid_input("amount overflows"))
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Compare two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// [`OrgError::CurrencyMismatch`] if the currencies differ.
    pub fn try_cmp(&self, other: &Amount) -> Result<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.minor_units.cmp(&other.minor_units))
    }

    /// # Errors
    ///
    /// [`OrgError::CurrencyMismatch`] if the currencies differ, or
    /// [`OrgError::InvalidInput`] on overflow.
    pub fn checked_add(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_currency(other)?;
        self.minor_units
            .checked_add(other.minor_units)
            .map(|sum| Amount::new(sum, self.currency.clone()))
            .ok_or_else(|| OrgError::invalid_input("amount overflows"))
    }

    fn ensure_same_currency(&self, other: &Amount) -> Result<()> {
        if self.currency != other.currency {
            return Err(OrgError::CurrencyMismatch {
                left: self.currency.code().to_string(),
                right: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

/// Total order for listings: currency code, then value.
impl NaturalOrder for Amount {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.currency
            .cmp(&other.currency)
            .then_with(|| self.minor_units.cmp(&other.minor_units))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        let per = MINOR_UNITS.unsigned_abs();
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            abs / per,
            abs % per,
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sek() -> Currency {
        WellKnownCurrency::Sek.into()
    }

    fn eur() -> Currency {
        WellKnownCurrency::Eur.into()
    }

    #[test]
    fn test_currency_validation() {
        assert_eq!(Currency::new("sek").unwrap().code(), "SEK");
        assert!(matches!(
            Currency::new("SE"),
            Err(OrgError::InvalidCurrency { .. })
        ));
        assert!(Currency::new("S3K").is_err());
    }

    #[test]
    fn test_well_known_currency_names() {
        let dkk = Currency::new("DKK").unwrap().well_known().unwrap();
        assert_eq!(dkk.singular(), "krone");
        assert_eq!(dkk.plural(), "kronor");
        assert_eq!(WellKnownCurrency::Eur.symbol(), "€");
        assert_eq!(Currency::new("USD").unwrap().well_known(), None);
    }

    #[test]
    fn test_compare_same_currency() {
        let small = Amount::new(1050, sek());
        let large = Amount::of(20, sek()).unwrap();
        assert_eq!(small.try_cmp(&large).unwrap(), Ordering::Less);
        assert!(small < large);
    }

    #[test]
    fn test_compare_different_currencies_fails() {
        let a = Amount::new(100, sek());
        let b = Amount::new(100, eur());
        let err = a.try_cmp(&b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot compare amounts in different currencies. [SEK <--> EUR]"
        );
        assert_eq!(a.partial_cmp(&b), None);
        assert!(!(a < b) && !(a > b));
    }

    #[test]
    fn test_checked_add() {
        let sum = Amount::new(150, sek())
            .checked_add(&Amount::new(275, sek()))
            .unwrap();
        assert_eq!(sum, Amount::new(425, sek()));
        assert!(Amount::new(1, sek()).checked_add(&Amount::new(1, eur())).is_err());
        assert!(Amount::new(i64::MAX, sek())
            .checked_add(&Amount::new(1, sek()))
            .is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(1250, sek()).to_string(), "12.50 SEK");
        assert_eq!(Amount::new(-5, eur()).to_string(), "-0.05 EUR");
        assert_eq!(Amount::zero(sek()).to_string(), "0.00 SEK");
    }

    #[test]
    fn test_currency_serde_validates() {
        let parsed: Currency = serde_json::from_str("\"nok\"").unwrap();
        assert_eq!(parsed.code(), "NOK");
        assert!(serde_json::from_str::<Currency>("\"kronor\"").is_err());
    }
}
