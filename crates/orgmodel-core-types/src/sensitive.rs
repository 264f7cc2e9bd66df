//! Redaction wrapper for personal data
//!
//! Member records carry data (personal number digits, identifier tokens) that
//! must stay out of logs and error messages. Wrapping them in `Sensitive<T>`
//! makes `Debug` and `Display` print a fixed marker instead of the value.

use std::fmt;

/// Marker printed in place of a sensitive value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use orgmodel_core_types::Sensitive;
///
/// let digits = Sensitive::new("1234");
/// assert_eq!(format!("{:?}", digits), "***REDACTED***");
/// assert_eq!(digits.expose(), &"1234");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value.
    ///
    /// Only persistence and explicit display paths should call this.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Transform the wrapped value without exposing it.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Sensitive<U> {
        Sensitive(f(self.0))
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
