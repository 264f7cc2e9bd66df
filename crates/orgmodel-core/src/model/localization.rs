//! Capability traits for locale-dependent text and ordering

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::Result;
use crate::model::locale::Locale;

/// Something that can resolve text by locale and classifier.
pub trait Localizable {
    /// Resolve a text; `None` arguments fall back to the standard locale and
    /// the default classifier.
    fn text(&self, locale: Option<&Locale>, classifier: Option<&str>) -> Option<&str>;

    /// Standard locale, default classifier.
    fn default_text(&self) -> Option<&str> {
        self.text(None, None)
    }

    /// Standard locale, given classifier.
    fn text_for(&self, classifier: &str) -> Option<&str> {
        self.text(None, Some(classifier))
    }

    /// Resolve using a language tag such as `sv-SE`.
    ///
    /// # Errors
    ///
    /// [`crate::errors::OrgError::InvalidLocale`] if the tag cannot be parsed.
    fn text_for_language_tag(&self, language_tag: &str, classifier: &str) -> Result<Option<&str>> {
        let locale = Locale::from_language_tag(language_tag)?;
        Ok(self.text(Some(&locale), Some(classifier)))
    }
}

/// Ordering that depends on the caller's locale.
///
/// Implementors produce a sort key for a given locale; comparators compare keys.
/// Key resolution may fail when a required text is missing.
pub trait LocalizedComparable {
    type SortKey: Ord;

    /// Locale used when the caller supplies none.
    fn standard_locale(&self) -> &Locale;

    /// Sort key in the given locale.
    ///
    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if a text needed for the key is absent.
    fn localized_key(&self, locale: &Locale) -> Result<Self::SortKey>;

    /// Compare with `other` in the given locale.
    ///
    /// # Errors
    ///
    /// Propagates key resolution failures from either side.
    fn compare_localized(&self, other: &Self, locale: Option<&Locale>) -> Result<Ordering> {
        let left = self.localized_key(effective_locale(self, locale))?;
        let right = other.localized_key(effective_locale(other, locale))?;
        Ok(left.cmp(&right))
    }
}

impl<T: LocalizedComparable> LocalizedComparable for Arc<T> {
    type SortKey = T::SortKey;

    fn standard_locale(&self) -> &Locale {
        self.as_ref().standard_locale()
    }

    fn localized_key(&self, locale: &Locale) -> Result<Self::SortKey> {
        self.as_ref().localized_key(locale)
    }
}

/// The locale to use for `item`: the supplied one, or the item's own standard
/// locale (logged, since it usually means the caller forgot to pass one).
pub fn effective_locale<'a, T>(item: &'a T, locale: Option<&'a Locale>) -> &'a Locale
where
    T: LocalizedComparable + ?Sized,
{
    match locale {
        Some(locale) => locale,
        None => {
            let fallback = item.standard_locale();
            tracing::info!(
                locale = %fallback,
                "no comparator locale supplied; using the text suite's standard locale"
            );
            fallback
        }
    }
}

/// Build a comparator for the given locale.
///
/// The comparator is a pure function of the locale: the same locale always
/// yields the same ordering.
pub fn localized_comparator<'l, T>(
    locale: Option<&'l Locale>,
) -> impl Fn(&T, &T) -> Result<Ordering> + 'l
where
    T: LocalizedComparable + 'l,
{
    move |left: &T, right: &T| {
        let left_key = left.localized_key(effective_locale(left, locale))?;
        let right_key = right.localized_key(effective_locale(right, locale))?;
        Ok(left_key.cmp(&right_key))
    }
}

/// Stable sort in the given locale. Keys are resolved up front, so a missing
/// text leaves `items` untouched.
///
/// # Errors
///
/// Propagates the first key resolution failure.
pub fn sort_localized<T>(items: &mut Vec<T>, locale: Option<&Locale>) -> Result<()>
where
    T: LocalizedComparable,
{
    let keys = items
        .iter()
        .map(|item| item.localized_key(effective_locale(item, locale)))
        .collect::<Result<Vec<_>>>()?;

    let mut keyed: Vec<(T::SortKey, T)> = keys.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
    Ok(())
}
