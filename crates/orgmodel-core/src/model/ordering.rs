//! Natural (locale-independent) ordering and the shared naming contracts

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::organisation::Organisation;

/// Deterministic multi-field ordering of an entity.
///
/// Fields are compared in a fixed sequence and the first non-equal one wins.
/// This is kept apart from `Ord` because entity equality covers every field
/// while the natural order covers only a few.
pub trait NaturalOrder {
    fn natural_cmp(&self, other: &Self) -> Ordering;
}

impl<T: NaturalOrder + ?Sized> NaturalOrder for Arc<T> {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.as_ref().natural_cmp(other.as_ref())
    }
}

impl<T: NaturalOrder + ?Sized> NaturalOrder for &T {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        (**self).natural_cmp(*other)
    }
}

/// Stable sort by natural order.
pub fn sort_natural<T: NaturalOrder>(items: &mut [T]) {
    items.sort_by(|a, b| a.natural_cmp(b));
}

/// Entities with a display name and a free-text description.
pub trait NamedDescription {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

/// Entities owned by an organisation.
pub trait Organisational {
    fn organisation(&self) -> &Arc<Organisation>;
}

/// Entities shown in listings: short and full descriptions plus owner.
pub trait Listable {
    fn short_desc(&self) -> &str;
    fn full_desc(&self) -> &str;
    fn owning_organisation(&self) -> &Arc<Organisation>;
}

/// Name, then description.
pub fn compare_named_descriptions<T: NamedDescription + ?Sized>(left: &T, right: &T) -> Ordering {
    left.name()
        .cmp(right.name())
        .then_with(|| left.description().cmp(right.description()))
}

/// Organisation, then name, then description.
pub fn compare_organisational_named_descriptions<T>(left: &T, right: &T) -> Ordering
where
    T: NamedDescription + Organisational + ?Sized,
{
    left.organisation()
        .natural_cmp(right.organisation())
        .then_with(|| compare_named_descriptions(left, right))
}

/// Owning organisation, then short description, then full description.
pub fn compare_listables<T: Listable + ?Sized>(left: &T, right: &T) -> Ordering {
    left.owning_organisation()
        .natural_cmp(right.owning_organisation())
        .then_with(|| left.short_desc().cmp(right.short_desc()))
        .then_with(|| left.full_desc().cmp(right.full_desc()))
}

/// `None` sorts as the empty string.
pub(crate) fn cmp_opt_str(left: Option<&str>, right: Option<&str>) -> Ordering {
    left.unwrap_or("").cmp(right.unwrap_or(""))
}
