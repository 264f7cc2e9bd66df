//! Domain model: entities, value types and their orderings

pub mod activity;
pub mod address;
pub mod award;
pub mod category;
pub mod compound_key;
pub mod finance;
pub mod food;
pub mod group;
pub mod identity;
pub mod locale;
pub mod localization;
pub mod membership;
pub mod ordering;
pub mod organisation;
pub mod text_suite;
pub mod user;

pub use activity::{Activity, Admission, AdmissionKey, CategorizedAddress, Dresscode, EventCalendar};
pub use address::Address;
pub use award::{Award, AwardLevel, AwardLevelGrant, AwardLevelGrantKey, AwardType};
pub use category::{Category, CategoryProducer, LocalizedCategory, WellKnownAddressType};
pub use compound_key::CompoundKeyed;
pub use finance::{Amount, Currency, WellKnownCurrency};
pub use food::{Allergy, AllergyKey, AllergySeverity, Food, FoodPreference, FoodPreferenceKey};
pub use group::{
    Group, GroupKind, GroupMembership, GroupMembershipKey, GroupMembershipKind, GuildMembershipType,
};
pub use identity::Identity;
pub use locale::{Locale, LocaleDefinition};
pub use localization::{localized_comparator, sort_localized, Localizable, LocalizedComparable};
pub use membership::{Membership, MembershipYear, YearlyMembership, YearlyMembershipKey};
pub use ordering::{sort_natural, Listable, NamedDescription, NaturalOrder, Organisational};
pub use organisation::Organisation;
pub use text_suite::{
    required_text, ClassifiedLocalizedText, ClassifiedLocalizedTextKey, TextSuite, DEFAULT_CLASSIFIER,
};
pub use user::InternalUser;
