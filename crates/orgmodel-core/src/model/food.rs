//! Foods, allergies and food preferences

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::Result;
use crate::model::category::Category;
use crate::model::compound_key::CompoundKeyed;
use crate::model::identity::Identity;
use crate::model::locale::Locale;
use crate::model::localization::LocalizedComparable;
use crate::model::ordering::NaturalOrder;
use crate::model::text_suite::{required_text, TextSuite, DEFAULT_CLASSIFIER};
use crate::model::user::InternalUser;

const SEVERITY_SUITE_NAME: &str = "allergy_severity";
const FOOD_PREFERENCE_SUITE_NAME: &str = "food_preference";

/// How severe an allergy is. Lower sort order means milder.
#[derive(Debug, Clone, PartialEq)]
pub struct AllergySeverity {
    pub(crate) id: Identity,
    pub severity_sort_order: i32,
    pub(crate) names: Arc<TextSuite>,
    pub(crate) descriptions: Arc<TextSuite>,
}

impl AllergySeverity {
    pub fn new(severity_sort_order: i32, names: Arc<TextSuite>, descriptions: Arc<TextSuite>) -> Self {
        Self {
            id: Identity::Unassigned,
            severity_sort_order,
            names,
            descriptions,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn names(&self) -> &Arc<TextSuite> {
        &self.names
    }

    pub fn descriptions(&self) -> &Arc<TextSuite> {
        &self.descriptions
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the names suite lacks the locale.
    pub fn name(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.names, SEVERITY_SUITE_NAME, DEFAULT_CLASSIFIER, locale)
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the descriptions suite lacks the locale.
    pub fn description(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.descriptions, SEVERITY_SUITE_NAME, DEFAULT_CLASSIFIER, locale)
    }
}

impl NaturalOrder for AllergySeverity {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.severity_sort_order.cmp(&other.severity_sort_order)
    }
}

impl LocalizedComparable for AllergySeverity {
    type SortKey = (i32, String);

    fn standard_locale(&self) -> &Locale {
        self.names.standard_locale().locale()
    }

    fn localized_key(&self, locale: &Locale) -> Result<Self::SortKey> {
        Ok((self.severity_sort_order, self.name(Some(locale))?))
    }
}

/// A food, classified by a category and a more specific sub category.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub(crate) id: Identity,
    pub category: Arc<Category>,
    pub sub_category: Arc<Category>,
}

impl Food {
    pub fn new(category: Arc<Category>, sub_category: Arc<Category>) -> Self {
        Self {
            id: Identity::Unassigned,
            category,
            sub_category,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

impl NaturalOrder for Food {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.category
            .natural_cmp(&other.category)
            .then_with(|| self.sub_category.natural_cmp(&other.sub_category))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AllergyKey {
    pub food_id: i64,
    pub user_id: i64,
}

/// A user's allergy to a food.
#[derive(Debug, Clone, PartialEq)]
pub struct Allergy {
    key: Option<AllergyKey>,
    pub food: Arc<Food>,
    pub user: Arc<InternalUser>,
    pub severity: Arc<AllergySeverity>,
    pub note: Option<String>,
}

impl Allergy {
    pub fn new(food: Arc<Food>, user: Arc<InternalUser>, severity: Arc<AllergySeverity>) -> Self {
        Self {
            key: None,
            food,
            user,
            severity,
            note: None,
        }
    }
}

impl CompoundKeyed for Allergy {
    type Key = AllergyKey;

    fn key(&self) -> Option<&AllergyKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<AllergyKey> {
        let key = AllergyKey {
            food_id: self.food.id.require("Food")?,
            user_id: self.user.id.require("InternalUser")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl NaturalOrder for Allergy {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.food
            .natural_cmp(&other.food)
            .then_with(|| self.user.natural_cmp(&other.user))
            .then_with(|| self.severity.natural_cmp(&other.severity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoodPreferenceKey {
    pub name_suite_id: i64,
    pub user_id: i64,
}

/// A user's stated food preference (vegetarian, no pork...).
#[derive(Debug, Clone, PartialEq)]
pub struct FoodPreference {
    key: Option<FoodPreferenceKey>,
    pub(crate) names: Arc<TextSuite>,
    pub(crate) descriptions: Arc<TextSuite>,
    pub user: Arc<InternalUser>,
}

impl FoodPreference {
    pub fn new(names: Arc<TextSuite>, descriptions: Arc<TextSuite>, user: Arc<InternalUser>) -> Self {
        Self {
            key: None,
            names,
            descriptions,
            user,
        }
    }

    pub fn names(&self) -> &Arc<TextSuite> {
        &self.names
    }

    pub fn descriptions(&self) -> &Arc<TextSuite> {
        &self.descriptions
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the names suite lacks the locale.
    pub fn name(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.names, FOOD_PREFERENCE_SUITE_NAME, DEFAULT_CLASSIFIER, locale)
    }

    /// # Errors
    ///
    /// [`crate::errors::OrgError::MissingText`] if the descriptions suite lacks the locale.
    pub fn description(&self, locale: Option<&Locale>) -> Result<String> {
        required_text(&self.descriptions, FOOD_PREFERENCE_SUITE_NAME, DEFAULT_CLASSIFIER, locale)
    }
}

impl CompoundKeyed for FoodPreference {
    type Key = FoodPreferenceKey;

    fn key(&self) -> Option<&FoodPreferenceKey> {
        self.key.as_ref()
    }

    fn synchronize_key_values(&mut self) -> Result<FoodPreferenceKey> {
        let key = FoodPreferenceKey {
            name_suite_id: self.names.id.require("TextSuite")?,
            user_id: self.user.id.require("InternalUser")?,
        };
        self.key = Some(key);
        Ok(key)
    }
}

impl LocalizedComparable for FoodPreference {
    /// (first name, last name, user id, preference name)
    type SortKey = (String, String, i64, String);

    fn standard_locale(&self) -> &Locale {
        self.names.standard_locale().locale()
    }

    fn localized_key(&self, locale: &Locale) -> Result<Self::SortKey> {
        Ok((
            self.user.first_name.clone(),
            self.user.last_name.clone(),
            self.user.id.sort_value(),
            self.name(Some(locale))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Address;
    use crate::model::locale::LocaleDefinition;
    use crate::model::localization::{localized_comparator, sort_localized};

    fn suite(identifier: &str, en: &str, sv: &str) -> Arc<TextSuite> {
        let en_us = LocaleDefinition::new("en", "US", "");
        let mut suite = TextSuite::new(identifier, en_us.clone());
        suite.set_text(en_us, DEFAULT_CLASSIFIER, en).unwrap();
        suite
            .set_text(LocaleDefinition::new("sv", "SE", ""), DEFAULT_CLASSIFIER, sv)
            .unwrap();
        Arc::new(suite)
    }

    fn severity(order: i32, en: &str, sv: &str) -> AllergySeverity {
        AllergySeverity::new(
            order,
            suite(&format!("severity.{}.name", order), en, sv),
            suite(&format!("severity.{}.desc", order), en, sv),
        )
    }

    #[test]
    fn test_severity_sort_order_dominates_localized_name() {
        let mut items = vec![
            severity(3, "Lethal", "Dödlig"),
            severity(1, "Mild", "Lindrig"),
            severity(2, "Severe", "Allvarlig"),
        ];
        sort_localized(&mut items, Some(&Locale::new("sv", "SE", ""))).unwrap();

        let orders: Vec<i32> = items.iter().map(|s| s.severity_sort_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_food_preference_orders_by_user_then_name() {
        let bilbo = Arc::new(InternalUser::new("Bilbo", "Baggins", Address::default()));
        let sam = Arc::new(InternalUser::new("Sam", "Gamgee", Address::default()));
        let vegan_sam = FoodPreference::new(suite("vegan", "Vegan", "Vegan"), suite("vegan.d", "-", "-"), sam);
        let vegan_bilbo = FoodPreference::new(
            suite("vegan", "Vegan", "Vegan"),
            suite("vegan.d", "-", "-"),
            bilbo.clone(),
        );
        let lactose_bilbo = FoodPreference::new(
            suite("lactose", "Lactose free", "Laktosfri"),
            suite("lactose.d", "-", "-"),
            bilbo,
        );

        let cmp = localized_comparator::<FoodPreference>(None);
        assert_eq!(cmp(&vegan_bilbo, &vegan_sam).unwrap(), Ordering::Less);
        assert_eq!(cmp(&lactose_bilbo, &vegan_bilbo).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_allergy_key_requires_persisted_food() {
        let veg = Arc::new(Category::new("vegetables", "food", ""));
        let food = Arc::new(Food::new(veg.clone(), veg));
        let user = Arc::new(InternalUser::new("Bilbo", "Baggins", Address::default()));
        let mut allergy = Allergy::new(food, user, Arc::new(severity(1, "Mild", "Lindrig")));

        assert!(matches!(
            allergy.synchronize_key_values(),
            Err(crate::errors::OrgError::UnassignedIdentity { entity: "Food" })
        ));
    }
}
