use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{OrgError, Result};
use crate::model::{
    Activity, Admission, AdmissionKey, Allergy, AllergyKey, AllergySeverity, Award, AwardLevel,
    AwardLevelGrant, AwardLevelGrantKey, AwardType, CategorizedAddress, Category, CompoundKeyed,
    Dresscode, EventCalendar, Food, FoodPreference, FoodPreferenceKey, Group, GroupMembership,
    GroupMembershipKey, GuildMembershipType, Identity, InternalUser, Locale, LocaleDefinition,
    LocalizedCategory, Membership, MembershipYear, NaturalOrder, Organisation, TextSuite,
    YearlyMembership, YearlyMembershipKey,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Rows of one entity kind keyed by identity.
pub type EntityTable<T> = BTreeMap<i64, Arc<T>>;

/// Rows of one association kind keyed by compound key.
pub type AssociationTable<K, T> = BTreeMap<K, Arc<T>>;

/// One value of a unique constraint, e.g. `("unq_alias_per_org", "Bilbo|1")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub constraint: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }
}

/// A stored entity with a surrogate identity drawn from its own sequence.
///
/// Hooks run in this order on persist: `validate`, `cascade`,
/// `check_references`, the unique check over `unique_keys`, identity
/// assignment, `pre_persist`.
pub trait Entity: Clone + Sized {
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;
    /// Name of the sequence identities are drawn from.
    const SEQUENCE: &'static str;

    fn identity(&self) -> Identity;
    fn identity_mut(&mut self) -> &mut Identity;
    fn table(store: &Store) -> &EntityTable<Self>;
    fn table_mut(store: &mut Store) -> &mut EntityTable<Self>;

    /// Column lengths and required fields.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Persist owned, not yet stored dependents and adopt their identities.
    fn cascade(&mut self, _store: &mut Store) -> Result<()> {
        Ok(())
    }

    fn check_references(&self, _store: &Store) -> Result<()> {
        Ok(())
    }

    /// Values this row contributes to unique constraints. Null columns are
    /// left out, as SQL unique constraints ignore them.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Runs after the identity is assigned, before the row is stored.
    fn pre_persist(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A stored association identified by its compound key.
pub trait Association: CompoundKeyed + Clone + Sized {
    const ENTITY: &'static str;
    /// Name of the primary key constraint, `pk_<table>`.
    const PRIMARY_KEY: &'static str;

    fn table(store: &Store) -> &AssociationTable<Self::Key, Self>;
    fn table_mut(store: &mut Store) -> &mut AssociationTable<Self::Key, Self>;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn cascade(&mut self, _store: &mut Store) -> Result<()> {
        Ok(())
    }

    fn check_references(&self, store: &Store) -> Result<()>;
}

/// In-memory store for the organisation model
///
/// Holds one table per entity kind plus the sequences identities are drawn
/// from. References between entities are `Arc` snapshots taken when the
/// referring entity was built; replacing a row with [`Store::update`] does not
/// rewrite snapshots held elsewhere. Single-threaded: no interior locking.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(crate) sequences: BTreeMap<String, i64>,

    pub(crate) locale_definitions: EntityTable<LocaleDefinition>,
    pub(crate) text_suites: EntityTable<TextSuite>,
    pub(crate) categories: EntityTable<Category>,
    pub(crate) localized_categories: EntityTable<LocalizedCategory>,
    pub(crate) organisations: EntityTable<Organisation>,
    pub(crate) users: EntityTable<InternalUser>,
    pub(crate) memberships: EntityTable<Membership>,
    pub(crate) membership_years: EntityTable<MembershipYear>,
    pub(crate) groups: EntityTable<Group>,
    pub(crate) guild_membership_types: EntityTable<GuildMembershipType>,
    pub(crate) award_types: EntityTable<AwardType>,
    pub(crate) awards: EntityTable<Award>,
    pub(crate) award_levels: EntityTable<AwardLevel>,
    pub(crate) dresscodes: EntityTable<Dresscode>,
    pub(crate) event_calendars: EntityTable<EventCalendar>,
    pub(crate) activities: EntityTable<Activity>,
    pub(crate) categorized_addresses: EntityTable<CategorizedAddress>,
    pub(crate) allergy_severities: EntityTable<AllergySeverity>,
    pub(crate) foods: EntityTable<Food>,

    pub(crate) yearly_memberships: AssociationTable<YearlyMembershipKey, YearlyMembership>,
    pub(crate) group_memberships: AssociationTable<GroupMembershipKey, GroupMembership>,
    pub(crate) award_level_grants: AssociationTable<AwardLevelGrantKey, AwardLevelGrant>,
    pub(crate) admissions: AssociationTable<AdmissionKey, Admission>,
    pub(crate) allergies: AssociationTable<AllergyKey, Allergy>,
    pub(crate) food_preferences: AssociationTable<FoodPreferenceKey, FoodPreference>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op`, putting the store back as it was if it fails. Cascaded
    /// dependents of a rejected row are not left behind.
    fn all_or_nothing<R>(&mut self, op: impl FnOnce(&mut Store) -> Result<R>) -> Result<R> {
        let checkpoint = self.clone();
        let result = op(self);
        if result.is_err() {
            *self = checkpoint;
        }
        result
    }

    // ----- entities -----

    /// Store a new entity and return the stored snapshot.
    ///
    /// # Errors
    ///
    /// * `IdentityAlreadyAssigned` - the entity was persisted before
    /// * `UnassignedIdentity` / `ForeignKeyViolation` - a reference is not stored
    /// * `UniqueViolation` - a unique constraint would be broken
    /// * validation errors from the entity itself
    pub fn persist<T: Entity>(&mut self, entity: T) -> Result<Arc<T>> {
        log_op_start!("persist", entity = T::ENTITY);
        let start = Instant::now();

        let stored = self.all_or_nothing(|store| store.persist_impl(entity)).map_err(|e| {
            log_op_error!(
                "persist",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity = T::ENTITY
            );
            e
        })?;

        log_op_end!(
            "persist",
            duration_ms = start.elapsed().as_millis() as u64,
            entity = T::ENTITY,
            entity_id = stored.identity().sort_value()
        );
        Ok(stored)
    }

    fn persist_impl<T: Entity>(&mut self, mut entity: T) -> Result<Arc<T>> {
        if let Identity::Assigned(id) = entity.identity() {
            return Err(OrgError::IdentityAlreadyAssigned {
                entity: T::ENTITY,
                id,
            });
        }
        entity.validate()?;
        entity.cascade(self)?;
        entity.check_references(self)?;
        self.check_unique(&entity, None)?;

        let id = self.next_sequence_value(T::SEQUENCE);
        entity.identity_mut().assign(id, T::ENTITY)?;
        entity.pre_persist()?;

        let stored = Arc::new(entity);
        T::table_mut(self).insert(id, Arc::clone(&stored));
        Ok(stored)
    }

    /// Replace a stored entity.
    ///
    /// # Errors
    ///
    /// * `UnassignedIdentity` / `NotFound` - the entity is not stored
    /// * reference and unique violations as for [`Store::persist`]
    pub fn update<T: Entity>(&mut self, entity: T) -> Result<Arc<T>> {
        log_op_start!("update", entity = T::ENTITY);
        let start = Instant::now();

        let stored = self.all_or_nothing(|store| store.update_impl(entity)).map_err(|e| {
            log_op_error!(
                "update",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity = T::ENTITY
            );
            e
        })?;

        log_op_end!(
            "update",
            duration_ms = start.elapsed().as_millis() as u64,
            entity = T::ENTITY,
            entity_id = stored.identity().sort_value()
        );
        Ok(stored)
    }

    fn update_impl<T: Entity>(&mut self, mut entity: T) -> Result<Arc<T>> {
        let id = entity.identity().require(T::ENTITY)?;
        if !T::table(self).contains_key(&id) {
            return Err(OrgError::NotFound {
                entity: T::ENTITY,
                id: id.to_string(),
            });
        }
        entity.validate()?;
        entity.cascade(self)?;
        entity.check_references(self)?;
        self.check_unique(&entity, Some(id))?;
        entity.pre_persist()?;

        let stored = Arc::new(entity);
        T::table_mut(self).insert(id, Arc::clone(&stored));
        Ok(stored)
    }

    /// Insert an entity that already carries an identity, e.g. one read back
    /// from the database. The entity's sequence moves past its id.
    ///
    /// # Errors
    ///
    /// `UnassignedIdentity` if the entity has no identity.
    pub fn restore<T: Entity>(&mut self, entity: T) -> Result<Arc<T>> {
        let id = entity.identity().require(T::ENTITY)?;
        let next = self.sequences.entry(T::SEQUENCE.to_string()).or_insert(1);
        *next = (*next).max(id + 1);

        let stored = Arc::new(entity);
        T::table_mut(self).insert(id, Arc::clone(&stored));
        Ok(stored)
    }

    /// # Errors
    ///
    /// `NotFound` if no entity with this id is stored.
    pub fn get<T: Entity>(&self, id: i64) -> Result<Arc<T>> {
        T::table(self)
            .get(&id)
            .cloned()
            .ok_or_else(|| OrgError::NotFound {
                entity: T::ENTITY,
                id: id.to_string(),
            })
    }

    pub fn find<T: Entity>(&self, id: i64) -> Option<&Arc<T>> {
        T::table(self).get(&id)
    }

    /// Stored entities in identity order.
    pub fn list<'a, T: Entity + 'a>(&'a self) -> impl Iterator<Item = &'a Arc<T>> + 'a {
        T::table(self).values()
    }

    /// Stored entities in natural order.
    pub fn list_sorted<T: Entity + NaturalOrder>(&self) -> Vec<Arc<T>> {
        let mut items: Vec<Arc<T>> = T::table(self).values().cloned().collect();
        items.sort_by(|a, b| a.natural_cmp(b));
        items
    }

    pub fn count<T: Entity>(&self) -> usize {
        T::table(self).len()
    }

    // ----- associations -----

    /// Store a new association under its synchronized key.
    ///
    /// # Errors
    ///
    /// * `UnassignedIdentity` - a linked entity has not been persisted
    /// * `ForeignKeyViolation` - a linked entity is not stored
    /// * `UniqueViolation` on the primary key - the pair is already linked
    pub fn persist_association<T: Association>(&mut self, association: T) -> Result<Arc<T>> {
        log_op_start!("persist_association", entity = T::ENTITY);
        let start = Instant::now();

        let stored = self
            .all_or_nothing(|store| store.persist_association_impl(association))
            .map_err(|e| {
            log_op_error!(
                "persist_association",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity = T::ENTITY
            );
            e
        })?;

        log_op_end!(
            "persist_association",
            duration_ms = start.elapsed().as_millis() as u64,
            entity = T::ENTITY
        );
        Ok(stored)
    }

    fn persist_association_impl<T: Association>(&mut self, mut association: T) -> Result<Arc<T>> {
        association.validate()?;
        association.cascade(self)?;
        let key = association.synchronize_key_values()?;
        association.check_references(self)?;

        if T::table(self).contains_key(&key) {
            return Err(OrgError::UniqueViolation {
                constraint: T::PRIMARY_KEY,
                entity: T::ENTITY,
                key: format!("{:?}", key),
            });
        }

        let stored = Arc::new(association);
        T::table_mut(self).insert(key, Arc::clone(&stored));
        Ok(stored)
    }

    /// Replace a stored association with the same key.
    ///
    /// # Errors
    ///
    /// `NotFound` if no association with this key is stored, plus the
    /// reference errors of [`Store::persist_association`].
    pub fn update_association<T: Association>(&mut self, association: T) -> Result<Arc<T>> {
        self.all_or_nothing(|store| store.update_association_impl(association))
    }

    fn update_association_impl<T: Association>(&mut self, mut association: T) -> Result<Arc<T>> {
        association.validate()?;
        association.cascade(self)?;
        let key = association.synchronize_key_values()?;
        association.check_references(self)?;
        if !T::table(self).contains_key(&key) {
            return Err(OrgError::NotFound {
                entity: T::ENTITY,
                id: format!("{:?}", key),
            });
        }
        let stored = Arc::new(association);
        T::table_mut(self).insert(key, Arc::clone(&stored));
        Ok(stored)
    }

    /// Insert an association read back from the database.
    ///
    /// # Errors
    ///
    /// `UnassignedIdentity` if a linked entity has no identity.
    pub fn restore_association<T: Association>(&mut self, mut association: T) -> Result<Arc<T>> {
        let key = association.synchronize_key_values()?;
        let stored = Arc::new(association);
        T::table_mut(self).insert(key, Arc::clone(&stored));
        Ok(stored)
    }

    /// # Errors
    ///
    /// `NotFound` if nothing is stored under `key`.
    pub fn remove_association<T: Association>(&mut self, key: &T::Key) -> Result<Arc<T>> {
        let removed = T::table_mut(self)
            .remove(key)
            .ok_or_else(|| OrgError::NotFound {
                entity: T::ENTITY,
                id: format!("{:?}", key),
            })?;
        tracing::debug!(entity = T::ENTITY, key = ?key, "association removed");
        Ok(removed)
    }

    pub fn get_association<T: Association>(&self, key: &T::Key) -> Option<&Arc<T>> {
        T::table(self).get(key)
    }

    /// Stored associations in key order.
    pub fn associations<'a, T: Association + 'a>(&'a self) -> impl Iterator<Item = &'a Arc<T>> + 'a
    where
        T::Key: 'a,
    {
        T::table(self).values()
    }

    // ----- sequences -----

    /// Next value a sequence will hand out; 1 for an unused sequence.
    pub fn sequence_next(&self, name: &str) -> i64 {
        self.sequences.get(name).copied().unwrap_or(1)
    }

    /// Every sequence that has handed out or restored a value.
    pub fn sequences(&self) -> impl Iterator<Item = (&str, i64)> {
        self.sequences.iter().map(|(name, next)| (name.as_str(), *next))
    }

    /// Set a sequence's next value, never moving it backwards.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `next` is below 1.
    pub fn restore_sequence(&mut self, name: &str, next: i64) -> Result<()> {
        if next < 1 {
            return Err(OrgError::invalid_input(format!(
                "sequence {} cannot restart at {}",
                name, next
            )));
        }
        let current = self.sequences.entry(name.to_string()).or_insert(1);
        *current = (*current).max(next);
        Ok(())
    }

    fn next_sequence_value(&mut self, name: &'static str) -> i64 {
        let next = self.sequences.entry(name.to_string()).or_insert(1);
        let value = *next;
        *next += 1;
        value
    }

    // ----- integrity helpers -----

    /// Resolve a reference for a foreign key check.
    ///
    /// # Errors
    ///
    /// `UnassignedIdentity` if the target was never persisted, or
    /// `ForeignKeyViolation` if it is not in this store.
    pub(crate) fn require_ref<T: Entity>(&self, constraint: &'static str, target: &T) -> Result<i64> {
        let id = target.identity().require(T::ENTITY)?;
        if T::table(self).contains_key(&id) {
            Ok(id)
        } else {
            Err(OrgError::ForeignKeyViolation {
                constraint,
                entity: T::ENTITY,
                id,
            })
        }
    }

    fn check_unique<T: Entity>(&self, entity: &T, exclude: Option<i64>) -> Result<()> {
        let keys = entity.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        for (id, existing) in T::table(self) {
            if Some(*id) == exclude {
                continue;
            }
            for existing_key in existing.unique_keys() {
                if keys.contains(&existing_key) {
                    return Err(OrgError::UniqueViolation {
                        constraint: existing_key.constraint,
                        entity: T::ENTITY,
                        key: existing_key.value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Give an unpersisted locale the identity of the stored definition with
    /// the same value, persisting it first if there is none.
    pub(crate) fn cascade_locale(&mut self, locale: &mut LocaleDefinition) -> Result<()> {
        if locale.id.is_assigned() {
            return Ok(());
        }
        let existing = self.find_locale(locale.locale()).map(|stored| stored.id());
        let id = match existing {
            Some(identity) => identity.require(LocaleDefinition::ENTITY)?,
            None => self
                .persist(locale.clone())?
                .id()
                .require(LocaleDefinition::ENTITY)?,
        };
        locale.id.assign(id, LocaleDefinition::ENTITY)
    }

    /// Persist an unpersisted suite and swap in the stored snapshot.
    pub(crate) fn cascade_suite(&mut self, suite: &mut Arc<TextSuite>) -> Result<()> {
        if suite.id().is_assigned() {
            return Ok(());
        }
        *suite = self.persist((**suite).clone())?;
        Ok(())
    }

    // ----- queries -----

    pub fn find_locale(&self, locale: &Locale) -> Option<&Arc<LocaleDefinition>> {
        self.locale_definitions.values().find(|d| d.matches(locale))
    }

    pub fn find_text_suite(&self, suite_identifier: &str) -> Option<&Arc<TextSuite>> {
        self.text_suites
            .values()
            .find(|s| s.suite_identifier() == suite_identifier)
    }

    pub fn find_organisation(&self, name: &str) -> Option<&Arc<Organisation>> {
        self.organisations.values().find(|o| o.name == name)
    }

    /// Memberships of an organisation in natural order.
    pub fn memberships_of(&self, organisation_id: i64) -> Vec<Arc<Membership>> {
        let mut found: Vec<Arc<Membership>> = self
            .memberships
            .values()
            .filter(|m| m.organisation.id().id() == Some(organisation_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.natural_cmp(b));
        found
    }

    /// Admissions to an activity in natural order.
    pub fn admissions_for(&self, activity_id: i64) -> Vec<Arc<Admission>> {
        let range = AdmissionKey {
            activity_id,
            membership_id: i64::MIN,
        }..=AdmissionKey {
            activity_id,
            membership_id: i64::MAX,
        };
        let mut found: Vec<Arc<Admission>> = self.admissions.range(range).map(|(_, a)| a.clone()).collect();
        found.sort_by(|a, b| a.natural_cmp(b));
        found
    }

    /// Memberships of a group (or guild) in natural order.
    pub fn group_members(&self, group_id: i64) -> Vec<Arc<GroupMembership>> {
        let range = GroupMembershipKey {
            group_id,
            membership_id: i64::MIN,
        }..=GroupMembershipKey {
            group_id,
            membership_id: i64::MAX,
        };
        let mut found: Vec<Arc<GroupMembership>> =
            self.group_memberships.range(range).map(|(_, g)| g.clone()).collect();
        found.sort_by(|a, b| a.natural_cmp(b));
        found
    }

    /// Yearly enrolments of a membership, oldest year first.
    pub fn yearly_memberships_of(&self, membership_id: i64) -> Vec<Arc<YearlyMembership>> {
        let mut found: Vec<Arc<YearlyMembership>> = self
            .yearly_memberships
            .iter()
            .filter(|(key, _)| key.membership_id == membership_id)
            .map(|(_, y)| y.clone())
            .collect();
        found.sort_by(|a, b| a.natural_cmp(b));
        found
    }

    /// Allergies registered for a user.
    pub fn allergies_of(&self, user_id: i64) -> Vec<Arc<Allergy>> {
        let mut found: Vec<Arc<Allergy>> = self
            .allergies
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(_, a)| a.clone())
            .collect();
        found.sort_by(|a, b| a.natural_cmp(b));
        found
    }
}
