//! Rebuild a core `Store` from SQLite
//!
//! Rows are turned back into domain values through the public constructors,
//! so every invariant the model enforces is checked again on load. A row that
//! fails those checks is reported as a corrupt row rather than skipped.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use crate::repo::columns::{amount, currency, read_address, select_list, with_address};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use orgmodel_core::errors::ExError;
use orgmodel_core::model::{
    Activity, Address, Admission, Allergy, AllergySeverity, Award, AwardLevel, AwardLevelGrant,
    AwardType, CategorizedAddress, Category, Dresscode, EventCalendar, Food, FoodPreference, Group,
    GroupMembership, GuildMembershipType, InternalUser, LocalizedCategory, Membership,
    MembershipYear, Organisation, YearlyMembership,
};
use orgmodel_core::{log_op_end, log_op_error, log_op_start};
use orgmodel_core::{Entity, Identity, LocaleDefinition, Store, TextSuite};
use rusqlite::{Connection, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Load every table into a fresh `Store`
///
/// Identities and sequences come back exactly as stored, so entities
/// persisted afterwards continue the same id ranges.
pub fn load_store(conn: &Connection) -> Result<Store> {
    log_op_start!("load_store");
    let start = Instant::now();

    let mut loader = Loader {
        conn,
        store: Store::new(),
        rows: 0,
    };
    match loader.load_all() {
        Ok(()) => {
            log_op_end!(
                "load_store",
                duration_ms = start.elapsed().as_millis() as u64,
                rows = loader.rows as u64
            );
            Ok(loader.store)
        }
        Err(e) => {
            log_op_error!(
                "load_store",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

fn query<T, F>(conn: &Connection, sql: &str, map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let mapped = stmt.query_map([], map).map_err(from_rusqlite)?;
    let collected = mapped.collect::<rusqlite::Result<Vec<T>>>();
    collected.map_err(from_rusqlite)
}

/// Resolve a stored reference; a dangling one means the row is corrupt.
fn reference<T: Entity>(store: &Store, id: i64, owner: &'static str, owner_id: i64) -> Result<Arc<T>> {
    store.find::<T>(id).cloned().ok_or_else(|| {
        corrupt_row(
            owner,
            owner_id.to_string(),
            &format!("references missing {} {}", T::ENTITY, id),
        )
    })
}

fn optional_reference<T: Entity>(
    store: &Store,
    id: Option<i64>,
    owner: &'static str,
    owner_id: i64,
) -> Result<Option<Arc<T>>> {
    id.map(|id| reference::<T>(store, id, owner, owner_id))
        .transpose()
}

/// Attach a domain error to the row it came from.
fn invalid(entity: &'static str, id: i64) -> impl FnOnce(orgmodel_core::OrgError) -> ExError {
    move |err| corrupt_row(entity, id.to_string(), &err.to_string())
}

/// Rows keyed by owner id, in storage order
fn group_by_owner<V>(rows: Vec<(i64, V)>) -> BTreeMap<i64, Vec<V>> {
    let mut grouped: BTreeMap<i64, Vec<V>> = BTreeMap::new();
    for (owner, value) in rows {
        grouped.entry(owner).or_default().push(value);
    }
    grouped
}

struct GroupRow {
    id: i64,
    name: String,
    description: String,
    email_list: Option<String>,
    organisation_id: i64,
    parent_id: Option<i64>,
    is_guild: bool,
    quenya_name: Option<String>,
    quenya_prefix: Option<String>,
}

struct ActivityRow {
    id: i64,
    name: String,
    description: String,
    organisation_id: i64,
    dresscode_id: Option<i64>,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    cost_minor: i64,
    late_admission_cost_minor: i64,
    currency: String,
    late_admission_date: NaiveDate,
    last_admission_date: NaiveDate,
    cancelled: bool,
    open_to_general_public: bool,
    address_category_id: i64,
    address_short_description: String,
    location: Address,
    responsible_group_id: Option<i64>,
}

struct AdmissionRow {
    activity_id: i64,
    membership_id: i64,
    admitted_by_id: Option<i64>,
    timestamp: DateTime<Utc>,
    last_modified: Option<DateTime<Utc>>,
    note: Option<String>,
    responsible: bool,
}

struct Loader<'c> {
    conn: &'c Connection,
    store: Store,
    rows: usize,
}

impl Loader<'_> {
    fn restore<T: Entity>(&mut self, mut entity: T, id: i64) -> Result<Arc<T>> {
        *entity.identity_mut() = Identity::Assigned(id);
        let stored = self.store.restore(entity)?;
        self.rows += 1;
        Ok(stored)
    }

    fn load_all(&mut self) -> Result<()> {
        self.load_localization()?;
        self.load_categories()?;
        self.load_organisations()?;
        self.load_users()?;
        self.load_memberships()?;
        self.load_groups()?;
        self.load_awards()?;
        self.load_activities()?;
        self.load_food()?;
        self.load_associations()?;
        self.load_sequences()
    }

    fn load_localization(&mut self) -> Result<()> {
        let locales = query(
            self.conn,
            "SELECT id, language, country, variant FROM locale_definitions ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;
        for (id, language, country, variant) in locales {
            self.restore(LocaleDefinition::new(language, country, variant), id)?;
        }

        let texts = group_by_owner(query(
            self.conn,
            "SELECT suite_id, locale_id, classifier, text FROM localized_texts ORDER BY suite_id, rowid",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    (
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ),
                ))
            },
        )?);
        let suites = query(
            self.conn,
            "SELECT id, suite_identifier, standard_locale_id FROM text_suites ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        for (id, identifier, standard_locale_id) in suites {
            let standard = reference::<LocaleDefinition>(&self.store, standard_locale_id, "TextSuite", id)?;
            let mut suite = TextSuite::new(identifier, LocaleDefinition::clone(&standard));
            for (locale_id, classifier, text) in texts.get(&id).into_iter().flatten() {
                let locale = reference::<LocaleDefinition>(&self.store, *locale_id, "TextSuite", id)?;
                suite
                    .set_text(LocaleDefinition::clone(&locale), classifier, text.as_str())
                    .map_err(invalid("TextSuite", id))?;
            }
            *suite.identity_mut() = Identity::Assigned(id);
            suite
                .synchronize_key_values()
                .map_err(invalid("TextSuite", id))?;
            self.restore(suite, id)?;
        }
        Ok(())
    }

    fn load_categories(&mut self) -> Result<()> {
        let categories = query(
            self.conn,
            "SELECT id, name, classification, description FROM categories ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;
        for (id, name, classification, description) in categories {
            self.restore(Category::new(name, classification, description), id)?;
        }

        let localized = query(
            self.conn,
            "SELECT id, texts_id FROM localized_categories ORDER BY id",
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        for (id, texts_id) in localized {
            let texts = reference::<TextSuite>(&self.store, texts_id, "LocalizedCategory", id)?;
            self.restore(LocalizedCategory::new(texts), id)?;
        }
        Ok(())
    }

    fn load_organisations(&mut self) -> Result<()> {
        let columns = with_address(&[
            "id",
            "name",
            "suffix",
            "phone",
            "bank_account_info",
            "post_account_info",
            "email_suffix",
        ]);
        let sql = format!(
            "SELECT {}, time_zone_id, language, country, standard_currency, founding_year \
             FROM organisations ORDER BY id",
            select_list(&columns)
        );
        let rows = query(self.conn, &sql, |row| {
            let id: i64 = row.get(0)?;
            let mut org = Organisation::new(
                row.get::<_, String>(1)?,
                row.get::<_, String>(6)?,
                read_address(row, 7)?,
            );
            org.suffix = row.get(2)?;
            org.phone = row.get(3)?;
            org.bank_account_info = row.get(4)?;
            org.post_account_info = row.get(5)?;
            org.time_zone_id = row.get(15)?;
            org.language = row.get(16)?;
            org.country = row.get(17)?;
            org.founding_year = row.get(19)?;
            Ok((id, org, row.get::<_, String>(18)?))
        })?;
        for (id, mut org, code) in rows {
            org.standard_currency = currency("Organisation", id, &code)?;
            self.restore(org, id)?;
        }
        Ok(())
    }

    fn load_users(&mut self) -> Result<()> {
        let mut details = group_by_owner(query(
            self.conn,
            "SELECT user_id, contact_type, value FROM user_contact_details ORDER BY user_id, contact_type",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    (row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                ))
            },
        )?);

        let columns = with_address(&[
            "id",
            "identifier_token",
            "first_name",
            "last_name",
            "birthday",
            "personal_number_last4",
        ]);
        let sql = format!("SELECT {} FROM internal_users ORDER BY id", select_list(&columns));
        let rows = query(self.conn, &sql, |row| {
            let id: i64 = row.get(0)?;
            let mut user = InternalUser::with_identifier_token(
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                read_address(row, 6)?,
            );
            user.birthday = row.get(4)?;
            Ok((id, user, row.get::<_, Option<u16>>(5)?))
        })?;

        for (id, mut user, last4) in rows {
            if let Some(digits) = last4 {
                user.set_personal_number_last4(digits)
                    .map_err(invalid("InternalUser", id))?;
            }
            for (contact_type, value) in details.remove(&id).unwrap_or_default() {
                user.set_contact_detail(contact_type, value)
                    .map_err(invalid("InternalUser", id))?;
            }
            self.restore(user, id)?;
        }
        Ok(())
    }

    fn load_memberships(&mut self) -> Result<()> {
        let mut settings = group_by_owner(query(
            self.conn,
            "SELECT membership_id, settings_type, value FROM membership_personal_settings \
             ORDER BY membership_id, settings_type",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    (row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                ))
            },
        )?);

        let rows = query(
            self.conn,
            "SELECT id, alias, sub_alias, email_alias, login_permitted, user_id, organisation_id \
             FROM memberships ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            },
        )?;
        for (id, alias, sub_alias, email_alias, login_permitted, user_id, organisation_id) in rows {
            let user = reference::<InternalUser>(&self.store, user_id, "Membership", id)?;
            let org = reference::<Organisation>(&self.store, organisation_id, "Membership", id)?;
            let mut membership = Membership::new(alias, user, org);
            membership.sub_alias = sub_alias;
            membership.email_alias = email_alias;
            membership.login_permitted = login_permitted;
            for (settings_type, value) in settings.remove(&id).unwrap_or_default() {
                membership.set_personal_setting(settings_type, value);
            }
            self.restore(membership, id)?;
        }

        let years = query(
            self.conn,
            "SELECT id, year, start_date, standard_fee_minor, reduced_fee_minor, expanded_fee_minor, \
             currency, organisation_id FROM membership_years ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, NaiveDate>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            },
        )?;
        for (id, year, start_date, standard, reduced, expanded, code, organisation_id) in years {
            let org = reference::<Organisation>(&self.store, organisation_id, "MembershipYear", id)?;
            let fee_currency = currency("MembershipYear", id, &code)?;
            let mut template = MembershipYear::new(year, amount(standard, &fee_currency), org)
                .map_err(invalid("MembershipYear", id))?;
            template.start_date = start_date;
            template.reduced_fee = reduced.map(|minor| amount(minor, &fee_currency));
            template.expanded_fee = expanded.map(|minor| amount(minor, &fee_currency));
            self.restore(template, id)?;
        }
        Ok(())
    }

    /// Parents may carry higher ids than their children, so groups are
    /// restored in passes until every parent is in place.
    fn load_groups(&mut self) -> Result<()> {
        let mut pending = query(
            self.conn,
            "SELECT id, name, description, email_list, organisation_id, parent_id, is_guild, \
             quenya_name, quenya_prefix FROM org_groups ORDER BY id",
            |row| {
                Ok(GroupRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    email_list: row.get(3)?,
                    organisation_id: row.get(4)?,
                    parent_id: row.get(5)?,
                    is_guild: row.get(6)?,
                    quenya_name: row.get(7)?,
                    quenya_prefix: row.get(8)?,
                })
            },
        )?;

        while !pending.is_empty() {
            let (ready, blocked): (Vec<GroupRow>, Vec<GroupRow>) =
                pending.into_iter().partition(|row| {
                    row.parent_id
                        .map_or(true, |parent| self.store.find::<Group>(parent).is_some())
                });
            if ready.is_empty() {
                let first = &blocked[0];
                return Err(corrupt_row(
                    "Group",
                    first.id.to_string(),
                    "parent group is missing or part of a cycle",
                ));
            }
            for row in ready {
                let group = self.build_group(row)?;
                let id = group.1;
                self.restore(group.0, id)?;
            }
            pending = blocked;
        }

        let types = query(
            self.conn,
            "SELECT id, name, description FROM guild_membership_types ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        for (id, name, description) in types {
            self.restore(GuildMembershipType::new(name, description), id)?;
        }
        Ok(())
    }

    fn build_group(&self, row: GroupRow) -> Result<(Group, i64)> {
        let id = row.id;
        let org = reference::<Organisation>(&self.store, row.organisation_id, "Group", id)?;
        let mut group = if row.is_guild {
            match (row.quenya_name, row.quenya_prefix) {
                (Some(quenya_name), Some(quenya_prefix)) => {
                    Group::guild(row.name, row.description, org, quenya_name, quenya_prefix)
                }
                _ => {
                    return Err(corrupt_row(
                        "Group",
                        id.to_string(),
                        "guild row without quenya name and prefix",
                    ))
                }
            }
        } else {
            Group::new(row.name, row.description, org)
        };
        group.email_list = row.email_list;
        if let Some(parent) = optional_reference::<Group>(&self.store, row.parent_id, "Group", id)? {
            group = group.with_parent(parent).map_err(invalid("Group", id))?;
        }
        Ok((group, id))
    }

    fn load_awards(&mut self) -> Result<()> {
        let types = query(
            self.conn,
            "SELECT id, name, description FROM award_types ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        for (id, name, description) in types {
            self.restore(AwardType::new(name, description), id)?;
        }

        let awards = query(
            self.conn,
            "SELECT id, name, description, award_type_id, organisation_id FROM awards ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;
        for (id, name, description, award_type_id, organisation_id) in awards {
            let award_type = reference::<AwardType>(&self.store, award_type_id, "Award", id)?;
            let org = reference::<Organisation>(&self.store, organisation_id, "Award", id)?;
            self.restore(Award::new(name, description, award_type, org), id)?;
        }

        let levels = query(
            self.conn,
            "SELECT id, level_index, name, description, award_id FROM award_levels ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;
        for (id, index, name, description, award_id) in levels {
            let award = reference::<Award>(&self.store, award_id, "AwardLevel", id)?;
            self.restore(AwardLevel::new(index, name, description, award), id)?;
        }
        Ok(())
    }

    fn load_activities(&mut self) -> Result<()> {
        let dresscodes = query(
            self.conn,
            "SELECT id, dress_code, short_desc, full_desc, organisation_id FROM dresscodes ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;
        for (id, dress_code, short_desc, full_desc, organisation_id) in dresscodes {
            let org = reference::<Organisation>(&self.store, organisation_id, "Dresscode", id)?;
            self.restore(Dresscode::new(dress_code, short_desc, full_desc, org), id)?;
        }

        let calendars = query(
            self.conn,
            "SELECT id, name, description, organisation_id, time_zone_id, first_day_of_week, \
             calendar_identifier, runtime_environment FROM event_calendars ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )?;
        for (id, name, description, organisation_id, time_zone_id, first_day, identifier, environment) in
            calendars
        {
            let org = reference::<Organisation>(&self.store, organisation_id, "EventCalendar", id)?;
            let mut calendar = EventCalendar::new(name, description, org, identifier);
            calendar.time_zone_id = time_zone_id;
            calendar.first_day_of_week = first_day.parse::<Weekday>().map_err(|_| {
                corrupt_row(
                    "EventCalendar",
                    id.to_string(),
                    &format!("unknown weekday {}", first_day),
                )
            })?;
            calendar.runtime_environment = environment;
            self.restore(calendar, id)?;
        }

        let sql = format!(
            "SELECT {} FROM categorized_addresses ORDER BY id",
            select_list(&with_address(&[
                "id",
                "short_desc",
                "full_desc",
                "organisation_id",
                "category_id",
            ]))
        );
        let addresses = query(self.conn, &sql, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                read_address(row, 5)?,
            ))
        })?;
        for (id, short_desc, full_desc, organisation_id, category_id, address) in addresses {
            let org = reference::<Organisation>(&self.store, organisation_id, "CategorizedAddress", id)?;
            let category = reference::<Category>(&self.store, category_id, "CategorizedAddress", id)?;
            self.restore(
                CategorizedAddress::new(short_desc, full_desc, category, org, address),
                id,
            )?;
        }

        let mut columns = with_address(&[
            "id",
            "name",
            "description",
            "organisation_id",
            "dresscode_id",
            "start_time",
            "end_time",
            "cost_minor",
            "late_admission_cost_minor",
            "currency",
            "late_admission_date",
            "last_admission_date",
            "cancelled",
            "open_to_general_public",
            "address_category_id",
            "address_short_description",
        ]);
        columns.push("responsible_group_id");
        let sql = format!("SELECT {} FROM activities ORDER BY id", select_list(&columns));
        let activities = query(self.conn, &sql, |row| {
            Ok(ActivityRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                organisation_id: row.get(3)?,
                dresscode_id: row.get(4)?,
                start_time: row.get(5)?,
                end_time: row.get(6)?,
                cost_minor: row.get(7)?,
                late_admission_cost_minor: row.get(8)?,
                currency: row.get(9)?,
                late_admission_date: row.get(10)?,
                last_admission_date: row.get(11)?,
                cancelled: row.get(12)?,
                open_to_general_public: row.get(13)?,
                address_category_id: row.get(14)?,
                address_short_description: row.get(15)?,
                location: read_address(row, 16)?,
                responsible_group_id: row.get(24)?,
            })
        })?;
        for row in activities {
            let id = row.id;
            let org = reference::<Organisation>(&self.store, row.organisation_id, "Activity", id)?;
            let address_category =
                reference::<Category>(&self.store, row.address_category_id, "Activity", id)?;
            let cost_currency = currency("Activity", id, &row.currency)?;
            let mut activity = Activity::new(
                row.name,
                row.description,
                org,
                row.start_time,
                row.end_time,
                amount(row.cost_minor, &cost_currency),
                address_category,
                row.location,
            )
            .map_err(invalid("Activity", id))?;
            activity
                .set_late_admission(
                    amount(row.late_admission_cost_minor, &cost_currency),
                    row.late_admission_date,
                )
                .map_err(invalid("Activity", id))?;
            activity.last_admission_date = row.last_admission_date;
            activity.cancelled = row.cancelled;
            activity.open_to_general_public = row.open_to_general_public;
            activity.address_short_description = row.address_short_description;
            activity.dresscode =
                optional_reference::<Dresscode>(&self.store, row.dresscode_id, "Activity", id)?;
            activity.responsible =
                optional_reference::<Group>(&self.store, row.responsible_group_id, "Activity", id)?;
            self.restore(activity, id)?;
        }
        Ok(())
    }

    fn load_food(&mut self) -> Result<()> {
        let severities = query(
            self.conn,
            "SELECT id, severity_sort_order, names_id, descriptions_id FROM allergy_severities ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;
        for (id, order, names_id, descriptions_id) in severities {
            let names = reference::<TextSuite>(&self.store, names_id, "AllergySeverity", id)?;
            let descriptions =
                reference::<TextSuite>(&self.store, descriptions_id, "AllergySeverity", id)?;
            self.restore(AllergySeverity::new(order, names, descriptions), id)?;
        }

        let foods = query(
            self.conn,
            "SELECT id, category_id, sub_category_id FROM foods ORDER BY id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        for (id, category_id, sub_category_id) in foods {
            let category = reference::<Category>(&self.store, category_id, "Food", id)?;
            let sub_category = reference::<Category>(&self.store, sub_category_id, "Food", id)?;
            self.restore(Food::new(category, sub_category), id)?;
        }
        Ok(())
    }

    fn load_associations(&mut self) -> Result<()> {
        let enrolments = query(
            self.conn,
            "SELECT membership_year_id, membership_id, amount_minor, currency, payment_date \
             FROM yearly_memberships ORDER BY membership_year_id, membership_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<NaiveDate>>(4)?,
                ))
            },
        )?;
        for (year_id, membership_id, minor, code, payment_date) in enrolments {
            let template = reference::<MembershipYear>(&self.store, year_id, "YearlyMembership", membership_id)?;
            let membership =
                reference::<Membership>(&self.store, membership_id, "YearlyMembership", membership_id)?;
            let mut enrolment = YearlyMembership::new(membership, template);
            match (minor, code, payment_date) {
                (None, None, None) => {}
                (Some(minor), Some(code), Some(date)) => {
                    let paid = amount(minor, &currency("YearlyMembership", membership_id, &code)?);
                    enrolment
                        .register_payment(paid, date)
                        .map_err(invalid("YearlyMembership", membership_id))?;
                }
                _ => {
                    return Err(corrupt_row(
                        "YearlyMembership",
                        membership_id.to_string(),
                        "payment amount, currency and date must be stored together",
                    ))
                }
            }
            self.store.restore_association(enrolment)?;
            self.rows += 1;
        }

        let members = query(
            self.conn,
            "SELECT group_id, membership_id, joined, guild_membership_type_id \
             FROM group_memberships ORDER BY group_id, membership_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, DateTime<Utc>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            },
        )?;
        for (group_id, membership_id, joined, type_id) in members {
            let group = reference::<Group>(&self.store, group_id, "GroupMembership", membership_id)?;
            let membership =
                reference::<Membership>(&self.store, membership_id, "GroupMembership", membership_id)?;
            let member = match optional_reference::<GuildMembershipType>(
                &self.store,
                type_id,
                "GroupMembership",
                membership_id,
            )? {
                Some(membership_type) => {
                    GroupMembership::guild(group, membership, joined, membership_type)
                        .map_err(invalid("GroupMembership", membership_id))?
                }
                None => GroupMembership::new(group, membership, joined),
            };
            self.store.restore_association(member)?;
            self.rows += 1;
        }

        let grants = query(
            self.conn,
            "SELECT award_level_id, membership_id, date_granted, note \
             FROM award_level_grants ORDER BY award_level_id, membership_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, NaiveDate>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?;
        for (level_id, membership_id, date_granted, note) in grants {
            let level = reference::<AwardLevel>(&self.store, level_id, "AwardLevelGrant", membership_id)?;
            let membership =
                reference::<Membership>(&self.store, membership_id, "AwardLevelGrant", membership_id)?;
            let mut grant = AwardLevelGrant::new(level, membership, date_granted);
            grant.note = note;
            self.store.restore_association(grant)?;
            self.rows += 1;
        }

        let admissions = query(
            self.conn,
            "SELECT activity_id, membership_id, admitted_by_id, timestamp, last_modified, note, responsible \
             FROM admissions ORDER BY activity_id, membership_id",
            |row| {
                Ok(AdmissionRow {
                    activity_id: row.get(0)?,
                    membership_id: row.get(1)?,
                    admitted_by_id: row.get(2)?,
                    timestamp: row.get(3)?,
                    last_modified: row.get(4)?,
                    note: row.get(5)?,
                    responsible: row.get(6)?,
                })
            },
        )?;
        for row in admissions {
            let owner = row.membership_id;
            let activity = reference::<Activity>(&self.store, row.activity_id, "Admission", owner)?;
            let admitted = reference::<Membership>(&self.store, owner, "Admission", owner)?;
            let mut admission = Admission::new(activity, admitted, row.timestamp);
            admission.admitted_by =
                optional_reference::<Membership>(&self.store, row.admitted_by_id, "Admission", owner)?;
            admission.last_modified = row.last_modified;
            admission.note = row.note;
            admission.responsible = row.responsible;
            self.store.restore_association(admission)?;
            self.rows += 1;
        }

        let allergies = query(
            self.conn,
            "SELECT food_id, user_id, severity_id, note FROM allergies ORDER BY food_id, user_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?;
        for (food_id, user_id, severity_id, note) in allergies {
            let food = reference::<Food>(&self.store, food_id, "Allergy", user_id)?;
            let user = reference::<InternalUser>(&self.store, user_id, "Allergy", user_id)?;
            let severity = reference::<AllergySeverity>(&self.store, severity_id, "Allergy", user_id)?;
            let mut allergy = Allergy::new(food, user, severity);
            allergy.note = note;
            self.store.restore_association(allergy)?;
            self.rows += 1;
        }

        let preferences = query(
            self.conn,
            "SELECT name_suite_id, user_id, description_suite_id FROM food_preferences \
             ORDER BY name_suite_id, user_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        for (names_id, user_id, descriptions_id) in preferences {
            let names = reference::<TextSuite>(&self.store, names_id, "FoodPreference", user_id)?;
            let descriptions =
                reference::<TextSuite>(&self.store, descriptions_id, "FoodPreference", user_id)?;
            let user = reference::<InternalUser>(&self.store, user_id, "FoodPreference", user_id)?;
            self.store
                .restore_association(FoodPreference::new(names, descriptions, user))?;
            self.rows += 1;
        }
        Ok(())
    }

    fn load_sequences(&mut self) -> Result<()> {
        let sequences = query(
            self.conn,
            "SELECT name, next_value FROM sequences ORDER BY name",
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;
        for (name, next) in sequences {
            self.store.restore_sequence(&name, next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use crate::repo::SqliteRepo;
    use orgmodel_core::ExErrorKind;

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_empty_database_loads_empty_store() {
        let conn = setup_test_db();
        let store = load_store(&conn).unwrap();
        assert_eq!(store.count::<Organisation>(), 0);
        assert_eq!(store.sequences().count(), 0);
    }

    #[test]
    fn test_child_group_loads_before_parent_id() {
        let mut conn = setup_test_db();
        let mut store = Store::new();
        let org = store
            .persist(Organisation::new(
                "Mithlond",
                "mithlond.se",
                Address::new("Storgatan", "1", "Stockholm", "111 22", "Sweden"),
            ))
            .unwrap();
        let council = store.persist(Group::new("Council", "", org.clone())).unwrap();
        let board = store
            .persist(Group::new("Board", "", org).with_parent(council).unwrap())
            .unwrap();
        SqliteRepo::save_store(&mut conn, &store).unwrap();

        // Swap ids so the child row precedes its parent.
        conn.execute_batch(
            "PRAGMA defer_foreign_keys = ON;
             BEGIN;
             UPDATE org_groups SET id = 100 WHERE id = 1;
             UPDATE org_groups SET parent_id = 100 WHERE parent_id = 1;
             COMMIT;",
        )
        .unwrap();

        let loaded = load_store(&conn).unwrap();
        let child = loaded.get::<Group>(board.id().id().unwrap()).unwrap();
        assert_eq!(child.parent().unwrap().name, "Council");
        assert_eq!(child.parent().unwrap().id(), Identity::Assigned(100));
    }

    #[test]
    fn test_bad_currency_is_corrupt_row() {
        let mut conn = setup_test_db();
        let mut store = Store::new();
        store
            .persist(Organisation::new(
                "Mithlond",
                "mithlond.se",
                Address::new("Storgatan", "1", "Stockholm", "111 22", "Sweden"),
            ))
            .unwrap();
        SqliteRepo::save_store(&mut conn, &store).unwrap();
        conn.execute("UPDATE organisations SET standard_currency = 'kr1'", [])
            .unwrap();

        let err = load_store(&conn).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.entity(), Some("Organisation"));
        assert_eq!(err.entity_id(), Some("1"));
    }
}
