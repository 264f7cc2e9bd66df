//! SQLite repository implementation
//!
//! Writes every table of a core `Store` to SQLite. Entities are upserted by
//! id; association rows and owned detail rows (texts, contact details,
//! personal settings) are replaced, since the store may have removed some.

use crate::errors::{from_rusqlite, Result};
use crate::repo::columns::{address_values, insert_sql, upsert_sql, with_address};
use orgmodel_core::errors::{ExError, OrgError};
use orgmodel_core::model::{GroupKind, GroupMembershipKind};
use orgmodel_core::{log_op_end, log_op_error, log_op_start, Association, Entity, Store};
use rusqlite::types::ToSql;
use rusqlite::Connection;
use std::time::Instant;

/// SQLite repository for the organisation model
pub struct SqliteRepo;

fn id_of<T: Entity>(entity: &T) -> Result<i64> {
    Ok(entity.identity().require(T::ENTITY)?)
}

fn key_of<T: Association>(association: &T) -> Result<T::Key> {
    association
        .key()
        .cloned()
        .ok_or_else(|| ExError::from(OrgError::UnassignedIdentity { entity: T::ENTITY }))
}

fn execute(conn: &Connection, sql: &str, values: &[&dyn ToSql]) -> Result<()> {
    conn.prepare_cached(sql)
        .and_then(|mut stmt| stmt.execute(values))
        .map_err(from_rusqlite)?;
    Ok(())
}

impl SqliteRepo {
    /// Write the whole store in dependency order
    ///
    /// Pass a transaction so a failure leaves the database untouched; see
    /// [`SqliteRepo::save_store`]. Returns the number of rows written.
    pub fn persist_store(conn: &Connection, store: &Store) -> Result<usize> {
        log_op_start!("persist_store");
        let start = Instant::now();

        let rows = Self::persist_store_impl(conn, store).map_err(|e| {
            log_op_error!(
                "persist_store",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "persist_store",
            duration_ms = start.elapsed().as_millis() as u64,
            rows = rows as u64
        );
        Ok(rows)
    }

    /// Persist the store inside a transaction of its own
    pub fn save_store(conn: &mut Connection, store: &Store) -> Result<usize> {
        let tx = conn.transaction().map_err(from_rusqlite)?;
        let rows = Self::persist_store(&tx, store)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn persist_store_impl(conn: &Connection, store: &Store) -> Result<usize> {
        let mut rows = 0;
        rows += Self::persist_sequences(conn, store)?;
        rows += Self::persist_localization(conn, store)?;
        rows += Self::persist_categories(conn, store)?;
        rows += Self::persist_organisations(conn, store)?;
        rows += Self::persist_users(conn, store)?;
        rows += Self::persist_memberships(conn, store)?;
        rows += Self::persist_groups(conn, store)?;
        rows += Self::persist_awards(conn, store)?;
        rows += Self::persist_activities(conn, store)?;
        rows += Self::persist_food(conn, store)?;
        rows += Self::persist_associations(conn, store)?;
        Ok(rows)
    }

    fn persist_sequences(conn: &Connection, store: &Store) -> Result<usize> {
        let mut rows = 0;
        for (name, next) in store.sequences() {
            execute(
                conn,
                "INSERT INTO sequences (name, next_value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET next_value = max(next_value, excluded.next_value)",
                &[&name, &next],
            )?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_localization(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{LocaleDefinition, TextSuite};

        let mut rows = 0;
        let locale_sql = upsert_sql("locale_definitions", &["id", "language", "country", "variant"]);
        for locale in store.list::<LocaleDefinition>() {
            let id = id_of(locale.as_ref())?;
            execute(
                conn,
                &locale_sql,
                &[&id, &locale.language(), &locale.country(), &locale.variant()],
            )?;
            rows += 1;
        }

        let suite_sql = upsert_sql(
            "text_suites",
            &["id", "suite_identifier", "standard_locale_id"],
        );
        let text_sql = insert_sql(
            "localized_texts",
            &["suite_id", "locale_id", "classifier", "text"],
        );
        for suite in store.list::<TextSuite>() {
            let id = id_of(suite.as_ref())?;
            let standard_locale_id = id_of(suite.standard_locale())?;
            execute(
                conn,
                &suite_sql,
                &[&id, &suite.suite_identifier(), &standard_locale_id],
            )?;
            execute(conn, "DELETE FROM localized_texts WHERE suite_id = ?1", &[&id])?;
            for text in suite.texts() {
                let locale_id = id_of(text.locale())?;
                execute(
                    conn,
                    &text_sql,
                    &[&id, &locale_id, &text.classifier(), &text.text()],
                )?;
                rows += 1;
            }
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_categories(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{Category, LocalizedCategory};

        let mut rows = 0;
        let sql = upsert_sql(
            "categories",
            &["id", "name", "classification", "description"],
        );
        for category in store.list::<Category>() {
            let id = id_of(category.as_ref())?;
            execute(
                conn,
                &sql,
                &[&id, &category.name, &category.classification, &category.description],
            )?;
            rows += 1;
        }

        let sql = upsert_sql("localized_categories", &["id", "texts_id"]);
        for category in store.list::<LocalizedCategory>() {
            let id = id_of(category.as_ref())?;
            let texts_id = id_of(category.texts().as_ref())?;
            execute(conn, &sql, &[&id, &texts_id])?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_organisations(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::Organisation;

        let mut columns = with_address(&[
            "id",
            "name",
            "suffix",
            "phone",
            "bank_account_info",
            "post_account_info",
            "email_suffix",
        ]);
        columns.extend([
            "time_zone_id",
            "language",
            "country",
            "standard_currency",
            "founding_year",
        ]);
        let sql = upsert_sql("organisations", &columns);

        let mut rows = 0;
        for org in store.list::<Organisation>() {
            let id = id_of(org.as_ref())?;
            let currency = org.standard_currency.code();
            let mut values: Vec<&dyn ToSql> = vec![
                &id,
                &org.name,
                &org.suffix,
                &org.phone,
                &org.bank_account_info,
                &org.post_account_info,
                &org.email_suffix,
            ];
            values.extend(address_values(&org.visiting_address));
            values.extend::<[&dyn ToSql; 5]>([
                &org.time_zone_id,
                &org.language,
                &org.country,
                &currency,
                &org.founding_year,
            ]);
            execute(conn, &sql, &values)?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_users(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::InternalUser;

        let columns = with_address(&[
            "id",
            "identifier_token",
            "first_name",
            "last_name",
            "birthday",
            "personal_number_last4",
        ]);
        let sql = upsert_sql("internal_users", &columns);
        let detail_sql = insert_sql("user_contact_details", &["user_id", "contact_type", "value"]);

        let mut rows = 0;
        for user in store.list::<InternalUser>() {
            let id = id_of(user.as_ref())?;
            let token = user.identifier_token();
            let last4: Option<u16> = user.personal_number_last4().map(|digits| *digits.expose());
            let mut values: Vec<&dyn ToSql> = vec![
                &id,
                &token,
                &user.first_name,
                &user.last_name,
                &user.birthday,
                &last4,
            ];
            values.extend(address_values(&user.home_address));
            execute(conn, &sql, &values)?;

            execute(conn, "DELETE FROM user_contact_details WHERE user_id = ?1", &[&id])?;
            for (contact_type, value) in user.contact_details() {
                execute(conn, &detail_sql, &[&id, contact_type, value])?;
                rows += 1;
            }
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_memberships(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{Membership, MembershipYear};

        let mut rows = 0;
        let sql = upsert_sql(
            "memberships",
            &[
                "id",
                "alias",
                "sub_alias",
                "email_alias",
                "login_permitted",
                "user_id",
                "organisation_id",
            ],
        );
        let setting_sql = insert_sql(
            "membership_personal_settings",
            &["membership_id", "settings_type", "value"],
        );
        for membership in store.list::<Membership>() {
            let id = id_of(membership.as_ref())?;
            let user_id = id_of(membership.user.as_ref())?;
            let organisation_id = id_of(membership.organisation.as_ref())?;
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &membership.alias,
                    &membership.sub_alias,
                    &membership.email_alias,
                    &membership.login_permitted,
                    &user_id,
                    &organisation_id,
                ],
            )?;

            execute(
                conn,
                "DELETE FROM membership_personal_settings WHERE membership_id = ?1",
                &[&id],
            )?;
            for (settings_type, value) in membership.personal_settings() {
                execute(conn, &setting_sql, &[&id, settings_type, value])?;
                rows += 1;
            }
            rows += 1;
        }

        let sql = upsert_sql(
            "membership_years",
            &[
                "id",
                "year",
                "start_date",
                "standard_fee_minor",
                "reduced_fee_minor",
                "expanded_fee_minor",
                "currency",
                "organisation_id",
            ],
        );
        for year in store.list::<MembershipYear>() {
            let id = id_of(year.as_ref())?;
            let organisation_id = id_of(year.organisation.as_ref())?;
            let standard = year.standard_fee.minor_units();
            let reduced = year.reduced_fee.as_ref().map(|fee| fee.minor_units());
            let expanded = year.expanded_fee.as_ref().map(|fee| fee.minor_units());
            let currency = year.standard_fee.currency().code();
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &year.year,
                    &year.start_date,
                    &standard,
                    &reduced,
                    &expanded,
                    &currency,
                    &organisation_id,
                ],
            )?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_groups(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{Group, GuildMembershipType};

        let mut rows = 0;
        let sql = upsert_sql(
            "org_groups",
            &[
                "id",
                "name",
                "description",
                "email_list",
                "organisation_id",
                "parent_id",
                "is_guild",
                "quenya_name",
                "quenya_prefix",
            ],
        );
        for group in store.list::<Group>() {
            let id = id_of(group.as_ref())?;
            let organisation_id = id_of(group.organisation.as_ref())?;
            let parent_id = group
                .parent()
                .map(|parent| id_of(parent.as_ref()))
                .transpose()?;
            let (quenya_name, quenya_prefix) = match group.kind() {
                GroupKind::Plain => (None, None),
                GroupKind::Guild {
                    quenya_name,
                    quenya_prefix,
                } => (Some(quenya_name), Some(quenya_prefix)),
            };
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &group.name,
                    &group.description,
                    &group.email_list,
                    &organisation_id,
                    &parent_id,
                    &group.is_guild(),
                    &quenya_name,
                    &quenya_prefix,
                ],
            )?;
            rows += 1;
        }

        let sql = upsert_sql("guild_membership_types", &["id", "name", "description"]);
        for membership_type in store.list::<GuildMembershipType>() {
            let id = id_of(membership_type.as_ref())?;
            execute(
                conn,
                &sql,
                &[&id, &membership_type.name, &membership_type.description],
            )?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_awards(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{Award, AwardLevel, AwardType};

        let mut rows = 0;
        let sql = upsert_sql("award_types", &["id", "name", "description"]);
        for award_type in store.list::<AwardType>() {
            let id = id_of(award_type.as_ref())?;
            execute(conn, &sql, &[&id, &award_type.name, &award_type.description])?;
            rows += 1;
        }

        let sql = upsert_sql(
            "awards",
            &["id", "name", "description", "award_type_id", "organisation_id"],
        );
        for award in store.list::<Award>() {
            let id = id_of(award.as_ref())?;
            let award_type_id = id_of(award.award_type.as_ref())?;
            let organisation_id = id_of(award.organisation.as_ref())?;
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &award.name,
                    &award.description,
                    &award_type_id,
                    &organisation_id,
                ],
            )?;
            rows += 1;
        }

        let sql = upsert_sql(
            "award_levels",
            &["id", "level_index", "name", "description", "award_id"],
        );
        for level in store.list::<AwardLevel>() {
            let id = id_of(level.as_ref())?;
            let award_id = id_of(level.award.as_ref())?;
            execute(
                conn,
                &sql,
                &[&id, &level.index, &level.name, &level.description, &award_id],
            )?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_activities(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{Activity, CategorizedAddress, Dresscode, EventCalendar};

        let mut rows = 0;
        let sql = upsert_sql(
            "dresscodes",
            &["id", "short_desc", "full_desc", "organisation_id", "dress_code"],
        );
        for dresscode in store.list::<Dresscode>() {
            let id = id_of(dresscode.as_ref())?;
            let organisation_id = id_of(dresscode.organisation.as_ref())?;
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &dresscode.short_desc,
                    &dresscode.full_desc,
                    &organisation_id,
                    &dresscode.dress_code,
                ],
            )?;
            rows += 1;
        }

        let sql = upsert_sql(
            "event_calendars",
            &[
                "id",
                "name",
                "description",
                "organisation_id",
                "time_zone_id",
                "first_day_of_week",
                "calendar_identifier",
                "runtime_environment",
            ],
        );
        for calendar in store.list::<EventCalendar>() {
            let id = id_of(calendar.as_ref())?;
            let organisation_id = id_of(calendar.organisation.as_ref())?;
            let first_day = calendar.first_day_of_week.to_string();
            execute(
                conn,
                &sql,
                &[
                    &id,
                    &calendar.name,
                    &calendar.description,
                    &organisation_id,
                    &calendar.time_zone_id,
                    &first_day,
                    &calendar.calendar_identifier,
                    &calendar.runtime_environment,
                ],
            )?;
            rows += 1;
        }

        let sql = upsert_sql(
            "categorized_addresses",
            &with_address(&[
                "id",
                "short_desc",
                "full_desc",
                "organisation_id",
                "category_id",
            ]),
        );
        for categorized in store.list::<CategorizedAddress>() {
            let id = id_of(categorized.as_ref())?;
            let organisation_id = id_of(categorized.organisation.as_ref())?;
            let category_id = id_of(categorized.category.as_ref())?;
            let mut values: Vec<&dyn ToSql> = vec![
                &id,
                &categorized.short_desc,
                &categorized.full_desc,
                &organisation_id,
                &category_id,
            ];
            values.extend(address_values(&categorized.address));
            execute(conn, &sql, &values)?;
            rows += 1;
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
        let sql = upsert_sql("activities", &columns);
        for activity in store.list::<Activity>() {
            let id = id_of(activity.as_ref())?;
            let organisation_id = id_of(activity.organisation.as_ref())?;
            let dresscode_id = activity
                .dresscode
                .as_ref()
                .map(|dresscode| id_of(dresscode.as_ref()))
                .transpose()?;
            let cost = activity.cost().minor_units();
            let late_cost = activity.late_admission_cost().minor_units();
            let currency = activity.cost().currency().code();
            let address_category_id = id_of(activity.address_category.as_ref())?;
            let responsible_id = activity
                .responsible
                .as_ref()
                .map(|group| id_of(group.as_ref()))
                .transpose()?;
            let mut values: Vec<&dyn ToSql> = vec![
                &id,
                &activity.name,
                &activity.description,
                &organisation_id,
                &dresscode_id,
                &activity.start_time,
                &activity.end_time,
                &cost,
                &late_cost,
                &currency,
                &activity.late_admission_date,
                &activity.last_admission_date,
                &activity.cancelled,
                &activity.open_to_general_public,
                &address_category_id,
                &activity.address_short_description,
            ];
            values.extend(address_values(&activity.location));
            values.push(&responsible_id);
            execute(conn, &sql, &values)?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_food(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{AllergySeverity, Food};

        let mut rows = 0;
        let sql = upsert_sql(
            "allergy_severities",
            &["id", "severity_sort_order", "names_id", "descriptions_id"],
        );
        for severity in store.list::<AllergySeverity>() {
            let id = id_of(severity.as_ref())?;
            let names_id = id_of(severity.names().as_ref())?;
            let descriptions_id = id_of(severity.descriptions().as_ref())?;
            execute(
                conn,
                &sql,
                &[&id, &severity.severity_sort_order, &names_id, &descriptions_id],
            )?;
            rows += 1;
        }

        let sql = upsert_sql("foods", &["id", "category_id", "sub_category_id"]);
        for food in store.list::<Food>() {
            let id = id_of(food.as_ref())?;
            let category_id = id_of(food.category.as_ref())?;
            let sub_category_id = id_of(food.sub_category.as_ref())?;
            execute(conn, &sql, &[&id, &category_id, &sub_category_id])?;
            rows += 1;
        }
        Ok(rows)
    }

    fn persist_associations(conn: &Connection, store: &Store) -> Result<usize> {
        use orgmodel_core::model::{
            Admission, Allergy, AwardLevelGrant, FoodPreference, GroupMembership, YearlyMembership,
        };

        conn.execute_batch(
            "DELETE FROM yearly_memberships;
             DELETE FROM group_memberships;
             DELETE FROM award_level_grants;
             DELETE FROM admissions;
             DELETE FROM allergies;
             DELETE FROM food_preferences;",
        )
        .map_err(from_rusqlite)?;

        let mut rows = 0;
        let sql = insert_sql(
            "yearly_memberships",
            &[
                "membership_year_id",
                "membership_id",
                "amount_minor",
                "currency",
                "payment_date",
            ],
        );
        for enrolment in store.associations::<YearlyMembership>() {
            let key = key_of(enrolment.as_ref())?;
            let amount = enrolment.amount().map(|a| a.minor_units());
            let currency = enrolment.amount().map(|a| a.currency().code());
            execute(
                conn,
                &sql,
                &[
                    &key.membership_year_id,
                    &key.membership_id,
                    &amount,
                    &currency,
                    &enrolment.payment_date(),
                ],
            )?;
            rows += 1;
        }

        let sql = insert_sql(
            "group_memberships",
            &["group_id", "membership_id", "joined", "guild_membership_type_id"],
        );
        for member in store.associations::<GroupMembership>() {
            let key = key_of(member.as_ref())?;
            let membership_type_id = match member.kind() {
                GroupMembershipKind::Plain => None,
                GroupMembershipKind::Guild { membership_type } => {
                    Some(id_of(membership_type.as_ref())?)
                }
            };
            execute(
                conn,
                &sql,
                &[&key.group_id, &key.membership_id, &member.joined, &membership_type_id],
            )?;
            rows += 1;
        }

        let sql = insert_sql(
            "award_level_grants",
            &["award_level_id", "membership_id", "date_granted", "note"],
        );
        for grant in store.associations::<AwardLevelGrant>() {
            let key = key_of(grant.as_ref())?;
            execute(
                conn,
                &sql,
                &[&key.award_level_id, &key.membership_id, &grant.date_granted, &grant.note],
            )?;
            rows += 1;
        }

        let sql = insert_sql(
            "admissions",
            &[
                "activity_id",
                "membership_id",
                "admitted_by_id",
                "timestamp",
                "last_modified",
                "note",
                "responsible",
            ],
        );
        for admission in store.associations::<Admission>() {
            let key = key_of(admission.as_ref())?;
            let admitted_by_id = admission
                .admitted_by
                .as_ref()
                .map(|admitter| id_of(admitter.as_ref()))
                .transpose()?;
            execute(
                conn,
                &sql,
                &[
                    &key.activity_id,
                    &key.membership_id,
                    &admitted_by_id,
                    &admission.timestamp,
                    &admission.last_modified,
                    &admission.note,
                    &admission.responsible,
                ],
            )?;
            rows += 1;
        }

        let sql = insert_sql("allergies", &["food_id", "user_id", "severity_id", "note"]);
        for allergy in store.associations::<Allergy>() {
            let key = key_of(allergy.as_ref())?;
            let severity_id = id_of(allergy.severity.as_ref())?;
            execute(
                conn,
                &sql,
                &[&key.food_id, &key.user_id, &severity_id, &allergy.note],
            )?;
            rows += 1;
        }

        let sql = insert_sql(
            "food_preferences",
            &["name_suite_id", "user_id", "description_suite_id"],
        );
        for preference in store.associations::<FoodPreference>() {
            let key = key_of(preference.as_ref())?;
            let description_suite_id = id_of(preference.descriptions().as_ref())?;
            execute(
                conn,
                &sql,
                &[&key.name_suite_id, &key.user_id, &description_suite_id],
            )?;
            rows += 1;
        }

        Ok(rows)
    }
}
