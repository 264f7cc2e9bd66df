use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use orgmodel_core::model::{
    Activity, Address, Admission, Allergy, AllergySeverity, Amount, Award, AwardLevel,
    AwardLevelGrant, AwardType, CategorizedAddress, Category, Currency, Dresscode, EventCalendar,
    Food, FoodPreference, Group, GroupMembership, GuildMembershipType, InternalUser,
    LocaleDefinition, LocalizedCategory, Membership, MembershipYear, Organisation, TextSuite,
    WellKnownCurrency, YearlyMembership, DEFAULT_CLASSIFIER,
};
use orgmodel_core::Store;
use rusqlite::Connection;

/// In-memory database with foreign keys on and every migration applied
#[allow(dead_code)]
pub fn setup_test_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    orgmodel_store::db::configure(&conn, orgmodel_store::JournalMode::Memory).unwrap();
    orgmodel_store::migrations::apply_migrations(&mut conn).unwrap();
    conn
}

#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[allow(dead_code)]
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

#[allow(dead_code)]
pub fn stockholm() -> Address {
    Address::new("Storgatan", "1", "Stockholm", "111 22", "Sweden")
}

fn sek() -> Currency {
    WellKnownCurrency::Sek.into()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn suite(identifier: &str, texts: &[(&str, &str, &str)]) -> TextSuite {
    let en = LocaleDefinition::new("en", "GB", "");
    let mut suite = TextSuite::new(identifier, en);
    for (tag, classifier, text) in texts {
        let locale = LocaleDefinition::from_language_tag(tag).unwrap();
        suite.set_text(locale, classifier, *text).unwrap();
    }
    suite
}

/// A store holding at least one row of every entity and association kind
#[allow(dead_code)]
pub fn build_full_store() -> Store {
    let mut store = Store::new();

    let mut org = Organisation::new("Mithlond", "mithlond.se", stockholm().with_care_of("Círdan"));
    org.phone = "+46 8 123 456".to_string();
    org.founding_year = Some(1997);
    let org = store.persist(org).unwrap();

    let mut frodo_user =
        InternalUser::with_identifier_token("token-frodo", "Frodo", "Baggins", stockholm());
    frodo_user.birthday = Some(date(1968, 9, 22));
    frodo_user.set_personal_number_last4(1234).unwrap();
    frodo_user
        .set_contact_detail("email", "frodo@shire.example")
        .unwrap();
    frodo_user
        .set_contact_detail("mobile_phone", "070-000 00 00")
        .unwrap();
    let frodo_user = store.persist(frodo_user).unwrap();
    let sam_user = store
        .persist(InternalUser::with_identifier_token(
            "token-sam",
            "Samwise",
            "Gamgee",
            stockholm(),
        ))
        .unwrap();

    let mut frodo = Membership::new("Frodo", frodo_user.clone(), org.clone());
    frodo.email_alias = Some("frodo".to_string());
    frodo.set_personal_setting("theme", "dark");
    let frodo = store.persist(frodo).unwrap();
    let mut sam = Membership::new("Sam", sam_user.clone(), org.clone());
    sam.sub_alias = "the Brave".to_string();
    sam.login_permitted = false;
    let sam = store.persist(sam).unwrap();

    let mut year = MembershipYear::new(2024, Amount::of(300, sek()).unwrap(), org.clone()).unwrap();
    year.reduced_fee = Some(Amount::of(150, sek()).unwrap());
    let year = store.persist(year).unwrap();

    let council = store
        .persist(Group::new("Council", "The board", org.clone()))
        .unwrap();
    let mut archive = Group::new("Archive", "", org.clone())
        .with_parent(council.clone())
        .unwrap();
    archive.email_list = Some("archive@mithlond.se".to_string());
    store.persist(archive).unwrap();
    let brewers = store
        .persist(Group::guild("Brewers", "", org.clone(), "Sambeleg", "Sam"))
        .unwrap();
    let master = store
        .persist(GuildMembershipType::new("Master", "Guild master"))
        .unwrap();

    let award_type = store.persist(AwardType::new("Medal", "")).unwrap();
    let award = store
        .persist(Award::new("Star of Elendil", "", award_type, org.clone()))
        .unwrap();
    let level = store
        .persist(AwardLevel::new(1, "Bronze", "", award))
        .unwrap();

    let dresscode = store
        .persist(Dresscode::new("Formal", "Suit", "Suit or gown", org.clone()))
        .unwrap();
    let mut calendar = EventCalendar::new("Events", "", org.clone(), "cal-1");
    calendar.first_day_of_week = Weekday::Sun;
    store.persist(calendar).unwrap();

    let visiting = store
        .persist(Category::new("Visiting", "Address", "Visiting address"))
        .unwrap();
    store
        .persist(CategorizedAddress::new(
            "HQ",
            "Headquarters",
            visiting.clone(),
            org.clone(),
            stockholm(),
        ))
        .unwrap();

    let start = date(2024, 6, 21).and_hms_opt(18, 0, 0).unwrap();
    let end = date(2024, 6, 22).and_hms_opt(2, 30, 0).unwrap();
    let mut midsummer = Activity::new(
        "Midsummer",
        "Dancing round the pole",
        org.clone(),
        start,
        end,
        Amount::of(100, sek()).unwrap(),
        visiting,
        stockholm(),
    )
    .unwrap();
    midsummer
        .set_late_admission(Amount::of(150, sek()).unwrap(), date(2024, 6, 1))
        .unwrap();
    midsummer.last_admission_date = date(2024, 6, 20);
    midsummer.dresscode = Some(dresscode);
    midsummer.responsible = Some(council.clone());
    midsummer.address_short_description = "Garden".to_string();
    let midsummer = store.persist(midsummer).unwrap();

    store
        .persist(LocalizedCategory::new(Arc::new(suite(
            "category.cafe",
            &[
                ("en-GB", DEFAULT_CLASSIFIER, "Cafe"),
                ("en-GB", "Classification", "Venue"),
                ("en-GB", "Description", "Coffee and cake"),
                ("sv-SE", DEFAULT_CLASSIFIER, "Kafé"),
            ],
        ))))
        .unwrap();

    let mild = store
        .persist(AllergySeverity::new(
            1,
            Arc::new(suite("severity.mild", &[("en-GB", DEFAULT_CLASSIFIER, "Mild")])),
            Arc::new(suite(
                "severity.mild.description",
                &[("en-GB", DEFAULT_CLASSIFIER, "Discomfort")],
            )),
        ))
        .unwrap();

    let nuts = store.persist(Category::new("Nuts", "Food", "")).unwrap();
    let peanut = store.persist(Category::new("Peanut", "Food", "")).unwrap();
    let food = store.persist(Food::new(nuts, peanut)).unwrap();

    let mut enrolment = YearlyMembership::new(frodo.clone(), year);
    enrolment
        .register_payment(Amount::of(300, sek()).unwrap(), date(2024, 1, 15))
        .unwrap();
    store.persist_association(enrolment).unwrap();

    let joined = Utc.with_ymd_and_hms(2023, 3, 1, 12, 0, 0).unwrap();
    store
        .persist_association(GroupMembership::new(council, frodo.clone(), joined))
        .unwrap();
    store
        .persist_association(GroupMembership::guild(brewers, sam.clone(), joined, master).unwrap())
        .unwrap();

    let mut grant = AwardLevelGrant::new(level, frodo.clone(), date(2024, 3, 25));
    grant.note = Some("For services to the Shire".to_string());
    store.persist_association(grant).unwrap();

    let mut admission = Admission::new(
        midsummer,
        sam,
        Utc.with_ymd_and_hms(2024, 6, 21, 18, 5, 30).unwrap(),
    );
    admission.admitted_by = Some(frodo);
    admission.responsible = true;
    admission.note = Some("Brought a cake".to_string());
    store.persist_association(admission).unwrap();

    let mut allergy = Allergy::new(food, frodo_user, mild);
    allergy.note = Some("Carries an epipen".to_string());
    store.persist_association(allergy).unwrap();

    store
        .persist_association(FoodPreference::new(
            Arc::new(suite("preference.vegetarian", &[("en-GB", DEFAULT_CLASSIFIER, "Vegetarian")])),
            Arc::new(suite(
                "preference.vegetarian.description",
                &[("en-GB", DEFAULT_CLASSIFIER, "No meat or fish")],
            )),
            sam_user,
        ))
        .unwrap();

    store
}
