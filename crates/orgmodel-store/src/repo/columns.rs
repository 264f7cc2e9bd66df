//! Column groups and statement builders shared by several tables

use crate::errors::{corrupt_row, Result};
use orgmodel_core::model::{Address, Amount, Currency};
use rusqlite::types::ToSql;
use rusqlite::Row;

/// Embedded address columns, in declaration order
pub const ADDRESS_COLUMNS: [&str; 8] = [
    "addr_care_of_line",
    "addr_department_name",
    "addr_street",
    "addr_number",
    "addr_city",
    "addr_zip_code",
    "addr_country",
    "addr_description",
];

/// Bind values for [`ADDRESS_COLUMNS`]
pub fn address_values(address: &Address) -> [&dyn ToSql; 8] {
    [
        &address.care_of_line,
        &address.department_name,
        &address.street,
        &address.number,
        &address.city,
        &address.zip_code,
        &address.country,
        &address.description,
    ]
}

/// Read [`ADDRESS_COLUMNS`] starting at column `start`
pub fn read_address(row: &Row<'_>, start: usize) -> rusqlite::Result<Address> {
    Ok(Address {
        care_of_line: row.get(start)?,
        department_name: row.get(start + 1)?,
        street: row.get(start + 2)?,
        number: row.get(start + 3)?,
        city: row.get(start + 4)?,
        zip_code: row.get(start + 5)?,
        country: row.get(start + 6)?,
        description: row.get(start + 7)?,
    })
}

/// Comma separated column list for a SELECT
pub fn select_list(columns: &[&str]) -> String {
    columns.join(", ")
}

/// `INSERT ... ON CONFLICT(id) DO UPDATE` over `columns`; the first column is `id`.
pub fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns
        .iter()
        .skip(1)
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        table,
        columns.join(", "),
        placeholders,
        updates
    )
}

/// Plain `INSERT` over `columns`
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

/// `base` followed by the address columns
pub fn with_address(base: &[&'static str]) -> Vec<&'static str> {
    base.iter().copied().chain(ADDRESS_COLUMNS).collect()
}

pub fn currency(entity: &str, id: i64, code: &str) -> Result<Currency> {
    code.parse::<Currency>()
        .map_err(|e| corrupt_row(entity, id.to_string(), &e.to_string()))
}

pub fn amount(minor_units: i64, currency: &Currency) -> Amount {
    Amount::new(minor_units, currency.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_updates_every_column_but_id() {
        let sql = upsert_sql("award_types", &["id", "name", "description"]);
        assert_eq!(
            sql,
            "INSERT INTO award_types (id, name, description) VALUES (?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, description = excluded.description"
        );
    }

    #[test]
    fn test_with_address_appends_columns() {
        let columns = with_address(&["id", "name"]);
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[2], "addr_care_of_line");
        assert_eq!(columns[9], "addr_description");
    }

    #[test]
    fn test_corrupt_currency_is_reported() {
        let err = currency("Organisation", 3, "kronor").unwrap_err();
        assert_eq!(err.entity(), Some("Organisation"));
        assert_eq!(err.entity_id(), Some("3"));
    }
}
