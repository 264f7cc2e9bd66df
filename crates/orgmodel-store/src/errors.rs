//! Error handling for orgmodel-store
//!
//! Everything the persistence layer reports is an `ExError`; domain failures
//! raised by the core `Store` convert through `From<OrgError>`.

use orgmodel_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a seed validation error
pub fn seed_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("seed_parse")
        .with_message(reason.to_string())
}

/// A stored row that cannot be turned back into a domain value
pub fn corrupt_row(entity: &str, id: impl Into<String>, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("hydrate")
        .with_entity(entity)
        .with_entity_id(id)
        .with_message(reason.to_string())
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures keep their own kinds so callers can tell a duplicate
/// from a broken connection.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                ExErrorKind::UniqueViolation
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ExErrorKind::ForeignKeyViolation,
            _ if failure.code == rusqlite::ErrorCode::ConstraintViolation => {
                ExErrorKind::ConstraintViolation
            }
            _ => ExErrorKind::Persistence,
        },
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_failure_maps_to_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT, CONSTRAINT unq_name UNIQUE (name));")
            .unwrap();
        conn.execute("INSERT INTO t (name) VALUES ('a')", []).unwrap();
        let err = conn
            .execute("INSERT INTO t (name) VALUES ('a')", [])
            .unwrap_err();

        let ex = from_rusqlite(err);
        assert_eq!(ex.kind(), ExErrorKind::UniqueViolation);
        assert_eq!(ex.op(), Some("sqlite"));
    }

    #[test]
    fn test_checksum_mismatch_names_migration() {
        let err = checksum_mismatch("001_organisation_schema", "abc", "def");
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
        assert!(err.message().contains("001_organisation_schema"));
    }
}
