//! Provenance event tracking for seed imports
//!
//! Records events in the provenance_events table, correlated by seed digest

use crate::errors::{from_rusqlite, Result};
use orgmodel_core::errors::{ExError, ExErrorKind};
use rusqlite::Connection;

/// Provenance event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceKind {
    /// Seed import started
    ImportStarted,
    /// Entity created or updated from seed
    EntityApplied,
    /// Seed import completed
    ImportCompleted,
}

impl ProvenanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceKind::ImportStarted => "seed_import_started",
            ProvenanceKind::EntityApplied => "seed_entity_applied",
            ProvenanceKind::ImportCompleted => "seed_import_completed",
        }
    }
}

/// Emit a provenance event
///
/// Pass the import transaction so events roll back with the data.
pub fn emit_event(
    conn: &Connection,
    kind: ProvenanceKind,
    correlation_id: &str,
    metadata: Option<serde_json::Value>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    let metadata_str = match metadata {
        Some(value) => serde_json::to_string(&value).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("provenance")
                .with_message(e.to_string())
        })?,
        None => "{}".to_string(),
    };

    conn.execute(
        "INSERT INTO provenance_events (kind, correlation_id, timestamp, metadata) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![kind.as_str(), correlation_id, now, metadata_str],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Emit "seed import started" event
pub fn emit_started(conn: &Connection, seed_digest: &str) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::ImportStarted,
        seed_digest,
        Some(serde_json::json!({
            "seed_digest": seed_digest,
        })),
    )
}

/// Emit "entity applied" event
pub fn emit_applied(conn: &Connection, seed_digest: &str, entity: &str, key: &str) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::EntityApplied,
        seed_digest,
        Some(serde_json::json!({
            "entity": entity,
            "key": key,
        })),
    )
}

/// Emit "seed import completed" event
pub fn emit_completed(conn: &Connection, seed_digest: &str, applied: usize) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::ImportCompleted,
        seed_digest,
        Some(serde_json::json!({
            "seed_digest": seed_digest,
            "applied": applied,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations::apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_emit_event() {
        let conn = setup_test_db();

        emit_event(&conn, ProvenanceKind::ImportStarted, "digest-1", None).unwrap();

        let (count, metadata): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), max(metadata) FROM provenance_events WHERE correlation_id = ?",
                ["digest-1"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(metadata, "{}");
    }

    #[test]
    fn test_emit_started_applied_completed() {
        let mut conn = setup_test_db();
        let seed_digest = "test_digest";

        let tx = conn.transaction().unwrap();
        emit_started(&tx, seed_digest).unwrap();
        emit_applied(&tx, seed_digest, "TextSuite", "greeting").unwrap();
        emit_applied(&tx, seed_digest, "Organisation", "Mithlond").unwrap();
        emit_completed(&tx, seed_digest, 2).unwrap();
        tx.commit().unwrap();

        let kinds: Vec<String> = conn
            .prepare("SELECT kind FROM provenance_events WHERE correlation_id = ? ORDER BY id")
            .unwrap()
            .query_map([seed_digest], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(
            kinds,
            vec![
                "seed_import_started",
                "seed_entity_applied",
                "seed_entity_applied",
                "seed_import_completed"
            ]
        );
    }
}
