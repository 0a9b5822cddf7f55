use rusqlite::{params, Connection, OptionalExtension};

use crate::models::Collection;

// ── Submission ledger ──

pub fn find_submission(
    conn: &Connection,
    idempotency_key: &str,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT generated_key FROM submissions WHERE idempotency_key = ?1",
        params![idempotency_key],
        |row| row.get(0),
    )
    .optional()
}

pub fn record_submission(
    conn: &Connection,
    idempotency_key: &str,
    collection: Collection,
    generated_key: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO submissions (idempotency_key, collection, generated_key)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(idempotency_key) DO NOTHING",
        params![idempotency_key, collection.as_str(), generated_key],
    )?;
    Ok(())
}
