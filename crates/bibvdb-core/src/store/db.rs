use rusqlite::Connection;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{IdentifierKind, Record, RecordId};

use super::migrations::MIGRATIONS;

/// A database connection with CRUD methods for bibliographic records.
///
/// The store is append-only: records are inserted once and never mutated
/// in place. Re-adding an existing identifier fails with `DuplicateKey`.
#[derive(Debug)]
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) a store at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                tracing::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Record CRUD
impl RecordStore {
    /// Insert a new record.
    ///
    /// # Errors
    /// Returns `DuplicateKey` if a record with the same identifier exists,
    /// or `InvalidData` if the embedding is empty.
    pub fn insert_record(&self, record: &Record) -> Result<()> {
        if record.embedding.is_empty() {
            return Err(Error::InvalidData("empty embedding".to_string()));
        }
        if self.contains(&record.identifier)? {
            return Err(Error::DuplicateKey {
                identifier: record.identifier.clone(),
            });
        }

        self.conn.execute(
            "INSERT INTO records (
                id, identifier, kind, title, summary, authors, year,
                embedding, embedding_dim, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                record.id.to_string(),
                record.identifier,
                record.kind.as_str(),
                record.title,
                record.summary,
                record.authors,
                record.year.map(i64::from),
                embedding_to_blob(&record.embedding),
                i64::try_from(record.embedding.len()).unwrap_or(0),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up a record by its DOI/ISBN identifier.
    ///
    /// # Errors
    /// Returns `NotFound` if no record has that identifier.
    pub fn get_record(&self, identifier: &str) -> Result<Record> {
        let mut stmt = self.conn.prepare(
            "SELECT id, identifier, kind, title, summary, authors, year,
                    embedding, created_at, updated_at
             FROM records
             WHERE identifier = ?1",
        )?;

        let mut rows = stmt
            .query_map([identifier], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.pop().ok_or_else(|| Error::NotFound {
            entity: "record",
            id: identifier.to_string(),
        })
    }

    /// Whether a record with the given identifier exists.
    pub fn contains(&self, identifier: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE identifier = ?1",
            [identifier],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all records, ordered by identifier.
    pub fn list_records(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, identifier, kind, title, summary, authors, year,
                    embedding, created_at, updated_at
             FROM records
             ORDER BY identifier",
        )?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// List `(identifier, title)` pairs, ordered by identifier.
    ///
    /// This is the feed for the fuzzy matcher, which does not need
    /// embeddings loaded.
    pub fn list_identifier_titles(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT identifier, title FROM records ORDER BY identifier")?;

        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pairs)
    }

    /// Number of records in the store.
    pub fn record_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Encode an embedding as a little-endian f32 BLOB.
#[must_use]
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decode a little-endian f32 BLOB back into an embedding.
///
/// # Errors
/// Returns `InvalidData` if the blob length is not a multiple of 4.
pub fn blob_to_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::InvalidData(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    use chrono::DateTime;
    use rusqlite::types::Type;
    use uuid::Uuid;

    fn conversion_err<E>(idx: usize, ty: Type) -> impl FnOnce(E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
    }

    let id_str: String = row.get(0)?;
    let id = RecordId::from_uuid(
        Uuid::parse_str(&id_str).map_err(conversion_err(0, Type::Text))?,
    );

    let kind_str: String = row.get(2)?;
    let kind: IdentifierKind = kind_str
        .parse()
        .map_err(conversion_err(2, Type::Text))?;

    let blob: Vec<u8> = row.get(7)?;
    let embedding = blob_to_embedding(&blob).map_err(conversion_err(7, Type::Blob))?;

    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Record {
        id,
        identifier: row.get(1)?,
        kind,
        title: row.get(3)?,
        summary: row.get(4)?,
        authors: row.get(5)?,
        year: row.get::<_, Option<i64>>(6)?.map(|y| y as i32),
        embedding,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(conversion_err(8, Type::Text))?
            .into(),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(conversion_err(9, Type::Text))?
            .into(),
    })
}
