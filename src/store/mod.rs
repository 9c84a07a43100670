//! Relation store adapter: loads generation inputs and persists batches.
//!
//! `save_batch` is atomic (one transaction) and idempotent under re-delivery:
//! duplicate relation rows are ignored, duplicate log rows overwrite
//! `processed_at` / `found_count`.

use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::db::Db;
use crate::error::{LexrelError, Result};
use crate::models::{ProcessedLog, Relation, RelationKey, RelationType, Word};

/// Storage contract consumed by the generation jobs. Calls block.
pub trait RelationStore: Send + Sync {
    /// All words of the user, ordered by id
    fn load_words(&self, user_id: &str) -> Result<Vec<Word>>;

    /// Every stored directed relation row of the user
    fn load_existing_relations(&self, user_id: &str) -> Result<HashSet<RelationKey>>;

    /// Word ids that already have a processed marker for `relation_type`
    fn load_processed_word_ids(&self, user_id: &str, relation_type: RelationType) -> Result<HashSet<i64>>;

    /// Persist relation rows and processed markers together
    fn save_batch(&self, relations: &[Relation], logs: &[ProcessedLog], user_id: &str) -> Result<()>;
}

/// SQLite-backed store
#[derive(Debug, Clone)]
pub struct SqliteRelationStore {
    db: Db,
}

impl SqliteRelationStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn write_batch(
        conn: &mut Connection,
        relations: &[Relation],
        logs: &[ProcessedLog],
        user_id: &str,
    ) -> Result<()> {
        let tx = conn.transaction()?;
        {
            let mut insert_relation = tx.prepare(
                r#"
                INSERT INTO words_relations (
                    user_id, word_id, related_word_id, relation_type, confidence
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (word_id, related_word_id, relation_type) DO NOTHING
                "#,
            )?;
            for rel in relations {
                insert_relation.execute(params![
                    user_id,
                    rel.source_id,
                    rel.target_id,
                    rel.relation_type.as_str(),
                    rel.confidence,
                ])?;
            }

            let mut upsert_log = tx.prepare(
                r#"
                INSERT INTO relation_generation_log (
                    user_id, word_id, relation_type, processed_at, found_count
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (word_id, relation_type) DO UPDATE SET
                    processed_at = excluded.processed_at,
                    found_count = excluded.found_count
                "#,
            )?;
            for entry in logs {
                upsert_log.execute(params![
                    user_id,
                    entry.word_id,
                    entry.relation_type.as_str(),
                    entry.processed_at.to_rfc3339(),
                    entry.found_count as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl RelationStore for SqliteRelationStore {
    fn load_words(&self, user_id: &str) -> Result<Vec<Word>> {
        let conn = self.db.open_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, word, definition FROM words WHERE user_id = ?1 ORDER BY id",
        )?;
        let words = stmt
            .query_map([user_id], |row| {
                Ok(Word {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    definition: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(words)
    }

    fn load_existing_relations(&self, user_id: &str) -> Result<HashSet<RelationKey>> {
        let conn = self.db.open_connection()?;
        let mut stmt = conn.prepare(
            "SELECT word_id, related_word_id, relation_type FROM words_relations WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut existing = HashSet::new();
        for row in rows {
            let (source, target, kind) = row?;
            existing.insert((source, target, kind.parse::<RelationType>()?));
        }
        Ok(existing)
    }

    fn load_processed_word_ids(&self, user_id: &str, relation_type: RelationType) -> Result<HashSet<i64>> {
        let conn = self.db.open_connection()?;
        let mut stmt = conn.prepare(
            "SELECT word_id FROM relation_generation_log WHERE user_id = ?1 AND relation_type = ?2",
        )?;
        let ids = stmt
            .query_map(params![user_id, relation_type.as_str()], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<HashSet<_>, rusqlite::Error>>()?;
        Ok(ids)
    }

    fn save_batch(&self, relations: &[Relation], logs: &[ProcessedLog], user_id: &str) -> Result<()> {
        if relations.is_empty() && logs.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .db
            .open_connection()
            .map_err(|e| LexrelError::StoreFailure(e.to_string()))?;

        // Dropping an uncommitted transaction rolls it back.
        Self::write_batch(&mut conn, relations, logs, user_id).map_err(|e| {
            LexrelError::StoreFailure(format!(
                "batch of {} relations / {} logs rolled back: {}",
                relations.len(),
                logs.len(),
                e
            ))
        })?;

        log::info!("Batch saved: {} relations, {} logs", relations.len(), logs.len());
        Ok(())
    }
}
