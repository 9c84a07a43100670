//! Per-type relation counts and processed-log coverage.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Db;
use crate::error::Result;
use crate::models::RelationType;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationStats {
    pub word_count: usize,
    /// Undirected relations per type
    pub relations: BTreeMap<RelationType, usize>,
    pub total_relations: usize,
    /// Words with a processed marker, per type
    pub processed: BTreeMap<RelationType, usize>,
}

fn count_by_type(conn: &Connection, sql: &str, user_id: &str) -> Result<BTreeMap<RelationType, usize>> {
    let mut counts: BTreeMap<RelationType, usize> = RelationType::ALL.iter().map(|rt| (*rt, 0)).collect();
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([user_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (kind, count) = row?;
        counts.insert(kind.parse()?, count as usize);
    }
    Ok(counts)
}

fn collect(conn: &Connection, user_id: &str) -> Result<RelationStats> {
    let word_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM words WHERE user_id = ?1", [user_id], |row| row.get(0))?;

    let relations = count_by_type(
        conn,
        "SELECT relation_type, COUNT(*) FROM words_relations \
         WHERE user_id = ?1 AND word_id < related_word_id GROUP BY relation_type",
        user_id,
    )?;
    let processed = count_by_type(
        conn,
        "SELECT l.relation_type, COUNT(*) FROM relation_generation_log l \
         JOIN words w ON w.id = l.word_id AND w.user_id = l.user_id \
         WHERE l.user_id = ?1 GROUP BY l.relation_type",
        user_id,
    )?;

    Ok(RelationStats {
        word_count: word_count as usize,
        total_relations: relations.values().sum(),
        relations,
        processed,
    })
}

pub async fn relation_stats(db: &Db, user_id: &str) -> Result<RelationStats> {
    let user_id = user_id.to_string();
    db.with_connection(move |conn| collect(conn, &user_id)).await
}
