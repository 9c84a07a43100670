//! SQL side of graph retrieval. Every edge is stored twice, so reads keep
//! only rows with `word_id < related_word_id`.

use std::collections::{HashMap, HashSet};

use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};

use super::{extract_definitions, GraphEdge, GraphNode, RelationGraph};
use crate::error::Result;
use crate::models::RelationType;

/// Stay well below SQLite's host parameter limit
const MAX_IDS_PER_QUERY: usize = 500;

type Params = Vec<Box<dyn ToSql>>;

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// ` AND <column> IN (...)`, or nothing when unfiltered
fn type_filter(column: &str, types: &[RelationType], params: &mut Params) -> String {
    if types.is_empty() {
        return String::new();
    }
    for t in types {
        params.push(Box::new(t.as_str()));
    }
    format!(" AND {} IN ({})", column, placeholders(types.len()))
}

fn load_nodes(conn: &Connection, user_id: &str, ids: &[i64]) -> Result<Vec<GraphNode>> {
    let mut nodes = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
        let query = format!(
            "SELECT id, word, definition FROM words WHERE user_id = ? AND id IN ({})",
            placeholders(chunk.len())
        );
        let mut params: Params = vec![Box::new(user_id.to_string())];
        params.extend(chunk.iter().map(|id| Box::new(*id) as Box<dyn ToSql>));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(GraphNode {
                id: row.get(0)?,
                word: row.get(1)?,
                definition: extract_definitions(&row.get::<_, Option<String>>(2)?.unwrap_or_default()),
            })
        })?;
        for row in rows {
            nodes.push(row?);
        }
    }
    Ok(nodes)
}

/// Deduplicated edges leaving `sources`, optionally restricted to targets in `within`
fn load_edges(
    conn: &Connection,
    user_id: &str,
    sources: Option<&[i64]>,
    within: &HashSet<i64>,
    types: &[RelationType],
) -> Result<Vec<GraphEdge>> {
    // an empty chunk means no source restriction
    let chunks: Vec<&[i64]> = match sources {
        Some(ids) => ids.chunks(MAX_IDS_PER_QUERY).collect(),
        None => vec![&[][..]],
    };

    let mut raw: Vec<(i64, i64, String, f64)> = Vec::new();

    for chunk in chunks {
        let mut params: Params = vec![Box::new(user_id.to_string())];
        let mut query = String::from(
            "SELECT word_id, related_word_id, relation_type, confidence FROM words_relations \
             WHERE user_id = ? AND word_id < related_word_id",
        );
        if !chunk.is_empty() {
            query.push_str(&format!(" AND word_id IN ({})", placeholders(chunk.len())));
            params.extend(chunk.iter().map(|id| Box::new(*id) as Box<dyn ToSql>));
        }
        query.push_str(&type_filter("relation_type", types, &mut params));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        for row in rows {
            raw.push(row?);
        }
    }

    let mut edges = Vec::with_capacity(raw.len());
    for (source, target, kind, confidence) in raw {
        if !within.contains(&source) || !within.contains(&target) {
            continue;
        }
        edges.push(GraphEdge { source, target, relation_type: kind.parse()?, confidence });
    }
    edges.sort_by(|a, b| (a.source, a.target, a.relation_type).cmp(&(b.source, b.target, b.relation_type)));
    Ok(edges)
}

/// Every word of the user and every relation between them
pub(super) fn whole_graph(conn: &Connection, user_id: &str, types: &[RelationType]) -> Result<RelationGraph> {
    let mut stmt = conn.prepare("SELECT id, word, definition FROM words WHERE user_id = ?1 ORDER BY id")?;
    let nodes = stmt
        .query_map([user_id], |row| {
            Ok(GraphNode {
                id: row.get(0)?,
                word: row.get(1)?,
                definition: extract_definitions(&row.get::<_, Option<String>>(2)?.unwrap_or_default()),
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let ids: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
    let edges = load_edges(conn, user_id, None, &ids, types)?;
    Ok(RelationGraph { nodes, edges })
}

/// Word ids reachable from `seed` within `max_depth` hops, in discovery order.
/// Only words owned by the user are followed.
fn reachable(
    conn: &Connection,
    user_id: &str,
    seed: i64,
    types: &[RelationType],
    max_depth: usize,
) -> Result<Vec<i64>> {
    let mut visited: HashSet<i64> = HashSet::from([seed]);
    let mut order = vec![seed];
    let mut frontier = vec![seed];

    for depth in 0..max_depth {
        if frontier.is_empty() {
            break;
        }

        let mut next = Vec::new();
        for chunk in frontier.chunks(MAX_IDS_PER_QUERY) {
            let mut params: Params = vec![Box::new(user_id.to_string())];
            params.extend(chunk.iter().map(|id| Box::new(*id) as Box<dyn ToSql>));
            let mut query = format!(
                "SELECT DISTINCT r.related_word_id FROM words_relations r \
                 JOIN words w ON w.id = r.related_word_id AND w.user_id = r.user_id \
                 WHERE r.user_id = ? AND r.word_id IN ({})",
                placeholders(chunk.len())
            );
            query.push_str(&type_filter("r.relation_type", types, &mut params));
            query.push_str(" ORDER BY r.related_word_id");

            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(params_from_iter(params), |row| row.get::<_, i64>(0))?;
            for row in rows {
                let id = row?;
                if visited.insert(id) {
                    next.push(id);
                }
            }
        }

        log::debug!("graph: depth {} reached {} new words", depth + 1, next.len());
        order.extend_from_slice(&next);
        frontier = next;
    }

    Ok(order)
}

/// Breadth-first subgraph around `seed`: the reachable words and every
/// relation whose endpoints were both reached. Empty if the seed is not
/// one of the user's words.
pub(super) fn subgraph(
    conn: &Connection,
    user_id: &str,
    seed: i64,
    types: &[RelationType],
    max_depth: usize,
) -> Result<RelationGraph> {
    let owned: Option<i64> = conn
        .query_row(
            "SELECT id FROM words WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![seed, user_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Ok(RelationGraph::default());
    }

    let order = reachable(conn, user_id, seed, types, max_depth)?;
    let within: HashSet<i64> = order.iter().copied().collect();

    let mut nodes = load_nodes(conn, user_id, &order)?;
    let rank: HashMap<i64, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    nodes.sort_by_key(|n| rank.get(&n.id).copied().unwrap_or(usize::MAX));

    let edges = load_edges(conn, user_id, Some(&order), &within, types)?;
    Ok(RelationGraph { nodes, edges })
}
