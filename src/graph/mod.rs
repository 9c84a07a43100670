//! Relation graph retrieval for visualisation.
//!
//! Two modes: the user's whole vocabulary, or a breadth-first subgraph of
//! at most `MAX_DEPTH` hops around a seed word. Each undirected relation is
//! returned once even though the store holds both directions.

mod stats;
mod traversal;

pub use stats::{relation_stats, RelationStats};

use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::error::{LexrelError, Result};
use crate::models::RelationType;

pub const DEFAULT_DEPTH: usize = 2;
pub const MAX_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: i64,
    pub word: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: i64,
    pub target: i64,
    pub relation_type: RelationType,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Parameters of a graph request
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
    /// Empty means every type
    pub relation_types: Vec<RelationType>,
    /// Seed word; None returns the whole graph
    pub word_id: Option<i64>,
    pub max_depth: usize,
}

impl Default for GraphQuery {
    fn default() -> Self {
        Self { relation_types: Vec::new(), word_id: None, max_depth: DEFAULT_DEPTH }
    }
}

impl GraphQuery {
    /// Build a query from loosely typed request parameters
    pub fn parse(relation_types: Option<&str>, word_id: Option<i64>, max_depth: Option<usize>) -> Result<Self> {
        let query = Self {
            relation_types: match relation_types {
                Some(list) => RelationType::parse_list(list)?,
                None => Vec::new(),
            },
            word_id,
            max_depth: max_depth.unwrap_or(DEFAULT_DEPTH),
        };
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DEPTH).contains(&self.max_depth) {
            return Err(LexrelError::InvalidInput(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_DEPTH, self.max_depth
            )));
        }
        Ok(())
    }
}

/// Fetch the graph described by `query`. The depth is not validated here;
/// depth 0 yields just the seed.
pub async fn get_graph(db: &Db, user_id: &str, query: &GraphQuery) -> Result<RelationGraph> {
    let user_id = user_id.to_string();
    let types = query.relation_types.clone();
    let max_depth = query.max_depth;

    let graph = match query.word_id {
        Some(seed) => {
            db.with_connection(move |conn| traversal::subgraph(conn, &user_id, seed, &types, max_depth))
                .await?
        }
        None => db.with_connection(move |conn| traversal::whole_graph(conn, &user_id, &types)).await?,
    };

    log::debug!("graph: {} nodes, {} edges", graph.nodes.len(), graph.edges.len());
    Ok(graph)
}

/// `get_graph` for callers that want a missing seed reported: a seed the user
/// does not own is `WordNotFound` instead of an empty graph.
pub async fn get_seeded_graph(db: &Db, user_id: &str, query: &GraphQuery) -> Result<RelationGraph> {
    let graph = get_graph(db, user_id, query).await?;
    match query.word_id {
        Some(seed) if graph.nodes.is_empty() => Err(LexrelError::WordNotFound(seed)),
        _ => Ok(graph),
    }
}

/// Display text for a stored definition. A JSON object with a
/// `definitions` string array is joined with "; ", other JSON yields an
/// empty string, and plain text is returned as is.
pub fn extract_definitions(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return String::new();
    };
    value
        .get("definitions")
        .and_then(|d| d.as_array())
        .map(|defs| defs.iter().filter_map(|d| d.as_str()).collect::<Vec<_>>().join("; "))
        .unwrap_or_default()
}
