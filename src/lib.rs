pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod graph;
pub mod heuristics;
pub mod lexicon;
pub mod models;
pub mod store;
pub mod tasks;

pub use config::Config;
pub use error::{LexrelError, Result};
pub use graph::{get_graph, GraphQuery, RelationGraph};
pub use models::{Relation, RelationType, Word};
pub use store::{RelationStore, SqliteRelationStore};
pub use tasks::{TaskManager, TaskSnapshot, TaskStatus};
