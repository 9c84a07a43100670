//! Lexical heuristics: candidate relations and confidence scores, one module
//! per relation type. Nothing here touches storage.

pub mod data;

mod antonym;
mod confused;
mod root;
mod synonym;
mod topic;

pub use antonym::{AntonymResolver, AntonymSource};
pub use confused::{edit_distance, is_anagram, similarity_ratio, Confusion, ConfusionKind, ConfusionScorer};
pub use root::{RootAnalyzer, RootMatch, RootMethod};
pub use synonym::{direct_synonyms, semantic_pairs, SimilarPair};
pub use topic::TopicIndex;
