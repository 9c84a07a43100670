//! Lexical oracle: synonym, antonym and sense-similarity lookups.
//!
//! The oracle is optional. Callers hold an `Option<Arc<dyn LexicalOracle>>`
//! and every heuristic has a fallback for `None`.

mod wordnet;

pub use wordnet::{LemmaRecord, SynsetRecord, WordNet};

#[cfg(test)]
pub(crate) use wordnet::tests::sample_wordnet;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::error::{LexrelError, Result};

/// Shared handle to an oracle
pub type SharedOracle = Arc<dyn LexicalOracle>;

/// How the senses of two words relate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseOverlap {
    /// Both words are lemmas of at least one common sense
    pub shared_sense: bool,
    /// Highest taxonomic (path) similarity over all sense pairs, 0.0 if none connect
    pub max_similarity: f64,
}

pub trait LexicalOracle: Send + Sync {
    /// Direct synonyms with a confidence hint in [0, 1]
    fn synonyms_of(&self, word: &str) -> HashMap<String, f64>;

    /// Antonyms reported by the lexicon
    fn antonyms_of(&self, word: &str) -> HashSet<String>;

    /// None when either word has no senses
    fn sense_overlap(&self, a: &str, b: &str) -> Option<SenseOverlap>;

    /// Max path similarity over the first `senses` senses of each word.
    /// Stops early once `stop_at` is reached. None when either word has no senses.
    fn leading_sense_similarity(&self, a: &str, b: &str, senses: usize, stop_at: f64) -> Option<f64>;

    fn has_senses(&self, word: &str) -> bool;
}

/// Load the oracle from the configured lexicon file. A missing or broken
/// lexicon is not fatal: generation degrades to oracle-free heuristics.
pub fn load_oracle(path: Option<&Path>) -> Option<SharedOracle> {
    let Some(path) = path else {
        log::warn!("No lexicon_path configured; lexical oracle unavailable");
        return None;
    };

    match WordNet::from_path(path) {
        Ok(wordnet) => {
            log::info!(
                "Lexicon loaded from {} ({} synsets, {} lemmas)",
                path.display(),
                wordnet.synset_count(),
                wordnet.lemma_count()
            );
            Some(Arc::new(wordnet))
        }
        Err(e) => {
            let err = LexrelError::OracleUnavailable(format!("{}: {}", path.display(), e));
            log::warn!("{}", err);
            None
        }
    }
}

/// Lowercase and treat `_` as a space, the way lexicon lemma names are stored.
pub(crate) fn normalize(word: &str) -> String {
    word.trim().to_lowercase().replace('_', " ")
}

/// Read a lexicon file, mapping I/O and JSON failures to `OracleUnavailable`.
pub(crate) fn read_lexicon(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LexrelError::OracleUnavailable(format!("cannot read lexicon: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_oracle_without_path() {
        assert!(load_oracle(None).is_none());
    }

    #[test]
    fn test_load_oracle_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(load_oracle(Some(&temp.path().join("missing.json"))).is_none());
    }

    #[test]
    fn test_load_oracle_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lexicon.json");
        std::fs::write(
            &path,
            r#"{"synsets":[{"id":"glad.a.01","pos":"a","definition":"showing joy","lemmas":[{"name":"glad"},{"name":"happy"}]}]}"#,
        )
        .unwrap();
        let oracle = load_oracle(Some(&path)).expect("oracle should load");
        assert!(oracle.has_senses("Happy"));
        assert!(oracle.synonyms_of("glad").contains_key("happy"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Give_Up "), "give up");
    }
}
