//! Antonym candidates with tiered precedence.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::data::{ANTONYM_FALSE_PREFIX_PAIRS, ANTONYM_MANUAL_PAIRS};
use crate::lexicon::LexicalOracle;

const NEGATION_PREFIXES: [&str; 7] = ["un", "dis", "in", "im", "ir", "il", "non"];

/// Where an antonym candidate came from, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AntonymSource {
    Oracle,
    Manual,
    Morphological,
}

impl AntonymSource {
    pub fn confidence(self) -> f64 {
        match self {
            AntonymSource::Oracle => 1.0,
            AntonymSource::Manual => 0.95,
            AntonymSource::Morphological => 0.85,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AntonymSource::Oracle => "oracle",
            AntonymSource::Manual => "manual",
            AntonymSource::Morphological => "morphological",
        }
    }
}

pub struct AntonymResolver {
    manual: HashMap<&'static str, HashSet<&'static str>>,
    false_pairs: HashSet<(&'static str, &'static str)>,
}

impl Default for AntonymResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AntonymResolver {
    pub fn new() -> Self {
        let mut manual: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        for &(a, b) in ANTONYM_MANUAL_PAIRS {
            manual.entry(a).or_default().insert(b);
            manual.entry(b).or_default().insert(a);
        }

        let false_pairs = ANTONYM_FALSE_PREFIX_PAIRS
            .iter()
            .flat_map(|&(a, b)| [(a, b), (b, a)])
            .collect();

        Self { manual, false_pairs }
    }

    /// Antonym candidates for `word` keyed by lowercase text.
    ///
    /// Lexicon antonyms win over curated pairs; negation-prefix matching is
    /// only tried when neither produced anything. Morphological candidates
    /// must be in `word_index`; the others are filtered by the caller.
    pub fn resolve(
        &self,
        word: &str,
        oracle: Option<&dyn LexicalOracle>,
        word_index: &HashMap<String, i64>,
    ) -> BTreeMap<String, AntonymSource> {
        let word = word.to_lowercase();
        let mut found = BTreeMap::new();

        if let Some(oracle) = oracle {
            for antonym in oracle.antonyms_of(&word) {
                found.insert(antonym, AntonymSource::Oracle);
            }
        }

        if let Some(manual) = self.manual.get(word.as_str()) {
            for &antonym in manual {
                found.entry(antonym.to_string()).or_insert(AntonymSource::Manual);
            }
        }

        if found.is_empty() {
            for antonym in self.morphological(&word, word_index) {
                found.insert(antonym, AntonymSource::Morphological);
            }
        }

        found
    }

    fn morphological(&self, word: &str, word_index: &HashMap<String, i64>) -> Vec<String> {
        NEGATION_PREFIXES
            .iter()
            .filter(|prefix| word.starts_with(*prefix) && word.len() > prefix.len() + 2)
            .map(|prefix| &word[prefix.len()..])
            .filter(|base| {
                base.len() >= 3
                    && word_index.contains_key(*base)
                    && !self.false_pairs.contains(&(word, *base))
            })
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::WordNet;

    fn index(words: &[&str]) -> HashMap<String, i64> {
        words.iter().enumerate().map(|(i, w)| (w.to_string(), i as i64 + 1)).collect()
    }

    #[test]
    fn test_oracle_overrides_manual() {
        let wn = WordNet::from_json_str(
            r#"{"synsets":[{"id":"accept.v.01","lemmas":[{"name":"accept","antonyms":["reject"]}]}]}"#,
        )
        .unwrap();
        let resolver = AntonymResolver::new();
        let found = resolver.resolve("accept", Some(&wn), &index(&["accept", "reject"]));
        assert_eq!(found.get("reject"), Some(&AntonymSource::Oracle));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_manual_without_oracle() {
        let resolver = AntonymResolver::new();
        let found = resolver.resolve("Reject", None, &index(&["accept", "reject"]));
        assert_eq!(found.get("accept"), Some(&AntonymSource::Manual));
    }

    #[test]
    fn test_morphological_only_when_tiers_empty() {
        let resolver = AntonymResolver::new();
        let idx = index(&["unhappy", "happy", "advantage", "disadvantage"]);

        let found = resolver.resolve("unhappy", None, &idx);
        assert_eq!(found.get("happy"), Some(&AntonymSource::Morphological));

        // "disadvantage" has a curated pair, so no prefix match is attempted
        let found = resolver.resolve("disadvantage", None, &idx);
        assert_eq!(found.get("advantage"), Some(&AntonymSource::Manual));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_false_prefix_pairs_rejected() {
        let resolver = AntonymResolver::new();
        let idx = index(&["invaluable", "valuable", "discover", "cover"]);
        assert!(resolver.resolve("invaluable", None, &idx).is_empty());
        assert!(resolver.resolve("discover", None, &idx).is_empty());
    }

    #[test]
    fn test_morphological_requires_base_in_vocabulary() {
        let resolver = AntonymResolver::new();
        assert!(resolver.resolve("unkind", None, &index(&["unkind"])).is_empty());
        // base shorter than three letters
        assert!(resolver.resolve("undo", None, &index(&["undo", "do"])).is_empty());
    }

    #[test]
    fn test_confidences() {
        assert_eq!(AntonymSource::Oracle.confidence(), 1.0);
        assert_eq!(AntonymSource::Manual.confidence(), 0.95);
        assert_eq!(AntonymSource::Morphological.confidence(), 0.85);
    }
}
