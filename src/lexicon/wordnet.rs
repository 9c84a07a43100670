//! WordNet-style lexicon loaded from JSON.
//!
//! File layout:
//! `{"synsets":[{"id","pos","definition","lemmas":[{"name","count","antonyms"}],"hypernyms":[ids]}]}`
//! Synsets are listed in sense order: the first synset containing a lemma is
//! that lemma's most frequent sense.

use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use super::{normalize, read_lexicon, LexicalOracle, SenseOverlap};
use crate::error::{LexrelError, Result};

const CLOSURE_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LemmaRecord {
    pub name: String,
    /// Tagged-corpus frequency of this sense
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynsetRecord {
    pub id: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub definition: String,
    pub lemmas: Vec<LemmaRecord>,
    #[serde(default)]
    pub hypernyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    synsets: Vec<SynsetRecord>,
}

/// Ancestor synset index -> number of hypernym hops from the start synset
type Closure = Arc<HashMap<usize, usize>>;

pub struct WordNet {
    synsets: Vec<SynsetRecord>,
    /// Resolved hypernym links per synset (unknown ids dropped)
    hypernyms: Vec<Vec<usize>>,
    /// Normalized lemma -> synset indices in sense order
    lemma_index: HashMap<String, Vec<usize>>,
    closures: Mutex<LruCache<usize, Closure>>,
}

impl WordNet {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = read_lexicon(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(raw)
            .map_err(|e| LexrelError::OracleUnavailable(format!("invalid lexicon: {}", e)))?;
        Ok(Self::from_synsets(file.synsets))
    }

    pub fn from_synsets(synsets: Vec<SynsetRecord>) -> Self {
        let id_index: HashMap<&str, usize> = synsets
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id.as_str(), idx))
            .collect();

        let hypernyms = synsets
            .iter()
            .map(|s| {
                s.hypernyms
                    .iter()
                    .filter_map(|h| id_index.get(h.as_str()).copied())
                    .collect()
            })
            .collect();

        let mut lemma_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, synset) in synsets.iter().enumerate() {
            for lemma in &synset.lemmas {
                let senses = lemma_index.entry(normalize(&lemma.name)).or_default();
                if !senses.contains(&idx) {
                    senses.push(idx);
                }
            }
        }

        let capacity = NonZeroUsize::new(CLOSURE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            synsets,
            hypernyms,
            lemma_index,
            closures: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn synset_count(&self) -> usize {
        self.synsets.len()
    }

    pub fn lemma_count(&self) -> usize {
        self.lemma_index.len()
    }

    fn senses(&self, word: &str) -> &[usize] {
        self.lemma_index
            .get(&normalize(word))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn closure(&self, start: usize) -> Closure {
        let mut cache = self.closures.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&start) {
            return Arc::clone(hit);
        }

        let mut depths = HashMap::new();
        let mut queue = VecDeque::new();
        depths.insert(start, 0);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            let depth = depths[&current];
            for &parent in &self.hypernyms[current] {
                if !depths.contains_key(&parent) {
                    depths.insert(parent, depth + 1);
                    queue.push_back(parent);
                }
            }
        }

        let closure = Arc::new(depths);
        cache.put(start, Arc::clone(&closure));
        closure
    }

    /// 1 / (shortest path through a common hypernym + 1)
    fn path_similarity(&self, a: usize, b: usize) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        let up_a = self.closure(a);
        let up_b = self.closure(b);
        up_a.iter()
            .filter_map(|(ancestor, da)| up_b.get(ancestor).map(|db| da + db))
            .min()
            .map(|distance| 1.0 / (distance as f64 + 1.0))
    }

    fn synonym_confidence(synset: &SynsetRecord, lemma: &LemmaRecord) -> f64 {
        let mut confidence = 0.9;
        if lemma.count > 0 {
            confidence += (lemma.count as f64 / 100.0).min(0.1);
        }
        if !synset.definition.is_empty() {
            let words = synset.definition.split_whitespace().count();
            confidence += (words as f64 / 50.0).min(0.05);
        }
        confidence.min(1.0)
    }
}

impl LexicalOracle for WordNet {
    fn synonyms_of(&self, word: &str) -> HashMap<String, f64> {
        let word = normalize(word);
        let mut synonyms: HashMap<String, f64> = HashMap::new();

        for &idx in self.senses(&word) {
            let synset = &self.synsets[idx];
            for lemma in &synset.lemmas {
                let name = normalize(&lemma.name);
                if name == word || name.chars().count() <= 1 {
                    continue;
                }
                let confidence = Self::synonym_confidence(synset, lemma);
                let entry = synonyms.entry(name).or_insert(confidence);
                *entry = entry.max(confidence);
            }
        }
        synonyms
    }

    fn antonyms_of(&self, word: &str) -> HashSet<String> {
        let word = normalize(word);
        self.senses(&word)
            .iter()
            .flat_map(|&idx| self.synsets[idx].lemmas.iter())
            .flat_map(|lemma| lemma.antonyms.iter())
            .map(|a| normalize(a))
            .filter(|a| *a != word)
            .collect()
    }

    fn sense_overlap(&self, a: &str, b: &str) -> Option<SenseOverlap> {
        let senses_a = self.senses(a);
        let senses_b = self.senses(b);
        if senses_a.is_empty() || senses_b.is_empty() {
            return None;
        }

        let shared_sense = senses_a.iter().any(|s| senses_b.contains(s));
        let max_similarity = senses_a
            .iter()
            .flat_map(|&x| senses_b.iter().map(move |&y| (x, y)))
            .filter_map(|(x, y)| self.path_similarity(x, y))
            .fold(0.0, f64::max);

        Some(SenseOverlap { shared_sense, max_similarity })
    }

    fn leading_sense_similarity(&self, a: &str, b: &str, senses: usize, stop_at: f64) -> Option<f64> {
        let senses_a = self.senses(a);
        let senses_b = self.senses(b);
        if senses_a.is_empty() || senses_b.is_empty() {
            return None;
        }

        let mut best = 0.0;
        for &x in senses_a.iter().take(senses) {
            for &y in senses_b.iter().take(senses) {
                if let Some(sim) = self.path_similarity(x, y) {
                    if sim > best {
                        best = sim;
                    }
                }
                if best >= stop_at {
                    return Some(best);
                }
            }
        }
        Some(best)
    }

    fn has_senses(&self, word: &str) -> bool {
        !self.senses(word).is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small taxonomy used across the crate's tests.
    pub(crate) fn sample_wordnet() -> WordNet {
        WordNet::from_json_str(
            r#"{"synsets":[
                {"id":"entity.n.01","pos":"n","definition":"that which exists","lemmas":[{"name":"entity"}]},
                {"id":"being.n.01","pos":"n","definition":"a living thing","lemmas":[{"name":"being"}],"hypernyms":["entity.n.01"]},
                {"id":"spirit.n.01","pos":"n","definition":"a supernatural being","lemmas":[{"name":"spirit"}],"hypernyms":["being.n.01"]},
                {"id":"angel.n.01","pos":"n","definition":"spiritual being attendant upon god","lemmas":[{"name":"angel","count":12}],"hypernyms":["spirit.n.01"]},
                {"id":"shape.n.01","pos":"n","definition":"the spatial arrangement of something","lemmas":[{"name":"shape"}],"hypernyms":["entity.n.01"]},
                {"id":"angle.n.01","pos":"n","definition":"the space between two lines diverging from a common point","lemmas":[{"name":"angle","count":5}],"hypernyms":["shape.n.01"]},
                {"id":"happy.a.01","pos":"a","definition":"enjoying or showing or marked by joy or pleasure","lemmas":[{"name":"happy","count":40,"antonyms":["unhappy"]},{"name":"glad","count":3}]},
                {"id":"unhappy.a.01","pos":"a","definition":"experiencing or marked by sorrow","lemmas":[{"name":"unhappy","count":8,"antonyms":["happy"]}]},
                {"id":"give_up.v.01","pos":"v","definition":"stop maintaining","lemmas":[{"name":"give_up"},{"name":"abandon","count":2}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_synonyms_of() {
        let wn = sample_wordnet();
        let syns = wn.synonyms_of("happy");
        assert_eq!(syns.len(), 1);
        let confidence = syns["glad"];
        assert!(confidence > 0.9 && confidence <= 1.0);
        // Multiword lemma comes back with a space
        assert!(wn.synonyms_of("abandon").contains_key("give up"));
    }

    #[test]
    fn test_synonym_confidence_saturates() {
        let synset = SynsetRecord {
            id: "x".into(),
            pos: "n".into(),
            definition: "a ".repeat(200),
            lemmas: vec![],
            hypernyms: vec![],
        };
        let lemma = LemmaRecord { name: "x".into(), count: 500, antonyms: vec![] };
        assert_eq!(WordNet::synonym_confidence(&synset, &lemma), 1.0);
    }

    #[test]
    fn test_antonyms_of() {
        let wn = sample_wordnet();
        assert_eq!(wn.antonyms_of("happy"), HashSet::from(["unhappy".to_string()]));
        // Antonyms are collected across every lemma of the word's senses
        assert!(wn.antonyms_of("glad").contains("unhappy"));
        assert!(wn.antonyms_of("entity").is_empty());
    }

    #[test]
    fn test_path_similarity() {
        let wn = sample_wordnet();
        // angel -> spirit -> being -> entity <- shape <- angle : 5 hops
        let overlap = wn.sense_overlap("angel", "angle").unwrap();
        assert!(!overlap.shared_sense);
        assert!((overlap.max_similarity - 1.0 / 6.0).abs() < 1e-9);

        let same = wn.sense_overlap("happy", "glad").unwrap();
        assert!(same.shared_sense);
        assert_eq!(same.max_similarity, 1.0);
    }

    #[test]
    fn test_unknown_word_has_no_overlap() {
        let wn = sample_wordnet();
        assert!(wn.sense_overlap("angel", "zzz").is_none());
        assert!(wn.leading_sense_similarity("zzz", "angel", 2, 0.8).is_none());
        assert!(!wn.has_senses("zzz"));
    }

    #[test]
    fn test_disconnected_pos_similarity_is_zero() {
        let wn = sample_wordnet();
        let sim = wn.leading_sense_similarity("happy", "angel", 2, 0.8).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_invalid_lexicon_is_oracle_unavailable() {
        let err = WordNet::from_json_str("{\"nope\": 1}").err().unwrap();
        assert!(matches!(err, LexrelError::OracleUnavailable(_)));
    }
}
