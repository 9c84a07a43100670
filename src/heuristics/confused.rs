//! Commonly confused words: look-alike spellings with unrelated meanings.

use std::collections::HashSet;

use super::data::CONFUSED_PAIRS;
use crate::lexicon::LexicalOracle;

const CLASSIC_CONFIDENCE: f64 = 0.95;
const MAX_EDIT_DISTANCE: usize = 2;
/// Taxonomic similarity at or above which two words count as related
const RELATED_SIMILARITY: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfusionKind {
    Classic,
    Computed,
}

impl ConfusionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfusionKind::Classic => "classic",
            ConfusionKind::Computed => "computed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confusion {
    pub score: f64,
    pub kind: ConfusionKind,
}

pub struct ConfusionScorer {
    classic: HashSet<(&'static str, &'static str)>,
}

impl Default for ConfusionScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfusionScorer {
    pub fn new() -> Self {
        let classic = CONFUSED_PAIRS
            .iter()
            .flat_map(|&(a, b)| [(a, b), (b, a)])
            .collect();
        Self { classic }
    }

    /// Score a pair of words, or None when they are not easily confused.
    pub fn score(&self, word1: &str, word2: &str, oracle: Option<&dyn LexicalOracle>) -> Option<Confusion> {
        let (w1, w2) = (word1.to_lowercase(), word2.to_lowercase());
        if w1 == w2 {
            return None;
        }

        if self.classic.contains(&(w1.as_str(), w2.as_str())) {
            return Some(Confusion { score: CLASSIC_CONFIDENCE, kind: ConfusionKind::Classic });
        }

        let distance = edit_distance(&w1, &w2);
        if distance > MAX_EDIT_DISTANCE {
            return None;
        }

        let min_ratio = match distance {
            1 => 0.75,
            2 => 0.70,
            _ => 0.65,
        };
        if similarity_ratio(&w1, &w2) < min_ratio {
            return None;
        }

        if !semantically_distinct(oracle, &w1, &w2) {
            return None;
        }

        let mut score = 1.0 - 0.1 * distance as f64;
        if distance == 1 {
            score += 0.05;
        }
        if is_anagram(&w1, &w2) {
            score += 0.05;
        }
        Some(Confusion { score: score.min(1.0), kind: ConfusionKind::Computed })
    }
}

/// Without a lexicon every pair is assumed distinct. A word the lexicon does
/// not know makes the pair indistinct.
fn semantically_distinct(oracle: Option<&dyn LexicalOracle>, a: &str, b: &str) -> bool {
    let Some(oracle) = oracle else {
        return true;
    };
    match oracle.sense_overlap(a, b) {
        Some(overlap) => !overlap.shared_sense && overlap.max_similarity < RELATED_SIMILARITY,
        None => false,
    }
}

/// Edit distance with insertions, deletions, substitutions and adjacent
/// transpositions each costing one.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];
    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }
    d[a.len() * width + b.len()]
}

/// 2·M / T where M is the total size of the matching blocks found by
/// recursively taking the longest common substring.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matched_chars(&a[..i], &b[..j]) + matched_chars(&a[i + size..], &b[j + size..])
}

/// Longest common substring, earliest in `a` then earliest in `b` on ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut row = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                row[j + 1] = prev[j] + 1;
                if row[j + 1] > best.2 {
                    best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
                }
            }
        }
        prev = row;
    }
    best
}

/// Same letters in a different order
pub fn is_anagram(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    let mut x: Vec<char> = a.chars().collect();
    let mut y: Vec<char> = b.chars().collect();
    x.sort_unstable();
    y.sort_unstable();
    x == y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::sample_wordnet;

    #[test]
    fn test_angel_angle_scores_one() {
        let scorer = ConfusionScorer::new();
        let wn = sample_wordnet();
        let c = scorer.score("angel", "angle", Some(&wn)).unwrap();
        assert_eq!(c.kind, ConfusionKind::Computed);
        assert!((c.score - 1.0).abs() < 1e-9);

        let c = scorer.score("angel", "angle", None).unwrap();
        assert!((c.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_classic_pair() {
        let scorer = ConfusionScorer::new();
        let c = scorer.score("Effect", "affect", None).unwrap();
        assert_eq!(c, Confusion { score: 0.95, kind: ConfusionKind::Classic });
    }

    #[test]
    fn test_related_meanings_rejected() {
        let scorer = ConfusionScorer::new();
        let wn = sample_wordnet();
        // "glad" and "happy" share a sense; "being"/"beings" is unknown to the lexicon
        assert!(scorer.score("being", "beings", Some(&wn)).is_none());
        assert!(semantically_distinct(None, "being", "beings"));
        assert!(!semantically_distinct(Some(&wn), "happy", "glad"));
    }

    #[test]
    fn test_distance_limit() {
        let scorer = ConfusionScorer::new();
        assert!(scorer.score("house", "mouse", None).is_some());
        assert!(scorer.score("planet", "plaque", None).is_none());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("angel", "angle"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_similarity_ratio() {
        assert!((similarity_ratio("angel", "angle") - 0.8).abs() < 1e-9);
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_is_anagram() {
        assert!(is_anagram("angel", "angle"));
        assert!(!is_anagram("angel", "angel"));
        assert!(!is_anagram("angel", "angels"));
    }
}
