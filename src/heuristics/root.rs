//! Shared-root detection: Latin/Greek roots first, then stem plus
//! derivational suffix matching.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use super::data::{RootInfo, COMMON_PREFIXES, LATIN_GREEK_ROOTS, ROOT_DENYLIST};

const STEM_SUFFIXES: [&str; 7] = ["ing", "ed", "er", "est", "ly", "s", "es"];

/// Short prefixes allowed directly before a root
const SHORT_ROOT_PREFIXES: [&str; 9] = ["a", "e", "i", "o", "u", "de", "re", "un", "in"];

/// (suffixed form, base form). The `tion` base may keep a trailing `t`/`e`.
const DERIVATION_PATTERNS: [(&str, &str); 10] = [
    (r"^(.+)ly$", r"^(.+)$"),
    (r"^(.+)ness$", r"^(.+)$"),
    (r"^(.+)ment$", r"^(.+)$"),
    (r"^(.+)tion$", r"^(.+)t?e?$"),
    (r"^(.+)able$", r"^(.+)$"),
    (r"^(.+)ful$", r"^(.+)$"),
    (r"^(.+)ity$", r"^(.+)$"),
    (r"^(.+)ive$", r"^(.+)$"),
    (r"^(.+)ing$", r"^(.+)$"),
    (r"^(.+)ed$", r"^(.+)$"),
];

/// Confidence for a pair sharing Latin/Greek roots
const ROOT_CONFIDENCE: f64 = 0.85;
const MULTI_ROOT_BONUS: f64 = 0.1;
/// Confidence for a stem plus derivational-suffix match
const STEM_CONFIDENCE: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMethod {
    LatinGreek,
    Stem,
}

impl RootMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RootMethod::LatinGreek => "latin_greek",
            RootMethod::Stem => "stem",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMatch {
    pub confidence: f64,
    pub method: RootMethod,
}

/// Root analyzer with per-word caches. One instance per generation run.
pub struct RootAnalyzer {
    /// Prefixes sorted longest first
    prefixes: Vec<&'static str>,
    patterns: Vec<(Regex, Regex)>,
    root_cache: HashMap<String, BTreeSet<&'static str>>,
    stem_cache: HashMap<String, String>,
}

impl RootAnalyzer {
    pub fn new() -> Self {
        let mut prefixes: Vec<&'static str> = COMMON_PREFIXES.iter().map(|(p, _)| *p).collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        let patterns = DERIVATION_PATTERNS
            .iter()
            .filter_map(|(suffixed, base)| Some((Regex::new(suffixed).ok()?, Regex::new(base).ok()?)))
            .collect();

        Self {
            prefixes,
            patterns,
            root_cache: HashMap::new(),
            stem_cache: HashMap::new(),
        }
    }

    fn remove_prefix<'a>(&self, word: &'a str) -> &'a str {
        self.prefixes
            .iter()
            .find(|p| word.starts_with(**p) && word.len() > p.len() + 2)
            .map(|p| &word[p.len()..])
            .unwrap_or(word)
    }

    fn has_other_root_after(word: &str, current: &str) -> bool {
        let Some(pos) = word.find(current) else {
            return false;
        };
        let after = &word[pos + current.len()..];
        if after.len() < 3 {
            return false;
        }
        LATIN_GREEK_ROOTS
            .iter()
            .any(|(other, _)| *other != current && other.len() >= 4 && after.contains(other))
    }

    /// Reject substring hits that do not sit where a root would.
    fn validate_root_match(word: &str, root: &str, info: &RootInfo) -> bool {
        let denied = ROOT_DENYLIST
            .iter()
            .any(|(r, words)| *r == root && words.contains(&word));
        if denied {
            return false;
        }

        if info.examples.contains(&word) {
            return true;
        }

        let Some(pos) = word.find(root) else {
            return false;
        };
        if root.len() < 4 {
            return false;
        }

        let after = &word[pos + root.len()..];
        if pos == 0 {
            return after.len() >= 2 && !Self::has_other_root_after(word, root);
        }

        let before = &word[..pos];
        if COMMON_PREFIXES.iter().any(|(p, _)| *p == before) && !after.is_empty() {
            return true;
        }

        SHORT_ROOT_PREFIXES.contains(&before) && !after.is_empty()
    }

    /// Latin/Greek roots found in `word` (lowercase)
    pub fn extract_roots(&mut self, word: &str) -> BTreeSet<&'static str> {
        if let Some(hit) = self.root_cache.get(word) {
            return hit.clone();
        }

        let stripped = self.remove_prefix(word);
        let mut found = BTreeSet::new();
        for (root, info) in LATIN_GREEK_ROOTS {
            let present = |form: &str| stripped.contains(form) || word.contains(form);

            if present(*root) && Self::validate_root_match(word, root, info) {
                found.insert(*root);
                continue;
            }
            if info
                .variants
                .iter()
                .any(|&v| present(v) && Self::validate_root_match(word, v, info))
            {
                found.insert(*root);
            }
        }

        self.root_cache.insert(word.to_string(), found.clone());
        found
    }

    /// Strip the first matching inflectional suffix
    pub fn stem(&mut self, word: &str) -> String {
        if let Some(hit) = self.stem_cache.get(word) {
            return hit.clone();
        }
        let stem = STEM_SUFFIXES
            .iter()
            .find(|s| word.ends_with(**s) && word.len() > s.len() + 2)
            .map(|s| word[..word.len() - s.len()].to_string())
            .unwrap_or_else(|| word.to_string());
        self.stem_cache.insert(word.to_string(), stem.clone());
        stem
    }

    fn roots_similar(a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        if a.len() < 4 || b.len() < 4 {
            return false;
        }
        let one_longer = |long: &str, short: &str| long.len() == short.len() + 1 && long.starts_with(short);
        if one_longer(a, b) || one_longer(b, a) {
            return true;
        }
        if a.len() != b.len() || a.len() < 5 {
            return false;
        }
        let cut = a.len() - 2;
        matches!((a.get(..cut), b.get(..cut)), (Some(x), Some(y)) if x == y)
    }

    fn is_derivational_pair(&self, w1: &str, w2: &str) -> bool {
        let stems_similar = |suffixed: &Regex, base: &Regex, x: &str, y: &str| {
            match (suffixed.captures(x), base.captures(y)) {
                (Some(cx), Some(cy)) => Self::roots_similar(&cx[1], &cy[1]),
                _ => false,
            }
        };
        self.patterns.iter().any(|(suffixed, base)| {
            stems_similar(suffixed, base, w1, w2) || stems_similar(suffixed, base, w2, w1)
        })
    }

    /// Decide whether two words share a root.
    pub fn same_root(&mut self, w1: &str, w2: &str) -> Option<RootMatch> {
        let (w1, w2) = (w1.to_lowercase(), w2.to_lowercase());
        if w1 == w2 {
            return None;
        }

        let roots1 = self.extract_roots(&w1);
        let roots2 = self.extract_roots(&w2);
        let common = roots1.intersection(&roots2).count();
        if common > 0 {
            let bonus = if common > 1 { MULTI_ROOT_BONUS } else { 0.0 };
            return Some(RootMatch {
                confidence: (ROOT_CONFIDENCE + bonus).min(1.0),
                method: RootMethod::LatinGreek,
            });
        }

        let (stem1, stem2) = (self.stem(&w1), self.stem(&w2));
        if stem1 == stem2 && stem1.len() >= 5 && self.is_derivational_pair(&w1, &w2) {
            return Some(RootMatch { confidence: STEM_CONFIDENCE, method: RootMethod::Stem });
        }
        None
    }
}

impl Default for RootAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_fallback() {
        let mut analyzer = RootAnalyzer::new();
        let m = analyzer.same_root("quick", "quickly").unwrap();
        assert_eq!(m.method, RootMethod::Stem);
        assert_eq!(m.confidence, 0.80);
    }

    #[test]
    fn test_shared_latin_root() {
        let mut analyzer = RootAnalyzer::new();
        let m = analyzer.same_root("inspect", "spectator").unwrap();
        assert_eq!(m.method, RootMethod::LatinGreek);
        assert_eq!(m.confidence, 0.85);
    }

    #[test]
    fn test_multiple_shared_roots_bonus() {
        let mut analyzer = RootAnalyzer::new();
        // both carry "photo" and "graph"
        let m = analyzer.same_root("photograph", "photographer").unwrap();
        assert!((m.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_denylist_blocks_spurious_root() {
        let mut analyzer = RootAnalyzer::new();
        assert!(!analyzer.extract_roots("important").contains("port"));
        assert!(analyzer.extract_roots("transport").contains("port"));
    }

    #[test]
    fn test_short_root_needs_example() {
        let mut analyzer = RootAnalyzer::new();
        // "bio" is under four letters: only listed examples qualify
        assert!(analyzer.extract_roots("biology").contains("bio"));
        assert!(!analyzer.extract_roots("symbiosis").contains("bio"));
    }

    #[test]
    fn test_unrelated_words() {
        let mut analyzer = RootAnalyzer::new();
        assert!(analyzer.same_root("table", "cable").is_none());
        assert!(analyzer.same_root("same", "Same").is_none());
    }

    #[test]
    fn test_stem_strips_first_suffix_only() {
        let mut analyzer = RootAnalyzer::new();
        assert_eq!(analyzer.stem("walking"), "walk");
        assert_eq!(analyzer.stem("bed"), "bed");
        assert_eq!(analyzer.stem("quickly"), "quick");
    }

    #[test]
    fn test_roots_similar() {
        assert!(RootAnalyzer::roots_similar("educat", "educate"));
        assert!(RootAnalyzer::roots_similar("creates", "created"));
        assert!(!RootAnalyzer::roots_similar("abc", "abd"));
    }
}
