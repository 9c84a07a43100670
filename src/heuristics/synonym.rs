//! Synonym candidates: direct lexicon synonyms and taxonomic similarity.

use rayon::prelude::*;

use crate::error::{LexrelError, Result};
use crate::lexicon::LexicalOracle;
use crate::models::Word;

/// Senses compared per word in the similarity pass
const LEADING_SENSES: usize = 2;

/// Direct synonyms of `word` at or above `min_confidence`, sorted by name.
pub fn direct_synonyms(oracle: &dyn LexicalOracle, word: &str, min_confidence: f64) -> Vec<(String, f64)> {
    let mut synonyms: Vec<(String, f64)> = oracle
        .synonyms_of(word)
        .into_iter()
        .filter(|(_, confidence)| *confidence >= min_confidence)
        .collect();
    synonyms.sort_by(|a, b| a.0.cmp(&b.0));
    synonyms
}

/// A pair found by the similarity pass: (source id, target id, similarity)
pub type SimilarPair = (i64, i64, f64);

/// Compare every pair of `words` that the lexicon knows, keeping pairs whose
/// leading-sense path similarity reaches `threshold`.
///
/// Rows are split into batches of `batch_size` first-words and scored on a
/// dedicated pool of `workers` threads. Results are ordered by batch, so the
/// output does not depend on scheduling.
pub fn semantic_pairs(
    oracle: &dyn LexicalOracle,
    words: &[Word],
    threshold: f64,
    batch_size: usize,
    workers: usize,
) -> Result<Vec<SimilarPair>> {
    let known: Vec<&Word> = words.iter().filter(|w| oracle.has_senses(&w.text)).collect();
    if known.len() < 2 {
        return Ok(Vec::new());
    }

    let starts: Vec<usize> = (0..known.len()).step_by(batch_size.max(1)).collect();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| LexrelError::Generation(format!("similarity pool: {}", e)))?;

    let batches: Vec<Vec<SimilarPair>> = pool.install(|| {
        starts
            .par_iter()
            .map(|&start| {
                let end = (start + batch_size).min(known.len());
                score_rows(oracle, &known, start..end, threshold)
            })
            .collect()
    });

    Ok(batches.into_iter().flatten().collect())
}

fn score_rows(
    oracle: &dyn LexicalOracle,
    known: &[&Word],
    rows: std::ops::Range<usize>,
    threshold: f64,
) -> Vec<SimilarPair> {
    let mut found = Vec::new();
    for i in rows {
        let w1 = known[i];
        for w2 in &known[i + 1..] {
            let similarity = oracle
                .leading_sense_similarity(&w1.text, &w2.text, LEADING_SENSES, threshold)
                .unwrap_or(0.0);
            if similarity >= threshold {
                found.push((w1.id, w2.id, similarity));
            }
        }
    }
    found
}
