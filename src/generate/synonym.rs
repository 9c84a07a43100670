use std::collections::{HashMap, HashSet};

use super::{GenerationContext, GenerationStats};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::heuristics::{direct_synonyms, semantic_pairs};
use crate::lexicon::SharedOracle;
use crate::models::{RelationKey, Word};

/// Direct lexicon synonyms, then a parallel taxonomic-similarity pass over
/// the words scanned in this run.
pub struct SynonymGenerator {
    oracle: Option<SharedOracle>,
    min_confidence: f64,
    semantic_threshold: f64,
    batch_size: usize,
    workers: usize,
}

impl SynonymGenerator {
    pub fn new(config: &GenerationConfig, oracle: Option<SharedOracle>) -> Self {
        Self {
            oracle,
            min_confidence: config.synonym_min_confidence,
            semantic_threshold: config.semantic_threshold,
            batch_size: config.similarity_batch_size,
            workers: config.worker_count(),
        }
    }

    pub(super) fn generate(
        &mut self,
        words: &[Word],
        word_index: &HashMap<String, i64>,
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        let Some(oracle) = self.oracle.clone() else {
            log::warn!("Synonym generation needs a lexicon; nothing generated");
            return Ok(GenerationStats { oracle_unavailable: true, ..GenerationStats::default() });
        };

        let unprocessed: Vec<Word> = words.iter().filter(|w| !processed.contains(&w.id)).cloned().collect();
        if unprocessed.is_empty() {
            return Ok(GenerationStats::skipped());
        }

        let mut stats = GenerationStats { processed_count: unprocessed.len(), ..GenerationStats::default() };

        for (i, word) in unprocessed.iter().enumerate() {
            if ctx.is_cancelled() {
                break;
            }

            let mut found = 0;
            for (synonym, confidence) in direct_synonyms(oracle.as_ref(), &word.text, self.min_confidence) {
                let Some(&related_id) = word_index.get(&synonym) else {
                    continue;
                };
                if ctx.add_relation(word.id, related_id, confidence, existing) {
                    found += 1;
                    stats.record("direct");
                } else {
                    stats.skipped_existing += 1;
                }
            }
            log::debug!("synonym: '{}' -> {} direct", word.text, found);

            ctx.add_log(word.id, found);
            ctx.flush(false)?;
            ctx.report_progress(i + 1, unprocessed.len(), stats.total_found);
        }

        // Similarity hits count toward the run stats only; each word's marker
        // already records its direct synonyms.
        if !ctx.is_cancelled() {
            let pairs = semantic_pairs(
                oracle.as_ref(),
                &unprocessed,
                self.semantic_threshold,
                self.batch_size,
                self.workers,
            )?;

            for (source_id, target_id, similarity) in pairs {
                if ctx.add_relation(source_id, target_id, similarity, existing) {
                    stats.record("semantic");
                } else {
                    stats.skipped_existing += 1;
                }
                ctx.flush(false)?;
            }
        }

        ctx.flush(true)?;
        Ok(stats)
    }
}
