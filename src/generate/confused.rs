use std::collections::HashSet;

use super::{GenerationContext, GenerationStats};
use crate::error::Result;
use crate::heuristics::ConfusionScorer;
use crate::lexicon::SharedOracle;
use crate::models::{RelationKey, Word};

pub struct ConfusedGenerator {
    min_length: usize,
    oracle: Option<SharedOracle>,
    scorer: ConfusionScorer,
}

impl ConfusedGenerator {
    pub fn new(min_length: usize, oracle: Option<SharedOracle>) -> Self {
        if oracle.is_none() {
            log::warn!("Confused-word generation without a lexicon: all look-alike pairs count as distinct");
        }
        Self { min_length, oracle, scorer: ConfusionScorer::new() }
    }

    fn long_enough(&self, word: &Word) -> bool {
        word.text.chars().count() >= self.min_length
    }

    /// Words shorter than `min_length` are neither scanned nor marked.
    pub(super) fn generate(
        &mut self,
        words: &[Word],
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        let candidates: Vec<&Word> = words.iter().filter(|w| self.long_enough(w)).collect();
        let unprocessed: Vec<&Word> = candidates.iter().copied().filter(|w| !processed.contains(&w.id)).collect();
        if unprocessed.is_empty() {
            return Ok(GenerationStats::skipped());
        }

        let mut stats = GenerationStats { processed_count: unprocessed.len(), ..GenerationStats::default() };
        let mut scanned: HashSet<i64> = HashSet::new();
        let oracle = self.oracle.as_deref();

        for (i, w1) in unprocessed.iter().enumerate() {
            if ctx.is_cancelled() {
                break;
            }

            let mut found = 0;
            for w2 in &candidates {
                if w2.id == w1.id || scanned.contains(&w2.id) {
                    continue;
                }
                let Some(confusion) = self.scorer.score(&w1.text, &w2.text, oracle) else {
                    continue;
                };
                if ctx.add_relation(w1.id, w2.id, confusion.score, existing) {
                    found += 1;
                    stats.record(confusion.kind.as_str());
                } else {
                    stats.skipped_existing += 1;
                }
            }

            scanned.insert(w1.id);
            ctx.add_log(w1.id, found);
            ctx.flush(false)?;
            ctx.report_progress(i + 1, unprocessed.len(), stats.total_found);
        }

        ctx.flush(true)?;
        Ok(stats)
    }
}
