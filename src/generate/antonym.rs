use std::collections::{HashMap, HashSet};

use super::{GenerationContext, GenerationStats};
use crate::error::Result;
use crate::heuristics::AntonymResolver;
use crate::lexicon::SharedOracle;
use crate::models::{RelationKey, Word};

pub struct AntonymGenerator {
    oracle: Option<SharedOracle>,
    resolver: AntonymResolver,
}

impl AntonymGenerator {
    pub fn new(oracle: Option<SharedOracle>) -> Self {
        if oracle.is_none() {
            log::warn!("Antonym generation without a lexicon: curated and prefix matches only");
        }
        Self { oracle, resolver: AntonymResolver::new() }
    }

    pub(super) fn generate(
        &mut self,
        words: &[Word],
        word_index: &HashMap<String, i64>,
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        let unprocessed: Vec<&Word> = words.iter().filter(|w| !processed.contains(&w.id)).collect();
        if unprocessed.is_empty() {
            return Ok(GenerationStats::skipped());
        }

        let mut stats = GenerationStats { processed_count: unprocessed.len(), ..GenerationStats::default() };

        for (i, word) in unprocessed.iter().enumerate() {
            if ctx.is_cancelled() {
                break;
            }

            let mut found = 0;
            let candidates = self.resolver.resolve(&word.text, self.oracle.as_deref(), word_index);
            for (antonym, source) in candidates {
                let Some(&related_id) = word_index.get(&antonym) else {
                    continue;
                };
                if ctx.add_relation(word.id, related_id, source.confidence(), existing) {
                    found += 1;
                    stats.record(source.as_str());
                } else {
                    stats.skipped_existing += 1;
                }
            }

            ctx.add_log(word.id, found);
            ctx.flush(false)?;
            ctx.report_progress(i + 1, unprocessed.len(), stats.total_found);
        }

        ctx.flush(true)?;
        Ok(stats)
    }
}
