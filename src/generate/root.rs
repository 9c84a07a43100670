use std::collections::HashSet;

use super::{GenerationContext, GenerationStats};
use crate::error::Result;
use crate::heuristics::RootAnalyzer;
use crate::models::{RelationKey, Word};

pub struct RootGenerator {
    min_confidence: f64,
    analyzer: RootAnalyzer,
}

impl RootGenerator {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence, analyzer: RootAnalyzer::new() }
    }

    /// Each unprocessed word is compared with the whole vocabulary, so new
    /// words also link to words processed in earlier runs.
    pub(super) fn generate(
        &mut self,
        words: &[Word],
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        let unprocessed: Vec<&Word> = words.iter().filter(|w| !processed.contains(&w.id)).collect();
        if unprocessed.is_empty() {
            return Ok(GenerationStats::skipped());
        }

        let mut stats = GenerationStats { processed_count: unprocessed.len(), ..GenerationStats::default() };
        // Pairs with a word scanned earlier in this run were already compared
        let mut scanned: HashSet<i64> = HashSet::new();

        for (i, w1) in unprocessed.iter().enumerate() {
            if ctx.is_cancelled() {
                break;
            }

            let mut found = 0;
            for w2 in words {
                if w2.id == w1.id || scanned.contains(&w2.id) {
                    continue;
                }
                let Some(m) = self.analyzer.same_root(&w1.text, &w2.text) else {
                    continue;
                };
                if m.confidence < self.min_confidence {
                    continue;
                }
                if ctx.add_relation(w1.id, w2.id, m.confidence, existing) {
                    found += 1;
                    stats.record(m.method.as_str());
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

#[cfg(test)]
mod tests {
    use super::super::test_support::{run, words};
    use super::super::{CancellationToken, Generator};
    use super::*;
    use crate::config::GenerationConfig;
    use crate::models::RelationType;

    fn generator(min_confidence: f64) -> Generator {
        let config = GenerationConfig { root_min_confidence: min_confidence, ..Default::default() };
        Generator::for_type(RelationType::Root, &config, None)
    }

    #[test]
    fn test_new_word_links_to_processed_older_word() {
        // "inspect" (1) was processed in an earlier run; "spectator" (2) is new
        let list = words(&[(1, "inspect"), (2, "spectator"), (3, "banana")]);
        let (stats, recorded) = run(
            &mut generator(0.75),
            &list,
            &HashSet::from([1]),
            &mut HashSet::new(),
            200,
            CancellationToken::new(),
        );
        assert_eq!(recorded.pairs(), vec![(1, 2)]);
        assert_eq!(stats.breakdown["latin_greek"], 1);
        assert_eq!(recorded.log_for(2), Some(1));
        assert_eq!(recorded.log_for(3), Some(0));
    }

    #[test]
    fn test_lower_id_new_word_links_to_higher_id() {
        let list = words(&[(1, "quick"), (2, "quickly")]);
        let (stats, recorded) = run(
            &mut generator(0.75),
            &list,
            &HashSet::from([2]),
            &mut HashSet::new(),
            200,
            CancellationToken::new(),
        );
        assert_eq!(recorded.pairs(), vec![(1, 2)]);
        assert_eq!(stats.breakdown["stem"], 1);
    }

    #[test]
    fn test_pair_counted_once_per_run() {
        let list = words(&[(1, "quick"), (2, "quickly")]);
        let (stats, recorded) =
            run(&mut generator(0.75), &list, &HashSet::new(), &mut HashSet::new(), 200, CancellationToken::new());
        assert_eq!(stats.total_found, 1);
        assert_eq!(stats.skipped_existing, 0);
        assert_eq!(recorded.log_for(1), Some(1));
        assert_eq!(recorded.log_for(2), Some(0));
    }

    #[test]
    fn test_min_confidence_filters_stem_matches() {
        let list = words(&[(1, "quick"), (2, "quickly")]);
        let (stats, _) =
            run(&mut generator(0.85), &list, &HashSet::new(), &mut HashSet::new(), 200, CancellationToken::new());
        assert_eq!(stats.total_found, 0);
    }
}
