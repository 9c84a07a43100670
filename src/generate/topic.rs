use std::collections::{BTreeSet, HashMap, HashSet};

use super::{GenerationContext, GenerationStats};
use crate::error::Result;
use crate::heuristics::TopicIndex;
use crate::models::{RelationKey, Word};

const TOPIC_CONFIDENCE: f64 = 1.0;

/// Links words listed under the same topic. Progress is reported per topic
/// bucket. Words not listed under any topic are left unmarked.
#[derive(Default)]
pub struct TopicGenerator {
    index: TopicIndex,
}

impl TopicGenerator {
    pub fn new(index: TopicIndex) -> Self {
        Self { index }
    }

    pub(super) fn generate(
        &mut self,
        words: &[Word],
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        let unprocessed: Vec<&Word> = words.iter().filter(|w| !processed.contains(&w.id)).collect();

        // word id -> topics still to visit before its marker can be written
        let mut remaining: HashMap<i64, BTreeSet<usize>> = unprocessed
            .iter()
            .filter_map(|w| self.index.topics_of(&w.text).map(|t| (w.id, t.clone())))
            .collect();
        if remaining.is_empty() {
            return Ok(GenerationStats::skipped());
        }

        let unprocessed_ids: HashSet<i64> = unprocessed.iter().map(|w| w.id).collect();
        let by_text: HashMap<String, &Word> = words.iter().map(|w| (w.lower(), w)).collect();

        let mut stats = GenerationStats { processed_count: unprocessed.len(), ..GenerationStats::default() };
        let mut seen_pairs: HashSet<(i64, i64)> = HashSet::new();
        let mut found_per_word: HashMap<i64, usize> = HashMap::new();
        let total = self.index.len();

        for (topic_idx, (topic, members)) in self.index.topics().iter().enumerate() {
            if ctx.is_cancelled() {
                break;
            }

            let in_topic: Vec<&Word> = members.iter().filter_map(|m| by_text.get(m).copied()).collect();

            for (i, w1) in in_topic.iter().enumerate() {
                for w2 in &in_topic[i + 1..] {
                    if !unprocessed_ids.contains(&w1.id) && !unprocessed_ids.contains(&w2.id) {
                        continue;
                    }
                    if !seen_pairs.insert((w1.id.min(w2.id), w1.id.max(w2.id))) {
                        continue;
                    }
                    if ctx.add_relation(w1.id, w2.id, TOPIC_CONFIDENCE, existing) {
                        stats.record(topic);
                        *found_per_word.entry(w1.id).or_insert(0) += 1;
                        *found_per_word.entry(w2.id).or_insert(0) += 1;
                    } else {
                        stats.skipped_existing += 1;
                    }
                }
            }

            for word in &in_topic {
                let Some(left) = remaining.get_mut(&word.id) else {
                    continue;
                };
                left.remove(&topic_idx);
                if left.is_empty() {
                    remaining.remove(&word.id);
                    ctx.add_log(word.id, found_per_word.get(&word.id).copied().unwrap_or(0));
                }
            }

            ctx.flush(false)?;
            ctx.report_progress(topic_idx + 1, total, stats.total_found);
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

    fn generator() -> Generator {
        Generator::Topic(TopicGenerator::new(TopicIndex::new([
            ("economy", vec!["export", "import", "tariff"]),
            ("trade", vec!["export", "import", "customs"]),
            ("health", vec!["vaccine", "diet"]),
        ])))
    }

    #[test]
    fn test_pairs_deduplicated_across_topics() {
        let list = words(&[(1, "export"), (2, "import"), (3, "tariff"), (4, "customs"), (5, "banana")]);
        let (stats, recorded) =
            run(&mut generator(), &list, &HashSet::new(), &mut HashSet::new(), 200, CancellationToken::new());

        assert_eq!(recorded.pairs(), vec![(1, 2), (1, 3), (2, 3), (1, 4), (2, 4)]);
        assert_eq!(stats.breakdown["economy"], 3);
        assert_eq!(stats.breakdown["trade"], 2);
        assert_eq!(stats.total_found, 5);
        // export's marker covers both of its topics
        assert_eq!(recorded.log_for(1), Some(3));
        assert_eq!(recorded.log_for(3), Some(2));
        assert!(recorded.log_for(5).is_none());
        assert_eq!(recorded.progress, vec![(1, 3, 3), (2, 3, 5), (3, 3, 5)]);
    }

    #[test]
    fn test_processed_pairs_skipped() {
        let list = words(&[(1, "export"), (2, "import"), (3, "tariff")]);
        let (stats, recorded) = run(
            &mut generator(),
            &list,
            &HashSet::from([1, 2]),
            &mut HashSet::new(),
            200,
            CancellationToken::new(),
        );
        // export-import were both processed before; tariff is new
        assert_eq!(recorded.pairs(), vec![(1, 3), (2, 3)]);
        assert_eq!(stats.total_found, 2);
        assert_eq!(recorded.logs().len(), 1);
    }

    #[test]
    fn test_no_topic_words_is_skipped() {
        let list = words(&[(1, "banana")]);
        let (stats, recorded) =
            run(&mut generator(), &list, &HashSet::new(), &mut HashSet::new(), 200, CancellationToken::new());
        assert!(stats.skipped);
        assert!(recorded.batches.is_empty());
    }

    #[test]
    fn test_cancel_keeps_flushed_topics() {
        let cancel = CancellationToken::new();
        let list = words(&[(1, "export"), (2, "import"), (3, "vaccine"), (4, "diet")]);
        let index = crate::generate::word_index(&list);
        let mut existing = HashSet::new();
        let mut saved = Vec::new();
        let mut generator = generator();
        {
            let stopper = cancel.clone();
            let mut ctx = GenerationContext::new(crate::models::RelationType::Topic, 200, cancel)
                .on_save(|r, _| {
                    saved.extend(r.to_vec());
                    Ok(())
                })
                .on_progress(move |done, _, _| {
                    if done == 1 {
                        stopper.cancel();
                    }
                });
            generator.generate(&list, &index, &mut existing, &HashSet::new(), &mut ctx).unwrap();
        }
        // only the first topic ran; its relations were flushed on the way out
        assert_eq!(saved.len(), 2);
        assert!(!existing.contains(&(3, 4, crate::models::RelationType::Topic)));
    }
}
