//! Relation generators.
//!
//! One closed set of variants, one per relation type, sharing a single
//! contract: scan the words not yet processed for that type, queue new
//! relations (both directions) and one processed marker per scanned word,
//! and hand batches to the save callback whenever the buffer fills up and
//! once more at the end.

mod antonym;
mod buffer;
mod cancel;
mod confused;
mod root;
mod synonym;
mod topic;

pub use antonym::AntonymGenerator;
pub use buffer::{round_confidence, RelationBuffer};
pub use cancel::CancellationToken;
pub use confused::ConfusedGenerator;
pub use root::RootGenerator;
pub use synonym::SynonymGenerator;
pub use topic::TopicGenerator;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::lexicon::SharedOracle;
use crate::models::{ProcessedLog, Relation, RelationKey, RelationType, Word};

/// Outcome of one generator run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    /// New undirected relations queued during the run
    pub total_found: usize,
    /// Candidates dropped because the pair already existed
    pub skipped_existing: usize,
    /// Words that were eligible for scanning
    pub processed_count: usize,
    /// Nothing to do: every eligible word was already processed
    pub skipped: bool,
    /// The run needs a lexicon and none was loaded
    pub oracle_unavailable: bool,
    /// Found relations per method / source / topic
    pub breakdown: BTreeMap<String, usize>,
}

impl GenerationStats {
    pub fn skipped() -> Self {
        Self { skipped: true, ..Self::default() }
    }

    fn record(&mut self, key: &str) {
        self.total_found += 1;
        *self.breakdown.entry(key.to_string()).or_insert(0) += 1;
    }
}

/// Lowercase word text -> word id. On duplicate text the later word wins.
pub fn word_index(words: &[Word]) -> HashMap<String, i64> {
    words.iter().map(|w| (w.lower(), w.id)).collect()
}

type SaveFn<'a> = Box<dyn FnMut(&[Relation], &[ProcessedLog]) -> Result<()> + 'a>;
type ProgressFn<'a> = Box<dyn FnMut(usize, usize, usize) + 'a>;

/// Everything a generator needs besides its inputs: the write buffer, the
/// stop signal and the two callbacks.
pub struct GenerationContext<'a> {
    buffer: RelationBuffer,
    cancel: CancellationToken,
    on_save: SaveFn<'a>,
    on_progress: ProgressFn<'a>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(relation_type: RelationType, flush_threshold: usize, cancel: CancellationToken) -> Self {
        Self {
            buffer: RelationBuffer::new(relation_type, flush_threshold),
            cancel,
            on_save: Box::new(|_, _| Ok(())),
            on_progress: Box::new(|_, _, _| {}),
        }
    }

    /// Called with each batch of (relations, logs) to persist
    pub fn on_save<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[Relation], &[ProcessedLog]) -> Result<()> + 'a,
    {
        self.on_save = Box::new(f);
        self
    }

    /// Called with (processed, total, found)
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, usize, usize) + 'a,
    {
        self.on_progress = Box::new(f);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn add_relation(&mut self, word_id: i64, related_id: i64, confidence: f64, existing: &mut HashSet<RelationKey>) -> bool {
        self.buffer.add_relation(word_id, related_id, confidence, existing)
    }

    pub fn add_log(&mut self, word_id: i64, found_count: usize) {
        self.buffer.add_log(word_id, found_count);
    }

    /// Hand pending rows to the save callback once the buffer is full, or
    /// unconditionally when `force` is set.
    pub fn flush(&mut self, force: bool) -> Result<()> {
        if !(force || self.buffer.is_full()) || self.buffer.is_empty() {
            return Ok(());
        }
        let (relations, logs) = self.buffer.take();
        log::debug!("Flushing {} relation rows, {} logs", relations.len(), logs.len());
        (self.on_save)(&relations, &logs)
    }

    pub fn report_progress(&mut self, processed: usize, total: usize, found: usize) {
        (self.on_progress)(processed, total, found);
    }
}

/// The five generator variants
pub enum Generator {
    Synonym(SynonymGenerator),
    Antonym(AntonymGenerator),
    Root(RootGenerator),
    Confused(ConfusedGenerator),
    Topic(TopicGenerator),
}

impl Generator {
    pub fn for_type(relation_type: RelationType, config: &GenerationConfig, oracle: Option<SharedOracle>) -> Self {
        match relation_type {
            RelationType::Synonym => Generator::Synonym(SynonymGenerator::new(config, oracle)),
            RelationType::Antonym => Generator::Antonym(AntonymGenerator::new(oracle)),
            RelationType::Root => Generator::Root(RootGenerator::new(config.root_min_confidence)),
            RelationType::Confused => {
                Generator::Confused(ConfusedGenerator::new(config.confused_min_length, oracle))
            }
            RelationType::Topic => Generator::Topic(TopicGenerator::default()),
        }
    }

    pub fn relation_type(&self) -> RelationType {
        match self {
            Generator::Synonym(_) => RelationType::Synonym,
            Generator::Antonym(_) => RelationType::Antonym,
            Generator::Root(_) => RelationType::Root,
            Generator::Confused(_) => RelationType::Confused,
            Generator::Topic(_) => RelationType::Topic,
        }
    }

    /// Scan `words` for new relations of this generator's type.
    ///
    /// `existing` is updated with every relation queued. The buffer is always
    /// force-flushed before returning successfully, also after cancellation.
    pub fn generate(
        &mut self,
        words: &[Word],
        word_index: &HashMap<String, i64>,
        existing: &mut HashSet<RelationKey>,
        processed: &HashSet<i64>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<GenerationStats> {
        match self {
            Generator::Synonym(g) => g.generate(words, word_index, existing, processed, ctx),
            Generator::Antonym(g) => g.generate(words, word_index, existing, processed, ctx),
            Generator::Root(g) => g.generate(words, existing, processed, ctx),
            Generator::Confused(g) => g.generate(words, existing, processed, ctx),
            Generator::Topic(g) => g.generate(words, existing, processed, ctx),
        }
    }
}
