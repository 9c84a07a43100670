//! Pending relation rows and processed markers awaiting a flush.

use std::collections::HashSet;

use chrono::Utc;

use crate::models::{ProcessedLog, Relation, RelationKey, RelationType};

/// Round a confidence to two decimals before it is stored
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

/// Bounded queue of pending writes for one relation type. `is_full` turns
/// true once `threshold` relation rows are pending.
#[derive(Debug)]
pub struct RelationBuffer {
    relation_type: RelationType,
    threshold: usize,
    relations: Vec<Relation>,
    logs: Vec<ProcessedLog>,
}

impl RelationBuffer {
    pub fn new(relation_type: RelationType, threshold: usize) -> Self {
        Self {
            relation_type,
            threshold: threshold.max(1),
            relations: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Queue both directed rows of an undirected relation.
    ///
    /// Returns false without queuing anything when either ordering is already
    /// in `existing`. On success both orderings are added to `existing`.
    pub fn add_relation(
        &mut self,
        word_id: i64,
        related_id: i64,
        confidence: f64,
        existing: &mut HashSet<RelationKey>,
    ) -> bool {
        let rt = self.relation_type;
        if word_id == related_id
            || existing.contains(&(word_id, related_id, rt))
            || existing.contains(&(related_id, word_id, rt))
        {
            return false;
        }

        let confidence = round_confidence(confidence);
        for (source_id, target_id) in [(word_id, related_id), (related_id, word_id)] {
            self.relations.push(Relation { source_id, target_id, relation_type: rt, confidence });
            existing.insert((source_id, target_id, rt));
        }
        true
    }

    pub fn add_log(&mut self, word_id: i64, found_count: usize) {
        self.logs.push(ProcessedLog {
            word_id,
            relation_type: self.relation_type,
            processed_at: Utc::now(),
            found_count,
        });
    }

    pub fn is_full(&self) -> bool {
        self.relations.len() >= self.threshold
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty() && self.logs.is_empty()
    }

    /// Drain everything pending
    pub fn take(&mut self) -> (Vec<Relation>, Vec<ProcessedLog>) {
        (std::mem::take(&mut self.relations), std::mem::take(&mut self.logs))
    }
}
