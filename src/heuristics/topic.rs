//! Topic buckets and the reverse word -> topics index.

use std::collections::{BTreeSet, HashMap};

use super::data::TOPICS;

pub struct TopicIndex {
    /// (topic, lowercase member words) in table order
    topics: Vec<(String, Vec<String>)>,
    word_topics: HashMap<String, BTreeSet<usize>>,
}

impl Default for TopicIndex {
    fn default() -> Self {
        Self::new(TOPICS.iter().map(|(topic, words)| (*topic, words.iter().copied())))
    }
}

impl TopicIndex {
    pub fn new<'a, I, W>(table: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, W)>,
        W: IntoIterator<Item = &'a str>,
    {
        let topics: Vec<(String, Vec<String>)> = table
            .into_iter()
            .map(|(topic, words)| {
                let mut members: Vec<String> = Vec::new();
                for word in words {
                    let word = word.to_lowercase();
                    if !members.contains(&word) {
                        members.push(word);
                    }
                }
                (topic.to_string(), members)
            })
            .collect();

        let mut word_topics: HashMap<String, BTreeSet<usize>> = HashMap::new();
        for (idx, (_, members)) in topics.iter().enumerate() {
            for word in members {
                word_topics.entry(word.clone()).or_default().insert(idx);
            }
        }

        Self { topics, word_topics }
    }

    pub fn topics(&self) -> &[(String, Vec<String>)] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Indices of the topics listing `word`
    pub fn topics_of(&self, word: &str) -> Option<&BTreeSet<usize>> {
        self.word_topics.get(&word.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_index() {
        let index = TopicIndex::new([
            ("economy", vec!["Export", "import", "export"]),
            ("trade", vec!["export", "tariff"]),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.topics()[0].1, vec!["export", "import"]);
        assert_eq!(index.topics_of("EXPORT"), Some(&BTreeSet::from([0, 1])));
        assert!(index.topics_of("banana").is_none());
    }

    #[test]
    fn test_default_table_loaded() {
        let index = TopicIndex::default();
        assert!(!index.is_empty());
        assert!(index.topics_of("pollution").is_some());
    }
}
