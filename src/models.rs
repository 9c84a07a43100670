//! Core data model: words, relation types, directed relation rows and
//! processed-log entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LexrelError;

/// A vocabulary word owned by a user. Read-only input for generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub definition: String,
}

impl Word {
    pub fn new(id: i64, text: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            definition: definition.into(),
        }
    }

    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

/// The fixed set of relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Synonym,
    Antonym,
    Root,
    Confused,
    Topic,
}

impl RelationType {
    pub const ALL: [RelationType; 5] = [
        RelationType::Synonym,
        RelationType::Antonym,
        RelationType::Root,
        RelationType::Confused,
        RelationType::Topic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Synonym => "synonym",
            RelationType::Antonym => "antonym",
            RelationType::Root => "root",
            RelationType::Confused => "confused",
            RelationType::Topic => "topic",
        }
    }

    /// Parse a comma separated list such as `synonym,antonym`.
    /// Empty input yields an empty list (no filter).
    pub fn parse_list(s: &str) -> Result<Vec<RelationType>, LexrelError> {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(RelationType::from_str)
            .collect()
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = LexrelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synonym" => Ok(RelationType::Synonym),
            "antonym" => Ok(RelationType::Antonym),
            "root" => Ok(RelationType::Root),
            "confused" => Ok(RelationType::Confused),
            "topic" => Ok(RelationType::Topic),
            other => Err(LexrelError::UnknownRelationType(other.to_string())),
        }
    }
}

/// Key of a directed relation row: (source, target, type).
pub type RelationKey = (i64, i64, RelationType);

/// One directed relation row. Every logical relation is stored as two rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source_id: i64,
    pub target_id: i64,
    pub relation_type: RelationType,
    pub confidence: f64,
}

/// Processed marker: the word has been fully scanned for `relation_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedLog {
    pub word_id: i64,
    pub relation_type: RelationType,
    pub processed_at: chrono::DateTime<chrono::Utc>,
    pub found_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_type_round_trip_names() {
        for rt in RelationType::ALL {
            assert_eq!(rt.as_str().parse::<RelationType>().unwrap(), rt);
        }
    }

    #[test]
    fn test_unknown_relation_type() {
        let err = "hypernym".parse::<RelationType>().unwrap_err();
        assert!(matches!(err, LexrelError::UnknownRelationType(ref t) if t == "hypernym"));
    }

    #[test]
    fn test_parse_list() {
        let types = RelationType::parse_list("synonym, topic").unwrap();
        assert_eq!(types, vec![RelationType::Synonym, RelationType::Topic]);
        assert!(RelationType::parse_list("").unwrap().is_empty());
        assert!(RelationType::parse_list("synonym,bogus").is_err());
    }

    #[test]
    fn test_relation_type_serde_lowercase() {
        let json = serde_json::to_string(&RelationType::Confused).unwrap();
        assert_eq!(json, "\"confused\"");
    }
}
