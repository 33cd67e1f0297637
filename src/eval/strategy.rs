//! Retrieval-QA strategy identifiers.

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How retrieved documents are combined with the query before answering.
///
/// - `Stuff`: every document in one prompt
/// - `MapReduce`: extract from each document, then combine
/// - `Refine`: answer from the first document, refine with each next one
/// - `MapRerank`: answer per document with a score, keep the best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Stuff,
    MapReduce,
    Refine,
    MapRerank,
}

impl StrategyId {
    /// Every strategy, in benchmark order.
    pub const ALL: [StrategyId; 4] = [
        StrategyId::Stuff,
        StrategyId::MapReduce,
        StrategyId::Refine,
        StrategyId::MapRerank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stuff => "stuff",
            Self::MapReduce => "map_reduce",
            Self::Refine => "refine",
            Self::MapRerank => "map_rerank",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = BenchError;

    /// Exact match on the wire tokens only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| BenchError::UnknownStrategy(s.to_string()))
    }
}
