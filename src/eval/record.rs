//! Evaluation data: examples, grades and measured records.

use serde::{Deserialize, Serialize};

/// A generated question with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationExample {
    pub query: String,
    pub reference_answer: String,
}

impl EvaluationExample {
    pub fn new(query: impl Into<String>, reference_answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reference_answer: reference_answer.into(),
        }
    }
}

/// Judge verdict for one predicted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Correct,
    Incorrect,
    /// Not graded: the judge failed or the strategy produced no answer.
    #[default]
    Ungraded,
}

impl Grade {
    /// Report cell text; ungraded renders empty.
    pub fn as_cell(&self) -> &'static str {
        match self {
            Grade::Correct => "CORRECT",
            Grade::Incorrect => "INCORRECT",
            Grade::Ungraded => "",
        }
    }

    pub fn is_graded(&self) -> bool {
        !matches!(self, Grade::Ungraded)
    }
}

/// What a strategy produced for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The strategy answered.
    Answer(String),
    /// The strategy could not parse its own intermediate output; the
    /// description stands in for the answer.
    RecoverableFailure(String),
}

impl StrategyOutcome {
    /// Text recorded as the predicted answer.
    pub fn text(&self) -> &str {
        match self {
            StrategyOutcome::Answer(s) | StrategyOutcome::RecoverableFailure(s) => s,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            StrategyOutcome::Answer(s) => Some(s),
            StrategyOutcome::RecoverableFailure(_) => None,
        }
    }
}

/// One timed, graded execution of one query under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub sequence_number: u32,
    pub query: String,
    pub predicted_answer: String,
    pub reference_answer: String,
    pub grade: Grade,
    pub latency_ms: f64,
    /// Total tokens for the execution; 0 when the service reported none.
    pub tokens_used: u64,
}
