//! LLM-as-judge grading of predicted answers.
//!
//! Predicted and reference answers rarely match verbatim, so equivalence
//! is left to a model. Verdicts are advisory: the same inputs may grade
//! differently across runs.

use super::record::{EvaluationExample, Grade};
use crate::llm::{ChatModel, Prompts};
use std::sync::Arc;
use tracing::warn;

/// Grades predictions against reference answers.
pub struct Grader {
    model: Arc<dyn ChatModel>,
}

impl Grader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Judge `predicted_answer` for `example`.
    ///
    /// Never fails: a judge error or an unreadable verdict yields
    /// [`Grade::Ungraded`] so timing data is still recorded.
    pub async fn grade(&self, example: &EvaluationExample, predicted_answer: &str) -> Grade {
        let prompt = Prompts::fill(
            Prompts::grade_answer(),
            &[
                ("query", example.query.as_str()),
                ("predicted", predicted_answer),
                ("reference", example.reference_answer.as_str()),
            ],
        );

        match self.model.complete(None, &prompt).await {
            Ok(verdict) => {
                let grade = parse_verdict(&verdict);
                if grade == Grade::Ungraded {
                    warn!(query = %example.query, verdict = %verdict.trim(), "unrecognised verdict");
                }
                grade
            }
            Err(err) => {
                warn!(query = %example.query, error = %err, "grading failed");
                Grade::Ungraded
            }
        }
    }
}

/// Read a `CORRECT`/`INCORRECT` verdict, optionally after a `GRADE:` label.
fn parse_verdict(verdict: &str) -> Grade {
    let upper = verdict.to_uppercase();
    let text = match upper.rfind("GRADE:") {
        Some(at) => &upper[at + "GRADE:".len()..],
        None => upper.as_str(),
    };
    let text = text.trim_start();

    if text.starts_with("INCORRECT") {
        Grade::Incorrect
    } else if text.starts_with("CORRECT") {
        Grade::Correct
    } else if text.contains("INCORRECT") {
        Grade::Incorrect
    } else if text.contains("CORRECT") {
        Grade::Correct
    } else {
        Grade::Ungraded
    }
}
