//! Synthetic question/answer generation from corpus documents.

use super::record::EvaluationExample;
use crate::corpus::Document;
use crate::error::{BenchError, Result};
use crate::llm::{ChatModel, Prompts, extract_json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Generates evaluation examples with a language model.
pub struct ExampleGenerator {
    model: Arc<dyn ChatModel>,
}

/// Accepts `{"query", "answer"}` as well as the `{"qa_pairs": {...}}` wrapping.
#[derive(Debug, Deserialize)]
struct RawPair {
    #[serde(default, alias = "question")]
    query: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    qa_pairs: Option<Box<RawPair>>,
}

impl ExampleGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Generate one example from each of the first `sample_size` documents.
    ///
    /// Malformed pairs are dropped, so the result may be shorter than
    /// `sample_size`. A service failure fails the whole request.
    pub async fn generate(
        &self,
        documents: &[Document],
        sample_size: usize,
    ) -> Result<Vec<EvaluationExample>> {
        if sample_size > documents.len() {
            return Err(BenchError::SampleTooLarge {
                requested: sample_size,
                available: documents.len(),
            });
        }

        let mut examples = Vec::with_capacity(sample_size);

        for document in &documents[..sample_size] {
            let prompt = Prompts::fill(
                Prompts::generate_example(),
                &[("document", document.content.as_str())],
            );
            let response = self.model.complete(None, &prompt).await?;

            match parse_example(&response) {
                Some(example) => examples.push(example),
                None => warn!(
                    row = document.row,
                    response = %response.trim(),
                    "dropping malformed generated pair"
                ),
            }
        }

        info!(
            requested = sample_size,
            generated = examples.len(),
            "generated evaluation examples"
        );

        Ok(examples)
    }
}

/// Parse a generated pair; `None` when either field is missing or blank.
fn parse_example(response: &str) -> Option<EvaluationExample> {
    parse_json_pair(response).or_else(|| parse_labelled_pair(response))
}

fn parse_json_pair(response: &str) -> Option<EvaluationExample> {
    let raw: RawPair = serde_json::from_str(&extract_json(response)).ok()?;
    let raw = match raw.qa_pairs {
        Some(inner) => *inner,
        None => raw,
    };
    complete_pair(raw.query?, raw.answer?)
}

/// `QUESTION: ...` / `ANSWER: ...` plain-text layout.
fn parse_labelled_pair(response: &str) -> Option<EvaluationExample> {
    let q_at = response.find("QUESTION:")?;
    let a_at = response.find("ANSWER:")?;
    if a_at < q_at {
        return None;
    }

    let query = &response[q_at + "QUESTION:".len()..a_at];
    let answer = &response[a_at + "ANSWER:".len()..];
    complete_pair(query.to_string(), answer.to_string())
}

fn complete_pair(query: String, answer: String) -> Option<EvaluationExample> {
    let (query, answer) = (query.trim(), answer.trim());
    if query.is_empty() || answer.is_empty() {
        return None;
    }
    Some(EvaluationExample::new(query, answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::from_text(i, format!("product {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_generates_one_example_per_sampled_document() {
        let model = Arc::new(ScriptedModel::replies(
            vec![
                r#"{"query": "What is product 0?", "answer": "A shirt."}"#,
                "```json\n{\"query\": \"What is product 1?\", \"answer\": \"A hat.\"}\n```",
            ],
            3,
        ));
        let generator = ExampleGenerator::new(model.clone());

        let examples = generator.generate(&docs(4), 2).await.unwrap();

        assert_eq!(
            examples,
            vec![
                EvaluationExample::new("What is product 0?", "A shirt."),
                EvaluationExample::new("What is product 1?", "A hat."),
            ]
        );
        assert_eq!(model.call_count(), 2);
        assert!(model.prompts()[1].contains("product 1"));
    }

    #[tokio::test]
    async fn test_malformed_pairs_are_dropped() {
        let model = Arc::new(ScriptedModel::replies(
            vec![
                r#"{"query": "Only a question?"}"#,
                "QUESTION: Is it waterproof?\nANSWER: Yes.",
                r#"{"query": "", "answer": "blank query"}"#,
            ],
            1,
        ));
        let generator = ExampleGenerator::new(model);

        let examples = generator.generate(&docs(3), 3).await.unwrap();
        assert_eq!(
            examples,
            vec![EvaluationExample::new("Is it waterproof?", "Yes.")]
        );
    }

    #[tokio::test]
    async fn test_sample_larger_than_corpus_is_rejected() {
        let generator = ExampleGenerator::new(Arc::new(ScriptedModel::replies(vec![], 0)));
        let err = generator.generate(&docs(2), 3).await.unwrap_err();
        assert!(matches!(
            err,
            BenchError::SampleTooLarge {
                requested: 3,
                available: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_service_failure_fails_generation() {
        let generator = ExampleGenerator::new(Arc::new(ScriptedModel::unavailable()));
        assert!(generator.generate(&docs(2), 2).await.is_err());
    }

    #[test]
    fn test_parse_wrapped_pair() {
        let text = r#"{"qa_pairs": {"query": "Q?", "answer": "A."}}"#;
        assert_eq!(parse_example(text), Some(EvaluationExample::new("Q?", "A.")));
    }
}
