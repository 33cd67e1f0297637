//! The four retrieval-QA strategies.
//!
//! Each strategy turns a query plus retrieved documents into one answer
//! using one or more model calls. Failures split in two: a strategy that
//! cannot parse its own intermediate output returns
//! [`ChainError::Validation`], which the runner survives; anything the
//! service raises is [`ChainError::Service`] and stays fatal.

use super::strategy::StrategyId;
use crate::corpus::Document;
use crate::error::BenchError;
use crate::llm::{ChatModel, Prompts};
use thiserror::Error;
use tracing::debug;

/// Separator between documents sharing one prompt.
const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Failure of a single strategy execution.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The strategy's own output was unusable; the run continues.
    #[error("{0}")]
    Validation(String),

    /// The backing service failed.
    #[error(transparent)]
    Service(#[from] BenchError),
}

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Answer `question` from `documents` using `strategy`.
pub async fn run_chain(
    strategy: StrategyId,
    documents: &[Document],
    model: &dyn ChatModel,
    question: &str,
) -> ChainResult<String> {
    debug!(%strategy, documents = documents.len(), "running chain");

    let answer = match strategy {
        StrategyId::Stuff => stuff(documents, model, question).await?,
        StrategyId::MapReduce => map_reduce(documents, model, question).await?,
        StrategyId::Refine => refine(documents, model, question).await?,
        StrategyId::MapRerank => map_rerank(documents, model, question).await?,
    };

    Ok(answer.trim().to_string())
}

async fn stuff(documents: &[Document], model: &dyn ChatModel, question: &str) -> ChainResult<String> {
    let context = documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR);

    let prompt = Prompts::fill(
        Prompts::stuff(),
        &[("context", context.as_str()), ("question", question)],
    );

    Ok(model.complete(None, &prompt).await?)
}

async fn map_reduce(
    documents: &[Document],
    model: &dyn ChatModel,
    question: &str,
) -> ChainResult<String> {
    let mut extracts = Vec::with_capacity(documents.len());

    for document in documents {
        let prompt = Prompts::fill(
            Prompts::map_extract(),
            &[("context", document.content.as_str()), ("question", question)],
        );
        extracts.push(model.complete(None, &prompt).await?.trim().to_string());
    }

    let summaries = extracts.join(DOCUMENT_SEPARATOR);
    let prompt = Prompts::fill(
        Prompts::reduce_combine(),
        &[("question", question), ("summaries", summaries.as_str())],
    );

    Ok(model.complete(None, &prompt).await?)
}

async fn refine(documents: &[Document], model: &dyn ChatModel, question: &str) -> ChainResult<String> {
    let (first, rest) = documents
        .split_first()
        .ok_or_else(|| ChainError::Validation("refine requires at least one document".to_string()))?;

    let prompt = Prompts::fill(
        Prompts::refine_initial(),
        &[("context", first.content.as_str()), ("question", question)],
    );
    let mut answer = model.complete(None, &prompt).await?;

    for document in rest {
        let prompt = Prompts::fill(
            Prompts::refine_step(),
            &[
                ("question", question),
                ("existing_answer", answer.trim()),
                ("context", document.content.as_str()),
            ],
        );
        answer = model.complete(None, &prompt).await?;
    }

    Ok(answer)
}

async fn map_rerank(
    documents: &[Document],
    model: &dyn ChatModel,
    question: &str,
) -> ChainResult<String> {
    if documents.is_empty() {
        return Err(ChainError::Validation(
            "map_rerank requires at least one document".to_string(),
        ));
    }

    let mut best: Option<(u32, String)> = None;

    for document in documents {
        let prompt = Prompts::fill(
            Prompts::map_rerank(),
            &[("context", document.content.as_str()), ("question", question)],
        );
        let output = model.complete(None, &prompt).await?;
        let (answer, score) = parse_scored_answer(&output)?;

        // Strictly greater keeps the earliest document on ties.
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, answer));
        }
    }

    Ok(best.map(|(_, answer)| answer).unwrap_or_default())
}

/// Split `"<answer>\nScore: <n>"` into its parts.
fn parse_scored_answer(output: &str) -> ChainResult<(String, u32)> {
    let invalid = || ChainError::Validation(format!("Could not parse output: {}", output.trim()));

    let at = output.rfind("Score:").ok_or_else(invalid)?;
    let answer = output[..at].trim();
    let answer = answer.strip_prefix("Helpful Answer:").unwrap_or(answer).trim();

    let digits: String = output[at + "Score:".len()..]
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let score = digits.parse::<u32>().map_err(|_| invalid())?;

    Ok((answer.to_string(), score))
}
