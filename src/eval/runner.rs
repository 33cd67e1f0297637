//! Timed, metered execution of one strategy against one query.

use super::chains::{ChainError, ChainResult, run_chain};
use super::record::StrategyOutcome;
use super::strategy::StrategyId;
use crate::error::{BenchError, Result};
use crate::index::Retriever;
use crate::llm::{ChatModel, LlmResponse, Message};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Measurements from one strategy execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub outcome: StrategyOutcome,
    /// Wall-clock time of retrieval plus every model call.
    pub latency_ms: f64,
    /// Tokens reported by the service during the execution, 0 if none were.
    pub tokens_used: u64,
}

/// Wraps a model and sums the usage it reports.
pub struct MeteredModel<'a> {
    inner: &'a dyn ChatModel,
    total_tokens: AtomicU64,
    reported: AtomicBool,
}

impl<'a> MeteredModel<'a> {
    pub fn new(inner: &'a dyn ChatModel) -> Self {
        Self {
            inner,
            total_tokens: AtomicU64::new(0),
            reported: AtomicBool::new(false),
        }
    }

    /// Total tokens so far; 0 when no call reported usage.
    pub fn total_tokens(&self) -> u64 {
        if self.reported.load(Ordering::Relaxed) {
            self.total_tokens.load(Ordering::Relaxed)
        } else {
            0
        }
    }
}

#[async_trait]
impl<'a> ChatModel for MeteredModel<'a> {
    async fn chat(&self, messages: Vec<Message>) -> Result<LlmResponse> {
        let response = self.inner.chat(messages).await?;
        if let Some(usage) = response.usage {
            self.total_tokens
                .fetch_add(u64::from(usage.total_tokens), Ordering::Relaxed);
            self.reported.store(true, Ordering::Relaxed);
        }
        Ok(response)
    }
}

/// Runs strategies, bracketing each execution with a timer and usage meter.
#[derive(Debug, Clone, Default)]
pub struct StrategyRunner {
    timeout: Option<Duration>,
}

impl StrategyRunner {
    /// A runner that waits as long as the service takes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that fails the run when one execution exceeds `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Execute `strategy` for `query`.
    ///
    /// A strategy validation failure becomes
    /// [`StrategyOutcome::RecoverableFailure`] with usage still counted.
    /// Service failures and timeouts are returned as errors.
    pub async fn run(
        &self,
        strategy: StrategyId,
        retriever: &dyn Retriever,
        model: &dyn ChatModel,
        query: &str,
    ) -> Result<RunResult> {
        let metered = MeteredModel::new(model);

        let start = Instant::now();
        let execution = execute(strategy, retriever, &metered, query);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, execution)
                .await
                .map_err(|_| BenchError::Timeout {
                    strategy: strategy.to_string(),
                    after: limit,
                })?,
            None => execution.await,
        };
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let tokens_used = metered.total_tokens();

        let outcome = match result {
            Ok(answer) => StrategyOutcome::Answer(answer),
            Err(ChainError::Validation(description)) => {
                warn!(%strategy, query, error = %description, "strategy output rejected, continuing");
                StrategyOutcome::RecoverableFailure(description)
            }
            Err(ChainError::Service(err)) => return Err(err),
        };

        debug!(%strategy, latency_ms, tokens_used, "strategy finished");

        Ok(RunResult {
            outcome,
            latency_ms,
            tokens_used,
        })
    }
}

async fn execute(
    strategy: StrategyId,
    retriever: &dyn Retriever,
    model: &dyn ChatModel,
    query: &str,
) -> ChainResult<String> {
    let documents = retriever.retrieve(query).await?;
    run_chain(strategy, &documents, model, query).await
}
