//! Benchmark loop: every strategy against every example.

use super::grader::Grader;
use super::record::{EvaluationExample, EvaluationRecord, Grade};
use super::results::ResultsAccumulator;
use super::runner::StrategyRunner;
use super::strategy::StrategyId;
use crate::config::BenchmarkSettings;
use crate::error::Result;
use crate::index::Retriever;
use crate::llm::ChatModel;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for the benchmark.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Strategies to run, in order.
    pub strategies: Vec<StrategyId>,
    /// Per-execution timeout.
    pub timeout: Option<Duration>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyId::ALL.to_vec(),
            timeout: None,
        }
    }
}

impl From<&BenchmarkSettings> for BenchmarkConfig {
    fn from(settings: &BenchmarkSettings) -> Self {
        Self {
            strategies: settings.strategies.clone(),
            timeout: settings.timeout(),
        }
    }
}

/// Benchmark runner.
pub struct Benchmark {
    config: BenchmarkConfig,
    runner: StrategyRunner,
    grader: Grader,
}

impl Benchmark {
    /// Create a new benchmark runner.
    pub fn new(config: BenchmarkConfig, grader: Grader) -> Self {
        let runner = StrategyRunner::with_timeout(config.timeout);
        Self {
            config,
            runner,
            grader,
        }
    }

    /// Run every configured strategy over `examples`, one call at a time.
    ///
    /// Per-example validation and grading failures become degraded
    /// records; service failures and timeouts abort the run.
    pub async fn run(
        &self,
        examples: &[EvaluationExample],
        retriever: &dyn Retriever,
        model: &dyn ChatModel,
    ) -> Result<ResultsAccumulator> {
        let start_time = Instant::now();
        let mut results = ResultsAccumulator::new();

        for &strategy in &self.config.strategies {
            info!(%strategy, examples = examples.len(), "running strategy");

            for (idx, example) in examples.iter().enumerate() {
                let record = self
                    .evaluate(strategy, idx as u32, example, retriever, model)
                    .await?;

                info!(
                    %strategy,
                    example = idx + 1,
                    total = examples.len(),
                    latency_ms = record.latency_ms,
                    tokens = record.tokens_used,
                    grade = ?record.grade,
                    "evaluated"
                );

                results.record(strategy, record)?;
            }
        }

        info!(
            records = results.total_records(),
            elapsed_secs = start_time.elapsed().as_secs_f64(),
            "benchmark complete"
        );

        Ok(results)
    }

    /// Run, then grade, a single example.
    async fn evaluate(
        &self,
        strategy: StrategyId,
        sequence_number: u32,
        example: &EvaluationExample,
        retriever: &dyn Retriever,
        model: &dyn ChatModel,
    ) -> Result<EvaluationRecord> {
        let run = self
            .runner
            .run(strategy, retriever, model, &example.query)
            .await?;

        let grade = match run.outcome.answer() {
            Some(answer) => self.grader.grade(example, answer).await,
            None => Grade::Ungraded,
        };

        Ok(EvaluationRecord {
            sequence_number,
            query: example.query.clone(),
            predicted_answer: run.outcome.text().to_string(),
            reference_answer: example.reference_answer.clone(),
            grade,
            latency_ms: run.latency_ms,
            tokens_used: run.tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::error::BenchError;
    use crate::eval::render;
    use crate::testing::{ScriptedModel, StaticRetriever, with_tokens};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn examples() -> Vec<EvaluationExample> {
        (1..=3)
            .map(|i| EvaluationExample::new(format!("q{}", i), format!("a{}", i)))
            .collect()
    }

    /// Answers strategy prompts with "answer" and grades everything CORRECT.
    fn cooperative_model() -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel::with_handler(|prompt| {
            if prompt.starts_with("You are a teacher grading") {
                Ok(with_tokens("GRADE: CORRECT", 2))
            } else {
                Ok(with_tokens("answer\nScore: 50", 10))
            }
        }))
    }

    /// Returns nothing for one query, one document otherwise.
    struct GapRetriever {
        empty_for: &'static str,
    }

    #[async_trait]
    impl Retriever for GapRetriever {
        async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
            if query == self.empty_for {
                Ok(Vec::new())
            } else {
                Ok(vec![Document::from_text(0, "doc")])
            }
        }
    }

    #[test]
    fn test_config_from_settings() {
        let settings = BenchmarkSettings {
            strategies: vec![StrategyId::Refine],
            timeout_secs: Some(9),
            ..Default::default()
        };
        let config = BenchmarkConfig::from(&settings);
        assert_eq!(config.strategies, vec![StrategyId::Refine]);
        assert_eq!(config.timeout, Some(Duration::from_secs(9)));
    }

    #[tokio::test]
    async fn test_two_strategies_three_examples() {
        let model = cooperative_model();
        let config = BenchmarkConfig {
            strategies: vec![StrategyId::Stuff, StrategyId::MapReduce],
            timeout: None,
        };
        let benchmark = Benchmark::new(config, Grader::new(model.clone()));
        let retriever = StaticRetriever::of(&["doc a", "doc b"]);

        let results = benchmark
            .run(&examples(), &retriever, model.as_ref())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        for entry in results.entries() {
            let queries: Vec<&str> = entry.records().iter().map(|r| r.query.as_str()).collect();
            assert_eq!(queries, vec!["q1", "q2", "q3"]);
            let seqs: Vec<u32> = entry.records().iter().map(|r| r.sequence_number).collect();
            assert_eq!(seqs, vec![0, 1, 2]);
            assert!(entry.records().iter().all(|r| r.grade == Grade::Correct));
        }
        // stuff: one call; map_reduce: two maps plus combine. Grading is not metered.
        assert_eq!(results.get(StrategyId::Stuff).unwrap().records()[0].tokens_used, 10);
        assert_eq!(results.get(StrategyId::MapReduce).unwrap().records()[0].tokens_used, 30);

        assert_eq!(render(&results).lines().count(), 2 + 6);
    }

    #[tokio::test]
    async fn test_validation_failure_on_one_query_keeps_the_run_alive() {
        let model = cooperative_model();
        let config = BenchmarkConfig {
            strategies: vec![StrategyId::Refine],
            timeout: None,
        };
        let benchmark = Benchmark::new(config, Grader::new(model.clone()));
        let retriever = GapRetriever { empty_for: "q2" };

        let results = benchmark
            .run(&examples(), &retriever, model.as_ref())
            .await
            .unwrap();

        let records = results.get(StrategyId::Refine).unwrap().records();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].grade, Grade::Correct);
        assert_eq!(records[2].grade, Grade::Correct);
        assert!(records[0].predicted_answer.starts_with("answer"));

        assert_eq!(
            records[1].predicted_answer,
            "refine requires at least one document"
        );
        assert_eq!(records[1].grade, Grade::Ungraded);
        assert_eq!(records[1].tokens_used, 0);
    }

    #[tokio::test]
    async fn test_grading_failure_keeps_measurements() {
        let model = Arc::new(ScriptedModel::with_handler(|prompt| {
            if prompt.starts_with("You are a teacher grading") {
                Err(BenchError::Http("judge down".to_string()))
            } else {
                Ok(with_tokens("answer", 4))
            }
        }));
        let config = BenchmarkConfig {
            strategies: vec![StrategyId::Stuff],
            timeout: None,
        };
        let benchmark = Benchmark::new(config, Grader::new(model.clone()));
        let retriever = StaticRetriever::of(&["doc"]);

        let results = benchmark
            .run(&examples()[..1], &retriever, model.as_ref())
            .await
            .unwrap();

        let record = &results.get(StrategyId::Stuff).unwrap().records()[0];
        assert_eq!(record.grade, Grade::Ungraded);
        assert_eq!(record.tokens_used, 4);
        assert_eq!(record.predicted_answer, "answer");
    }

    #[tokio::test]
    async fn test_service_outage_aborts_run() {
        let model = Arc::new(ScriptedModel::unavailable());
        let benchmark = Benchmark::new(BenchmarkConfig::default(), Grader::new(model.clone()));
        let retriever = StaticRetriever::of(&["doc"]);

        let err = benchmark
            .run(&examples(), &retriever, model.as_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::Http(_)));
    }
}
