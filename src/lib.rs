//! RAG Strategy Bench - benchmark retrieval-augmented QA strategies.
//!
//! Compares four ways of combining retrieved documents with a question
//! (`stuff`, `map_reduce`, `refine`, `map_rerank`) on a CSV corpus. Each run:
//! 1. Generates question/answer pairs from a sample of corpus rows with an LLM
//! 2. Executes every strategy on every question, timing it and counting tokens
//! 3. Grades each predicted answer with an LLM judge
//! 4. Renders all records as a markdown table
//!
//! # Quick Start
//!
//! ```no_run
//! use rag_strategy_bench::{
//!     config::Config,
//!     corpus::load_csv,
//!     eval::{Benchmark, BenchmarkConfig, ExampleGenerator, Grader, render, write_report},
//!     index::{VectorRetriever, load_or_build},
//!     llm::LlmClient,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let client = Arc::new(LlmClient::new(config.llm.clone()));
//!     let corpus = Path::new("data/catalog.csv");
//!     let documents = load_csv(corpus)?;
//!
//!     let index = load_or_build(corpus, &documents, client.as_ref(), &config.llm.embedding_model).await?;
//!     let retriever = VectorRetriever::new(index, client.clone(), config.benchmark.top_k);
//!
//!     let examples = ExampleGenerator::new(client.clone())
//!         .generate(&documents, config.benchmark.sample_size)
//!         .await?;
//!
//!     let benchmark = Benchmark::new(
//!         BenchmarkConfig::from(&config.benchmark),
//!         Grader::new(client.clone()),
//!     );
//!     let results = benchmark.run(&examples, &retriever, client.as_ref()).await?;
//!
//!     write_report(Path::new("results.md"), &render(&results))?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **LlmClient**: OpenAI-compatible chat and embeddings client
//! - **VectorIndex**: embedded corpus rows, cached next to the corpus
//! - **ExampleGenerator**: synthetic evaluation examples
//! - **StrategyRunner**: one timed, metered strategy execution
//! - **Grader**: LLM-as-judge verdicts
//! - **ResultsAccumulator**: append-only records keyed by strategy

pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod index;
pub mod llm;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use corpus::{Document, load_csv};
pub use error::{BenchError, Result};
pub use eval::{
    Benchmark, BenchmarkConfig, EvaluationExample, EvaluationRecord, ExampleGenerator, Grade,
    Grader, ResultsAccumulator, StrategyId, StrategyRunner,
};
pub use index::{Retriever, VectorIndex, VectorRetriever};
pub use llm::{ChatModel, Embedder, LlmClient};
