//! Strategy benchmarking.
//!
//! This module provides:
//! - Evaluation example generation from corpus documents
//! - The four retrieval-QA strategies and a timed, metered runner
//! - LLM-as-judge grading
//! - The results accumulator and markdown report

pub mod benchmark;
pub mod chains;
pub mod generator;
pub mod grader;
pub mod record;
pub mod report;
pub mod results;
pub mod runner;
pub mod strategy;

pub use benchmark::{Benchmark, BenchmarkConfig};
pub use chains::{ChainError, run_chain};
pub use generator::ExampleGenerator;
pub use grader::Grader;
pub use record::{EvaluationExample, EvaluationRecord, Grade, StrategyOutcome};
pub use report::{REPORT_HEADERS, render, summary_json, write_report};
pub use results::{ResultsAccumulator, ResultsEntry, StrategySummary};
pub use runner::{MeteredModel, RunResult, StrategyRunner};
pub use strategy::StrategyId;
