//! RAG Strategy Bench CLI
//!
//! Benchmarks retrieval-augmented QA strategies against a CSV corpus.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_strategy_bench::{
    config::Config,
    corpus::load_csv,
    eval::{
        Benchmark, BenchmarkConfig, ExampleGenerator, Grader, ResultsAccumulator, StrategyId,
        render, summary_json, write_report,
    },
    index::{VectorRetriever, cache_path_for, load_or_build},
    llm::LlmClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// RAG Strategy Bench - compare retrieval-QA strategies on a corpus
#[derive(Parser)]
#[command(name = "rag-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate examples, run every strategy and write the report
    Run {
        /// Path to the corpus CSV file
        corpus: PathBuf,

        /// Strategies to run, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        strategies: Option<Vec<StrategyId>>,

        /// Number of corpus rows turned into evaluation examples
        #[arg(long)]
        sample_size: Option<usize>,

        /// Documents retrieved per query
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Fail the run if one strategy execution takes longer (seconds)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Markdown report path
        #[arg(short, long, default_value = "results.md")]
        output: PathBuf,

        /// Also save summaries and records as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Build (or load) the vector index cache for a corpus
    Index {
        /// Path to the corpus CSV file
        corpus: PathBuf,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    match cli.command {
        Commands::Run {
            corpus,
            strategies,
            sample_size,
            top_k,
            timeout_secs,
            output,
            json,
        } => {
            let mut config = load_config()?;
            if let Some(strategies) = strategies {
                config.benchmark.strategies = strategies;
            }
            if let Some(n) = sample_size {
                config.benchmark.sample_size = n;
            }
            if let Some(k) = top_k {
                config.benchmark.top_k = k;
            }
            if timeout_secs.is_some() {
                config.benchmark.timeout_secs = timeout_secs;
            }
            config.validate().context("Invalid configuration")?;

            cmd_run(config, corpus, output, json).await
        }
        Commands::Index { corpus } => cmd_index(corpus).await,
        Commands::Test => cmd_test().await,
    }
}

fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

async fn cmd_run(
    config: Config,
    corpus: PathBuf,
    output: PathBuf,
    json: Option<PathBuf>,
) -> Result<()> {
    let start = Instant::now();
    info!(model = %config.llm.model, corpus = %corpus.display(), "starting benchmark");

    let documents = load_csv(&corpus).context("Failed to load corpus")?;
    info!(documents = documents.len(), "corpus loaded");

    let client = Arc::new(LlmClient::new(config.llm.clone()));

    let index = load_or_build(&corpus, &documents, client.as_ref(), &config.llm.embedding_model)
        .await
        .context("Failed to prepare vector index")?;
    let retriever = VectorRetriever::new(index, client.clone(), config.benchmark.top_k);

    let examples = ExampleGenerator::new(client.clone())
        .generate(&documents, config.benchmark.sample_size)
        .await
        .context("Failed to generate evaluation examples")?;

    if examples.is_empty() {
        anyhow::bail!("No usable evaluation examples were generated");
    }

    let benchmark = Benchmark::new(
        BenchmarkConfig::from(&config.benchmark),
        Grader::new(client.clone()),
    );
    let results = benchmark
        .run(&examples, &retriever, client.as_ref())
        .await
        .context("Benchmark run failed")?;

    print_summary(&results);

    write_report(&output, &render(&results)).context("Failed to write report")?;
    println!("Report saved to: {}", output.display());

    if let Some(json_path) = json {
        let content = summary_json(&results)?;
        write_report(&json_path, &content).context("Failed to write JSON results")?;
        println!("Results saved to: {}", json_path.display());
    }

    println!("Total time: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_index(corpus: PathBuf) -> Result<()> {
    let config = load_config()?;
    config.validate().context("Invalid configuration")?;

    let documents = load_csv(&corpus).context("Failed to load corpus")?;
    let client = LlmClient::new(config.llm.clone());

    let start = Instant::now();
    let index = load_or_build(&corpus, &documents, &client, &config.llm.embedding_model)
        .await
        .context("Failed to prepare vector index")?;

    println!("\nVector Index:");
    println!("  Documents:  {}", index.len());
    println!("  Model:      {}", index.model);
    println!("  Cache:      {}", cache_path_for(&corpus).display());
    println!("  Time:       {:.2?}", start.elapsed());

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Loading configuration...");
    let config = load_config()?;
    config.validate().context("Invalid configuration")?;

    println!("Testing connection to: {}", config.llm.api_base);
    println!("Using model: {}", config.llm.model);

    let client = LlmClient::new(config.llm);
    client
        .test_connection()
        .await
        .context("Connection test failed")?;

    println!("Connection successful!");
    Ok(())
}

fn print_summary(results: &ResultsAccumulator) {
    println!("\n========== Benchmark Results ==========");
    for summary in results.summaries() {
        println!("{}", summary.strategy);
        println!("  Records:      {}", summary.records);
        println!("  Avg latency:  {:.0}ms", summary.avg_latency_ms);
        match summary.avg_tokens {
            Some(tokens) => println!("  Avg tokens:   {:.0}", tokens),
            None => println!("  Avg tokens:   n/a"),
        }
        match summary.correct_pct {
            Some(pct) => println!(
                "  Correct:      {}/{} ({:.1}%)",
                summary.correct, summary.graded, pct
            ),
            None => println!("  Correct:      n/a (nothing graded)"),
        }
        println!("----------------------------------------");
    }
    println!("Total records: {}", results.total_records());
    println!("========================================\n");
}
