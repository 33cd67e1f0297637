//! Configuration for the strategy benchmark.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{BenchError, Result};
use crate::eval::StrategyId;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Chat model name (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// Embedding model used to build the vector index
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Benchmark run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    /// Strategies to run, in order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyId>,

    /// Number of corpus documents turned into evaluation examples.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Documents handed to each strategy per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-execution timeout. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_strategies() -> Vec<StrategyId> {
    StrategyId::ALL.to_vec()
}

fn default_sample_size() -> usize {
    5
}

fn default_top_k() -> usize {
    4
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            sample_size: default_sample_size(),
            top_k: default_top_k(),
            timeout_secs: None,
        }
    }
}

impl BenchmarkSettings {
    /// The configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,

    /// Benchmark settings
    #[serde(default)]
    pub benchmark: BenchmarkSettings,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    benchmark: Option<BenchmarkFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    embedding_model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkFileSection {
    strategies: Option<Vec<String>>,
    sample_size: Option<usize>,
    top_k: Option<usize>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY / OPENAI_API_KEY, LLM_MODEL, ...)
    /// 2. Config file (~/.config/rag-strategy-bench/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        if let Ok(api_base) = env::var("LLM_API_BASE") {
            config.llm.api_base = api_base;
        }

        // The provider's own variable is only a fallback.
        if let Ok(api_key) = env::var("LLM_API_KEY").or_else(|_| env::var("OPENAI_API_KEY")) {
            config.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(model) = env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                config.llm.max_tokens = tokens;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                config.llm.temperature = temp;
            }
        }

        if let Ok(timeout) = env::var("RAG_BENCH_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.benchmark.timeout_secs = Some(secs);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling gaps with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| BenchError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(model) = llm.embedding_model {
                config.llm.embedding_model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(bench) = file_config.benchmark {
            if let Some(names) = bench.strategies {
                config.benchmark.strategies = names
                    .iter()
                    .map(|n| n.parse())
                    .collect::<Result<Vec<StrategyId>>>()?;
            }
            if let Some(sample_size) = bench.sample_size {
                config.benchmark.sample_size = sample_size;
            }
            if let Some(top_k) = bench.top_k {
                config.benchmark.top_k = top_k;
            }
            if bench.timeout_secs.is_some() {
                config.benchmark.timeout_secs = bench.timeout_secs;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rag-strategy-bench")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(BenchError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(BenchError::Config(
                "LLM API key is required. Set LLM_API_KEY (or OPENAI_API_KEY) environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(BenchError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if self.benchmark.strategies.is_empty() {
            return Err(BenchError::InvalidConfig(
                "at least one strategy must be selected".to_string(),
            ));
        }

        if self.benchmark.sample_size == 0 {
            return Err(BenchError::InvalidConfig(
                "sample_size must be at least 1".to_string(),
            ));
        }

        if self.benchmark.top_k == 0 {
            return Err(BenchError::InvalidConfig("top_k must be at least 1".to_string()));
        }

        if self.benchmark.timeout_secs == Some(0) {
            return Err(BenchError::InvalidConfig(
                "timeout_secs must be positive when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            benchmark: BenchmarkSettings::default(),
        }
    }
}
