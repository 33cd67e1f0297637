//! LLM integration module.
//!
//! Provides the service seams ([`ChatModel`], [`Embedder`]), an
//! OpenAI-compatible client implementing both, and the prompts used
//! for example generation, grading and the retrieval-QA strategies.

mod client;
mod model;
mod parse;
mod prompts;

pub use client::LlmClient;
pub use model::{ChatModel, Embedder, LlmResponse, Message, Role, TokenUsage};
pub use parse::extract_json;
pub use prompts::Prompts;
