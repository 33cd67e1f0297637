//! Offline doubles for the service traits, shared by unit tests.

use crate::corpus::Document;
use crate::error::{BenchError, Result};
use crate::index::Retriever;
use crate::llm::{ChatModel, Embedder, LlmResponse, Message, TokenUsage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&str) -> Result<LlmResponse> + Send + Sync>;

/// A chat model that answers from a handler or a fixed queue of replies.
pub struct ScriptedModel {
    handler: Handler,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Answer every prompt with `handler(last user message)`.
    pub fn with_handler(
        handler: impl Fn(&str) -> Result<LlmResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with each item in turn, reporting `tokens` per call.
    /// Fails with an API error once the queue runs dry.
    pub fn replies(replies: Vec<&str>, tokens: u32) -> Self {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(replies.into_iter().map(str::to_string).collect());
        Self::with_handler(move |_| {
            let next = queue.lock().unwrap().pop_front();
            match next {
                Some(content) => Ok(with_tokens(content, tokens)),
                None => Err(BenchError::LlmApi("script exhausted".to_string())),
            }
        })
    }

    /// A model whose every call fails as if the service were down.
    pub fn unavailable() -> Self {
        Self::with_handler(|_| Err(BenchError::Http("connection refused".to_string())))
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: Vec<Message>) -> Result<LlmResponse> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());
        (self.handler)(&prompt)
    }
}

/// A response reporting `total` tokens.
pub fn with_tokens(content: impl Into<String>, total: u32) -> LlmResponse {
    LlmResponse {
        content: content.into(),
        finish_reason: Some("stop".to_string()),
        usage: Some(TokenUsage {
            prompt_tokens: total,
            completion_tokens: 0,
            total_tokens: total,
        }),
    }
}

/// Embeds text as lowercase letter frequencies; deterministic and offline.
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; 26];
                for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                    v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                }
                v
            })
            .collect())
    }
}

/// Embeds text into three dimensions, unlike [`LetterEmbedder`].
pub struct ThreeDim;

#[async_trait]
impl Embedder for ThreeDim {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| vec![text.len() as f32, text.matches(' ').count() as f32, 1.0])
            .collect())
    }
}

/// Always returns the same documents.
pub struct StaticRetriever(pub Vec<Document>);

impl StaticRetriever {
    pub fn of(contents: &[&str]) -> Self {
        Self(
            contents
                .iter()
                .enumerate()
                .map(|(row, c)| Document::from_text(row, *c))
                .collect(),
        )
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<Document>> {
        Ok(self.0.clone())
    }
}
