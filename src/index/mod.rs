//! Document retrieval for the QA strategies.
//!
//! A [`VectorIndex`] is built once per corpus (or loaded from its cache
//! file) and queried through the [`Retriever`] seam so strategies never
//! see how documents were found.

mod cache;
mod vector;

pub use cache::{CACHE_EXTENSION, SaveFormat, cache_path_for, load_index, load_or_build, save_index};
pub use vector::{IndexEntry, ScoredDocument, VectorIndex, cosine_similarity};

use crate::corpus::Document;
use crate::error::{BenchError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use std::sync::Arc;

/// Returns the documents most relevant to a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>>;
}

/// Retriever backed by a [`VectorIndex`] and the embedder it was built with.
pub struct VectorRetriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::LlmApi("no embedding returned for query".to_string()))?;

        if let Some(dimension) = self.index.dimension() {
            if embedding.len() != dimension {
                return Err(BenchError::InvalidConfig(format!(
                    "query embedding has {} dimensions but index '{}' has {}",
                    embedding.len(),
                    self.index.model,
                    dimension
                )));
            }
        }

        Ok(self
            .index
            .search(&embedding, self.top_k)
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }
}
