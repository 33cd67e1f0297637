//! In-memory vector index over corpus documents.

use crate::corpus::Document;
use crate::error::{BenchError, Result};
use crate::llm::Embedder;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Documents embedded per request.
const EMBED_BATCH_SIZE: usize = 32;

/// A vector index entry.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Vector search index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct VectorIndex {
    /// Embedding model the entries were built with.
    pub model: String,
    entries: Vec<IndexEntry>,
}

/// Vector search result.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    /// Cosine similarity to the query.
    pub score: f32,
}

impl VectorIndex {
    /// Build an index by embedding every document.
    pub async fn build(
        documents: &[Document],
        embedder: &dyn Embedder,
        model: impl Into<String>,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(documents.len());

        for (n, batch) in documents.chunks(EMBED_BATCH_SIZE).enumerate() {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let embeddings = embedder.embed(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(BenchError::LlmApi(format!(
                    "embedder returned {} vectors for {} documents",
                    embeddings.len(),
                    batch.len()
                )));
            }

            debug!(batch = n, size = batch.len(), "embedded batch");

            for (document, embedding) in batch.iter().zip(embeddings) {
                entries.push(IndexEntry {
                    document: document.clone(),
                    embedding,
                });
            }
        }

        Ok(Self {
            model: model.into(),
            entries,
        })
    }

    /// Rank entries by similarity to `query_embedding`, best first.
    ///
    /// Ties keep corpus order.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<ScoredDocument> {
        let mut results: Vec<ScoredDocument> = self
            .entries
            .iter()
            .map(|entry| ScoredDocument {
                document: entry.document.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        results
    }

    /// Number of documents in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Length of the stored embeddings; `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.embedding.len())
    }

    /// Check if index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all entries.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

/// Cosine similarity; 0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
