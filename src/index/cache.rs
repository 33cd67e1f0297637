//! On-disk cache for vector indexes.
//!
//! The cache file sits next to the corpus and is named after it
//! (`catalog.csv` -> `catalog.vecdb`). Its existence decides whether a
//! run loads the index or pays for building it; a cache built with a
//! different embedding model is rebuilt and overwritten.

use super::vector::VectorIndex;
use crate::corpus::Document;
use crate::error::{BenchError, Result};
use crate::llm::Embedder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension of derived cache files.
pub const CACHE_EXTENSION: &str = "vecdb";

/// Save format for cached indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension; anything but `.json` is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            _ => SaveFormat::Bincode,
        }
    }
}

/// Derive the cache path for a corpus file.
pub fn cache_path_for(corpus: &Path) -> PathBuf {
    let stem = corpus
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("corpus");
    corpus.with_file_name(format!("{}.{}", stem, CACHE_EXTENSION))
}

/// Save an index, creating parent directories as needed.
pub fn save_index(index: &VectorIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
        }
    }

    let data = match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::to_string_pretty(index)
            .map_err(|e| BenchError::Serialization(e.to_string()))?
            .into_bytes(),
        SaveFormat::Bincode => bincode::encode_to_vec(index, bincode::config::standard())
            .map_err(|e| BenchError::Serialization(e.to_string()))?,
    };

    fs::write(path, &data).map_err(|e| BenchError::io(path, e))
}

/// Load a previously saved index.
pub fn load_index(path: &Path) -> Result<VectorIndex> {
    let data = fs::read(path).map_err(|e| BenchError::io(path, e))?;

    match SaveFormat::from_path(path) {
        SaveFormat::Json => {
            serde_json::from_slice(&data).map_err(|e| BenchError::Serialization(e.to_string()))
        }
        SaveFormat::Bincode => {
            let (index, _): (VectorIndex, usize) =
                bincode::decode_from_slice(&data, bincode::config::standard())
                    .map_err(|e| BenchError::Serialization(e.to_string()))?;
            Ok(index)
        }
    }
}

/// Load the cached index for `corpus`, or build and persist it.
pub async fn load_or_build(
    corpus: &Path,
    documents: &[Document],
    embedder: &dyn Embedder,
    model: &str,
) -> Result<VectorIndex> {
    let path = cache_path_for(corpus);

    if path.is_file() {
        info!(path = %path.display(), "loading cached vector index");
        let index = load_index(&path)?;
        if index.model == model {
            return Ok(index);
        }
        warn!(
            path = %path.display(),
            cached = %index.model,
            requested = model,
            "cached index was built with another embedding model, rebuilding"
        );
    }

    info!(
        path = %path.display(),
        documents = documents.len(),
        "building vector index"
    );
    let index = VectorIndex::build(documents, embedder, model).await?;
    save_index(&index, &path)?;
    info!(path = %path.display(), "saved vector index");

    Ok(index)
}
