//! Corpus documents.
//!
//! A corpus is a headered CSV file. Each row becomes one [`Document`]
//! whose content lists every column as a `column: value` line, so the
//! language model sees field names alongside values.

use crate::error::{BenchError, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single corpus document (one CSV row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Document {
    /// Zero-based row index in the source file.
    pub row: usize,
    /// Rendered row content.
    pub content: String,
    /// Source file the row came from (if loaded from file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Create a document from raw text content.
    pub fn from_text(row: usize, content: impl Into<String>) -> Self {
        Self {
            row,
            content: content.into(),
            source: None,
        }
    }
}

/// Load a CSV corpus, one document per row in file order.
pub fn load_csv(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        return Err(BenchError::CorpusNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let source = path.display().to_string();

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(path, e))?;

        let content = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| format!("{}: {}", column.trim(), value.trim()))
            .collect::<Vec<_>>()
            .join("\n");

        documents.push(Document {
            row,
            content,
            source: Some(source.clone()),
        });
    }

    if documents.is_empty() {
        return Err(BenchError::EmptyCorpus(path.to_path_buf()));
    }

    Ok(documents)
}

fn csv_error(path: &Path, err: csv::Error) -> BenchError {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return BenchError::io(path, io);
        }
        return BenchError::Serialization(format!("CSV read failed for '{}'", path.display()));
    }
    BenchError::Serialization(format!("CSV parse error in '{}': {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv_renders_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(
            &path,
            "name,description\nSun Shirt,\"UPF 50+, lightweight\"\nRain Jacket,Waterproof shell\n",
        )
        .unwrap();

        let docs = load_csv(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].row, 0);
        assert_eq!(
            docs[0].content,
            "name: Sun Shirt\ndescription: UPF 50+, lightweight"
        );
        assert_eq!(docs[1].row, 1);
        assert!(docs[1].source.as_deref().unwrap().ends_with("catalog.csv"));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv(Path::new("/nonexistent/catalog.csv"));
        assert!(matches!(result, Err(BenchError::CorpusNotFound(_))));
    }

    #[test]
    fn test_load_csv_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "name,description\n").unwrap();

        assert!(matches!(load_csv(&path), Err(BenchError::EmptyCorpus(_))));
    }

    #[test]
    fn test_document_from_text() {
        let doc = Document::from_text(3, "hello");
        assert_eq!(doc.row, 3);
        assert_eq!(doc.content, "hello");
        assert!(doc.source.is_none());
    }
}
