//! Documents and work batches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters per token used for every token estimate in the pipeline
pub const CHARS_PER_TOKEN: usize = 4;

/// A plain-text document read by the discovery layer
///
/// Immutable once read; the pipeline owns it for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Path of the source file, as reported in citations
    pub path: String,

    /// Full text content
    pub content: String,

    /// Size of the file on disk in bytes
    pub size_bytes: u64,

    /// Last modification time (seconds since Unix epoch)
    pub modified_at: u64,

    /// Declared type, usually the file extension ("md", "txt", ...)
    pub doc_type: String,
}

impl ExtractedDocument {
    /// Create a document from a path and its content
    ///
    /// The byte size is taken from the content and the type from the
    /// path's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_domain::ExtractedDocument;
    ///
    /// let doc = ExtractedDocument::new("notes/today.md", "Hello");
    /// assert_eq!(doc.doc_type, "md");
    /// assert_eq!(doc.size_bytes, 5);
    /// ```
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        let doc_type = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.contains('/'))
            .unwrap_or_else(|| "txt".to_string());

        Self {
            size_bytes: content.len() as u64,
            modified_at: current_timestamp(),
            path,
            content,
            doc_type,
        }
    }

    /// Set the modification time
    pub fn with_modified_at(mut self, modified_at: u64) -> Self {
        self.modified_at = modified_at;
        self
    }

    /// Rough token estimate: content characters / 4
    pub fn estimated_tokens(&self) -> usize {
        self.content.chars().count() / CHARS_PER_TOKEN
    }
}

/// Unique identifier for a work batch based on UUIDv7
///
/// UUIDv7 keeps batch ids time-sortable without any coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(u128);

impl BatchId {
    /// Generate a new UUIDv7-based BatchId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a BatchId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// An ordered group of documents summarized by a single provider request
///
/// Invariant: `documents.len()` never exceeds the batch size the batch was
/// partitioned with. Batches belong to one run only.
#[derive(Debug, Clone)]
pub struct WorkBatch {
    /// Unique batch identifier
    pub id: BatchId,

    /// Documents in input order
    pub documents: Vec<ExtractedDocument>,

    /// Sum of the documents' byte sizes
    pub total_bytes: u64,

    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,
}

impl WorkBatch {
    /// Create a batch from an ordered list of documents
    pub fn new(documents: Vec<ExtractedDocument>) -> Self {
        let total_bytes = documents.iter().map(|d| d.size_bytes).sum();
        Self {
            id: BatchId::new(),
            documents,
            total_bytes,
            created_at: current_timestamp(),
        }
    }

    /// Number of documents in the batch
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when the batch holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Paths of the batch's documents, in order
    pub fn paths(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.path.as_str()).collect()
    }
}

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_extension() {
        assert_eq!(ExtractedDocument::new("a/b/notes.MD", "").doc_type, "md");
        assert_eq!(ExtractedDocument::new("README", "").doc_type, "txt");
        assert_eq!(ExtractedDocument::new("dir.d/README", "").doc_type, "txt");
    }

    #[test]
    fn test_estimated_tokens() {
        let doc = ExtractedDocument::new("a.txt", "a".repeat(400));
        assert_eq!(doc.estimated_tokens(), 100);
    }

    #[test]
    fn test_batch_totals() {
        let batch = WorkBatch::new(vec![
            ExtractedDocument::new("a.txt", "abc"),
            ExtractedDocument::new("b.txt", "defgh"),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total_bytes, 8);
        assert_eq!(batch.paths(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_batch_ids_unique() {
        let a = BatchId::new();
        let b = BatchId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
