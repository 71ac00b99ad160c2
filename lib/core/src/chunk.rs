use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a piece of corpus text came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source: PathBuf,
    /// Zero-based page number within the source document
    pub page: u32,
}

impl SourceMetadata {
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, page: u32) -> Self {
        Self {
            source: source.into(),
            page,
        }
    }
}

/// Text of a single loaded document page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub text: String,
    pub metadata: SourceMetadata,
}

impl PageText {
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: SourceMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A bounded slice of page text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: SourceMetadata,
}

impl DocumentChunk {
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: SourceMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
