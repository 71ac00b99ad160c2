//! Seams to the hosted models.
//!
//! The pipeline only ever talks to these two traits; the concrete HTTP
//! clients live in `formfill-llm`. Every method is an explicit await point.

use async_trait::async_trait;

use crate::{DocumentChunk, Result, Vector};

/// Turns text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name of the embedding model, for logging.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Embed many texts, one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Answers a question from retrieved context.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;

    /// Produce an answer to `question` grounded in `context`.
    async fn generate(&self, question: &str, context: &[DocumentChunk]) -> Result<String>;
}
