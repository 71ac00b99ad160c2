//! Hosted model providers behind the `formfill-core` [`Embedder`](formfill_core::Embedder)
//! and [`Generator`](formfill_core::Generator) traits.

pub mod embedding;
pub mod watsonx;

#[cfg(test)]
mod test_server;

pub use embedding::{EmbeddingConfig, HuggingFaceEmbedder, DEFAULT_EMBEDDING_URL, EMBEDDING_MODEL};
pub use watsonx::{WatsonxConfig, WatsonxGenerator, DEFAULT_MODEL_ID, DEFAULT_WATSONX_URL};
