//! # formfill
//!
//! Auto-fills HTML form fields by answering each field's implied question
//! with a retrieval-augmented language model over a directory of PDFs.
//!
//! ## Quick Start
//!
//! ```bash
//! export WATSONX_API_KEY=... WATSONX_PROJECT_ID=...
//! formfill --form-path templates/styled_tax_form.html --corpus-dir info
//! curl http://127.0.0.1:5055/api/get_tax_form_data
//! ```
//!
//! ## Crate Structure
//!
//! - `formfill-core` - field/chunk types, text splitting, embedding index, answer generation
//! - `formfill-ingest` - HTML form field extraction and PDF loading
//! - `formfill-llm` - watsonx.ai generation and feature-extraction embeddings
//! - `formfill-api` - the pipeline and its REST endpoint

// Re-export core types
pub use formfill_core::{
    assemble, field_question, qa_prompt,
    AnswerGenerator, AnsweredField, FieldDescriptor, FilledForm,
    DocumentChunk, PageText, SourceMetadata,
    Distance, EmbeddingIndex, ScoredChunk, TextSplitter, Vector,
    Embedder, Generator,
    Error, Result,
};

// Re-export loaders
pub use formfill_ingest::{extract_form_fields, load_corpus, parse_form_fields};

// Re-export providers
pub use formfill_llm::{
    EmbeddingConfig, HuggingFaceEmbedder, WatsonxConfig, WatsonxGenerator,
    DEFAULT_EMBEDDING_URL, DEFAULT_MODEL_ID, DEFAULT_WATSONX_URL, EMBEDDING_MODEL,
};

// Re-export API
pub use formfill_api::{FormFillPipeline, PipelineSettings, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnsweredField, FieldDescriptor, FilledForm,
        DocumentChunk, EmbeddingIndex, TextSplitter, Vector,
        Embedder, Generator,
        EmbeddingConfig, HuggingFaceEmbedder, WatsonxConfig, WatsonxGenerator,
        DEFAULT_EMBEDDING_URL, DEFAULT_MODEL_ID, DEFAULT_WATSONX_URL,
        FormFillPipeline, PipelineSettings, RestApi,
        Error, Result,
    };
}
