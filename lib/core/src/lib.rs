//! # formfill core
//!
//! Data model and retrieval logic shared by the formfill crates.
//!
//! - [`FieldDescriptor`] / [`AnsweredField`] - form fields and their answers
//! - [`TextSplitter`] - recursive character splitting into [`DocumentChunk`]s
//! - [`EmbeddingIndex`] - exact in-memory similarity search over chunk embeddings
//! - [`Embedder`] / [`Generator`] - seams to the hosted models
//! - [`AnswerGenerator`] - per-field retrieval-augmented answering
//! - [`assemble`] - flatten answers into a [`FilledForm`]
//!
//! ## Example
//!
//! ```rust
//! use formfill_core::{assemble, AnsweredField, FieldDescriptor, TextSplitter};
//!
//! let splitter = TextSplitter::default();
//! let chunks = splitter.split_text("Name: Jane Doe\n\nSSN: 123-45-6789");
//! assert_eq!(chunks.len(), 1);
//!
//! let form = assemble(vec![AnsweredField::new(
//!     FieldDescriptor::new("fullName", "Full Name"),
//!     "Jane Doe",
//! )]);
//! assert_eq!(form["fullName"], "Jane Doe");
//! ```

pub mod answer;
pub mod assemble;
pub mod chunk;
pub mod error;
pub mod field;
pub mod index;
pub mod provider;
pub mod splitter;
pub mod vector;

pub use answer::{field_question, qa_prompt, AnswerGenerator, DEFAULT_TOP_K};
pub use assemble::{assemble, FilledForm};
pub use chunk::{DocumentChunk, PageText, SourceMetadata};
pub use error::{Error, Result};
pub use field::{AnsweredField, FieldDescriptor};
pub use index::{Distance, EmbeddingIndex, ScoredChunk};
pub use provider::{Embedder, Generator};
pub use splitter::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use vector::Vector;
