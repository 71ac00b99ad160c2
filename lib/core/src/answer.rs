//! Per-field retrieval-augmented answering.

use futures_util::{stream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::{AnsweredField, DocumentChunk, Embedder, EmbeddingIndex, FieldDescriptor, Generator, Result};

/// Chunks retrieved as context for each field.
pub const DEFAULT_TOP_K: usize = 4;

const QA_INSTRUCTION: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// The question asked for a single form field.
pub fn field_question(field: &FieldDescriptor) -> String {
    format!(
        "Based on the document, what is the '{}'? Provide only the required information for the field ID '{}'.",
        field.label, field.id
    )
}

/// Full model input: instruction, retrieved chunks separated by blank lines, then the question.
pub fn qa_prompt(question: &str, context: &[DocumentChunk]) -> String {
    let context = context
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        QA_INSTRUCTION, context, question
    )
}

pub struct AnswerGenerator<'a> {
    index: &'a EmbeddingIndex,
    embedder: &'a dyn Embedder,
    generator: &'a dyn Generator,
    top_k: usize,
}

impl<'a> AnswerGenerator<'a> {
    pub fn new(
        index: &'a EmbeddingIndex,
        embedder: &'a dyn Embedder,
        generator: &'a dyn Generator,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve context for one field and ask the model about it.
    pub async fn answer_field(&self, field: &FieldDescriptor) -> Result<AnsweredField> {
        let question = field_question(field);

        let context: Vec<DocumentChunk> = if self.index.is_empty() {
            Vec::new()
        } else {
            let query = self.embedder.embed(&question).await?;
            self.index
                .search(&query, self.top_k)
                .into_iter()
                .map(|scored| scored.chunk)
                .collect()
        };
        debug!("Field '{}': {} context chunks", field.id, context.len());

        let answer = self.generator.generate(&question, &context).await?;
        Ok(AnsweredField::new(field.clone(), answer.trim()))
    }

    /// Answer every field, keeping input order. The first failure aborts.
    ///
    /// `concurrency` of 0 or 1 asks one field at a time.
    pub async fn answer_all(
        &self,
        fields: &[FieldDescriptor],
        concurrency: usize,
    ) -> Result<Vec<AnsweredField>> {
        if concurrency <= 1 {
            let mut answers = Vec::with_capacity(fields.len());
            for field in fields {
                answers.push(self.answer_field(field).await?);
            }
            return Ok(answers);
        }

        stream::iter(fields)
            .map(|field| self.answer_field(field))
            .buffered(concurrency)
            .try_collect()
            .await
    }
}
