use tracing::debug;

use crate::{DocumentChunk, Embedder, Error, Result, Vector};

/// Chunks embedded per provider call while building an index.
pub const EMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    Cosine,
    /// Smaller L2 distance ranks higher, as in a flat L2 index
    #[default]
    Euclidean,
    Dot,
}

/// A chunk returned from a search, with its score (higher is closer)
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Exact in-memory similarity index over embedded chunks
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    distance: Distance,
    dim: Option<usize>,
    entries: Vec<(DocumentChunk, Vector)>,
}

impl EmbeddingIndex {
    pub fn new(distance: Distance) -> Self {
        Self {
            distance,
            dim: None,
            entries: Vec::new(),
        }
    }

    /// Embed every chunk and index it. No chunks means no embedder calls.
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        embedder: &dyn Embedder,
        distance: Distance,
    ) -> Result<Self> {
        let mut index = Self::new(distance);

        let mut chunks = chunks.into_iter().peekable();
        while chunks.peek().is_some() {
            let batch: Vec<DocumentChunk> = chunks.by_ref().take(EMBED_BATCH_SIZE).collect();
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "{} returned {} embeddings for {} inputs",
                    embedder.model(),
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.into_iter().zip(vectors) {
                index.insert(chunk, vector)?;
            }
        }

        debug!("Built index of {} chunks with {}", index.len(), embedder.model());
        Ok(index)
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one embedded chunk. All vectors must share the first one's dimension.
    pub fn insert(&mut self, chunk: DocumentChunk, vector: Vector) -> Result<()> {
        match self.dim {
            Some(expected) if expected != vector.dim() => {
                return Err(Error::InvalidDimension {
                    expected,
                    actual: vector.dim(),
                });
            }
            None => self.dim = Some(vector.dim()),
            _ => {}
        }
        self.entries.push((chunk, vector));
        Ok(())
    }

    /// Top `limit` chunks closest to `query`, best first
    pub fn search(&self, query: &Vector, limit: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, vector))| {
                let score = match self.distance {
                    Distance::Cosine => vector.cosine_similarity(query),
                    Distance::Euclidean => -vector.l2_distance(query),
                    Distance::Dot => vector.dot(query),
                };
                (i, score)
            })
            .collect();

        // stable: ties keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].0.clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceMetadata;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds a text as the counts of a, b and c in it
    struct LetterEmbedder {
        calls: AtomicUsize,
    }

    impl LetterEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        fn model(&self) -> &str {
            "letters"
        }

        async fn embed(&self, text: &str) -> Result<Vector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = |ch| text.chars().filter(|c| *c == ch).count() as f32;
            Ok(Vector::new(vec![count('a'), count('b'), count('c')]))
        }
    }

    fn chunk(text: &str) -> DocumentChunk {
        DocumentChunk::new(text, SourceMetadata::new("info/test.pdf", 0))
    }

    #[tokio::test]
    async fn test_empty_corpus_builds_empty_index() {
        let embedder = LetterEmbedder::new();
        let index = EmbeddingIndex::build(Vec::new(), &embedder, Distance::default())
            .await
            .unwrap();

        assert!(index.is_empty());
        assert_eq!(index.dim(), None);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 4).is_empty());
    }

    #[tokio::test]
    async fn test_search_ranks_nearest_first() {
        let embedder = LetterEmbedder::new();
        let chunks = vec![chunk("aaaa"), chunk("bbbb"), chunk("cccc"), chunk("aab")];
        let index = EmbeddingIndex::build(chunks, &embedder, Distance::Euclidean)
            .await
            .unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dim(), Some(3));

        let query = embedder.embed("aaaa").await.unwrap();
        let results = index.search(&query, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "aaaa");
        assert_eq!(results[1].chunk.text, "aab");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_limit_larger_than_index() {
        let embedder = LetterEmbedder::new();
        let index = EmbeddingIndex::build(vec![chunk("a"), chunk("b")], &embedder, Distance::Cosine)
            .await
            .unwrap();
        assert_eq!(index.search(&Vector::new(vec![1.0, 1.0, 0.0]), 10).len(), 2);
    }

    #[tokio::test]
    async fn test_build_batches_large_corpus() {
        let embedder = LetterEmbedder::new();
        let chunks: Vec<DocumentChunk> = (0..EMBED_BATCH_SIZE + 5).map(|_| chunk("abc")).collect();
        let index = EmbeddingIndex::build(chunks, &embedder, Distance::Dot).await.unwrap();
        assert_eq!(index.len(), EMBED_BATCH_SIZE + 5);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), EMBED_BATCH_SIZE + 5);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = EmbeddingIndex::new(Distance::Dot);
        index.insert(chunk("first"), Vector::new(vec![1.0, 0.0])).unwrap();
        index.insert(chunk("second"), Vector::new(vec![1.0, 0.0])).unwrap();
        let results = index.search(&Vector::new(vec![1.0, 0.0]), 2);
        assert_eq!(results[0].chunk.text, "first");
        assert_eq!(results[1].chunk.text, "second");
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = EmbeddingIndex::new(Distance::Cosine);
        index.insert(chunk("a"), Vector::new(vec![1.0, 0.0])).unwrap();
        let err = index.insert(chunk("b"), Vector::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { expected: 2, actual: 1 }));
    }
}
