use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use formfill_core::{
    assemble, AnswerGenerator, Distance, Embedder, EmbeddingIndex, FilledForm, Generator, Result,
    TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K,
};
use formfill_ingest::{extract_form_fields, load_corpus};
use tracing::info;

/// Where the pipeline reads its inputs from and how it retrieves
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub form_path: PathBuf,
    pub corpus_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub distance: Distance,
    /// Fields answered at once; 1 answers them one after another
    pub field_concurrency: usize,
}

impl PipelineSettings {
    pub fn new(form_path: impl Into<PathBuf>, corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            form_path: form_path.into(),
            corpus_dir: corpus_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            distance: Distance::default(),
            field_concurrency: 1,
        }
    }
}

/// Extract fields, index the corpus, answer each field, flatten the answers.
///
/// Nothing is kept between runs: every call re-reads the form and rebuilds
/// the index from the PDFs on disk.
pub struct FormFillPipeline {
    settings: PipelineSettings,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
}

impl FormFillPipeline {
    pub fn new(
        settings: PipelineSettings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
        Ok(Self {
            settings,
            splitter,
            embedder,
            generator,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Load the corpus and embed it into a fresh index.
    pub async fn build_index(&self) -> Result<EmbeddingIndex> {
        let pages = load_corpus(&self.settings.corpus_dir)?;
        let chunks = self.splitter.split_pages(&pages);
        info!(
            "Indexing {} pages as {} chunks from {:?}",
            pages.len(),
            chunks.len(),
            self.settings.corpus_dir
        );
        EmbeddingIndex::build(chunks, self.embedder.as_ref(), self.settings.distance).await
    }

    pub async fn run(&self) -> Result<FilledForm> {
        let started = Instant::now();

        let fields = extract_form_fields(&self.settings.form_path)?;
        info!("Found {} form fields in {:?}", fields.len(), self.settings.form_path);

        let index = self.build_index().await?;

        let answers = AnswerGenerator::new(&index, self.embedder.as_ref(), self.generator.as_ref())
            .with_top_k(self.settings.top_k)
            .answer_all(&fields, self.settings.field_concurrency)
            .await?;

        let form = assemble(answers);
        info!(
            "Filled {} fields with {} in {:?}",
            form.len(),
            self.generator.model(),
            started.elapsed()
        );
        Ok(form)
    }
}
