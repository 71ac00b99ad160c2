//! PDF corpus loading built on `lopdf`.

use std::fs;
use std::path::{Path, PathBuf};

use formfill_core::{Error, PageText, Result, SourceMetadata};
use lopdf::Document;
use tracing::{debug, warn};

/// Load every page of every PDF directly inside `dir`.
///
/// Files are visited in path order and pages in page order. A directory that
/// is missing or unreadable gives an empty corpus; a PDF that cannot be
/// parsed is an error.
pub fn load_corpus(dir: impl AsRef<Path>) -> Result<Vec<PageText>> {
    let dir = dir.as_ref();
    let files = match list_pdfs(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!("Cannot read corpus directory {:?}: {}", dir, e);
            return Ok(Vec::new());
        }
    };

    let mut pages = Vec::new();
    for path in files {
        let loaded = load_pdf(&path)?;
        debug!("Loaded {} pages from {:?}", loaded.len(), path);
        pages.extend(loaded);
    }
    Ok(pages)
}

/// Text of each page of one PDF, page numbers starting at zero.
pub fn load_pdf(path: &Path) -> Result<Vec<PageText>> {
    let pdf_error = |message: String| Error::Pdf {
        path: path.to_path_buf(),
        message,
    };

    let document = Document::load(path).map_err(|e| pdf_error(e.to_string()))?;

    let mut pages = Vec::new();
    for (index, page_number) in document.get_pages().into_keys().enumerate() {
        let text = document
            .extract_text(&[page_number])
            .map_err(|e| pdf_error(format!("page {}: {}", page_number, e)))?;
        pages.push(PageText::new(text, SourceMetadata::new(path, index as u32)));
    }
    Ok(pages)
}

fn list_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let visible = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| !name.starts_with('.'))
            .unwrap_or(false);
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if visible && is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
