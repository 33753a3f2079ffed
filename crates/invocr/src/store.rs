//! Session-owned cache of the last processed document.
//!
//! One store holds at most one document, keyed by the content hash of its
//! bytes together with the render DPI. Loading different content (or the
//! same content at a different DPI) fully replaces the prior state. Tools
//! and the agent only ever read from it.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::processor::ProcessedDocument;

/// Extraction outcome for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "page")]
    pub number: usize,
    pub used_ocr: bool,
    pub text: String,
}

#[derive(Default)]
pub struct DocumentStore {
    cached: Option<CachedDocument>,
}

struct CachedDocument {
    doc_id: String,
    dpi: u32,
    pages: Vec<Page>,
    images: Vec<RgbImage>,
    full_text: String,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the store already holds this document at this DPI, so
    /// reprocessing can be skipped.
    pub fn is_cached(&self, doc_id: &str, dpi: u32) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|c| c.doc_id == doc_id && c.dpi == dpi)
    }

    /// Replaces any prior state with a freshly processed document.
    pub fn replace(&mut self, doc: ProcessedDocument, dpi: u32) {
        self.cached = Some(CachedDocument {
            doc_id: doc.doc_id,
            dpi,
            pages: doc.pages,
            images: doc.images,
            full_text: doc.full_text,
        });
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.cached.as_ref().map(|c| c.doc_id.as_str())
    }

    pub fn page_count(&self) -> usize {
        self.cached.as_ref().map_or(0, |c| c.pages.len())
    }

    pub fn pages(&self) -> &[Page] {
        self.cached.as_ref().map_or(&[], |c| c.pages.as_slice())
    }

    /// Concatenated text of the whole document. Errors when nothing is
    /// loaded or the document produced no text at all.
    pub fn full_text(&self) -> Result<&str, StoreError> {
        match &self.cached {
            Some(c) if !c.full_text.trim().is_empty() => Ok(&c.full_text),
            _ => Err(StoreError::NoText),
        }
    }

    /// Extracted text of a 1-based page.
    pub fn page_text(&self, page_number: usize) -> Result<&str, StoreError> {
        let cached = self.cached.as_ref().ok_or(StoreError::NoPages)?;
        if page_number < 1 || page_number > cached.pages.len() {
            return Err(StoreError::PageOutOfRange {
                page_count: cached.pages.len(),
            });
        }
        Ok(&cached.pages[page_number - 1].text)
    }

    /// Rendered image of a 1-based page.
    pub fn page_image(&self, page_number: usize) -> Result<&RgbImage, StoreError> {
        let cached = self.cached.as_ref().ok_or(StoreError::NoImages)?;
        if page_number < 1 || page_number > cached.images.len() {
            return Err(StoreError::PageOutOfRange {
                page_count: cached.images.len(),
            });
        }
        Ok(&cached.images[page_number - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::compute_doc_id;

    fn sample_document(content: &[u8], page_texts: &[&str]) -> ProcessedDocument {
        let pages: Vec<Page> = page_texts
            .iter()
            .enumerate()
            .map(|(i, text)| Page {
                number: i + 1,
                used_ocr: false,
                text: text.to_string(),
            })
            .collect();
        ProcessedDocument {
            doc_id: compute_doc_id(content),
            images: vec![RgbImage::new(1, 1); pages.len()],
            full_text: page_texts.join("\n\n"),
            pages,
        }
    }

    #[test]
    fn test_empty_store_errors() {
        let store = DocumentStore::new();
        assert_eq!(store.full_text(), Err(StoreError::NoText));
        assert_eq!(store.page_text(1), Err(StoreError::NoPages));
        assert!(matches!(store.page_image(1), Err(StoreError::NoImages)));
        assert_eq!(store.page_count(), 0);
        assert!(store.pages().is_empty());
    }

    #[test]
    fn test_replace_and_read_back() {
        let mut store = DocumentStore::new();
        store.replace(sample_document(b"doc", &["first page", "second page"]), 200);

        assert_eq!(store.full_text().unwrap(), "first page\n\nsecond page");
        assert_eq!(store.page_text(1).unwrap(), "first page");
        assert_eq!(store.page_text(2).unwrap(), "second page");
        assert_eq!(store.page_count(), 2);
        assert!(store.page_image(2).is_ok());
    }

    #[test]
    fn test_page_number_bounds() {
        let mut store = DocumentStore::new();
        store.replace(sample_document(b"doc", &["only page"]), 200);

        assert_eq!(
            store.page_text(0),
            Err(StoreError::PageOutOfRange { page_count: 1 })
        );
        assert_eq!(
            store.page_text(2),
            Err(StoreError::PageOutOfRange { page_count: 1 })
        );
        assert!(matches!(
            store.page_image(0),
            Err(StoreError::PageOutOfRange { page_count: 1 })
        ));
    }

    #[test]
    fn test_cache_key_includes_content_and_dpi() {
        let mut store = DocumentStore::new();
        let doc = sample_document(b"doc", &["text"]);
        let doc_id = doc.doc_id.clone();
        store.replace(doc, 200);

        assert!(store.is_cached(&doc_id, 200));
        // Different DPI means re-render, different bytes mean reprocess
        assert!(!store.is_cached(&doc_id, 300));
        assert!(!store.is_cached(&compute_doc_id(b"other"), 200));
    }

    #[test]
    fn test_replace_drops_prior_document() {
        let mut store = DocumentStore::new();
        let first_id = compute_doc_id(b"first");
        store.replace(sample_document(b"first", &["one", "two"]), 200);
        store.replace(sample_document(b"second", &["only"]), 200);

        assert!(!store.is_cached(&first_id, 200));
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.full_text().unwrap(), "only");
    }

    #[test]
    fn test_whitespace_only_text_counts_as_missing() {
        let mut store = DocumentStore::new();
        store.replace(sample_document(b"blank", &["  ", ""]), 200);

        assert_eq!(store.full_text(), Err(StoreError::NoText));
        // per-page reads still work
        assert_eq!(store.page_text(1).unwrap(), "  ");
    }
}
