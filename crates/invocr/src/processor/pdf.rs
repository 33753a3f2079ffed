//! Per-document processing: rasterize every page, read the embedded text
//! layer, and fall back to OCR where the layer is unusable.

use image::{DynamicImage, RgbImage};
use sha2::{Digest, Sha256};

use crate::error::ProcessError;
use crate::processor::ocr::OcrEngine;
use crate::processor::preprocess::preprocess_for_ocr;
use crate::processor::render::{count_pages_with_pdfinfo, render_page};
use crate::store::Page;

/// Minimum trimmed text-layer length that counts as "has real text".
/// Shorter layers are treated as scanned pages and sent through OCR.
pub const MIN_TEXT_LAYER_CHARS: usize = 30;

/// Pattern lopdf leaves behind for unmapped CID fonts.
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Ratio check only applies above this length; shorter text falls under the
/// MIN_TEXT_LAYER_CHARS rule anyway.
const MIN_RATIO_CHECK_CHARS: usize = 50;

/// Text layers with less than this percentage of alphanumeric characters
/// are considered garbled font-encoding output.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// Everything derived from one uploaded PDF: per-page text and images plus
/// the concatenated full text. Immutable once built.
pub struct ProcessedDocument {
    pub doc_id: String,
    pub pages: Vec<Page>,
    pub images: Vec<RgbImage>,
    pub full_text: String,
}

/// Content hash identifying an uploaded document.
pub fn compute_doc_id(pdf_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pdf_bytes);
    format!("{:x}", hasher.finalize())
}

pub struct PdfPipeline {
    ocr: OcrEngine,
}

impl PdfPipeline {
    pub fn new(ocr: OcrEngine) -> Self {
        Self { ocr }
    }

    /// Processes a PDF byte stream into a [`ProcessedDocument`].
    ///
    /// Each page is rendered at the given DPI and its embedded text layer
    /// read; pages without a usable layer are OCRed. When lopdf can't parse
    /// the document at all, the page count comes from `pdfinfo` and every
    /// page goes through OCR.
    pub fn process(&self, pdf_bytes: &[u8], dpi: u32) -> Result<ProcessedDocument, ProcessError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let doc_id = compute_doc_id(pdf_bytes);

        let text_layers: Vec<Option<String>> = match lopdf::Document::load_mem(pdf_bytes) {
            Ok(doc) => doc
                .get_pages()
                .keys()
                .map(|&page_num| doc.extract_text(&[page_num]).ok())
                .collect(),
            Err(e) => {
                // lopdf can't parse this PDF (e.g. invalid cross-reference
                // table). pdftoppm handles more PDF variants, so keep going
                // with OCR for every page.
                tracing::warn!("lopdf failed to parse document: {}. Using OCR for all pages.", e);
                let page_count = count_pages_with_pdfinfo(pdf_bytes)?;
                vec![None; page_count]
            }
        };

        let mut pages = Vec::with_capacity(text_layers.len());
        let mut images = Vec::with_capacity(text_layers.len());
        let mut full_text_parts = Vec::with_capacity(text_layers.len());

        for (index, layer) in text_layers.iter().enumerate() {
            let page_number = index + 1;
            let img = render_page(pdf_bytes, page_number as u32, dpi)?;
            let (text, used_ocr) =
                self.extract_page_text(layer.as_deref().unwrap_or(""), &img)?;

            full_text_parts.push(text.clone());
            pages.push(Page {
                number: page_number,
                used_ocr,
                text,
            });
            images.push(img);
        }

        Ok(ProcessedDocument {
            doc_id,
            pages,
            images,
            full_text: full_text_parts.join("\n\n"),
        })
    }

    /// Prefers the PDF text layer; falls back to OCR on the rendered page.
    fn extract_page_text(
        &self,
        text_layer: &str,
        img: &RgbImage,
    ) -> Result<(String, bool), ProcessError> {
        let trimmed = text_layer.trim();
        if text_layer_is_usable(trimmed) {
            return Ok((trimmed.to_string(), false));
        }

        let _span =
            tracing::info_span!("processor.ocr_fallback", reason = "text_layer_unusable").entered();
        let preprocessed = preprocess_for_ocr(&DynamicImage::ImageRgb8(img.clone()));
        let text = self.ocr.recognize(&preprocessed)?;
        Ok((text, true))
    }
}

/// Decides whether a trimmed text layer carries real text.
///
/// A layer is unusable when it is shorter than [`MIN_TEXT_LAYER_CHARS`],
/// consists only of Identity-H font-encoding markers, or is mostly
/// non-alphanumeric noise.
fn text_layer_is_usable(trimmed: &str) -> bool {
    if trimmed.chars().count() < MIN_TEXT_LAYER_CHARS {
        return false;
    }

    let cleaned = trimmed
        .replace(IDENTITY_H_PATTERN, "")
        .replace(['\n', ' '], "");
    if cleaned.is_empty() {
        return false;
    }

    let total_chars = trimmed.chars().count();
    let alphanumeric_chars = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
    if total_chars > MIN_RATIO_CHECK_CHARS
        && alphanumeric_chars * 100 < total_chars * MIN_ALPHANUMERIC_PERCENT
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_is_sha256_hex() {
        let id = compute_doc_id(b"hello");
        assert_eq!(id.len(), 64);
        assert_eq!(
            id,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_doc_id_differs_on_single_byte() {
        assert_ne!(compute_doc_id(b"invoice-a"), compute_doc_id(b"invoice-b"));
        assert_eq!(compute_doc_id(b"invoice-a"), compute_doc_id(b"invoice-a"));
    }

    #[test]
    fn test_short_text_layer_is_unusable() {
        assert!(!text_layer_is_usable(""));
        assert!(!text_layer_is_usable("Hi"));
        // 29 chars, one short of the threshold
        assert!(!text_layer_is_usable(&"a".repeat(MIN_TEXT_LAYER_CHARS - 1)));
        assert!(text_layer_is_usable(&"a".repeat(MIN_TEXT_LAYER_CHARS)));
    }

    #[test]
    fn test_real_invoice_text_is_usable() {
        assert!(text_layer_is_usable(
            "INVOICE #A-100 issued to ACME Corp, BALANCE DUE $ 186.51"
        ));
    }

    #[test]
    fn test_identity_h_only_layer_is_unusable() {
        let text = format!(
            "{} {} {}",
            IDENTITY_H_PATTERN, IDENTITY_H_PATTERN, IDENTITY_H_PATTERN
        );
        assert!(!text_layer_is_usable(text.trim()));
    }

    #[test]
    fn test_garbled_layer_is_unusable() {
        let garbled = "!@#$%^&*(){}[]|\\:\";<>?,./~`".repeat(3);
        assert!(garbled.chars().count() > MIN_RATIO_CHECK_CHARS);
        assert!(!text_layer_is_usable(&garbled));
    }

    #[test]
    fn test_mixed_identity_h_with_content_is_usable() {
        let text = "Invoice #12345 ?Identity-H Unimplemented? Total: $500 for services rendered";
        assert!(text_layer_is_usable(text));
    }

    #[test]
    fn test_text_layer_from_minimal_pdf() {
        // Same construction the lopdf docs use for a one-page PDF
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        let content_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
            }),
        );
        doc.objects.insert(
            resources_id,
            Object::Dictionary(dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            }),
        );

        let content = "BT /F1 12 Tf 50 700 Td (INVOICE A-100 BALANCE DUE 186.51 USD) Tj ET";
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(dictionary! {}, content.as_bytes().to_vec())),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut pdf_bytes = Vec::new();
        doc.save_to(&mut pdf_bytes).unwrap();

        let parsed = lopdf::Document::load_mem(&pdf_bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);

        let layer = parsed.extract_text(&[1]).unwrap();
        assert!(layer.contains("INVOICE A-100"));
        assert!(text_layer_is_usable(layer.trim()));
    }
}
