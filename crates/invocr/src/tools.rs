//! Agent-facing query tools over the document store.
//!
//! Tool outputs are always strings, even on failure: the agent only
//! understands textual results, so store errors are rendered with an
//! `"ERROR:"` prefix at this boundary instead of being raised.

use serde_json::{json, Value};

use crate::agent::client::ToolDefinition;
use crate::processor::{preprocess_for_ocr, OcrEngine};
use crate::store::DocumentStore;

pub const TOOL_GET_FULL_TEXT: &str = "get_full_text";
pub const TOOL_GET_PAGE_TEXT: &str = "get_page_text";
pub const TOOL_OCR_PAGE: &str = "ocr_page";

pub struct DocumentTools<'a> {
    store: &'a DocumentStore,
    ocr: &'a OcrEngine,
}

impl<'a> DocumentTools<'a> {
    pub fn new(store: &'a DocumentStore, ocr: &'a OcrEngine) -> Self {
        Self { store, ocr }
    }

    /// Tool declarations sent with every model request.
    pub fn definitions() -> Vec<ToolDefinition> {
        let page_number_schema = json!({
            "type": "object",
            "properties": {
                "page_number": {
                    "type": "integer",
                    "description": "1-based page number (1 = first page)"
                }
            },
            "required": ["page_number"]
        });

        vec![
            ToolDefinition {
                name: TOOL_GET_FULL_TEXT.to_string(),
                description: "Return concatenated text of the entire uploaded PDF (all pages)."
                    .to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            ToolDefinition {
                name: TOOL_GET_PAGE_TEXT.to_string(),
                description: "Return extracted text for a 1-based page number.".to_string(),
                input_schema: page_number_schema.clone(),
            },
            ToolDefinition {
                name: TOOL_OCR_PAGE.to_string(),
                description: "Force OCR for a 1-based page number and return the OCR text."
                    .to_string(),
                input_schema: page_number_schema,
            },
        ]
    }

    /// Executes a tool call by name, formatting any failure to the string
    /// convention.
    pub fn dispatch(&self, name: &str, input: &Value) -> String {
        match name {
            TOOL_GET_FULL_TEXT => self.get_full_text(),
            TOOL_GET_PAGE_TEXT => match page_number_arg(input) {
                Some(page_number) => self.get_page_text(page_number),
                None => "ERROR: page_number must be an integer".to_string(),
            },
            TOOL_OCR_PAGE => match page_number_arg(input) {
                Some(page_number) => self.ocr_page(page_number),
                None => "ERROR: page_number must be an integer".to_string(),
            },
            other => format!("ERROR: unknown tool '{}'", other),
        }
    }

    fn get_full_text(&self) -> String {
        match self.store.full_text() {
            Ok(text) => text.to_string(),
            Err(e) => format!("ERROR: {}", e),
        }
    }

    fn get_page_text(&self, page_number: usize) -> String {
        match self.store.page_text(page_number) {
            Ok(text) => text.to_string(),
            Err(e) => format!("ERROR: {}", e),
        }
    }

    /// Fresh OCR of the cached page image, ignoring any text-layer result.
    /// The output is not written back to the store.
    fn ocr_page(&self, page_number: usize) -> String {
        let img = match self.store.page_image(page_number) {
            Ok(img) => img,
            Err(e) => return format!("ERROR: {}", e),
        };
        let preprocessed =
            preprocess_for_ocr(&image::DynamicImage::ImageRgb8(img.clone()));
        match self.ocr.recognize(&preprocessed) {
            Ok(text) => text,
            Err(e) => format!("ERROR: {}", e),
        }
    }
}

/// Reads the page_number argument; out-of-range negative values map to 0,
/// which the store rejects as out of range.
fn page_number_arg(input: &Value) -> Option<usize> {
    let n = input.get("page_number")?.as_i64()?;
    Some(usize::try_from(n).unwrap_or(0))
}
