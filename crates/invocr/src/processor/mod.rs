pub mod ocr;
pub mod pdf;
pub mod preprocess;
pub mod render;

pub use ocr::OcrEngine;
pub use pdf::{compute_doc_id, PdfPipeline, ProcessedDocument, MIN_TEXT_LAYER_CHARS};
pub use preprocess::{preprocess_for_ocr, BINARIZE_THRESHOLD};
pub use render::render_page;
