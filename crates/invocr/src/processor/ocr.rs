use std::io::Cursor;
use std::sync::Arc;

use image::GrayImage;

use crate::error::ProcessError;

/// Tesseract page-segmentation mode: assume a single uniform block of text.
const PSM_SINGLE_BLOCK: &str = "6";

#[derive(Clone)]
pub struct OcrEngine {
    inner: Arc<OcrEngineInner>,
}

struct OcrEngineInner {
    languages: String,
}

impl OcrEngine {
    pub fn new(languages: &[String]) -> Self {
        let lang_str = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            inner: Arc::new(OcrEngineInner { languages: lang_str }),
        }
    }

    /// Runs Tesseract on an already preprocessed page image.
    pub fn recognize(&self, img: &GrayImage) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.ocr").entered();

        // leptess wants encoded bytes, so round-trip through PNG in memory
        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to encode image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.inner.languages).map_err(|e| {
            ProcessError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
        })?;

        lt.set_variable(leptess::Variable::TesseditPagesegMode, PSM_SINGLE_BLOCK)
            .map_err(|e| {
                ProcessError::OcrFailed(format!("Failed to set segmentation mode: {}", e))
            })?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| ProcessError::OcrFailed(format!("OCR failed: {}", e)))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_joined() {
        let engine = OcrEngine::new(&["eng".to_string(), "deu".to_string()]);
        assert_eq!(engine.inner.languages, "eng+deu");
    }

    #[test]
    fn test_default_language() {
        let engine = OcrEngine::new(&[]);
        assert_eq!(engine.inner.languages, "eng");
    }

    #[test]
    fn test_engine_clone_shares_settings() {
        let engine = OcrEngine::new(&["fra".to_string()]);
        let cloned = engine.clone();
        assert_eq!(engine.inner.languages, cloned.inner.languages);
    }
}
