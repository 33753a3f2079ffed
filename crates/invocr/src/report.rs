//! Final payload of one extraction run.

use serde::Serialize;

use crate::store::Page;

/// Default filename offered for the downloadable result.
pub const RESULT_FILENAME: &str = "ocr_claude_sonnet_result_with_evidence.json";

#[derive(Debug, Clone, Serialize)]
pub struct LlmInfo {
    pub provider: &'static str,
    pub model: String,
    pub temperature: f32,
}

/// Everything one run produced: the document text, per-page records, the
/// (possibly empty) extraction, the verbatim agent answer for diagnosis,
/// and the run's error if any. Errors here are terminal for the run but
/// never for the process.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub text: String,
    pub pages: Vec<Page>,
    pub extraction: serde_json::Value,
    pub agent_output_raw: Option<String>,
    pub error: Option<String>,
    pub llm: LlmInfo,
}

impl RunReport {
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            // Serialize of plain owned data cannot realistically fail
            format!("{{\"error\": \"failed to serialize report: {}\"}}", e)
        })
    }
}
