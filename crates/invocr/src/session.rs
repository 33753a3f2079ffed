//! One document's extraction session: owns the store and drives the
//! upload -> process -> agent -> normalize sequence. All run failures are
//! folded into the report; only loading a document can fail hard.

use crate::agent::{AnthropicClient, ExtractionAgent, ModelTransport};
use crate::config::{ExtractionConfig, CLAUDE_SONNET_MODEL};
use crate::error::{ConfigError, ProcessError};
use crate::normalize::normalize_extraction;
use crate::processor::{compute_doc_id, OcrEngine, PdfPipeline};
use crate::report::{LlmInfo, RunReport};
use crate::schema::{parse_agent_answer, AgentAnswer};
use crate::secrets::anthropic_api_key;
use crate::store::DocumentStore;
use crate::tools::DocumentTools;

const INVALID_JSON_MESSAGE: &str =
    "Claude did not return valid JSON. See agent_output_raw for details.";

pub struct ExtractionSession {
    config: ExtractionConfig,
    ocr: OcrEngine,
    pipeline: PdfPipeline,
    store: DocumentStore,
}

impl ExtractionSession {
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ocr = OcrEngine::new(&config.ocr_languages);
        Ok(Self {
            pipeline: PdfPipeline::new(ocr.clone()),
            ocr,
            config,
            store: DocumentStore::new(),
        })
    }

    /// Loads a PDF into the session, processing it unless byte-identical
    /// content is already cached at the configured DPI. Returns whether
    /// processing actually ran.
    pub fn load_document(&mut self, pdf_bytes: &[u8]) -> Result<bool, ProcessError> {
        let doc_id = compute_doc_id(pdf_bytes);
        if self.store.is_cached(&doc_id, self.config.dpi) {
            tracing::debug!(doc_id = %doc_id, "document already processed, skipping");
            return Ok(false);
        }

        let doc = self.pipeline.process(pdf_bytes, self.config.dpi)?;
        tracing::info!(
            doc_id = %doc.doc_id,
            pages = doc.pages.len(),
            ocr_pages = doc.pages.iter().filter(|p| p.used_ocr).count(),
            "document processed"
        );
        self.store.replace(doc, self.config.dpi);
        Ok(true)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Runs the extraction agent against the loaded document and returns
    /// the assembled report.
    pub async fn run_extraction(&self, task: &str) -> RunReport {
        let api_key = match anthropic_api_key() {
            Ok(key) => key,
            Err(e) => {
                let mut report = self.base_report();
                report.error = Some(e.to_string());
                return report;
            }
        };

        let client = AnthropicClient::new(api_key);
        self.run_with_transport(&client, task).await
    }

    /// Same as [`run_extraction`](Self::run_extraction) but with a caller
    /// supplied transport.
    pub async fn run_with_transport<T: ModelTransport>(
        &self,
        transport: &T,
        task: &str,
    ) -> RunReport {
        let mut report = self.base_report();

        let agent = ExtractionAgent::new(
            transport,
            DocumentTools::new(&self.store, &self.ocr),
            CLAUDE_SONNET_MODEL,
            self.config.temperature,
        );

        let raw = match agent.run(task).await {
            Ok(raw) => raw,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };

        match parse_agent_answer(&raw) {
            Ok(AgentAnswer::Extraction(mut result)) => {
                normalize_extraction(&mut result);
                report.extraction =
                    serde_json::to_value(&result).unwrap_or(serde_json::Value::Null);
            }
            Ok(AgentAnswer::NoDocument(answer)) => {
                tracing::warn!(details = %answer.details, "agent reported no document text");
                report.extraction =
                    serde_json::to_value(&answer).unwrap_or(serde_json::Value::Null);
            }
            Err(e) => {
                tracing::warn!("agent answer failed to parse: {}", e);
                report.error = Some(INVALID_JSON_MESSAGE.to_string());
            }
        }
        report.agent_output_raw = Some(raw);
        report
    }

    fn base_report(&self) -> RunReport {
        RunReport {
            text: self.store.full_text().unwrap_or_default().to_string(),
            pages: self.store.pages().to_vec(),
            extraction: serde_json::json!({}),
            agent_output_raw: None,
            error: None,
            llm: LlmInfo {
                provider: "anthropic",
                model: CLAUDE_SONNET_MODEL.to_string(),
                temperature: self.config.temperature,
            },
        }
    }
}
