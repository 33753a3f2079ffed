use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvocrError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Render DPI must be between {min} and {max}, got {value}")]
    DpiOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error(
        "ANTHROPIC_API_KEY not set. Set it as an environment variable or in '{secrets_path}'"
    )]
    MissingApiKey { secrets_path: String },

    #[error("Failed to read secrets file '{path}': {source}")]
    ReadSecrets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file '{path}': {source}")]
    ParseSecrets {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to render page {page}: {message}")]
    PageRender { page: u32, message: String },

    #[error("OCR failed: {0}")]
    OcrFailed(String),
}

/// Errors raised by document-store reads. The tool adapter renders these to
/// the agent-facing string convention (`"ERROR: ..."`), so the Display text
/// of each variant is part of the tool contract.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("No document text loaded. Upload and process a PDF first.")]
    NoText,

    #[error("No pages loaded. Upload and process a PDF first.")]
    NoPages,

    #[error("No document images loaded. Upload and process a PDF first.")]
    NoImages,

    #[error("page_number out of range. Must be 1..{page_count}")]
    PageOutOfRange { page_count: usize },
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model response contained no final text answer")]
    EmptyAnswer,

    #[error("Agent exceeded {0} tool-calling turns without a final answer")]
    ToolLoopExceeded(usize),
}

pub type Result<T> = std::result::Result<T, InvocrError>;
