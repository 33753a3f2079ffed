use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use invocr::{ExtractionConfig, ExtractionSession, DEFAULT_TASK, RESULT_FILENAME};

/// Extract structured invoice fields from a PDF.
#[derive(Parser, Debug)]
#[command(name = "invocr", version, about)]
struct Cli {
    /// Path to the PDF to process
    pdf: PathBuf,

    /// Render DPI (quality vs speed), 150-300
    #[arg(long, default_value_t = 200)]
    dpi: u32,

    /// Sampling temperature for the agent, 0.0-1.0
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Extraction task prompt
    #[arg(long, default_value = DEFAULT_TASK)]
    task: String,

    /// Where to write the result JSON
    #[arg(long, default_value = RESULT_FILENAME)]
    output: PathBuf,

    /// Tesseract OCR language, may be repeated (default: eng)
    #[arg(long = "ocr-lang")]
    ocr_languages: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let pdf_bytes = match std::fs::read(&cli.pdf) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to read '{}': {}", cli.pdf.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let config = ExtractionConfig {
        dpi: cli.dpi,
        temperature: cli.temperature,
        ocr_languages: cli.ocr_languages,
    };
    let mut session = match ExtractionSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = session.load_document(&pdf_bytes) {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    let report = session.run_extraction(&cli.task).await;

    if let Err(e) = std::fs::write(&cli.output, report.to_pretty_json()) {
        tracing::error!("failed to write '{}': {}", cli.output.display(), e);
        return ExitCode::FAILURE;
    }
    tracing::info!("result written to {}", cli.output.display());

    match report.error {
        None => ExitCode::SUCCESS,
        Some(error) => {
            tracing::error!("extraction run failed: {}", error);
            ExitCode::FAILURE
        }
    }
}
