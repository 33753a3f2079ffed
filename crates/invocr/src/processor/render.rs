//! Page rasterization via poppler-utils.

use std::process::Command;

use image::RgbImage;

use crate::error::ProcessError;

/// Renders one 1-based page of a PDF to an RGB image at the given DPI.
///
/// Uses `pdftoppm` for the actual rasterization and decodes the resulting
/// PNG in memory. Deterministic for identical page content and DPI.
pub fn render_page(pdf_bytes: &[u8], page_number: u32, dpi: u32) -> Result<RgbImage, ProcessError> {
    let png_data = render_page_to_png(pdf_bytes, page_number, dpi)?;
    let img = image::load_from_memory(&png_data).map_err(|e| ProcessError::PageRender {
        page: page_number,
        message: format!("Failed to decode rendered image: {}", e),
    })?;
    Ok(img.to_rgb8())
}

fn render_page_to_png(
    pdf_bytes: &[u8],
    page_number: u32,
    dpi: u32,
) -> Result<Vec<u8>, ProcessError> {
    let render_err = |message: String| ProcessError::PageRender {
        page: page_number,
        message,
    };

    let temp_dir = std::env::temp_dir();
    let pdf_path = temp_dir.join(format!("invocr_temp_{}.pdf", uuid::Uuid::new_v4()));
    let output_prefix = temp_dir.join(format!("invocr_page_{}", uuid::Uuid::new_v4()));

    std::fs::write(&pdf_path, pdf_bytes)
        .map_err(|e| render_err(format!("Failed to write temp PDF: {}", e)))?;

    let output = Command::new("pdftoppm")
        .args([
            "-png",
            "-r",
            &dpi.to_string(),
            "-f",
            &page_number.to_string(),
            "-l",
            &page_number.to_string(),
        ])
        .arg(&pdf_path)
        .arg(&output_prefix)
        .output()
        .map_err(|e| {
            let _ = std::fs::remove_file(&pdf_path);
            render_err(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    let _ = std::fs::remove_file(&pdf_path);

    if !output.status.success() {
        return Err(render_err(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm pads the page number suffix depending on the page count
    let candidates = [
        format!("{}-{}.png", output_prefix.display(), page_number),
        format!("{}-{:02}.png", output_prefix.display(), page_number),
        format!("{}-{:03}.png", output_prefix.display(), page_number),
    ];
    let image_path = candidates
        .iter()
        .find(|p| std::path::Path::new(p).exists())
        .ok_or_else(|| render_err("Failed to find rendered page image".to_string()))?;

    let png_data = std::fs::read(image_path)
        .map_err(|e| render_err(format!("Failed to read rendered image: {}", e)))?;

    let _ = std::fs::remove_file(image_path);

    Ok(png_data)
}

/// Gets the page count of a PDF using `pdfinfo`. Used as fallback when
/// lopdf can't parse the document structure.
pub fn count_pages_with_pdfinfo(pdf_bytes: &[u8]) -> Result<usize, ProcessError> {
    let temp_dir = std::env::temp_dir();
    let pdf_path = temp_dir.join(format!("invocr_pagecount_{}.pdf", uuid::Uuid::new_v4()));

    std::fs::write(&pdf_path, pdf_bytes)
        .map_err(|e| ProcessError::PdfProcessing(format!("Failed to write temp PDF: {}", e)))?;

    let output = Command::new("pdfinfo").arg(&pdf_path).output().map_err(|e| {
        let _ = std::fs::remove_file(&pdf_path);
        ProcessError::PdfProcessing(format!(
            "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    let _ = std::fs::remove_file(&pdf_path);

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(count_str) = line.strip_prefix("Pages:") {
            if let Ok(count) = count_str.trim().parse::<usize>() {
                return Ok(count);
            }
        }
    }

    // Default to 1 page if we can't determine the count
    Ok(1)
}
