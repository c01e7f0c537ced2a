use docx_rs::{read_docx, DocumentChild};
use domain::errors::RagError;
use domain::models::DownloadedContent;
use shared::utils::{DOCX, PDF};
use std::panic;

pub fn extract_text(file_name: &str, content: &DownloadedContent) -> Result<String, RagError> {
    let text = match content.mime_type.as_str() {
        PDF => extract_pdf(&content.bytes),
        DOCX => extract_docx(&content.bytes),
        // Exports and text files; non-UTF8 bytes must not fail the file.
        _ => Ok(String::from_utf8_lossy(&content.bytes).into_owned()),
    }
    .map_err(|reason| RagError::Extraction {
        file: file_name.to_string(),
        reason,
    })?;
    Ok(text.trim().to_string())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed documents.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("pdf parse error: {e:?}")),
        Err(_) => Err("pdf parser panicked".to_string()),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let docx = read_docx(bytes).map_err(|e| format!("docx parse error: {e}"))?;
    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            text.push_str(&p.raw_text());
            text.push('\n');
        }
    }
    Ok(text)
}
