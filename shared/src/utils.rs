pub const GOOGLE_DOCUMENT: &str = "application/vnd.google-apps.document";
pub const GOOGLE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";
pub const GOOGLE_PRESENTATION: &str = "application/vnd.google-apps.presentation";
pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT: &str = "text/plain";
pub const CSV: &str = "text/csv";

pub const SUPPORTED_MIME_TYPES: [&str; 6] = [
    GOOGLE_DOCUMENT,
    GOOGLE_SPREADSHEET,
    GOOGLE_PRESENTATION,
    PDF,
    DOCX,
    PLAIN_TEXT,
];

pub fn is_supported_mime_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime_type)
}

pub fn is_google_native(mime_type: &str) -> bool {
    mime_type.starts_with("application/vnd.google-apps")
}

/// Keep at most `max_chars` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
