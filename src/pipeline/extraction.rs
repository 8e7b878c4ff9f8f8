use std::path::Path;

use mime_guess::mime;

use super::InputError;

/// Upload types the compliance pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    PlainText,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
        }
    }
}

/// Map a MIME type (parameters ignored, case-insensitive) to an upload kind.
pub fn classify_mime(mime_type: &str) -> Result<UploadKind, InputError> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == mime::APPLICATION_PDF.essence_str() {
        Ok(UploadKind::Pdf)
    } else if essence == mime::TEXT_PLAIN.essence_str() {
        Ok(UploadKind::PlainText)
    } else {
        Err(InputError::UnsupportedType(mime_type.trim().to_string()))
    }
}

/// Guess a MIME type from a file name's extension.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Extract the text of an uploaded PDF or plain-text file.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, InputError> {
    let kind = classify_mime(mime_type)?;

    let text = match kind {
        UploadKind::Pdf => pdf_parse_guarded(|| {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
        })?,
        UploadKind::PlainText => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| InputError::Encoding(e.to_string()))?;
            text.strip_prefix('\u{feff}').unwrap_or(text).to_string()
        }
    };

    tracing::debug!(
        kind = kind.as_str(),
        bytes = bytes.len(),
        chars = text.chars().count(),
        "Upload text extracted"
    );

    Ok(text)
}

/// Run a PDF parser, turning both its errors and its panics into
/// `InputError::PdfParsing`. Malformed uploads can panic inside the parser.
fn pdf_parse_guarded<F>(parse: F) -> Result<String, InputError>
where
    F: FnOnce() -> Result<String, String>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(parse)) {
        Ok(result) => result.map_err(InputError::PdfParsing),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "parser panicked".into());
            tracing::warn!(%reason, "PDF parser panicked on upload");
            Err(InputError::PdfParsing(format!("parser panicked: {reason}")))
        }
    }
}
