//! Word-processor export of a synthesized plan.

pub mod docx;
pub mod outline;

use tracing::debug;

use crate::markdown::display_title;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DEFAULT_FILE_NAME: &str = "research_plan.docx";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to build document archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write document part: {0}")]
    Io(#[from] std::io::Error),
}

/// An in-memory `.docx` ready to be written or served for download.
#[derive(Debug)]
pub struct ExportedDocument {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub title: String,
    pub headings: usize,
    /// Bold markers kept as literal body text because they had no valid partner.
    pub unpaired_markers: usize,
    pub bytes: Vec<u8>,
}

pub fn export_plan(idea: &str, plan: &str) -> Result<ExportedDocument, ExportError> {
    let title = display_title(idea);
    let outline = outline::parse(plan);
    let headings = outline.headings().filter(|h| !h.text.is_empty()).count();
    let paragraphs = outline.bodies().filter(|b| !b.text.is_empty()).count();
    let unpaired_markers = outline.unpaired_markers.len();
    let bytes = docx::render(&title, &outline)?;
    debug!(
        %title,
        headings,
        paragraphs,
        unpaired_markers,
        bytes = bytes.len(),
        "document exported"
    );
    Ok(ExportedDocument {
        file_name: DEFAULT_FILE_NAME,
        mime_type: DOCX_MIME,
        title,
        headings,
        unpaired_markers,
        bytes,
    })
}
