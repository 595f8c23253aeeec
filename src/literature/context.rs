use super::client::LiteratureError;
use super::types::PaperRecord;

/// Context used when retrieval yields nothing the synthesis prompt can cite.
pub const NO_LITERATURE_PLACEHOLDER: &str = "No specific recent articles were found.";

/// Result of the retrieval phase. Retrieval never aborts the pipeline:
/// an unavailable search backend degrades the plan instead.
#[derive(Debug)]
pub enum LiteratureOutcome {
    Found(Vec<PaperRecord>),
    Empty,
    Unavailable(LiteratureError),
}

impl LiteratureOutcome {
    pub fn from_search(result: Result<Vec<PaperRecord>, LiteratureError>) -> Self {
        match result {
            Ok(records) if records.is_empty() => Self::Empty,
            Ok(records) => Self::Found(records),
            Err(e) => Self::Unavailable(e),
        }
    }

    pub fn records(&self) -> &[PaperRecord] {
        match self {
            Self::Found(records) => records,
            Self::Empty | Self::Unavailable(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Found(_))
    }

    /// Prompt context: the first `limit` records, or the placeholder sentence.
    pub fn context(&self, limit: usize) -> String {
        match self {
            Self::Found(records) => format_context(records, limit),
            Self::Empty | Self::Unavailable(_) => NO_LITERATURE_PLACEHOLDER.to_string(),
        }
    }
}

/// Joins the first `limit` records as `Title: ..\nAbstract: ..` blocks separated by a blank line.
pub fn format_context(records: &[PaperRecord], limit: usize) -> String {
    records
        .iter()
        .take(limit)
        .map(|r| format!("Title: {}\nAbstract: {}", r.title, r.abstract_text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
