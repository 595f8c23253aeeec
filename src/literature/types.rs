use serde::Deserialize;

/// Response from `GET /graph/v1/paper/search`.
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<PaperEntry>,
    pub total: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct PaperEntry {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Structured error body: `{"message": ...}` or `{"error": ...}`.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

/// A retrieved paper that carries an abstract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub title: String,
    pub abstract_text: String,
}
