use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::types::{ErrorBody, PaperRecord, SearchResponse};
use crate::config::{ApiKey, LiteratureConfig};

const UNTITLED: &str = "Untitled";
const FIELDS: &str = "title,abstract";

#[derive(Debug, thiserror::Error)]
pub enum LiteratureError {
    #[error("Paper search rate limit exceeded. Set SEMANTIC_SCHOLAR_API_KEY for higher limits.")]
    RateLimited,

    #[error("Paper search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed paper search response: {0}")]
    Decode(String),
}

/// Abstraction over a scholarly search backend.
/// Implemented by `SemanticScholarClient` for production; mock implementations used in tests.
pub trait LiteratureSource {
    /// Returns abstract-bearing records in the backend's relevance order.
    async fn search(&self, query: &str) -> Result<Vec<PaperRecord>, LiteratureError>;
}

/// HTTP client for the Semantic Scholar Graph API paper search.
#[derive(Clone)]
pub struct SemanticScholarClient {
    http: Client,
    endpoint: Url,
    api_key: Option<ApiKey>,
    limit: u8,
}

impl SemanticScholarClient {
    pub fn new(http: Client, config: &LiteratureConfig) -> Self {
        if config.api_key.is_none() {
            debug!("no Semantic Scholar API key; using shared unauthenticated rate limit");
        }
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            limit: config.search_limit,
        }
    }
}

impl LiteratureSource for SemanticScholarClient {
    async fn search(&self, query: &str) -> Result<Vec<PaperRecord>, LiteratureError> {
        let limit = self.limit.to_string();
        let mut request = self
            .http
            .get(self.endpoint.clone())
            .query(&[("query", query), ("limit", limit.as_str()), ("fields", FIELDS)])
            .header("User-Agent", crate::USER_AGENT);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose());
        }

        let response = request.send().await?;
        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            429 => {
                warn!("paper search rate limited");
                return Err(LiteratureError::RateLimited);
            }
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = extract_error_message(&text);
                warn!(status = %status, %message, "paper search API error");
                return Err(LiteratureError::Api { code, message });
            }
        }

        let text = response.text().await?;
        let body: SearchResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "paper search response is not valid JSON");
            LiteratureError::Decode(e.to_string())
        })?;
        let returned = body.data.len();
        let total = body.total.unwrap_or_default();
        let records = keep_with_abstract(body);
        debug!(
            total,
            returned,
            with_abstract = records.len(),
            "paper search complete"
        );
        Ok(records)
    }
}

fn keep_with_abstract(body: SearchResponse) -> Vec<PaperRecord> {
    body.data
        .into_iter()
        .filter_map(|entry| {
            let abstract_text = entry.abstract_text.filter(|a| !a.trim().is_empty())?;
            let title = entry
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            Some(PaperRecord {
                title,
                abstract_text,
            })
        })
        .collect()
}

fn extract_error_message(text: &str) -> String {
    serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            let end = text.floor_char_boundary(200);
            text[..end].to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literature::types::PaperEntry;

    fn entry(title: Option<&str>, abstract_text: Option<&str>) -> PaperEntry {
        PaperEntry {
            title: title.map(Into::into),
            abstract_text: abstract_text.map(Into::into),
        }
    }

    #[test]
    fn filters_entries_without_abstract() {
        let body = SearchResponse {
            data: vec![
                entry(Some("A"), Some("abstract a")),
                entry(Some("B"), None),
                entry(Some("C"), Some("   ")),
                entry(Some("D"), Some("abstract d")),
            ],
            total: Some(4),
        };

        let records = keep_with_abstract(body);
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["A", "D"]);
    }

    #[test]
    fn missing_title_becomes_untitled() {
        let body = SearchResponse {
            data: vec![entry(None, Some("text"))],
            total: None,
        };
        assert_eq!(keep_with_abstract(body)[0].title, "Untitled");
    }

    #[test]
    fn error_message_prefers_structured_body() {
        assert_eq!(
            extract_error_message(r#"{"message": "Too Many Requests"}"#),
            "Too Many Requests"
        );
        assert_eq!(
            extract_error_message(r#"{"error": "Unrecognized or unsupported fields"}"#),
            "Unrecognized or unsupported fields"
        );
        assert_eq!(extract_error_message("plain failure"), "plain failure");
    }
}
