use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::types::{ApiError, ChatMessage, ChatRequest, ChatResponse};
use crate::config::{ApiKey, CompletionConfig};

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Completion API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Completion API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Abstraction over a chat-completion backend.
/// Implemented by `GroqClient` for production; mock implementations used in tests.
pub trait CompletionClient {
    /// Sends one request and returns the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    endpoint: Url,
    temperature: f32,
}

impl GroqClient {
    pub fn new(http: Client, config: &CompletionConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionClient for GroqClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug_assert!(
            self.endpoint.scheme() == "https" || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("completion API rate limited");
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<ChatResponse>(&text)
                && let Some(err) = &body.error
            {
                let message = describe_api_error(err);
                warn!(status = %status, %message, "completion API error");
                return Err(CompletionError::Api {
                    code: status.as_u16(),
                    message,
                });
            }
            let end = text.floor_char_boundary(200);
            warn!(status = %status, "completion API error (no structured body)");
            return Err(CompletionError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let text = response.text().await?;
        let body: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "completion response is not valid JSON");
            CompletionError::MalformedResponse(format!("invalid JSON body: {e}"))
        })?;
        debug!(model = %self.model, "completion received");
        extract_first_choice(body)
    }
}

pub(crate) fn extract_first_choice(body: ChatResponse) -> Result<String, CompletionError> {
    if let Some(err) = &body.error {
        return Err(CompletionError::MalformedResponse(format!(
            "error object in success response: {}",
            describe_api_error(err)
        )));
    }
    body.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

fn describe_api_error(err: &ApiError) -> String {
    let message = err.message.as_deref().unwrap_or("Unknown error");
    match &err.kind {
        Some(kind) => format!("{message} ({kind})"),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::types::{Choice, ResponseMessage};

    #[test]
    fn extracts_first_choice_content() {
        let body = ChatResponse {
            choices: Some(vec![
                Choice {
                    message: Some(ResponseMessage {
                        content: Some("first".into()),
                    }),
                },
                Choice {
                    message: Some(ResponseMessage {
                        content: Some("second".into()),
                    }),
                },
            ]),
            error: None,
        };
        assert_eq!(extract_first_choice(body).unwrap(), "first");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let body = ChatResponse {
            choices: Some(vec![]),
            error: None,
        };
        assert!(matches!(
            extract_first_choice(body),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_content_is_malformed() {
        let body = ChatResponse {
            choices: Some(vec![Choice {
                message: Some(ResponseMessage { content: None }),
            }]),
            error: None,
        };
        assert!(matches!(
            extract_first_choice(body),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn describe_includes_error_type() {
        let err = ApiError {
            message: Some("Invalid API Key".into()),
            kind: Some("invalid_request_error".into()),
        };
        assert_eq!(describe_api_error(&err), "Invalid API Key (invalid_request_error)");
    }
}
