//! OpenAI-compatible chat completion client (OpenRouter by default).

use std::time::Duration;

use reqwest::Client;
use tienda_core::ChatConfig;

use crate::error::ChatError;
use crate::retry::retry_with_backoff;
use crate::types::{ChatMessage, CompletionRequest, CompletionResponse};

/// Sent when the model answers 200 but leaves the content empty.
pub const EMPTY_COMPLETION_REPLY: &str = "Lo siento, no pude procesar tu consulta.";

const APP_TITLE: &str = "MiTienda Chatbot";
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    endpoint: reqwest::Url,
    model: String,
    max_tokens: u32,
    temperature: f32,
    referer: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl OpenRouterClient {
    /// Builds a client from the chat section of the app config.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MissingApiKey`] when no key is configured,
    /// [`ChatError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`ChatError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?
            .to_owned();

        let normalized = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = reqwest::Url::parse(&normalized)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|_| ChatError::InvalidBaseUrl(config.base_url.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            referer: config.referer.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: BACKOFF_BASE_MS,
        })
    }

    /// Overrides the retry back-off base. Tests use `0` to skip sleeping.
    #[must_use]
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `messages` and returns the first choice's content.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::UnexpectedStatus`] for a non-2xx answer after the
    /// retry budget is spent, [`ChatError::Http`] on transport failure, or
    /// [`ChatError::Deserialize`] for a body that is not a completion.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.complete_once(messages)
        })
        .await
    }

    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&text, 512),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|source| ChatError::Deserialize {
                context: "chat/completions".to_owned(),
                source,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty());

        Ok(content.unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_owned()))
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_owned(),
    }
}
