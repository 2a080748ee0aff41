use thiserror::Error;
use tienda_core::CoreError;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-2xx status.
    #[error("chat endpoint returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid chat base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("chat is enabled but no API key is configured")]
    MissingApiKey,

    #[error("message must not be empty")]
    EmptyMessage,

    /// The catalog handed to the assistant failed aggregation.
    #[error(transparent)]
    Catalog(#[from] CoreError),
}
