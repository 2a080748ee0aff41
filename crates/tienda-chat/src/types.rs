use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{Offer, Product, Seller, UserLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Which path produced a [`Reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Llm,
    Local,
}

/// A product the reply points at, rendered as a button by clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLink {
    pub product_id: u64,
    pub label: String,
    pub price: Decimal,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
    pub products: Vec<ProductLink>,
}

impl Reply {
    pub(crate) fn local(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Local,
            products: Vec::new(),
        }
    }
}

/// The catalog state a reply is computed against.
#[derive(Debug, Clone, Copy)]
pub struct ChatContext<'a> {
    pub products: &'a [Product],
    pub sellers: &'a [Seller],
    pub user: UserLocation,
    /// Offers supplied by the caller. When set they replace the offers
    /// derived from `products` in the model prompt.
    pub offers: Option<&'a [Offer]>,
}

impl<'a> ChatContext<'a> {
    #[must_use]
    pub fn new(products: &'a [Product], sellers: &'a [Seller], user: UserLocation) -> Self {
        Self {
            products,
            sellers,
            user,
            offers: None,
        }
    }

    #[must_use]
    pub fn with_offers(mut self, offers: &'a [Offer]) -> Self {
        self.offers = Some(offers);
        self
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
}
