//! Chat orchestration: hosted model first, local responder as the floor.

use tienda_core::{
    offers_from_products, rank_all_groups, ChatConfig, Offer, Seller, SellerLocation,
};

use crate::client::OpenRouterClient;
use crate::error::ChatError;
use crate::local::LocalResponder;
use crate::prompt::build_system_prompt;
use crate::types::{ChatContext, ChatMessage, ChatRole, Reply, ReplySource};

/// Conversation turns forwarded to the model.
pub const HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone)]
pub struct Assistant {
    llm: Option<OpenRouterClient>,
    local: LocalResponder,
    offer_limit: usize,
}

impl Assistant {
    /// Builds an assistant from config. A chat section that is enabled but
    /// cannot produce a client logs a warning and answers locally.
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        if !config.enabled {
            return Self::local_only(config.offer_limit);
        }
        match OpenRouterClient::new(config) {
            Ok(client) => Self::with_client(client, config.offer_limit),
            Err(e) => {
                tracing::warn!(error = %e, "chat model unavailable, using local responder");
                Self::local_only(config.offer_limit)
            }
        }
    }

    #[must_use]
    pub fn local_only(offer_limit: usize) -> Self {
        Self {
            llm: None,
            local: LocalResponder::new(),
            offer_limit,
        }
    }

    #[must_use]
    pub fn with_client(client: OpenRouterClient, offer_limit: usize) -> Self {
        Self {
            llm: Some(client),
            local: LocalResponder::new(),
            offer_limit,
        }
    }

    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Answers `message`.
    ///
    /// Upstream model failures are logged and answered by the local
    /// responder. Bad catalog data, including offers the caller supplied, is
    /// an error on either path.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`] for a blank `message`, or
    /// [`ChatError::Catalog`] when an offer fails validation.
    pub async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        ctx: &ChatContext<'_>,
    ) -> Result<Reply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if let Some(offers) = ctx.offers {
            offers.iter().try_for_each(Offer::validate)?;
        }

        let Some(client) = &self.llm else {
            return Ok(self.local.respond(message, ctx));
        };

        let system = self.system_prompt(ctx)?;
        match client.complete(&conversation(system, history, message)).await {
            Ok(text) => Ok(Reply {
                text,
                source: ReplySource::Llm,
                products: Vec::new(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, model = client.model(), "chat model failed, answering locally");
                Ok(self.local.respond(message, ctx))
            }
        }
    }

    /// Ranks the context's offers and renders them into the system prompt.
    fn system_prompt(&self, ctx: &ChatContext<'_>) -> Result<String, ChatError> {
        let derived;
        let offers = match ctx.offers {
            Some(offers) => offers,
            None => {
                derived = offers_from_products(ctx.products, ctx.sellers)?;
                derived.as_slice()
            }
        };
        let locations: Vec<SellerLocation> = ctx.sellers.iter().map(Seller::location).collect();
        let groups = rank_all_groups(
            offers,
            &locations,
            ctx.user.coordinate,
            Some(self.offer_limit),
        )?;
        Ok(build_system_prompt(&groups, ctx.user, ctx.sellers))
    }
}

/// System prompt, the most recent history turns, then the new message.
/// Client-supplied system turns are dropped.
fn conversation(system: String, history: &[ChatMessage], message: &str) -> Vec<ChatMessage> {
    let turns: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.role != ChatRole::System && !m.content.trim().is_empty())
        .collect();
    let recent = &turns[turns.len().saturating_sub(HISTORY_TURNS)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(recent.iter().map(|m| (*m).clone()));
    messages.push(ChatMessage::user(message));
    messages
}
