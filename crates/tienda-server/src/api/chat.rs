use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tienda_chat::{ChatContext, ChatError, ChatMessage, ProductLink, ReplySource};
use tienda_core::{Coordinate, Offer, UserLocation};

use crate::middleware::RequestId;

use super::{map_core_error, map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Offers the client is showing. When present they prime the model
    /// instead of the stored catalog.
    #[serde(default)]
    pub offers: Option<Vec<Offer>>,
    #[serde(default, alias = "userLocation")]
    pub user_location: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatData {
    message: String,
    source: ReplySource,
    products: Vec<ProductLink>,
}

/// POST /api/v1/chat: answer a shopper's question. Model failures degrade to
/// the local responder; malformed client offers are a 400.
pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatData>>, ApiError> {
    let rid = &req_id.0;
    if body.message.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "message must not be empty",
        ));
    }

    let user = match body.user_location {
        Some(c) => {
            c.validate().map_err(|e| map_core_error(rid, &e))?;
            UserLocation::precise(c)
        }
        None => state
            .store
            .resolve_user_location(state.default_location)
            .map_err(|e| map_store_error(rid, &e))?,
    };

    if let Some(offers) = &body.offers {
        for offer in offers {
            offer.validate().map_err(|e| map_core_error(rid, &e))?;
        }
    }

    let products = state.store.get_products().map_err(|e| map_store_error(rid, &e))?;
    let sellers = state.store.get_sellers().map_err(|e| map_store_error(rid, &e))?;

    let mut ctx = ChatContext::new(&products, &sellers, user);
    if let Some(offers) = body.offers.as_deref() {
        ctx = ctx.with_offers(offers);
    }

    let reply = state
        .assistant
        .reply(&body.message, &body.history, &ctx)
        .await
        .map_err(|e| match e {
            ChatError::EmptyMessage => ApiError::new(rid, "validation_error", e.to_string()),
            ChatError::Catalog(core) => map_core_error(rid, &core),
            other => {
                tracing::error!(error = %other, "chat reply failed");
                ApiError::new(rid, "internal_error", "chat unavailable")
            }
        })?;

    Ok(ApiResponse::new(
        ChatData {
            message: reply.text,
            source: reply.source,
            products: reply.products,
        },
        req_id,
    ))
}
