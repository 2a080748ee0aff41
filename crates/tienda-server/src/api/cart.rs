use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tienda_store::{CartItem, CartSummary};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AddToCartRequest {
    pub product_id: u64,
}

/// GET /api/v1/cart
pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CartSummary>>, ApiError> {
    let summary = state
        .store
        .cart_summary()
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(summary, req_id))
}

/// POST /api/v1/cart: snapshot a listing into the cart.
pub(super) async fn add_to_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CartItem>>), ApiError> {
    let item = state
        .store
        .add_to_cart(body.product_id)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(item, req_id)))
}

/// DELETE /api/v1/cart/{index}
pub(super) async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<CartItem>>, ApiError> {
    let removed = state
        .store
        .remove_from_cart(index)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(removed, req_id))
}

/// DELETE /api/v1/cart
pub(super) async fn clear_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CartSummary>>, ApiError> {
    let rid = &req_id.0;
    state.store.clear_cart().map_err(|e| map_store_error(rid, &e))?;
    let summary = state.store.cart_summary().map_err(|e| map_store_error(rid, &e))?;
    Ok(ApiResponse::new(summary, req_id))
}
