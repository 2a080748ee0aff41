use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tienda_core::{compare_product, list_catalog, CatalogEntry, CatalogSort, Product, ProductComparison};

use crate::middleware::RequestId;

use super::{
    map_core_error, map_store_error, resolve_location, ApiError, ApiResponse, AppState,
    LocationQuery,
};

#[derive(Debug, Deserialize)]
pub(super) struct CatalogQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

/// GET /api/v1/products: storefront listing, one card per product key.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ApiResponse<Vec<CatalogEntry>>>, ApiError> {
    let rid = &req_id.0;
    let sort = query
        .sort
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<CatalogSort>)
        .transpose()
        .map_err(|msg| ApiError::new(rid, "validation_error", msg))?;

    let products = state.store.get_products().map_err(|e| map_store_error(rid, &e))?;
    let entries = list_catalog(&products, query.q.as_deref(), sort);

    Ok(ApiResponse::new(entries, req_id))
}

/// GET /api/v1/products/{id}/comparison: the listing against every seller
/// offering the same product.
pub(super) async fn product_comparison(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<u64>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ApiResponse<ProductComparison>>, ApiError> {
    let rid = &req_id.0;
    let location = resolve_location(&state, rid, query.lat, query.lng)?;

    let products = state.store.get_products().map_err(|e| map_store_error(rid, &e))?;
    let sellers = state.store.get_sellers().map_err(|e| map_store_error(rid, &e))?;
    let comparison = compare_product(&products, &sellers, location.coordinate, id)
        .map_err(|e| map_core_error(rid, &e))?;

    Ok(ApiResponse::new(comparison, req_id))
}

/// DELETE /api/v1/products/{id}
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let removed = state
        .store
        .delete_product(id)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    tracing::info!(product_id = id, seller_id = %removed.seller_id, "product deleted");
    Ok(ApiResponse::new(removed, req_id))
}
