use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tienda_core::{
    offers_from_products, rank_all_groups, search_products, OfferGroup, Product, Seller,
    SellerLocation, UserLocation,
};

use crate::middleware::RequestId;

use super::{
    map_core_error, map_store_error, normalize_limit, resolve_location, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct OffersQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub limit: Option<usize>,
    /// Restricts the catalog to listings matching this text.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OffersData {
    location: UserLocation,
    groups: Vec<OfferGroup>,
}

/// GET /api/v1/offers: every product's offers grouped and ranked by
/// distance from the user.
pub(super) async fn list_offers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OffersQuery>,
) -> Result<Json<ApiResponse<OffersData>>, ApiError> {
    let rid = &req_id.0;
    let location = resolve_location(&state, rid, query.lat, query.lng)?;

    let products = state.store.get_products().map_err(|e| map_store_error(rid, &e))?;
    let sellers = state.store.get_sellers().map_err(|e| map_store_error(rid, &e))?;

    let filtered: Vec<Product> = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => search_products(&products, q).into_iter().cloned().collect(),
        _ => products,
    };

    let offers = offers_from_products(&filtered, &sellers).map_err(|e| map_core_error(rid, &e))?;
    let locations: Vec<SellerLocation> = sellers.iter().map(Seller::location).collect();
    let groups = rank_all_groups(
        &offers,
        &locations,
        location.coordinate,
        normalize_limit(query.limit),
    )
    .map_err(|e| map_core_error(rid, &e))?;

    Ok(ApiResponse::new(OffersData { location, groups }, req_id))
}
