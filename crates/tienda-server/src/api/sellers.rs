//! Seller directory, registration and inventory management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tienda_core::{sellers_by_distance, Coordinate, NearbySeller, Product, Seller, UserLocation};
use tienda_geocode::GeocodeError;
use tienda_store::{NewSeller, ProductDraft};

use crate::middleware::RequestId;

use super::{
    map_store_error, resolve_location, ApiError, ApiResponse, AppState, LocationQuery,
};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct RegisterSellerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    /// Resolve `address` through the geocoder when no coordinate is given.
    #[serde(default)]
    pub geocode: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct SellerDirectory {
    location: UserLocation,
    nearby: Vec<NearbySeller>,
    /// Sellers with no coordinate, in registration order.
    unlocated: Vec<Seller>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/sellers: nearest first.
pub(super) async fn list_sellers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ApiResponse<SellerDirectory>>, ApiError> {
    let rid = &req_id.0;
    let location = resolve_location(&state, rid, query.lat, query.lng)?;
    let sellers = state.store.get_sellers().map_err(|e| map_store_error(rid, &e))?;

    let nearby = sellers_by_distance(&sellers, location.coordinate);
    let unlocated = sellers
        .into_iter()
        .filter(|s| s.coordinate.is_none())
        .collect();

    Ok(ApiResponse::new(
        SellerDirectory {
            location,
            nearby,
            unlocated,
        },
        req_id,
    ))
}

/// GET /api/v1/sellers/{id}/products
pub(super) async fn seller_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(seller_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state
        .store
        .seller_products(&seller_id)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(products, req_id))
}

/// POST /api/v1/sellers: register a seller, optionally geocoding the address.
pub(super) async fn register_seller(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterSellerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Seller>>), ApiError> {
    let rid = &req_id.0;

    let coordinate = match body.coordinate {
        Some(c) => Some(c),
        None if body.geocode => Some(geocode_address(&state, rid, &body.address).await?),
        None => None,
    };

    let seller = state
        .store
        .register_seller(NewSeller {
            name: body.name,
            email: body.email,
            business_type: body.business_type,
            address: body.address,
            phone: body.phone,
            coordinate,
        })
        .map_err(|e| map_store_error(rid, &e))?;
    tracing::info!(seller_id = %seller.id, located = seller.coordinate.is_some(), "seller registered");

    Ok((StatusCode::CREATED, ApiResponse::new(seller, req_id)))
}

async fn geocode_address(
    state: &AppState,
    rid: &str,
    address: &str,
) -> Result<Coordinate, ApiError> {
    let Some(geocoder) = &state.geocoder else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "address lookup is disabled; provide a coordinate",
        ));
    };

    match geocoder.search(address).await {
        Ok(Some(hit)) => Ok(hit.coordinate),
        Ok(None) => Err(ApiError::new(
            rid,
            "validation_error",
            "address not found; try a more specific address",
        )),
        Err(GeocodeError::EmptyAddress) => Err(ApiError::new(
            rid,
            "validation_error",
            "address is required for lookup",
        )),
        Err(e) => {
            tracing::warn!(error = %e, "address lookup failed");
            Err(ApiError::new(rid, "upstream_error", "address lookup failed"))
        }
    }
}

/// PUT /api/v1/sellers/{id}/inventory: replace a seller's whole listing set.
pub(super) async fn replace_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(seller_id): Path<String>,
    Json(drafts): Json<Vec<ProductDraft>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let count = drafts.len();
    let products = state
        .store
        .replace_seller_inventory(&seller_id, drafts)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    tracing::info!(seller_id = %seller_id, count, "seller inventory replaced");
    Ok(ApiResponse::new(products, req_id))
}

/// POST /api/v1/sellers/{id}/products: create a listing, or update one the
/// seller owns when the draft carries its id.
pub(super) async fn upsert_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(seller_id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let status = if draft.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let product = state
        .store
        .upsert_product(&seller_id, draft)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok((status, ApiResponse::new(product, req_id)))
}
