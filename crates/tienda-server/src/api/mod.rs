mod cart;
mod chat;
mod location;
mod offers;
mod products;
mod sellers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tienda_chat::Assistant;
use tienda_core::{Coordinate, CoreError, UserLocation};
use tienda_geocode::GeocodeClient;
use tienda_store::{CatalogStore, StoreError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub assistant: Arc<Assistant>,
    /// `None` disables address lookup on seller registration.
    pub geocoder: Option<Arc<GeocodeClient>>,
    /// Reference point used when no precise user location is known.
    pub default_location: Coordinate,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
    chat: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, req_id: RequestId) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(req_id.0),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(super) fn normalize_limit(limit: Option<usize>) -> Option<usize> {
    limit.map(|l| l.clamp(1, 200))
}

pub(super) fn map_store_error(request_id: &str, error: &StoreError) -> ApiError {
    match error {
        StoreError::DuplicateEmail(_) => ApiError::new(request_id, "conflict", error.to_string()),
        StoreError::SellerNotFound(_)
        | StoreError::ProductNotFound(_)
        | StoreError::CartIndexOutOfRange { .. } => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        StoreError::InvalidInput(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        StoreError::Validation(core) => map_core_error(request_id, core),
        StoreError::Io { .. } | StoreError::Serialize { .. } | StoreError::Corrupt { .. } => {
            tracing::error!(error = %error, "catalog store failed");
            ApiError::new(request_id, "internal_error", "catalog store unavailable")
        }
    }
}

pub(super) fn map_core_error(request_id: &str, error: &CoreError) -> ApiError {
    match error {
        CoreError::ProductNotFound(_) => ApiError::new(request_id, "not_found", error.to_string()),
        _ => ApiError::new(request_id, "validation_error", error.to_string()),
    }
}

/// Optional `?lat=&lng=` pair.
#[derive(Debug, Default, Deserialize)]
pub(super) struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A complete, valid query pair is a precise location; neither falls back to
/// the stored or configured location; half a pair is rejected.
pub(super) fn resolve_location(
    state: &AppState,
    request_id: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<UserLocation, ApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(UserLocation::precise)
            .map_err(|e| map_core_error(request_id, &e)),
        (None, None) => state
            .store
            .resolve_user_location(state.default_location)
            .map_err(|e| map_store_error(request_id, &e)),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            "lat and lng must be given together",
        )),
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/offers", get(offers::list_offers))
        .route("/api/v1/products", get(products::list_products))
        .route(
            "/api/v1/products/{id}/comparison",
            get(products::product_comparison),
        )
        .route(
            "/api/v1/sellers",
            get(sellers::list_sellers).post(sellers::register_seller),
        )
        .route(
            "/api/v1/sellers/{id}/products",
            get(sellers::seller_products),
        )
        .route(
            "/api/v1/cart",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .delete(cart::clear_cart),
        )
        .route("/api/v1/cart/{index}", delete(cart::remove_from_cart))
        .route(
            "/api/v1/location",
            get(location::get_location)
                .put(location::set_location)
                .delete(location::clear_location),
        )
}

fn chat_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/chat", post(chat::chat))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/sellers/{id}/inventory",
            put(sellers::replace_inventory),
        )
        .route("/api/v1/sellers/{id}/products", post(sellers::upsert_product))
        .route("/api/v1/products/{id}", delete(products::delete_product))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(chat_router(rate_limit))
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let chat = if state.assistant.llm_enabled() {
        "llm"
    } else {
        "local"
    };

    match state.store.catalog_version() {
        Ok(_) => (
            StatusCode::OK,
            ApiResponse::new(
                HealthData {
                    status: "ok",
                    store: "ok",
                    chat,
                },
                req_id,
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: catalog store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    HealthData {
                        status: "degraded",
                        store: "unavailable",
                        chat,
                    },
                    req_id,
                ),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
