use axum::{extract::State, Extension, Json};
use tienda_core::{Coordinate, UserLocation};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

/// GET /api/v1/location: stored precise location, else the reference point.
pub(super) async fn get_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<UserLocation>>, ApiError> {
    let location = state
        .store
        .resolve_user_location(state.default_location)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(location, req_id))
}

/// PUT /api/v1/location: record a device-reported coordinate.
pub(super) async fn set_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(coordinate): Json<Coordinate>,
) -> Result<Json<ApiResponse<UserLocation>>, ApiError> {
    let location = state
        .store
        .record_precise_location(coordinate)
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(location, req_id))
}

/// DELETE /api/v1/location: forget the device location.
pub(super) async fn clear_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<UserLocation>>, ApiError> {
    let rid = &req_id.0;
    state
        .store
        .clear_user_location()
        .map_err(|e| map_store_error(rid, &e))?;
    let location = state
        .store
        .resolve_user_location(state.default_location)
        .map_err(|e| map_store_error(rid, &e))?;
    Ok(ApiResponse::new(location, req_id))
}
