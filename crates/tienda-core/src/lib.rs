pub mod app_config;
pub mod catalog;
pub mod config;
pub mod format;
pub mod geo;
pub mod offers;
pub mod seed;

pub use app_config::{AppConfig, ChatConfig, Environment};
pub use catalog::{
    compare_product, list_catalog, offers_from_products, search_products, sellers_by_distance,
    CatalogEntry, CatalogSort, NearbySeller, Product, ProductComparison, Seller,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use format::format_clp;
pub use geo::{
    compute_distance, format_distance, Coordinate, LocationProvenance, UserLocation,
    EARTH_RADIUS_METERS, UNKNOWN_DISTANCE_METERS,
};
pub use offers::{
    build_offer_group, group_offers, product_key, rank_all_groups, Offer, OfferGroup,
    RankedOffer, SellerLocation,
};
pub use seed::{load_catalog_seed, CatalogSeed};

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures raised by the aggregation entry points.
///
/// These are never coerced into defaults: a mis-ranked price or distance is
/// user-facing, so callers get the error and decide what to show.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("product {product_id} has an empty product key")]
    EmptyProductKey { product_id: u64 },

    #[error("product {product_id} has a negative price ({price})")]
    NegativePrice { product_id: u64, price: Decimal },

    #[error("offer group '{product_key}' has no offers")]
    EmptyGroup { product_key: String },

    #[error("product {0} not found")]
    ProductNotFound(u64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
