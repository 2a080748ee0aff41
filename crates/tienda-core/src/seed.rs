use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Seller};
use crate::ConfigError;

/// Demo catalog shipped with the service.
///
/// `version` is compared against the one recorded in the store; a different
/// value means the demo products are rewritten on the next seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub version: String,
    pub sellers: Vec<Seller>,
    pub products: Vec<Product>,
}

/// Load and validate the catalog seed from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog_seed(path: &Path) -> Result<CatalogSeed, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed: CatalogSeed = serde_yaml::from_str(&content)?;
    validate_seed(&seed)?;

    Ok(seed)
}

fn validate_seed(seed: &CatalogSeed) -> Result<(), ConfigError> {
    if seed.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "catalog version must be non-empty".to_string(),
        ));
    }

    let mut seller_ids = HashSet::new();
    let mut emails = HashSet::new();
    for seller in &seed.sellers {
        if seller.id.trim().is_empty() || seller.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seller id and name must be non-empty".to_string(),
            ));
        }
        if !seller_ids.insert(seller.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate seller id: '{}'",
                seller.id
            )));
        }
        if !emails.insert(seller.email.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate seller email: '{}'",
                seller.email
            )));
        }
        if let Some(coordinate) = &seller.coordinate {
            coordinate.validate().map_err(|e| {
                ConfigError::Validation(format!("seller '{}': {e}", seller.id))
            })?;
        }
    }

    let mut product_ids = HashSet::new();
    for product in &seed.products {
        if !product_ids.insert(product.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: {}",
                product.id
            )));
        }
        if product.product_key().is_none() {
            return Err(ConfigError::Validation(format!(
                "product {} has neither sku nor name",
                product.id
            )));
        }
        if product.price < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "product {} has negative price {}",
                product.id, product.price
            )));
        }
        if !seller_ids.contains(product.seller_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "product {} references unknown seller '{}'",
                product.id, product.seller_id
            )));
        }
    }

    Ok(())
}
