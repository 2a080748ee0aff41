//! Product and seller records, plus the read-side views built on them:
//! storefront listing, search, per-product comparison and the store map.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::{compute_distance, format_distance, Coordinate};
use crate::offers::{build_offer_group, product_key, Offer, OfferGroup, RankedOffer, SellerLocation};
use crate::CoreError;

/// A seller's listing as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub tool_type: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub seller_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    #[must_use]
    pub fn product_key(&self) -> Option<String> {
        product_key(self.sku.as_deref(), &self.name)
    }

    /// Inventory value of this listing (`quantity * price`).
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    /// Project this listing into an [`Offer`], attaching the seller's
    /// coordinate when the seller is known.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyProductKey`] when both SKU and name are blank,
    /// or any [`Offer::validate`] failure.
    pub fn to_offer(&self, sellers: &[Seller]) -> Result<Offer, CoreError> {
        let coordinate = sellers
            .iter()
            .find(|s| s.id == self.seller_id)
            .and_then(|s| s.coordinate);
        self.offer_with_coordinate(coordinate)
    }

    fn offer_with_coordinate(&self, coordinate: Option<Coordinate>) -> Result<Offer, CoreError> {
        let key = self
            .product_key()
            .ok_or(CoreError::EmptyProductKey { product_id: self.id })?;
        let offer = Offer {
            product_key: key,
            product_id: self.id,
            product_name: self.name.trim().to_owned(),
            seller_id: self.seller_id.clone(),
            price: self.price,
            quantity_available: self.quantity,
            seller_coordinate: coordinate,
        };
        offer.validate()?;
        Ok(offer)
    }
}

fn any_field_contains(needle: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

impl Seller {
    #[must_use]
    pub fn location(&self) -> SellerLocation {
        let address = self.address.trim();
        SellerLocation {
            seller_id: self.id.clone(),
            name: self.name.clone(),
            address: (!address.is_empty()).then(|| address.to_owned()),
            coordinate: self.coordinate,
        }
    }
}

/// Project every listing into an offer.
///
/// # Errors
///
/// Returns the first listing that cannot form a valid offer.
pub fn offers_from_products(
    products: &[Product],
    sellers: &[Seller],
) -> Result<Vec<Offer>, CoreError> {
    let coordinates: HashMap<&str, Option<Coordinate>> = sellers
        .iter()
        .map(|s| (s.id.as_str(), s.coordinate))
        .collect();
    products
        .iter()
        .map(|p| {
            let coordinate = coordinates.get(p.seller_id.as_str()).copied().flatten();
            p.offer_with_coordinate(coordinate)
        })
        .collect()
}

/// Case-insensitive substring search over name, description, brand and tool
/// type. A blank query matches nothing.
#[must_use]
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| {
            any_field_contains(
                &needle,
                &[
                    p.name.as_str(),
                    p.description.as_str(),
                    p.brand.as_str(),
                    p.tool_type.as_str(),
                ],
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl FromStr for CatalogSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            other => Err(format!(
                "unknown sort '{other}'; expected price-asc, price-desc, name-asc or name-desc"
            )),
        }
    }
}

/// One storefront card: the cheapest listing of a product key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub product: Product,
    /// More than one seller lists this product.
    pub has_alternatives: bool,
    pub offer_count: usize,
}

/// Storefront listing: one entry per product key, optionally filtered by a
/// query over name and description, then sorted. Without a sort, entries keep
/// the order in which their key first appears.
#[must_use]
pub fn list_catalog(
    products: &[Product],
    query: Option<&str>,
    sort: Option<CatalogSort>,
) -> Vec<CatalogEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<CatalogEntry> = Vec::new();

    for product in products {
        let Some(key) = product.product_key() else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => {
                let entry = &mut entries[slot];
                entry.has_alternatives = true;
                entry.offer_count += 1;
                if product.price < entry.product.price {
                    entry.product = product.clone();
                }
            }
            None => {
                index.insert(key, entries.len());
                entries.push(CatalogEntry {
                    product: product.clone(),
                    has_alternatives: false,
                    offer_count: 1,
                });
            }
        }
    }

    if let Some(needle) = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty()) {
        entries.retain(|e| {
            any_field_contains(
                &needle,
                &[e.product.name.as_str(), e.product.description.as_str()],
            )
        });
    }

    match sort {
        Some(CatalogSort::PriceAsc) => entries.sort_by(|a, b| a.product.price.cmp(&b.product.price)),
        Some(CatalogSort::PriceDesc) => entries.sort_by(|a, b| b.product.price.cmp(&a.product.price)),
        Some(CatalogSort::NameAsc) => entries.sort_by_cached_key(|e| e.product.name.trim().to_lowercase()),
        Some(CatalogSort::NameDesc) => {
            entries.sort_by_cached_key(|e| std::cmp::Reverse(e.product.name.trim().to_lowercase()));
        }
        None => {}
    }

    entries
}

/// Everything the product detail page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductComparison {
    pub product: Product,
    pub group: OfferGroup,
    /// Group members cheapest first.
    pub by_price: Vec<RankedOffer>,
}

/// Compare one listing against every seller offering the same product.
///
/// # Errors
///
/// Returns [`CoreError::ProductNotFound`] for an unknown id, or a validation
/// error from the aggregator.
pub fn compare_product(
    products: &[Product],
    sellers: &[Seller],
    user: Coordinate,
    product_id: u64,
) -> Result<ProductComparison, CoreError> {
    let product = products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or(CoreError::ProductNotFound(product_id))?;
    let key = product
        .product_key()
        .ok_or(CoreError::EmptyProductKey { product_id })?;

    let siblings: Vec<Product> = products
        .iter()
        .filter(|p| p.product_key().as_deref() == Some(key.as_str()))
        .cloned()
        .collect();
    let offers = offers_from_products(&siblings, sellers)?;
    let locations: Vec<SellerLocation> = sellers.iter().map(Seller::location).collect();

    let group = build_offer_group(&key, &offers, &locations, user)?;
    let by_price = group.offers_by_price().into_iter().cloned().collect();

    Ok(ProductComparison {
        product: product.clone(),
        group,
        by_price,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySeller {
    pub seller: Seller,
    pub distance_meters: f64,
    pub distance_label: String,
}

/// Sellers with a known coordinate, nearest first.
#[must_use]
pub fn sellers_by_distance(sellers: &[Seller], user: Coordinate) -> Vec<NearbySeller> {
    let mut nearby: Vec<NearbySeller> = sellers
        .iter()
        .filter_map(|seller| {
            let coordinate = seller.coordinate?;
            let distance_meters = compute_distance(user, coordinate);
            Some(NearbySeller {
                seller: seller.clone(),
                distance_meters,
                distance_label: format_distance(distance_meters),
            })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    nearby
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
