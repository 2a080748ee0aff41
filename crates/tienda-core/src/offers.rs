//! Multi-seller offer aggregation and geographic ranking.
//!
//! Given a flat list of [`Offer`]s, a seller directory, and a user coordinate,
//! this module groups listings of the same product across sellers and picks
//! the cheapest, nearest and most expensive offer of each group. Everything
//! here is a pure function over its inputs: no I/O, no shared state.

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::{compute_distance, Coordinate, UNKNOWN_DISTANCE_METERS};
use crate::CoreError;

/// Derive the key that unifies the same physical product across sellers.
///
/// A non-blank stock code wins (trimmed, case preserved). Otherwise the
/// display name is trimmed and lowercased. Returns `None` when both are blank.
#[must_use]
pub fn product_key(sku: Option<&str>, name: &str) -> Option<String> {
    if let Some(sku) = sku.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(sku.to_owned());
    }
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_lowercase())
    }
}

/// One seller's listing of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub product_key: String,
    /// Catalog id of the listing, used to link back to the product page.
    pub product_id: u64,
    pub product_name: String,
    pub seller_id: String,
    pub price: Decimal,
    /// Informational only; no reservation semantics.
    pub quantity_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_coordinate: Option<Coordinate>,
}

impl Offer {
    /// # Errors
    ///
    /// Returns [`CoreError`] for a blank key, a negative price, or an
    /// out-of-range seller coordinate.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.product_key.trim().is_empty() {
            return Err(CoreError::EmptyProductKey {
                product_id: self.product_id,
            });
        }
        if self.price < Decimal::ZERO {
            return Err(CoreError::NegativePrice {
                product_id: self.product_id,
                price: self.price,
            });
        }
        if let Some(coordinate) = &self.seller_coordinate {
            coordinate.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerLocation {
    pub seller_id: String,
    pub name: String,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
}

/// An [`Offer`] with its distance from the user resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOffer {
    #[serde(flatten)]
    pub offer: Offer,
    /// Meters from the user, or [`UNKNOWN_DISTANCE_METERS`] when the seller
    /// has no coordinate.
    pub distance_meters: f64,
    pub distance_known: bool,
}

/// All offers for one product key, with the comparison picks resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferGroup {
    pub product_key: String,
    pub product_name: String,
    /// Members in input order.
    pub offers: Vec<RankedOffer>,
    pub cheapest: RankedOffer,
    pub nearest: RankedOffer,
    pub most_expensive: RankedOffer,
    pub is_exclusive: bool,
}

impl OfferGroup {
    #[must_use]
    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }

    /// Difference between the most expensive and the cheapest offer.
    #[must_use]
    pub fn price_spread(&self) -> Decimal {
        self.most_expensive.offer.price - self.cheapest.offer.price
    }

    #[must_use]
    pub fn cheapest_is_nearest(&self) -> bool {
        self.cheapest.offer.seller_id == self.nearest.offer.seller_id
            && self.cheapest.offer.product_id == self.nearest.offer.product_id
    }

    /// Members sorted by price ascending, ties kept in input order.
    #[must_use]
    pub fn offers_by_price(&self) -> Vec<&RankedOffer> {
        let mut sorted: Vec<&RankedOffer> = self.offers.iter().collect();
        sorted.sort_by(|a, b| a.offer.price.cmp(&b.offer.price));
        sorted
    }
}

/// Group offers by `product_key`.
///
/// Groups come back in order of first appearance and members keep their input
/// order, so downstream tie-breaks are deterministic. Empty input yields an
/// empty result; no group is ever empty.
///
/// # Errors
///
/// Returns the first validation failure found in `offers`.
pub fn group_offers(offers: &[Offer]) -> Result<Vec<(String, Vec<Offer>)>, CoreError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Offer>)> = Vec::new();

    for offer in offers {
        offer.validate()?;
        let key = offer.product_key.as_str();
        match index.get(key) {
            Some(&slot) => groups[slot].1.push(offer.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push((key.to_owned(), vec![offer.clone()]));
            }
        }
    }

    Ok(groups)
}

/// Resolve distances for one group and pick its cheapest, nearest and most
/// expensive members.
///
/// Seller coordinates come from the `sellers` directory, falling back to the
/// offer's own `seller_coordinate`. Ties go to the first member in input order.
///
/// # Errors
///
/// Returns [`CoreError::EmptyGroup`] for an empty `offers` slice, or a
/// validation error for a malformed offer or user coordinate.
pub fn build_offer_group(
    key: &str,
    offers: &[Offer],
    sellers: &[SellerLocation],
    user: Coordinate,
) -> Result<OfferGroup, CoreError> {
    user.validate()?;
    let directory = seller_directory(sellers);
    build_with_directory(key, offers, &directory, user)
}

/// Group, rank and optionally truncate the whole catalog.
///
/// Groups are ordered by their nearest offer: known distances ascending, then
/// groups whose sellers all lack a coordinate. `limit` truncates the ranked
/// group list only, so a returned group always carries every seller's offer.
///
/// # Errors
///
/// Returns the first validation failure among the offers or the user
/// coordinate.
pub fn rank_all_groups(
    offers: &[Offer],
    sellers: &[SellerLocation],
    user: Coordinate,
    limit: Option<usize>,
) -> Result<Vec<OfferGroup>, CoreError> {
    user.validate()?;
    let directory = seller_directory(sellers);

    let mut ranked = group_offers(offers)?
        .into_iter()
        .map(|(key, members)| build_with_directory(&key, &members, &directory, user))
        .collect::<Result<Vec<_>, _>>()?;

    ranked.sort_by(|a, b| by_distance(&a.nearest, &b.nearest));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    Ok(ranked)
}

fn seller_directory(sellers: &[SellerLocation]) -> HashMap<&str, Option<Coordinate>> {
    sellers
        .iter()
        .map(|s| (s.seller_id.as_str(), s.coordinate))
        .collect()
}

fn build_with_directory(
    key: &str,
    offers: &[Offer],
    directory: &HashMap<&str, Option<Coordinate>>,
    user: Coordinate,
) -> Result<OfferGroup, CoreError> {
    if offers.is_empty() {
        return Err(CoreError::EmptyGroup {
            product_key: key.to_owned(),
        });
    }

    let mut members = Vec::with_capacity(offers.len());
    for offer in offers {
        offer.validate()?;
        let coordinate = directory
            .get(offer.seller_id.as_str())
            .copied()
            .flatten()
            .or(offer.seller_coordinate);
        let (distance_meters, distance_known) = match coordinate {
            Some(c) => (compute_distance(user, c), true),
            None => (UNKNOWN_DISTANCE_METERS, false),
        };
        members.push(RankedOffer {
            offer: offer.clone(),
            distance_meters,
            distance_known,
        });
    }

    let cheapest = first_min_by(&members, |a, b| a.offer.price.cmp(&b.offer.price));
    let nearest = first_min_by(&members, by_distance);
    let most_expensive = first_min_by(&members, |a, b| b.offer.price.cmp(&a.offer.price));

    Ok(OfferGroup {
        product_key: key.to_owned(),
        product_name: members[0].offer.product_name.trim().to_owned(),
        cheapest: members[cheapest].clone(),
        nearest: members[nearest].clone(),
        most_expensive: members[most_expensive].clone(),
        is_exclusive: members.len() == 1,
        offers: members,
    })
}

/// Known distances first, then by meters.
fn by_distance(a: &RankedOffer, b: &RankedOffer) -> Ordering {
    b.distance_known
        .cmp(&a.distance_known)
        .then_with(|| a.distance_meters.total_cmp(&b.distance_meters))
}

/// Index of the first element that no later element strictly beats.
fn first_min_by<T>(items: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> usize {
    let mut best = 0;
    for (i, item) in items.iter().enumerate().skip(1) {
        if cmp(item, &items[best]) == Ordering::Less {
            best = i;
        }
    }
    best
}

#[cfg(test)]
#[path = "offers_test.rs"]
mod tests;
