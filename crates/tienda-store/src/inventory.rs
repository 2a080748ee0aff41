//! Seller registration, inventory management and demo seeding.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{CatalogSeed, Coordinate, CoreError, Product, Seller};
use uuid::Uuid;

use crate::events::CatalogEvent;
use crate::store::{keys, CatalogStore};
use crate::StoreError;

/// Registration form for a new seller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeller {
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
}

/// A listing as submitted by a seller. The store assigns the seller id, and
/// the product id when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
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
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductDraft {
    fn into_product(self, id: u64, seller_id: &str, created_at: Option<chrono::DateTime<Utc>>) -> Product {
        Product {
            id,
            sku: self
                .sku
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            name: self.name.trim().to_string(),
            description: self.description,
            brand: self.brand,
            tool_type: self.tool_type,
            size: self.size,
            quantity: self.quantity,
            price: self.price,
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            seller_id: seller_id.to_string(),
            created_at,
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            tool_type: product.tool_type.clone(),
            size: product.size.clone(),
            quantity: product.quantity,
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// Demo products were (re)written.
    pub products_written: bool,
    /// Demo sellers that were missing and got added.
    pub sellers_added: usize,
}

/// Smallest id greater than every id in `products`.
fn next_id(products: &[Product]) -> Result<u64, StoreError> {
    products.iter().map(|p| p.id).max().map_or(Ok(1), id_after)
}

fn id_after(id: u64) -> Result<u64, StoreError> {
    id.checked_add(1)
        .ok_or_else(|| StoreError::InvalidInput(format!("product id {id} is out of range")))
}

/// Same checks the aggregator applies to an offer, run at write time.
fn validate_product(product: &Product) -> Result<(), StoreError> {
    if product.product_key().is_none() {
        return Err(CoreError::EmptyProductKey {
            product_id: product.id,
        }
        .into());
    }
    if product.price < Decimal::ZERO {
        return Err(CoreError::NegativePrice {
            product_id: product.id,
            price: product.price,
        }
        .into());
    }
    Ok(())
}

impl CatalogStore {
    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    /// Load the demo catalog unless this exact version was already seeded.
    ///
    /// Missing demo sellers are merged in on every call, matched by id or
    /// email. Products are rewritten only when the stored version differs or
    /// no products exist; listings owned by non-demo sellers are kept, and
    /// any whose id the new catalog now uses are moved to a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn seed_if_outdated(&self, seed: &CatalogSeed) -> Result<SeedOutcome, StoreError> {
        self.seed(seed, false)
    }

    /// Rewrite the demo products regardless of the stored version.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn force_seed(&self, seed: &CatalogSeed) -> Result<SeedOutcome, StoreError> {
        self.seed(seed, true)
    }

    fn seed(&self, seed: &CatalogSeed, force: bool) -> Result<SeedOutcome, StoreError> {
        let _guard = self.lock();

        let mut sellers = self.get_sellers()?;
        let before = sellers.len();
        for demo in &seed.sellers {
            let exists = sellers
                .iter()
                .any(|s| s.id == demo.id || s.email.eq_ignore_ascii_case(&demo.email));
            if !exists {
                sellers.push(demo.clone());
            }
        }
        let sellers_added = sellers.len() - before;
        if sellers_added > 0 {
            self.write(keys::SELLERS, &sellers, CatalogEvent::SellersChanged)?;
        }

        let stored_version: Option<String> = self.read(keys::CATALOG_VERSION)?;
        let products = self.get_products()?;
        let outdated = stored_version.as_deref() != Some(seed.version.as_str());
        let products_written = force || outdated || products.is_empty();

        if products_written {
            let demo_ids: HashSet<&str> = seed.sellers.iter().map(|s| s.id.as_str()).collect();
            let seeded_ids: HashSet<u64> = seed.products.iter().map(|p| p.id).collect();
            let (colliding, kept): (Vec<Product>, Vec<Product>) = products
                .into_iter()
                .filter(|p| !demo_ids.contains(p.seller_id.as_str()))
                .partition(|p| seeded_ids.contains(&p.id));

            let mut merged: Vec<Product> = seed.products.clone();
            merged.extend(kept);
            for mut product in colliding {
                let fresh = next_id(&merged)?;
                tracing::warn!(
                    seller_id = %product.seller_id,
                    old_id = product.id,
                    new_id = fresh,
                    "listing id claimed by demo catalog, reassigned"
                );
                product.id = fresh;
                merged.push(product);
            }
            self.write(keys::PRODUCTS, &merged, CatalogEvent::ProductsChanged)?;
            self.write_silent(keys::CATALOG_VERSION, &seed.version)?;
            tracing::info!(
                version = %seed.version,
                products = merged.len(),
                "demo catalog seeded"
            );
        } else {
            tracing::debug!(version = %seed.version, "demo catalog already current");
        }

        Ok(SeedOutcome {
            products_written,
            sellers_added,
        })
    }

    // -----------------------------------------------------------------------
    // Sellers
    // -----------------------------------------------------------------------

    /// Register a seller and assign it a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a blank name or malformed
    /// email, [`StoreError::DuplicateEmail`] if the email is taken
    /// (case-insensitive), [`StoreError::Validation`] for a bad coordinate, or a
    /// storage error.
    pub fn register_seller(&self, form: NewSeller) -> Result<Seller, StoreError> {
        let name = form.name.trim();
        let email = form.email.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("seller name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(StoreError::InvalidInput(format!("invalid email '{email}'")));
        }
        if let Some(coordinate) = &form.coordinate {
            coordinate.validate()?;
        }

        let _guard = self.lock();
        let mut sellers = self.get_sellers()?;
        if sellers.iter().any(|s| s.email.eq_ignore_ascii_case(email)) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        let seller = Seller {
            id: format!("seller-{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            email: email.to_string(),
            business_type: form.business_type.trim().to_string(),
            address: form.address.trim().to_string(),
            phone: form.phone.trim().to_string(),
            coordinate: form.coordinate,
        };
        sellers.push(seller.clone());
        self.write(keys::SELLERS, &sellers, CatalogEvent::SellersChanged)?;
        Ok(seller)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::SellerNotFound`], or a storage error.
    pub fn seller(&self, seller_id: &str) -> Result<Seller, StoreError> {
        self.get_sellers()?
            .into_iter()
            .find(|s| s.id == seller_id)
            .ok_or_else(|| StoreError::SellerNotFound(seller_id.to_string()))
    }

    /// A store page: every listing owned by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SellerNotFound`], or a storage error.
    pub fn seller_products(&self, seller_id: &str) -> Result<Vec<Product>, StoreError> {
        self.seller(seller_id)?;
        Ok(self
            .get_products()?
            .into_iter()
            .filter(|p| p.seller_id == seller_id)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`StoreError::Io`], [`StoreError::Corrupt`], or
    /// [`StoreError::InvalidInput`] when the id space is exhausted.
    pub fn next_product_id(&self) -> Result<u64, StoreError> {
        next_id(&self.get_products()?)
    }

    /// Replace everything `seller_id` lists with `drafts`, leaving other
    /// sellers' products untouched.
    ///
    /// Draft ids are kept unless another seller owns them; missing or
    /// conflicting ids get fresh ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SellerNotFound`], [`StoreError::Validation`] for a
    /// listing with no name/SKU or a negative price,
    /// [`StoreError::InvalidInput`] for an id at the top of the id range, or a
    /// storage error.
    pub fn replace_seller_inventory(
        &self,
        seller_id: &str,
        drafts: Vec<ProductDraft>,
    ) -> Result<Vec<Product>, StoreError> {
        let _guard = self.lock();
        self.seller(seller_id)?;

        let existing = self.get_products()?;
        let (mine, mut others): (Vec<Product>, Vec<Product>) =
            existing.into_iter().partition(|p| p.seller_id == seller_id);

        let mut taken: HashSet<u64> = others.iter().map(|p| p.id).collect();
        let mut next = next_id(&others)?.max(next_id(&mine)?);
        let now = Utc::now();

        let mut replaced = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = match draft.id {
                Some(id) if !taken.contains(&id) => id,
                _ => {
                    while taken.contains(&next) {
                        next = id_after(next)?;
                    }
                    next
                }
            };
            taken.insert(id);
            next = next.max(id_after(id)?);

            let created_at = mine
                .iter()
                .find(|p| p.id == id)
                .and_then(|p| p.created_at)
                .or(Some(now));
            let product = draft.into_product(id, seller_id, created_at);
            validate_product(&product)?;
            replaced.push(product);
        }

        others.extend(replaced.iter().cloned());
        self.write(keys::PRODUCTS, &others, CatalogEvent::ProductsChanged)?;
        tracing::info!(seller_id, products = replaced.len(), "seller inventory replaced");
        Ok(replaced)
    }

    /// Create a listing, or update one `seller_id` already owns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SellerNotFound`], [`StoreError::ProductNotFound`]
    /// when the draft id belongs to no listing of this seller,
    /// [`StoreError::Validation`], or a storage error.
    pub fn upsert_product(&self, seller_id: &str, draft: ProductDraft) -> Result<Product, StoreError> {
        let _guard = self.lock();
        self.seller(seller_id)?;

        let mut products = self.get_products()?;
        let product = match draft.id {
            Some(id) => {
                let slot = products
                    .iter()
                    .position(|p| p.id == id && p.seller_id == seller_id)
                    .ok_or(StoreError::ProductNotFound(id))?;
                let created_at = products[slot].created_at;
                let updated = draft.into_product(id, seller_id, created_at);
                validate_product(&updated)?;
                products[slot] = updated.clone();
                updated
            }
            None => {
                let created = draft.into_product(next_id(&products)?, seller_id, Some(Utc::now()));
                validate_product(&created)?;
                products.push(created.clone());
                created
            }
        };

        self.write(keys::PRODUCTS, &products, CatalogEvent::ProductsChanged)?;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::ProductNotFound`], or a storage error.
    pub fn delete_product(&self, product_id: u64) -> Result<Product, StoreError> {
        let _guard = self.lock();
        let mut products = self.get_products()?;
        let slot = products
            .iter()
            .position(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;
        let removed = products.remove(slot);
        self.write(keys::PRODUCTS, &products, CatalogEvent::ProductsChanged)?;
        Ok(removed)
    }
}
