//! Shopping cart: a list of product snapshots taken at add time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::events::CatalogEvent;
use crate::store::{keys, CatalogStore};
use crate::StoreError;

/// A product as it looked when added. Later price edits do not touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: u64,
    pub name: String,
    pub price: Decimal,
    pub seller_id: String,
    #[serde(default)]
    pub seller_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    pub total: Decimal,
}

impl CartSummary {
    fn from_items(items: Vec<CartItem>) -> Self {
        let total = items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        Self {
            item_count: items.len(),
            items,
            total,
        }
    }
}

impl CatalogStore {
    /// Append one unit of `product_id` to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProductNotFound`] for an unknown product, or a
    /// storage error.
    pub fn add_to_cart(&self, product_id: u64) -> Result<CartItem, StoreError> {
        let _guard = self.lock();
        let products = self.get_products()?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;
        let seller_name = self
            .get_sellers()?
            .into_iter()
            .find(|s| s.id == product.seller_id)
            .map(|s| s.name);

        let item = CartItem {
            product_id,
            name: product.name.trim().to_string(),
            price: product.price,
            seller_id: product.seller_id.clone(),
            seller_name,
            quantity: 1,
            image_url: product.image_url.clone(),
            added_at: Utc::now(),
        };

        let mut cart = self.get_cart()?;
        cart.push(item.clone());
        self.write(keys::CART, &cart, CatalogEvent::CartChanged)?;
        tracing::debug!(product_id, items = cart.len(), "added to cart");
        Ok(item)
    }

    /// Remove the line at `index` (0-based, insertion order).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CartIndexOutOfRange`], or a storage error.
    pub fn remove_from_cart(&self, index: usize) -> Result<CartItem, StoreError> {
        let _guard = self.lock();
        let mut cart = self.get_cart()?;
        if index >= cart.len() {
            return Err(StoreError::CartIndexOutOfRange {
                index,
                len: cart.len(),
            });
        }
        let removed = cart.remove(index);
        self.write(keys::CART, &cart, CatalogEvent::CartChanged)?;
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns a storage error.
    pub fn clear_cart(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write(keys::CART, &Vec::<CartItem>::new(), CatalogEvent::CartChanged)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn cart_summary(&self) -> Result<CartSummary, StoreError> {
        Ok(CartSummary::from_items(self.get_cart()?))
    }
}
