use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tienda_core::{Product, Seller, UserLocation};

use crate::backend::{FileBackend, KeyValueBackend, MemoryBackend};
use crate::cart::CartItem;
use crate::events::{CatalogEvent, CatalogSubscription, EventHub};
use crate::StoreError;

/// Storage keys. Each holds one JSON document.
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const SELLERS: &str = "sellers";
    pub const CART: &str = "cart";
    pub const USER_LOCATION: &str = "user_location";
    pub const CATALOG_VERSION: &str = "catalog_version";
}

/// The single typed entry point to persisted catalog state.
///
/// Collection writes replace the whole document. Read-modify-write sequences
/// hold an internal lock so concurrent callers in one process never lose an
/// update; there is no coordination across processes.
pub struct CatalogStore {
    backend: Arc<dyn KeyValueBackend>,
    hub: EventHub,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore").finish_non_exhaustive()
    }
}

impl CatalogStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    #[must_use]
    pub fn with_backend(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            hub: EventHub::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open a file-backed store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let backend = FileBackend::open(dir).map_err(|source| StoreError::Io {
            key: "<data dir>".to_string(),
            source,
        })?;
        Ok(Self::new(backend))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Receive a [`CatalogEvent`] for every successful write from now on.
    #[must_use]
    pub fn subscribe(&self) -> CatalogSubscription {
        self.hub.subscribe()
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn get_products(&self) -> Result<Vec<Product>, StoreError> {
        self.read_or_default(keys::PRODUCTS)
    }

    /// Replace the whole product collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialize`].
    pub fn set_products(&self, products: &[Product]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write(keys::PRODUCTS, &products, CatalogEvent::ProductsChanged)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn get_sellers(&self) -> Result<Vec<Seller>, StoreError> {
        self.read_or_default(keys::SELLERS)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialize`].
    pub fn set_sellers(&self, sellers: &[Seller]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write(keys::SELLERS, &sellers, CatalogEvent::SellersChanged)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn get_cart(&self) -> Result<Vec<CartItem>, StoreError> {
        self.read_or_default(keys::CART)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialize`].
    pub fn set_cart(&self, items: &[CartItem]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write(keys::CART, &items, CatalogEvent::CartChanged)
    }

    /// The last precise location the shopper shared, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn get_user_location(&self) -> Result<Option<UserLocation>, StoreError> {
        self.read(keys::USER_LOCATION)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an out-of-range coordinate, or a
    /// storage error.
    pub fn set_user_location(&self, location: &UserLocation) -> Result<(), StoreError> {
        location.coordinate.validate()?;
        let _guard = self.lock();
        self.write(keys::USER_LOCATION, location, CatalogEvent::LocationChanged)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the stored location cannot be removed.
    pub fn clear_user_location(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.backend
            .remove(keys::USER_LOCATION)
            .map_err(|source| io_error(keys::USER_LOCATION, source))?;
        self.hub.publish(CatalogEvent::LocationChanged);
        Ok(())
    }

    /// Version string of the last seeded demo catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`].
    pub fn catalog_version(&self) -> Result<Option<String>, StoreError> {
        self.read(keys::CATALOG_VERSION)
    }

    // -----------------------------------------------------------------------
    // Internals shared with the operation modules
    // -----------------------------------------------------------------------

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.load(key).map_err(|source| io_error(key, source))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|source| {
            tracing::warn!(key, error = %source, "stored catalog document is corrupt");
            StoreError::Corrupt {
                key: key.to_string(),
                source,
            }
        })
    }

    pub(crate) fn read_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StoreError> {
        Ok(self.read(key)?.unwrap_or_default())
    }

    /// Persist `value` and publish `event`. Callers hold [`Self::lock`].
    pub(crate) fn write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        event: CatalogEvent,
    ) -> Result<(), StoreError> {
        self.write_silent(key, value)?;
        self.hub.publish(event);
        Ok(())
    }

    pub(crate) fn write_silent<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend
            .save(key, &raw)
            .map_err(|source| io_error(key, source))
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}
