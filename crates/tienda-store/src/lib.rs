//! Typed key-value persistence for the marketplace catalog.
//!
//! Every collection lives under one fixed key as a JSON document. Writes
//! replace the whole document and notify subscribers.

pub mod backend;
pub mod cart;
pub mod events;
pub mod inventory;
pub mod location;
pub mod store;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use cart::{CartItem, CartSummary};
pub use events::{CatalogEvent, CatalogSubscription};
pub use inventory::{NewSeller, ProductDraft, SeedOutcome};
pub use store::{keys, CatalogStore};

use thiserror::Error;
use tienda_core::CoreError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("a seller with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("seller '{0}' not found")]
    SellerNotFound(String),

    #[error("product {0} not found")]
    ProductNotFound(u64),

    #[error("cart index {index} out of range (cart has {len} items)")]
    CartIndexOutOfRange { index: usize, len: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Validation(#[from] CoreError),
}
