use tienda_core::{Coordinate, UserLocation};

use crate::store::CatalogStore;
use crate::StoreError;

impl CatalogStore {
    /// The shopper's stored precise location, or `default` tagged as a
    /// fallback when nothing has been shared.
    ///
    /// # Errors
    ///
    /// Returns a storage error. A stored coordinate that no longer validates is
    /// treated as absent.
    pub fn resolve_user_location(&self, default: Coordinate) -> Result<UserLocation, StoreError> {
        match self.get_user_location()? {
            Some(stored) if stored.coordinate.validate().is_ok() => Ok(stored),
            Some(stored) => {
                tracing::warn!(
                    lat = stored.coordinate.lat,
                    lng = stored.coordinate.lng,
                    "ignoring out-of-range stored user location"
                );
                Ok(UserLocation::fallback(default))
            }
            None => Ok(UserLocation::fallback(default)),
        }
    }

    /// Record a device-reported coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an out-of-range coordinate.
    pub fn record_precise_location(&self, coordinate: Coordinate) -> Result<UserLocation, StoreError> {
        let location = UserLocation::precise(coordinate);
        self.set_user_location(&location)?;
        Ok(location)
    }
}
