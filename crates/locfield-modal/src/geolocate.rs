//! Device geolocation seam.
//!
//! The modal never calls a device API directly; host environments provide a
//! [`Geolocator`] (or intercept the `get-current-location` event and push a
//! coordinate in themselves). Failure kinds are a proper enum — timeout
//! detection does not depend on any host-global error code.

use std::time::Duration;

use thiserror::Error;

use locfield_core::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocateError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("geolocation timed out")]
    Timeout,

    #[error("geolocation unavailable: {0}")]
    Unavailable(String),
}

/// Retrieves the device's current coordinate, giving up after `timeout`.
pub trait Geolocator {
    fn current_position(
        &mut self,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<Coordinate, GeolocateError>>;
}
