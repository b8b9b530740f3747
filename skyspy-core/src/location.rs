//! Device-location capability seam.
//!
//! The controller is capability-gated: an environment without a location
//! device reports `is_supported() == false` and startup short-circuits
//! before any fetch.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::LocateError;
use crate::model::Coordinates;

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    /// Whether this environment can produce a device location at all.
    fn is_supported(&self) -> bool {
        true
    }

    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Coordinates supplied up front (`--coords`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Environment with no location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl Locator for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_locator_returns_its_coordinates() {
        let coords = Coordinates { latitude: 47.6, longitude: -122.33 };
        let locator = FixedLocator(coords);
        assert!(locator.is_supported());
        assert_eq!(locator.locate().await.unwrap(), coords);
    }

    #[tokio::test]
    async fn unsupported_locator_reports_no_capability() {
        let locator = Unsupported;
        assert!(!locator.is_supported());
        assert_eq!(locator.locate().await.unwrap_err(), LocateError::Unsupported);
    }
}
