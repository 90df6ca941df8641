//! Delivery zone lookup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use hornada_core::geo::fallback_address_label;
use hornada_core::validation::validate_coordinates;
use hornada_core::{locate, DeliveryZone, GeoPoint, ZoneMatch};

use crate::error::ApiError;
use crate::state::AppState;

/// Pin dropped on the storefront map.
///
/// `address` is whatever the browser's geocoder produced, if anything.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
}

/// `zone: null` means the address is outside the service area.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateResponse {
    pub zone: Option<ZoneMatch>,
    pub address_label: String,
}

pub struct ZoneService {
    state: AppState,
}

impl ZoneService {
    pub fn new(state: AppState) -> Self {
        ZoneService { state }
    }

    /// Active zones in lookup order.
    pub async fn list(&self) -> Result<Vec<DeliveryZone>, ApiError> {
        Ok(self.state.db.zones().list_active_ordered().await?)
    }

    /// Finds the zone serving a point. Missing the service area is a normal
    /// answer, not an error.
    pub async fn locate(&self, request: LocateRequest) -> Result<LocateResponse, ApiError> {
        let point = GeoPoint::new(request.lat, request.lng);
        validate_coordinates(point)?;

        let zones = self.state.db.zones().list_active_ordered().await?;
        let zone = locate(point, &zones);

        debug!(
            lat = point.lat,
            lng = point.lng,
            zone = zone.as_ref().map(|z| z.zone_id.as_str()),
            "Located delivery zone"
        );

        let address_label = request
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| fallback_address_label(point));

        Ok(LocateResponse {
            zone,
            address_label,
        })
    }
}
