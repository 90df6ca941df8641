//! # Delivery Zones
//!
//! Resolves a customer coordinate to the delivery zone that serves it.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customer drops a pin on the map                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  locate(point, zones) ← THIS MODULE                                     │
//! │       │                                                                 │
//! │       ├── skip zones with active = false                                │
//! │       ├── ray-cast each remaining polygon, in the order given           │
//! │       └── first hit wins                                                │
//! │       │                                                                 │
//! │       ├── Some(ZoneMatch) → shipping price + ETA shown at checkout      │
//! │       └── None            → "we don't deliver there yet"                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlapping Zones
//! Zones may overlap. The answer depends on iteration order: the first active
//! zone that contains the point is returned, with no area or distance
//! tie-break. Callers control priority by ordering the list (the database
//! layer sorts by the zone's `order` field).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geo::{ring_contains, GeoPoint};
use crate::money::Money;

/// A polygonal delivery area with a flat shipping price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub id: String,
    pub name: String,
    /// Closed ring of vertices. Missing or malformed data means "matches nothing".
    #[serde(default)]
    pub polygon: Vec<GeoPoint>,
    pub price: Money,
    pub estimated_time: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub order: i32,
}

impl DeliveryZone {
    /// Returns true when this zone is active and its polygon contains `point`.
    pub fn serves(&self, point: GeoPoint) -> bool {
        self.active && ring_contains(&self.polygon, point)
    }
}

/// The zone a point resolved to, with what checkout needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMatch {
    pub zone_id: String,
    pub name: String,
    pub price: Money,
    pub estimated_time: String,
}

impl From<&DeliveryZone> for ZoneMatch {
    fn from(zone: &DeliveryZone) -> Self {
        ZoneMatch {
            zone_id: zone.id.clone(),
            name: zone.name.clone(),
            price: zone.price,
            estimated_time: zone.estimated_time.clone(),
        }
    }
}

/// Finds the first active zone containing `point`.
///
/// `None` is the normal "outside serviceable area" answer.
///
/// ## Example
/// ```rust
/// use hornada_core::geo::GeoPoint;
/// use hornada_core::money::Money;
/// use hornada_core::zone::{locate, DeliveryZone};
///
/// let centro = DeliveryZone {
///     id: "centro".into(),
///     name: "Centro".into(),
///     polygon: vec![
///         GeoPoint::new(0.0, 0.0),
///         GeoPoint::new(0.0, 10.0),
///         GeoPoint::new(10.0, 10.0),
///         GeoPoint::new(10.0, 0.0),
///         GeoPoint::new(0.0, 0.0),
///     ],
///     price: Money::from_cents(500),
///     estimated_time: "30-45 min".into(),
///     active: true,
///     order: 0,
/// };
///
/// let hit = locate(GeoPoint::new(5.0, 5.0), &[centro.clone()]).unwrap();
/// assert_eq!(hit.zone_id, "centro");
/// assert!(locate(GeoPoint::new(50.0, 50.0), &[centro]).is_none());
/// ```
pub fn locate(point: GeoPoint, zones: &[DeliveryZone]) -> Option<ZoneMatch> {
    zones
        .iter()
        .find(|zone| zone.serves(point))
        .map(ZoneMatch::from)
}

/// Sorts zones into lookup order: ascending `order`, stable for ties.
pub fn sort_for_lookup(zones: &mut [DeliveryZone]) {
    zones.sort_by_key(|z| z.order);
}

// =============================================================================
// Unit Tests
// =============================================================================
