//! # Geometry
//!
//! Coordinates and the ray-casting point-in-polygon test used for
//! delivery-zone lookup.
//!
//! ## Ray Casting
//! ```text
//!   lng
//!    ▲
//!    │   ┌──────────────┐
//!    │   │              │
//!    │   │   P ●────────┼────────►  ray: 1 crossing  → inside
//!    │   │              │
//!    │   └──────────────┘
//!    │                        Q ●──►  ray: 0 crossings → outside
//!    └───────────────────────────────► lat
//! ```
//!
//! The edge test is `(yi > lng) != (yj > lng)` with `x = lat`, `y = lng`.
//! This half-open convention counts a vertex lying exactly on the ray once,
//! never twice.
//!
//! ## Boundary Convention
//! Points exactly on an edge get a fixed answer: edges on the minimum side of
//! the ring (smallest lat, smallest lng) are inside, edges on the maximum side
//! are outside. For the square `(0,0)-(0,10)-(10,10)-(10,0)`, the point
//! `(0, 5)` is inside and `(10, 5)` is outside.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Number of vertices in a ring, not counting a closing vertex that repeats
/// the first one.
pub fn distinct_vertex_count(ring: &[GeoPoint]) -> usize {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => ring.len() - 1,
        _ => ring.len(),
    }
}

/// Returns true when `point` lies inside `ring`.
///
/// Rings with fewer than 3 distinct vertices, or any non-finite coordinate,
/// never contain anything. Malformed data is a miss, not an error.
pub fn ring_contains(ring: &[GeoPoint], point: GeoPoint) -> bool {
    if distinct_vertex_count(ring) < 3 {
        return false;
    }
    if !point.is_finite() || ring.iter().any(|v| !v.is_finite()) {
        return false;
    }

    let (x, y) = (point.lat, point.lng);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lat, ring[i].lng);
        let (xj, yj) = (ring[j].lat, ring[j].lng);

        // Horizontal edges never pass the first test, so the division is safe
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Label used when reverse geocoding is unavailable.
///
/// ```rust
/// use hornada_core::geo::{fallback_address_label, GeoPoint};
///
/// let label = fallback_address_label(GeoPoint::new(-34.603722, -58.381592));
/// assert_eq!(label, "-34.60372, -58.38159");
/// ```
pub fn fallback_address_label(point: GeoPoint) -> String {
    format!("{:.5}, {:.5}", point.lat, point.lng)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_point_inside_and_outside_square() {
        let ring = square();
        assert!(ring_contains(&ring, GeoPoint::new(5.0, 5.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(15.0, 15.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(-1.0, 5.0)));
    }

    #[test]
    fn test_edge_points_follow_min_side_convention() {
        let ring = square();
        // Minimum-side edges are inside
        assert!(ring_contains(&ring, GeoPoint::new(0.0, 5.0)));
        assert!(ring_contains(&ring, GeoPoint::new(5.0, 0.0)));
        // Maximum-side edges are outside
        assert!(!ring_contains(&ring, GeoPoint::new(10.0, 5.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(5.0, 10.0)));

        // Same answer on every call
        for _ in 0..3 {
            assert!(ring_contains(&ring, GeoPoint::new(0.0, 5.0)));
        }
    }

    #[test]
    fn test_open_ring_behaves_like_closed_ring() {
        let mut open = square();
        open.pop();
        assert!(ring_contains(&open, GeoPoint::new(5.0, 5.0)));
        assert!(ring_contains(&open, GeoPoint::new(0.0, 5.0)));
        assert!(!ring_contains(&open, GeoPoint::new(15.0, 15.0)));
    }

    #[test]
    fn test_concave_ring() {
        // U shape: the notch between lng 4 and 6 above lat 2 is outside
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 6.0),
            GeoPoint::new(2.0, 6.0),
            GeoPoint::new(2.0, 4.0),
            GeoPoint::new(10.0, 4.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ];
        assert!(ring_contains(&ring, GeoPoint::new(1.0, 5.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(5.0, 5.0)));
        assert!(ring_contains(&ring, GeoPoint::new(5.0, 2.0)));
        assert!(ring_contains(&ring, GeoPoint::new(5.0, 8.0)));
    }

    #[test]
    fn test_degenerate_rings_never_match() {
        let p = GeoPoint::new(0.0, 0.0);
        assert!(!ring_contains(&[], p));
        assert!(!ring_contains(&[p], p));
        assert!(!ring_contains(&[p, GeoPoint::new(1.0, 1.0)], p));
        // Closed ring with only two distinct vertices
        assert!(!ring_contains(
            &[p, GeoPoint::new(1.0, 1.0), p],
            GeoPoint::new(0.5, 0.5)
        ));
    }

    #[test]
    fn test_non_finite_coordinates_never_match() {
        let ring = square();
        assert!(!ring_contains(&ring, GeoPoint::new(f64::NAN, 5.0)));

        let mut broken = square();
        broken[2] = GeoPoint::new(f64::INFINITY, 10.0);
        assert!(!ring_contains(&broken, GeoPoint::new(5.0, 5.0)));
    }

    #[test]
    fn test_distinct_vertex_count() {
        assert_eq!(distinct_vertex_count(&square()), 4);
        assert_eq!(distinct_vertex_count(&[]), 0);
        assert_eq!(distinct_vertex_count(&[GeoPoint::new(1.0, 1.0)]), 1);
    }
}
