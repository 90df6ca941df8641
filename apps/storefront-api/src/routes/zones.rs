use axum::extract::State;
use axum::Json;

use hornada_core::DeliveryZone;

use crate::error::ApiError;
use crate::services::zone::{LocateRequest, LocateResponse};
use crate::services::ZoneService;
use crate::state::AppState;

pub async fn list_zones(State(state): State<AppState>) -> Result<Json<Vec<DeliveryZone>>, ApiError> {
    Ok(Json(ZoneService::new(state).list().await?))
}

/// `{ "lat": -34.6, "lng": -58.38 }` → `{ "zone": {...} | null, "addressLabel": "..." }`
pub async fn locate_zone(
    State(state): State<AppState>,
    Json(request): Json<LocateRequest>,
) -> Result<Json<LocateResponse>, ApiError> {
    Ok(Json(ZoneService::new(state).locate(request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_state, square_zone};

    #[tokio::test]
    async fn test_list_skips_inactive() {
        let state = memory_state().await;
        let mut closed = square_zone("cerrada", 0.0, 5.0, 100, 0);
        closed.active = false;
        state.db.zones().upsert(&closed).await.unwrap();
        state.db.zones().upsert(&square_zone("abierta", 0.0, 5.0, 100, 1)).await.unwrap();

        let Json(zones) = list_zones(State(state.clone())).await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, "abierta");

        let Json(found) = locate_zone(
            State(state),
            Json(LocateRequest { lat: 1.0, lng: 1.0, address: None }),
        )
        .await
        .unwrap();
        assert_eq!(found.zone.unwrap().zone_id, "abierta");
    }
}
