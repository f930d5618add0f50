//! DTOs de rutas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::route::Route;

/// Request para crear una ruta
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    #[validate(length(min = 2, max = 120))]
    pub origin: String,

    #[validate(length(min = 2, max = 120))]
    pub destination: String,

    /// Paradas intermedias en orden de recorrido
    #[serde(default)]
    pub stops: Vec<String>,
}

/// Response de ruta para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub stops: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            company_id: route.company_id,
            origin: route.origin,
            destination: route.destination,
            stops: route.stops.0,
            created_at: route.created_at,
        }
    }
}

/// Un par origen→destino tarificable de una ruta
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPair {
    pub origin: String,
    pub destination: String,
}

/// Response con todas las combinaciones tarificables de la ruta
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPairsResponse {
    pub route_id: Uuid,
    pub pairs: Vec<SegmentPair>,
}
