//! DTOs de viajes
//!
//! Requests del surface de viajes. Los filtros de búsqueda llegan con las
//! claves camelCase que los clientes ya consumen.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::{Segment, TripVisibility};

/// Filtros de búsqueda consumidos por el motor de expansión
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripSearchFilters {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    /// Rango inclusivo de días `[desde, hasta]`
    pub date_range: Option<Vec<NaiveDate>>,
    pub seats: Option<i32>,
    pub company_id: Option<Uuid>,
    pub company_ids: Option<Vec<Uuid>>,
    pub driver_id: Option<Uuid>,
    pub visibility: Option<TripVisibility>,
    pub include_all_visibilities: bool,
    /// true: una fila representativa por viaje; false: una fila por segmento
    pub optimized_response: bool,
}

/// Request para publicar un viaje
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub route_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub visibility: Option<TripVisibility>,
    /// Segmentos del viaje en orden de recorrido; nunca vacío
    #[validate(length(min = 1, message = "el viaje necesita al menos un segmento"))]
    pub segments: Vec<Segment>,
}

/// Request para cambiar la visibilidad de un viaje
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisibilityRequest {
    pub visibility: TripVisibility,
}
