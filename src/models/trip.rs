//! Modelo de Trip y codec de segmentos
//!
//! Un viaje es una salida física de un vehículo. Su campo `trip_data`
//! almacena un arreglo jsonb ordenado de segmentos: tramos vendibles que
//! comparten vehículo y chofer pero tienen origen, destino, horario,
//! precio e inventario de asientos propios. El primer segmento marca la
//! salida nominal del viaje y exactamente uno lleva `isMainTrip`.
//!
//! Los viajes legacy (una fila por segmento, enlazadas por
//! `parent_trip_id`) no llevan `trip_data`; solo el propagador de
//! disponibilidad los entiende.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Visibilidad del viaje - mapea al ENUM trip_visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "trip_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripVisibility {
    Draft,
    Published,
    Archived,
}

/// El `trip_data` de un viaje no se pudo interpretar como arreglo de segmentos
#[derive(Debug, Error, PartialEq, Eq)]
#[error("los datos de segmentos del viaje no tienen un formato válido")]
pub struct MalformedSegmentData;

/// Tramo vendible de un viaje - elemento del arreglo `trip_data`
///
/// La forma serializada es exactamente la que persisten y consumen los
/// clientes: claves camelCase, fecha ISO y precio numérico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    pub price: f64,
    pub available_seats: i32,
    /// Identificador de negocio del segmento (`"<tripId>_<índice>"`)
    #[serde(default)]
    pub trip_id: String,
    #[serde(default)]
    pub is_main_trip: bool,
}

/// Trip - mapea exactamente a la tabla trips
///
/// Las columnas origin/destination/departure_date/available_seats solo
/// tienen valor en filas legacy de una-fila-por-segmento.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub route_id: Option<Uuid>,
    pub company_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub visibility: TripVisibility,
    pub trip_data: Option<JsonValue>,
    pub parent_trip_id: Option<i64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub available_seats: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Componer el identificador de negocio de un segmento
pub fn compose_business_id(trip_id: i64, index: usize) -> String {
    format!("{}_{}", trip_id, index)
}

/// Extraer el índice de segmento de un identificador de negocio.
/// Devuelve None para identificadores sin sufijo numérico.
pub fn parse_segment_index(business_trip_id: &str) -> Option<usize> {
    let (_, suffix) = business_trip_id.rsplit_once('_')?;
    suffix.parse().ok()
}

/// Interpretar un valor jsonb como arreglo de segmentos.
/// Acepta el arreglo directo o un string con el arreglo codificado en JSON;
/// un arreglo vacío es válido (viaje sin tramos vendibles).
pub fn parse_segments_value(data: &JsonValue) -> Result<Vec<Segment>, MalformedSegmentData> {
    match data {
        JsonValue::Array(_) => {
            serde_json::from_value(data.clone()).map_err(|_| MalformedSegmentData)
        }
        JsonValue::String(encoded) => {
            serde_json::from_str(encoded).map_err(|_| MalformedSegmentData)
        }
        _ => Err(MalformedSegmentData),
    }
}

/// Serializar segmentos de vuelta a jsonb; inverso de `parse_segments_value`
pub fn serialize_segments(segments: &[Segment]) -> JsonValue {
    serde_json::to_value(segments).expect("un segmento siempre serializa a JSON")
}

impl Trip {
    /// Segmentos del viaje, o `MalformedSegmentData` si `trip_data`
    /// está ausente o no tiene forma de arreglo
    pub fn parse_segments(&self) -> Result<Vec<Segment>, MalformedSegmentData> {
        let data = self.trip_data.as_ref().ok_or(MalformedSegmentData)?;
        parse_segments_value(data)
    }

    /// Resolver un identificador de negocio al segmento concreto.
    ///
    /// Identificadores malformados o con índice fuera de rango devuelven
    /// None: pueden llegar de cachés de clientes desactualizadas y no son
    /// un error duro.
    pub fn resolve_segment(&self, business_trip_id: &str) -> Option<(Segment, usize)> {
        let index = parse_segment_index(business_trip_id)?;
        let segments = self.parse_segments().ok()?;
        let segment = segments.into_iter().nth(index)?;
        Some((segment, index))
    }

    /// Fila legacy de una-fila-por-segmento (sin arreglo embebido)
    pub fn is_legacy(&self) -> bool {
        self.trip_data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(origin: &str, destination: &str, seats: i32) -> Segment {
        Segment {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 5, 28).unwrap(),
            departure_time: "08:00".to_string(),
            arrival_time: "12:00".to_string(),
            price: 100.0,
            available_seats: seats,
            trip_id: String::new(),
            is_main_trip: false,
        }
    }

    fn trip_with_segments(id: i64, segments: Vec<Segment>) -> Trip {
        Trip {
            id,
            route_id: Some(Uuid::new_v4()),
            company_id: Uuid::new_v4(),
            vehicle_id: None,
            driver_id: None,
            visibility: TripVisibility::Published,
            trip_data: Some(serialize_segments(&segments)),
            parent_trip_id: None,
            origin: None,
            destination: None,
            departure_date: None,
            available_seats: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_segments_round_trip() {
        let mut first = segment("CityA", "CityB", 10);
        first.is_main_trip = true;
        first.trip_id = "42_0".to_string();
        let second = segment("CityB", "CityC", 8);

        let original = vec![first, second];
        let parsed = parse_segments_value(&serialize_segments(&original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_accepts_json_encoded_string() {
        let segments = vec![segment("CityA", "CityB", 10)];
        let encoded = serde_json::to_string(&segments).unwrap();
        let trip = Trip {
            trip_data: Some(JsonValue::String(encoded)),
            ..trip_with_segments(1, vec![])
        };
        assert_eq!(trip.parse_segments().unwrap(), segments);
    }

    #[test]
    fn test_parse_rejects_non_array_shapes() {
        assert_eq!(
            parse_segments_value(&json!({"origin": "CityA"})),
            Err(MalformedSegmentData)
        );
        assert_eq!(parse_segments_value(&json!(42)), Err(MalformedSegmentData));
        assert_eq!(
            parse_segments_value(&JsonValue::String("no es json".to_string())),
            Err(MalformedSegmentData)
        );
    }

    #[test]
    fn test_parse_accepts_empty_array() {
        let trip = trip_with_segments(7, vec![]);
        assert_eq!(trip.parse_segments().unwrap(), vec![]);
    }

    #[test]
    fn test_business_id_bijection() {
        let segments = vec![
            segment("CityA", "CityB", 10),
            segment("CityB", "CityC", 8),
            segment("CityC", "CityD", 5),
        ];
        let trip = trip_with_segments(42, segments.clone());

        for (index, expected) in segments.iter().enumerate() {
            let business_id = compose_business_id(trip.id, index);
            let (resolved, resolved_index) = trip.resolve_segment(&business_id).unwrap();
            assert_eq!(resolved_index, index);
            assert_eq!(&resolved, expected);
        }
    }

    #[test]
    fn test_resolve_out_of_range_is_none() {
        let trip = trip_with_segments(42, vec![segment("CityA", "CityB", 10)]);
        assert!(trip.resolve_segment("42_5").is_none());
    }

    #[test]
    fn test_resolve_malformed_id_is_none() {
        let trip = trip_with_segments(42, vec![segment("CityA", "CityB", 10)]);
        assert!(trip.resolve_segment("42").is_none());
        assert!(trip.resolve_segment("42_x").is_none());
        assert!(trip.resolve_segment("").is_none());
    }
}
