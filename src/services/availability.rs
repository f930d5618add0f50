//! Propagación de disponibilidad de asientos
//!
//! Cada mutación de reserva (alta, cancelación, cambio de asientos) pasa
//! por aquí. Conviven dos representaciones de viaje:
//!
//! - arreglo embebido `trip_data`: el delta se aplica solo al segmento que
//!   la reserva referencia, bajo `SELECT ... FOR UPDATE` para que el
//!   read-modify-write no pierda actualizaciones concurrentes;
//! - filas legacy de una-fila-por-segmento: el padre y todos los hermanos
//!   que comparten `parent_trip_id` se mueven juntos con un único UPDATE
//!   atómico con condición OR.
//!
//! Un viaje inexistente es un no-op registrado en logs, nunca un error:
//! la transición de la reserva que ya ocurrió no se revierte por esto.

use sqlx::PgPool;
use tracing::warn;

use crate::models::trip::{parse_segment_index, serialize_segments, Segment, Trip};
use crate::utils::errors::{AppError, AppResult};

/// Aplicar un delta de asientos al segmento indicado.
///
/// Un delta negativo que dejaría el inventario bajo cero se rechaza con
/// conflicto; la cancelación (delta positivo) nunca falla por esta vía.
pub fn apply_segment_delta(segments: &mut [Segment], index: usize, delta: i32) -> AppResult<()> {
    let segment = segments
        .get_mut(index)
        .ok_or_else(|| AppError::NotFound(format!("segmento {} fuera de rango", index)))?;

    let updated = segment.available_seats + delta;
    if updated < 0 {
        return Err(AppError::Conflict(
            "Asientos insuficientes en el segmento".to_string(),
        ));
    }

    segment.available_seats = updated;
    Ok(())
}

/// Propagar un delta de asientos al viaje y sus segmentos.
///
/// `seat_delta` es negativo para una reserva nueva y positivo para una
/// cancelación. `business_trip_id` identifica el segmento afectado en la
/// representación embebida; la representación legacy lo ignora porque la
/// familia completa comparte un solo inventario.
pub async fn adjust_availability(
    pool: &PgPool,
    trip_id: i64,
    business_trip_id: &str,
    seat_delta: i32,
) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE")
        .bind(trip_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(trip) = trip else {
        warn!(
            trip_id,
            "propagación de disponibilidad omitida: viaje inexistente"
        );
        return Ok(());
    };

    if trip.is_legacy() {
        let parent_id = trip.parent_trip_id.unwrap_or(trip.id);
        sqlx::query(
            "UPDATE trips SET available_seats = COALESCE(available_seats, 0) + $1 \
             WHERE id = $2 OR parent_trip_id = $2",
        )
        .bind(seat_delta)
        .bind(parent_id)
        .execute(&mut *tx)
        .await?;
    } else {
        let mut segments = match trip.parse_segments() {
            Ok(segments) => segments,
            Err(e) => {
                warn!(trip_id, "propagación de disponibilidad omitida: {}", e);
                return Ok(());
            }
        };

        let index = parse_segment_index(business_trip_id).filter(|i| *i < segments.len());
        let Some(index) = index else {
            warn!(
                trip_id,
                business_trip_id, "propagación de disponibilidad omitida: segmento irresoluble"
            );
            return Ok(());
        };

        apply_segment_delta(&mut segments, index, seat_delta)?;

        sqlx::query("UPDATE trips SET trip_data = $1 WHERE id = $2")
            .bind(serialize_segments(&segments))
            .bind(trip.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<Segment> {
        vec![
            Segment {
                origin: "CityA".to_string(),
                destination: "CityB".to_string(),
                departure_date: "2025-05-28".parse().unwrap(),
                departure_time: "08:00".to_string(),
                arrival_time: "10:00".to_string(),
                price: 100.0,
                available_seats: 10,
                trip_id: "42_0".to_string(),
                is_main_trip: true,
            },
            Segment {
                origin: "CityB".to_string(),
                destination: "CityC".to_string(),
                departure_date: "2025-05-28".parse().unwrap(),
                departure_time: "10:15".to_string(),
                arrival_time: "12:00".to_string(),
                price: 80.0,
                available_seats: 5,
                trip_id: "42_1".to_string(),
                is_main_trip: false,
            },
        ]
    }

    #[test]
    fn test_availability_conservation() {
        let mut data = segments();
        let original = data[1].available_seats;

        apply_segment_delta(&mut data, 1, -3).unwrap();
        assert_eq!(data[1].available_seats, original - 3);

        apply_segment_delta(&mut data, 1, 3).unwrap();
        assert_eq!(data[1].available_seats, original);
    }

    #[test]
    fn test_delta_only_touches_target_segment() {
        let mut data = segments();
        apply_segment_delta(&mut data, 1, -2).unwrap();
        assert_eq!(data[0].available_seats, 10);
        assert_eq!(data[1].available_seats, 3);
    }

    #[test]
    fn test_negative_inventory_rejected() {
        let mut data = segments();
        let result = apply_segment_delta(&mut data, 1, -6);
        assert!(matches!(result, Err(AppError::Conflict(_))));
        // el inventario queda intacto tras el rechazo
        assert_eq!(data[1].available_seats, 5);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut data = segments();
        let result = apply_segment_delta(&mut data, 9, -1);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
