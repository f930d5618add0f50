//! Agregación de reservas para listas de abordaje
//!
//! Las pantallas de abordaje y verificación agrupan cada reserva con su
//! tramo efectivo de viaje. Una reserva nunca se descarta en silencio:
//! con viaje ausente o datos malformados se emite un grupo degradado,
//! porque ocultarla escondería ingresos y pasajeros reales de las vistas
//! operativas.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::dto::reservation_dto::PassengerName;
use crate::models::reservation::{Passenger, Reservation, ReservationStatus};
use crate::models::route::Route;
use crate::models::trip::Trip;

/// Vista agregada de una reserva para las pantallas de abordaje
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedReservation {
    pub reservation_id: Uuid,
    /// Etiqueta del tramo, p.ej. `"CityB → CityC"`, o el marcador
    /// `"Viaje Relacionado #<tripId>"` cuando el viaje no se pudo resolver
    pub label: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub record_id: Option<i64>,
    pub business_trip_id: Option<String>,
    pub seats: i32,
    pub passenger_count: usize,
    pub passengers: Vec<PassengerName>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: Decimal,
    pub advance: Decimal,
    pub status: ReservationStatus,
    pub checked: bool,
}

/// Agrupar reservas por su tramo efectivo de viaje.
///
/// Devuelve exactamente un grupo por reserva recibida, con las no
/// verificadas primero (partición estable, no un reordenamiento total).
pub fn group_reservations(
    reservations: &[Reservation],
    trips_by_id: &HashMap<i64, Trip>,
    routes_by_id: &HashMap<Uuid, Route>,
    passengers_by_reservation: &HashMap<Uuid, Vec<Passenger>>,
) -> Vec<GroupedReservation> {
    let groups: Vec<GroupedReservation> = reservations
        .iter()
        .map(|reservation| {
            group_one(
                reservation,
                trips_by_id,
                routes_by_id,
                passengers_by_reservation,
            )
        })
        .collect();

    let (unchecked, checked): (Vec<_>, Vec<_>) =
        groups.into_iter().partition(|group| !group.checked);
    unchecked.into_iter().chain(checked).collect()
}

fn group_one(
    reservation: &Reservation,
    trips_by_id: &HashMap<i64, Trip>,
    routes_by_id: &HashMap<Uuid, Route>,
    passengers_by_reservation: &HashMap<Uuid, Vec<Passenger>>,
) -> GroupedReservation {
    let details = reservation.details();

    // el tripId crudo sirve para el marcador aunque el blob completo no parsee
    let business_trip_id = details
        .as_ref()
        .map(|d| d.trip_id.clone())
        .or_else(|| {
            reservation
                .trip_details
                .get("tripId")
                .and_then(|v| v.as_str())
                .map(String::from)
        });
    let record_id = details.as_ref().map(|d| d.record_id);
    let seats = details.as_ref().map(|d| d.seats).unwrap_or(0);

    let resolved = details.as_ref().and_then(|d| {
        let trip = trips_by_id.get(&d.record_id)?;
        let (segment, _) = trip.resolve_segment(&d.trip_id)?;
        Some((trip, segment))
    });

    let (label, origin, destination) = match resolved {
        Some((trip, segment)) => {
            // el tramo principal se etiqueta con la ruta completa;
            // los sub-tramos con su propio origen y destino
            let (origin, destination) = if segment.is_main_trip {
                trip.route_id
                    .and_then(|id| routes_by_id.get(&id))
                    .map(|route| (route.origin.clone(), route.destination.clone()))
                    .unwrap_or((segment.origin.clone(), segment.destination.clone()))
            } else {
                (segment.origin.clone(), segment.destination.clone())
            };
            (
                format!("{} → {}", origin, destination),
                Some(origin),
                Some(destination),
            )
        }
        None => (
            related_trip_placeholder(business_trip_id.as_deref(), record_id),
            None,
            None,
        ),
    };

    let passengers: Vec<PassengerName> = passengers_by_reservation
        .get(&reservation.id)
        .map(|rows| {
            rows.iter()
                .map(|p| PassengerName {
                    first_name: p.first_name.clone(),
                    last_name: p.last_name.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    GroupedReservation {
        reservation_id: reservation.id,
        label,
        origin,
        destination,
        record_id,
        business_trip_id,
        seats,
        passenger_count: passengers.len(),
        passengers,
        contact_name: reservation.contact_name.clone(),
        contact_phone: reservation.contact_phone.clone(),
        amount: reservation.amount,
        advance: reservation.advance,
        status: reservation.status,
        checked: reservation.is_checked(),
    }
}

fn related_trip_placeholder(business_trip_id: Option<&str>, record_id: Option<i64>) -> String {
    match (business_trip_id, record_id) {
        (Some(id), _) => format!("Viaje Relacionado #{}", id),
        (None, Some(record_id)) => format!("Viaje Relacionado #{}", record_id),
        (None, None) => "Viaje Relacionado".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{serialize_segments, Segment, TripVisibility};
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;

    fn example_trip_42() -> Trip {
        let segments = vec![
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
                available_seats: 10,
                trip_id: "42_1".to_string(),
                is_main_trip: false,
            },
        ];
        Trip {
            id: 42,
            route_id: Some(Uuid::nil()),
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

    fn route_for_trip_42() -> Route {
        Route {
            id: Uuid::nil(),
            company_id: Uuid::new_v4(),
            origin: "CityA".to_string(),
            destination: "CityC".to_string(),
            stops: Json(vec!["CityB".to_string()]),
            created_at: Utc::now(),
        }
    }

    fn reservation(record_id: i64, trip_id: &str, seats: i32) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            trip_details: json!({"recordId": record_id, "tripId": trip_id, "seats": seats}),
            contact_name: Some("Ana Pérez".to_string()),
            contact_phone: None,
            amount: Decimal::new(160, 0),
            advance: Decimal::ZERO,
            payment_method: Some("cash".to_string()),
            status: ReservationStatus::Confirmed,
            checked: false,
            check_count: 0,
            checked_by: None,
            checked_at: None,
            created_at: Utc::now(),
        }
    }

    fn maps() -> (HashMap<i64, Trip>, HashMap<Uuid, Route>) {
        let trip = example_trip_42();
        let route = route_for_trip_42();
        (
            HashMap::from([(trip.id, trip)]),
            HashMap::from([(route.id, route)]),
        )
    }

    #[test]
    fn test_sub_leg_labeled_with_segment_endpoints() {
        let (trips, routes) = maps();
        let reservation = reservation(42, "42_1", 2);
        let passengers = HashMap::from([(
            reservation.id,
            vec![
                Passenger {
                    id: Uuid::new_v4(),
                    reservation_id: reservation.id,
                    first_name: "Ana".to_string(),
                    last_name: "Pérez".to_string(),
                },
                Passenger {
                    id: Uuid::new_v4(),
                    reservation_id: reservation.id,
                    first_name: "Luis".to_string(),
                    last_name: "Pérez".to_string(),
                },
            ],
        )]);

        let groups = group_reservations(&[reservation], &trips, &routes, &passengers);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "CityB → CityC");
        assert_eq!(groups[0].origin.as_deref(), Some("CityB"));
        assert_eq!(groups[0].destination.as_deref(), Some("CityC"));
        assert_eq!(groups[0].passenger_count, 2);
        assert_eq!(groups[0].seats, 2);
    }

    #[test]
    fn test_main_leg_labeled_with_route_endpoints() {
        let (trips, routes) = maps();
        let reservation = reservation(42, "42_0", 1);

        let groups = group_reservations(&[reservation], &trips, &routes, &HashMap::new());
        assert_eq!(groups[0].label, "CityA → CityC");
    }

    #[test]
    fn test_missing_trip_emits_degraded_group() {
        let reservation = reservation(99, "99_0", 3);
        let id = reservation.id;

        let groups =
            group_reservations(&[reservation], &HashMap::new(), &HashMap::new(), &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].reservation_id, id);
        assert_eq!(groups[0].label, "Viaje Relacionado #99_0");
        assert_eq!(groups[0].seats, 3);
    }

    #[test]
    fn test_stale_segment_index_emits_degraded_group() {
        let (trips, routes) = maps();
        let reservation = reservation(42, "42_9", 1);

        let groups = group_reservations(&[reservation], &trips, &routes, &HashMap::new());
        assert_eq!(groups[0].label, "Viaje Relacionado #42_9");
    }

    #[test]
    fn test_malformed_details_still_emits_group() {
        let mut reservation = reservation(42, "42_0", 1);
        reservation.trip_details = json!({"tripId": "42_0"});

        let groups =
            group_reservations(&[reservation], &HashMap::new(), &HashMap::new(), &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Viaje Relacionado #42_0");
        assert_eq!(groups[0].seats, 0);
    }

    #[test]
    fn test_no_reservation_is_ever_dropped() {
        let (trips, routes) = maps();
        let reservations = vec![
            reservation(42, "42_0", 1),
            reservation(99, "99_0", 2),
            {
                let mut r = reservation(42, "42_1", 1);
                r.trip_details = json!(null);
                r
            },
        ];

        let groups = group_reservations(&reservations, &trips, &routes, &HashMap::new());
        assert_eq!(groups.len(), reservations.len());
    }

    #[test]
    fn test_zero_passengers_is_visible_actionable_state() {
        let (trips, routes) = maps();
        let reservation = reservation(42, "42_1", 2);

        let groups = group_reservations(&[reservation], &trips, &routes, &HashMap::new());
        assert_eq!(groups[0].passenger_count, 0);
        assert_eq!(groups[0].seats, 2);
    }

    #[test]
    fn test_unchecked_sort_before_checked_stable() {
        let (trips, routes) = maps();
        let mut first_checked = reservation(42, "42_0", 1);
        first_checked.check_count = 1;
        let second = reservation(42, "42_0", 1);
        let mut third_checked = reservation(42, "42_1", 1);
        third_checked.checked_by = Some("checker-01".to_string());
        let fourth = reservation(42, "42_1", 1);

        let ids = [
            first_checked.id,
            second.id,
            third_checked.id,
            fourth.id,
        ];
        let groups = group_reservations(
            &[first_checked, second, third_checked, fourth],
            &trips,
            &routes,
            &HashMap::new(),
        );

        // no verificadas primero, conservando el orden relativo de entrada
        let order: Vec<Uuid> = groups.iter().map(|g| g.reservation_id).collect();
        assert_eq!(order, vec![ids[1], ids[3], ids[0], ids[2]]);
        assert!(!groups[0].checked && !groups[1].checked);
        assert!(groups[2].checked && groups[3].checked);
    }
}
