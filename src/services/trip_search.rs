//! Motor de expansión y búsqueda de viajes
//!
//! Un viaje físico almacena varios tramos vendibles; según la intención
//! del consumidor la búsqueda los expande (una fila por segmento que pasa
//! los filtros, para pantallas de búsqueda) o los colapsa (una fila
//! representativa por viaje, para listados). Los mapas id→registro llegan
//! pre-construidos una vez por request: el costo total queda en
//! O(viajes + rutas + vehículos + choferes), nunca O(viajes × lookups).

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::dto::trip_dto::TripSearchFilters;
use crate::models::company::Company;
use crate::models::route::Route;
use crate::models::trip::{compose_business_id, Segment, Trip, TripVisibility};
use crate::models::user::{User, UserRole};
use crate::models::vehicle::Vehicle;

/// Resumen de ruta embebido en los resultados
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteView {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub stops: Vec<String>,
}

/// Identidad pública de la empresa, resuelta del usuario dueño
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

/// Resumen del vehículo asignado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    pub id: Uuid,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: i32,
}

/// Resumen del chofer asignado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverView {
    pub id: Uuid,
    pub full_name: String,
}

/// Mapas id→registro construidos una vez por request
#[derive(Debug, Default)]
pub struct SearchLookups {
    pub routes: HashMap<Uuid, RouteView>,
    pub companies: HashMap<Uuid, CompanyView>,
    pub vehicles: HashMap<Uuid, VehicleView>,
    pub drivers: HashMap<Uuid, DriverView>,
}

impl SearchLookups {
    /// Construir los mapas a partir de los registros crudos.
    ///
    /// La identidad pública de cada empresa sale del registro del usuario
    /// dueño; la fila de companies queda como respaldo cuando no hay dueño.
    pub fn build(
        routes: Vec<Route>,
        companies: Vec<Company>,
        vehicles: Vec<Vehicle>,
        users: Vec<User>,
    ) -> Self {
        let mut lookups = SearchLookups::default();

        for route in routes {
            lookups.routes.insert(
                route.id,
                RouteView {
                    id: route.id,
                    origin: route.origin,
                    destination: route.destination,
                    stops: route.stops.0,
                },
            );
        }

        for company in companies {
            lookups.companies.insert(
                company.id,
                CompanyView {
                    id: company.id,
                    name: company.name,
                    logo_url: company.logo_url,
                },
            );
        }

        for user in users {
            match user.role {
                UserRole::Owner => {
                    if let Some(view) = lookups.companies.get_mut(&user.company_id) {
                        view.name = user.full_name;
                        if user.logo_url.is_some() {
                            view.logo_url = user.logo_url;
                        }
                    } else {
                        lookups.companies.insert(
                            user.company_id,
                            CompanyView {
                                id: user.company_id,
                                name: user.full_name,
                                logo_url: user.logo_url,
                            },
                        );
                    }
                }
                UserRole::Driver => {
                    lookups.drivers.insert(
                        user.id,
                        DriverView {
                            id: user.id,
                            full_name: user.full_name,
                        },
                    );
                }
                _ => {}
            }
        }

        for vehicle in vehicles {
            lookups.vehicles.insert(
                vehicle.id,
                VehicleView {
                    id: vehicle.id,
                    license_plate: vehicle.license_plate,
                    brand: vehicle.brand,
                    model: vehicle.model,
                    capacity: vehicle.capacity,
                },
            );
        }

        lookups
    }
}

/// Vista de viaje que produce la búsqueda
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    /// Identificador de negocio: `"<id>_<índice>"` en modo expandido,
    /// el id del viaje en modo optimizado
    pub id: String,
    pub record_id: i64,
    pub segment_index: usize,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: f64,
    pub available_seats: i32,
    pub is_main_trip: bool,
    pub visibility: TripVisibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverView>,
}

/// Buscar sobre los viajes candidatos aplicando los filtros por segmento
/// (modo expandido) o por viaje (modo optimizado)
pub fn search_trips(
    trips: &[Trip],
    lookups: &SearchLookups,
    filters: &TripSearchFilters,
) -> Vec<TripView> {
    let mut views = Vec::new();

    for trip in trips {
        if !trip_level_match(trip, filters) {
            continue;
        }

        let segments = match trip.parse_segments() {
            Ok(segments) => segments,
            Err(e) => {
                // un viaje con datos corruptos no puede abortar el lote
                warn!(trip_id = trip.id, "viaje omitido de la búsqueda: {}", e);
                continue;
            }
        };

        if segments.is_empty() {
            continue; // sin tramos vendibles
        }

        if filters.optimized_response {
            if !segments.iter().any(|s| date_matches(s, filters)) {
                continue;
            }
            views.push(build_view(
                trip,
                &segments[0],
                0,
                trip.id.to_string(),
                lookups,
            ));
        } else {
            for (index, segment) in segments.iter().enumerate() {
                if segment_matches(segment, filters) {
                    views.push(build_view(
                        trip,
                        segment,
                        index,
                        compose_business_id(trip.id, index),
                        lookups,
                    ));
                }
            }
        }
    }

    views
}

/// Filtros que se deciden a nivel de viaje en ambos modos
fn trip_level_match(trip: &Trip, filters: &TripSearchFilters) -> bool {
    if !filters.include_all_visibilities {
        let wanted = filters.visibility.unwrap_or(TripVisibility::Published);
        if trip.visibility != wanted {
            return false;
        }
    }

    if let Some(company_id) = filters.company_id {
        if trip.company_id != company_id {
            return false;
        }
    }

    if let Some(company_ids) = &filters.company_ids {
        if !company_ids.contains(&trip.company_id) {
            return false;
        }
    }

    if let Some(driver_id) = filters.driver_id {
        if trip.driver_id != Some(driver_id) {
            return false;
        }
    }

    true
}

fn place_matches(value: &str, filter: Option<&String>) -> bool {
    match filter {
        Some(wanted) if !wanted.trim().is_empty() => value
            .to_lowercase()
            .contains(&wanted.trim().to_lowercase()),
        _ => true,
    }
}

/// Comparación a granularidad de día calendario, sin corrimientos de zona
fn date_matches(segment: &Segment, filters: &TripSearchFilters) -> bool {
    if let Some(date) = filters.date {
        if segment.departure_date != date {
            return false;
        }
    }

    if let Some(range) = &filters.date_range {
        if let (Some(from), Some(to)) = (range.first(), range.last()) {
            if segment.departure_date < *from || segment.departure_date > *to {
                return false;
            }
        }
    }

    true
}

/// Conjunción de todos los filtros por segmento del modo expandido
fn segment_matches(segment: &Segment, filters: &TripSearchFilters) -> bool {
    place_matches(&segment.origin, filters.origin.as_ref())
        && place_matches(&segment.destination, filters.destination.as_ref())
        && date_matches(segment, filters)
        && filters
            .seats
            .map_or(true, |seats| segment.available_seats >= seats)
}

fn build_view(
    trip: &Trip,
    segment: &Segment,
    index: usize,
    id: String,
    lookups: &SearchLookups,
) -> TripView {
    TripView {
        id,
        record_id: trip.id,
        segment_index: index,
        origin: segment.origin.clone(),
        destination: segment.destination.clone(),
        departure_date: segment.departure_date,
        departure_time: segment.departure_time.clone(),
        arrival_time: segment.arrival_time.clone(),
        price: segment.price,
        available_seats: segment.available_seats,
        is_main_trip: segment.is_main_trip,
        visibility: trip.visibility,
        route: trip
            .route_id
            .and_then(|id| lookups.routes.get(&id))
            .cloned(),
        company: lookups.companies.get(&trip.company_id).cloned(),
        vehicle: trip
            .vehicle_id
            .and_then(|id| lookups.vehicles.get(&id))
            .cloned(),
        driver: trip
            .driver_id
            .and_then(|id| lookups.drivers.get(&id))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::serialize_segments;
    use chrono::Utc;
    use serde_json::json;

    fn segment(origin: &str, destination: &str, date: &str, seats: i32, price: f64) -> Segment {
        Segment {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: date.parse().unwrap(),
            departure_time: "08:00".to_string(),
            arrival_time: "12:00".to_string(),
            price,
            available_seats: seats,
            trip_id: String::new(),
            is_main_trip: false,
        }
    }

    fn trip(id: i64, segments: Vec<Segment>) -> Trip {
        Trip {
            id,
            route_id: None,
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

    fn example_trip_42() -> Trip {
        let mut first = segment("CityA", "CityB", "2025-05-28", 10, 100.0);
        first.is_main_trip = true;
        first.trip_id = "42_0".to_string();
        let mut second = segment("CityB", "CityC", "2025-05-28", 10, 80.0);
        second.trip_id = "42_1".to_string();
        trip(42, vec![first, second])
    }

    fn expanded() -> TripSearchFilters {
        TripSearchFilters::default()
    }

    fn optimized() -> TripSearchFilters {
        TripSearchFilters {
            optimized_response: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_expansion_cardinality() {
        let segments = vec![
            segment("CityA", "CityB", "2025-05-28", 10, 100.0),
            segment("CityB", "CityC", "2025-05-28", 10, 80.0),
            segment("CityC", "CityD", "2025-05-28", 10, 60.0),
        ];
        let trips = vec![trip(1, segments)];
        let lookups = SearchLookups::default();

        assert_eq!(search_trips(&trips, &lookups, &expanded()).len(), 3);
        assert_eq!(search_trips(&trips, &lookups, &optimized()).len(), 1);
    }

    #[test]
    fn test_expanded_search_matches_specific_leg() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();
        let filters = TripSearchFilters {
            origin: Some("CityB".to_string()),
            destination: Some("CityC".to_string()),
            date: Some("2025-05-28".parse().unwrap()),
            ..Default::default()
        };

        let views = search_trips(&trips, &lookups, &filters);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, "42_1");
        assert_eq!(views[0].price, 80.0);
        assert!(!views[0].is_main_trip);
    }

    #[test]
    fn test_optimized_uses_first_segment_as_representative() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();

        let views = search_trips(&trips, &lookups, &optimized());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, "42");
        assert_eq!(views[0].price, 100.0);
        assert_eq!(views[0].origin, "CityA");
    }

    #[test]
    fn test_filter_conjunction() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();

        // cada filtro satisfecho de forma independiente: pasa
        let passing = TripSearchFilters {
            origin: Some("cityb".to_string()),
            destination: Some("CityC".to_string()),
            date: Some("2025-05-28".parse().unwrap()),
            seats: Some(10),
            ..Default::default()
        };
        assert_eq!(search_trips(&trips, &lookups, &passing).len(), 1);

        // un solo filtro que falla elimina el segmento
        let failing_seats = TripSearchFilters {
            seats: Some(11),
            ..passing.clone()
        };
        assert!(search_trips(&trips, &lookups, &failing_seats).is_empty());

        let failing_date = TripSearchFilters {
            date: Some("2025-05-29".parse().unwrap()),
            ..passing.clone()
        };
        assert!(search_trips(&trips, &lookups, &failing_date).is_empty());

        let failing_origin = TripSearchFilters {
            origin: Some("CityZ".to_string()),
            ..passing
        };
        assert!(search_trips(&trips, &lookups, &failing_origin).is_empty());
    }

    #[test]
    fn test_origin_filter_is_case_insensitive_substring() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();
        let filters = TripSearchFilters {
            origin: Some("ityb".to_string()),
            ..Default::default()
        };

        let views = search_trips(&trips, &lookups, &filters);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].origin, "CityB");
    }

    #[test]
    fn test_empty_filter_strings_match_everything() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();
        let filters = TripSearchFilters {
            origin: Some("  ".to_string()),
            destination: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(search_trips(&trips, &lookups, &filters).len(), 2);
    }

    #[test]
    fn test_date_range_inclusive() {
        let trips = vec![example_trip_42()];
        let lookups = SearchLookups::default();

        let inside = TripSearchFilters {
            date_range: Some(vec![
                "2025-05-27".parse().unwrap(),
                "2025-05-29".parse().unwrap(),
            ]),
            ..Default::default()
        };
        assert_eq!(search_trips(&trips, &lookups, &inside).len(), 2);

        let outside = TripSearchFilters {
            date_range: Some(vec![
                "2025-06-01".parse().unwrap(),
                "2025-06-05".parse().unwrap(),
            ]),
            ..Default::default()
        };
        assert!(search_trips(&trips, &lookups, &outside).is_empty());
    }

    #[test]
    fn test_malformed_trip_data_is_skipped_not_fatal() {
        let mut broken = example_trip_42();
        broken.id = 7;
        broken.trip_data = Some(json!({"no": "es un arreglo"}));

        let trips = vec![broken, example_trip_42()];
        let lookups = SearchLookups::default();

        let views = search_trips(&trips, &lookups, &expanded());
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.record_id == 42));
    }

    #[test]
    fn test_default_visibility_is_published_only() {
        let mut draft = example_trip_42();
        draft.id = 8;
        draft.visibility = TripVisibility::Draft;

        let trips = vec![draft, example_trip_42()];
        let lookups = SearchLookups::default();

        let views = search_trips(&trips, &lookups, &expanded());
        assert!(views.iter().all(|v| v.record_id == 42));

        let all = TripSearchFilters {
            include_all_visibilities: true,
            ..Default::default()
        };
        assert_eq!(search_trips(&trips, &lookups, &all).len(), 4);
    }

    #[test]
    fn test_company_membership_filter() {
        let company_a = Uuid::new_v4();
        let company_b = Uuid::new_v4();
        let mut first = example_trip_42();
        first.company_id = company_a;
        let mut second = example_trip_42();
        second.id = 43;
        second.company_id = company_b;

        let trips = vec![first, second];
        let lookups = SearchLookups::default();

        let by_membership = TripSearchFilters {
            company_ids: Some(vec![company_b]),
            ..Default::default()
        };
        let views = search_trips(&trips, &lookups, &by_membership);
        assert!(!views.is_empty());
        assert!(views.iter().all(|v| v.record_id == 43));
    }

    #[test]
    fn test_lookup_misses_resolve_to_absent_fields() {
        let mut with_refs = example_trip_42();
        with_refs.route_id = Some(Uuid::new_v4());
        with_refs.vehicle_id = Some(Uuid::new_v4());
        with_refs.driver_id = Some(Uuid::new_v4());

        let views = search_trips(&[with_refs], &SearchLookups::default(), &optimized());
        assert_eq!(views.len(), 1);
        assert!(views[0].route.is_none());
        assert!(views[0].company.is_none());
        assert!(views[0].vehicle.is_none());
        assert!(views[0].driver.is_none());
    }

    #[test]
    fn test_company_identity_comes_from_owner_user() {
        let company_id = Uuid::new_v4();
        let companies = vec![Company {
            id: company_id,
            name: "Transportes del Sur SA".to_string(),
            logo_url: None,
            created_at: Utc::now(),
        }];
        let users = vec![User {
            id: Uuid::new_v4(),
            company_id,
            full_name: "Transportes del Sur".to_string(),
            email: None,
            role: UserRole::Owner,
            logo_url: Some("https://cdn.example/logo.png".to_string()),
            created_at: Utc::now(),
        }];

        let lookups = SearchLookups::build(vec![], companies, vec![], users);
        let view = lookups.companies.get(&company_id).unwrap();
        assert_eq!(view.name, "Transportes del Sur");
        assert_eq!(view.logo_url.as_deref(), Some("https://cdn.example/logo.png"));

        let mut trip = example_trip_42();
        trip.company_id = company_id;
        let views = search_trips(&[trip], &lookups, &optimized());
        assert_eq!(views[0].company.as_ref().unwrap().name, "Transportes del Sur");
    }
}
