use std::collections::HashMap;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::dto::reservation_dto::{
    CancelReservationRequest, CheckInRequest, CreateReservationRequest, PassengerName,
    ReservationResponse,
};
use crate::models::reservation::{Reservation, ReservationStatus, TripDetails};
use crate::models::route::Route;
use crate::repositories::reservation_repository::ReservationRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::services::availability::adjust_availability;
use crate::services::boarding::{group_reservations, GroupedReservation};
use crate::utils::errors::{AppError, AppResult};

pub struct ReservationController {
    pool: PgPool,
    reservations: ReservationRepository,
    trips: TripRepository,
    routes: RouteRepository,
}

impl ReservationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reservations: ReservationRepository::new(pool.clone()),
            trips: TripRepository::new(pool.clone()),
            routes: RouteRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateReservationRequest,
    ) -> AppResult<ReservationResponse> {
        request.validate()?;

        let CreateReservationRequest {
            record_id,
            trip_id,
            seats,
            passengers,
            contact_name,
            contact_phone,
            amount,
            advance,
            payment_method,
        } = request;

        let trip = self
            .trips
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Viaje no encontrado".to_string()))?;

        let (segment, _) = trip
            .resolve_segment(&trip_id)
            .ok_or_else(|| AppError::NotFound("Segmento de viaje no encontrado".to_string()))?;

        if segment.available_seats < seats {
            return Err(AppError::Conflict(
                "Asientos insuficientes para la reserva".to_string(),
            ));
        }

        // tomar los asientos primero; el propagador revalida el piso bajo
        // bloqueo de fila, esta verificación solo adelanta el error
        adjust_availability(&self.pool, record_id, &trip_id, -seats).await?;

        let details = TripDetails {
            record_id,
            trip_id: trip_id.clone(),
            seats,
        };
        let details_value =
            serde_json::to_value(&details).expect("trip_details siempre serializa a JSON");

        let created = self
            .reservations
            .create(
                company_id,
                details_value,
                contact_name,
                contact_phone,
                amount,
                advance,
                payment_method,
                &passengers,
            )
            .await;

        match created {
            Ok(reservation) => Ok(ReservationResponse::from_model(&reservation, passengers)),
            Err(e) => {
                // la reserva no se persistió: devolver los asientos tomados
                if let Err(revert) =
                    adjust_availability(&self.pool, record_id, &trip_id, seats).await
                {
                    warn!(
                        record_id,
                        "no se pudo revertir la toma de asientos: {}", revert
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn confirm(&self, id: Uuid, company_id: Uuid) -> AppResult<ReservationResponse> {
        let reservation = self
            .reservations
            .find_by_id(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::Conflict(
                "Solo una reserva pendiente puede confirmarse".to_string(),
            ));
        }

        let updated = self
            .reservations
            .update_status(id, company_id, ReservationStatus::Confirmed)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        self.response_for(updated).await
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        company_id: Uuid,
        request: CancelReservationRequest,
    ) -> AppResult<ReservationResponse> {
        let reservation = self
            .reservations
            .find_by_id(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        if reservation.is_canceled() {
            return Err(AppError::Conflict(
                "La reserva ya está cancelada".to_string(),
            ));
        }

        let status = if request.refund {
            ReservationStatus::CanceledAndRefund
        } else {
            ReservationStatus::Canceled
        };

        let updated = self
            .reservations
            .update_status(id, company_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        match reservation.details() {
            Some(details) => {
                adjust_availability(&self.pool, details.record_id, &details.trip_id, details.seats)
                    .await?;
            }
            None => {
                warn!(
                    reservation_id = %id,
                    "reserva cancelada sin trip_details válido; disponibilidad no restaurada"
                );
            }
        }

        self.response_for(updated).await
    }

    pub async fn check_in(
        &self,
        id: Uuid,
        company_id: Uuid,
        request: CheckInRequest,
    ) -> AppResult<ReservationResponse> {
        let updated = self
            .reservations
            .register_check(id, company_id, request.checked_by)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        self.response_for(updated).await
    }

    /// Lista de abordaje de un viaje: reservas agrupadas por tramo efectivo
    pub async fn boarding_list(
        &self,
        record_id: i64,
        company_id: Uuid,
    ) -> AppResult<Vec<GroupedReservation>> {
        let reservations = self
            .reservations
            .list_active_for_trip(record_id, company_id)
            .await?;

        let mut trips_by_id = HashMap::new();
        if let Some(trip) = self.trips.find_by_id(record_id).await? {
            trips_by_id.insert(trip.id, trip);
        }

        let routes_by_id: HashMap<Uuid, Route> = self
            .routes
            .list_all()
            .await?
            .into_iter()
            .map(|route| (route.id, route))
            .collect();

        let ids: Vec<Uuid> = reservations.iter().map(|r| r.id).collect();
        let passengers = self.reservations.passengers_for(ids).await?;

        Ok(group_reservations(
            &reservations,
            &trips_by_id,
            &routes_by_id,
            &passengers,
        ))
    }

    async fn response_for(&self, reservation: Reservation) -> AppResult<ReservationResponse> {
        let mut passengers_map = self.reservations.passengers_for(vec![reservation.id]).await?;
        let passengers = passengers_map
            .remove(&reservation.id)
            .map(|rows| {
                rows.into_iter()
                    .map(|p| PassengerName {
                        first_name: p.first_name,
                        last_name: p.last_name,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ReservationResponse::from_model(&reservation, passengers))
    }
}
