//! DTOs de reservas
//!
//! Requests y responses del surface de reservas y abordaje.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::reservation::{Reservation, ReservationStatus, TripDetails};

/// Pasajero tal como llega y se devuelve por la API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerName {
    pub first_name: String,
    pub last_name: String,
}

/// Request para crear una reserva sobre un segmento concreto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Id de la fila del viaje (recordId del blob trip_details)
    pub record_id: i64,
    /// Identificador de negocio del segmento (`"<recordId>_<índice>"`)
    #[validate(length(min = 3, message = "tripId de segmento requerido"))]
    pub trip_id: String,
    #[validate(range(min = 1, message = "la reserva necesita al menos un asiento"))]
    pub seats: i32,
    pub passengers: Vec<PassengerName>,
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub advance: Decimal,
    pub payment_method: Option<String>,
}

/// Request para cancelar una reserva
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelReservationRequest {
    /// true: transición a canceledAndRefund en lugar de canceled
    pub refund: bool,
}

/// Request de check-in de abordaje
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Identificación del verificador que marca el abordaje
    pub checked_by: Option<String>,
}

/// Response de reserva para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub trip_details: Option<TripDetails>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: Decimal,
    pub advance: Decimal,
    pub payment_method: Option<String>,
    pub status: ReservationStatus,
    pub checked: bool,
    pub check_count: i32,
    pub passengers: Vec<PassengerName>,
    pub created_at: DateTime<Utc>,
}

impl ReservationResponse {
    pub fn from_model(reservation: &Reservation, passengers: Vec<PassengerName>) -> Self {
        Self {
            id: reservation.id,
            company_id: reservation.company_id,
            trip_details: reservation.details(),
            contact_name: reservation.contact_name.clone(),
            contact_phone: reservation.contact_phone.clone(),
            amount: reservation.amount,
            advance: reservation.advance,
            payment_method: reservation.payment_method.clone(),
            status: reservation.status,
            checked: reservation.is_checked(),
            check_count: reservation.check_count,
            passengers,
            created_at: reservation.created_at,
        }
    }
}
