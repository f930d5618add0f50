//! Modelo de Reservation y Passenger
//!
//! Una reserva queda atada a exactamente un segmento de viaje mediante el
//! blob `trip_details` (`{recordId, tripId, seats}`). Los pasajeros son
//! filas propias de la reserva y se eliminan en cascada con ella.
//!
//! El estado de abordaje se registró históricamente de cuatro maneras
//! (bandera booleana, `checked_by`, `checked_at` y `check_count`);
//! `is_checked` es la única derivación válida de ese hecho.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM reservation_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "reservation_status", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Canceled,
    CanceledAndRefund,
}

/// Referencia de la reserva a su segmento de viaje
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    /// Id de la fila del viaje en la tabla trips
    pub record_id: i64,
    /// Identificador de negocio del segmento (`"<recordId>_<índice>"`)
    pub trip_id: String,
    pub seats: i32,
}

/// Reservation - mapea exactamente a la tabla reservations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub company_id: Uuid,
    pub trip_details: JsonValue,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: Decimal,
    pub advance: Decimal,
    pub payment_method: Option<String>,
    pub status: ReservationStatus,
    pub checked: bool,
    pub check_count: i32,
    pub checked_by: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Referencia al segmento, o None si el blob quedó malformado
    pub fn details(&self) -> Option<TripDetails> {
        serde_json::from_value(self.trip_details.clone()).ok()
    }

    /// OR lógico de las cuatro señales redundantes de abordaje
    pub fn is_checked(&self) -> bool {
        self.checked
            || self.check_count > 0
            || self.checked_by.is_some()
            || self.checked_at.is_some()
    }

    pub fn is_canceled(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Canceled | ReservationStatus::CanceledAndRefund
        )
    }
}

/// Passenger - mapea exactamente a la tabla passengers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Passenger {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}
