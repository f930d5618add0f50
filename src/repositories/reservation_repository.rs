use std::collections::HashMap;

use crate::dto::reservation_dto::PassengerName;
use crate::models::reservation::{Passenger, Reservation, ReservationStatus};
use crate::utils::errors::AppError;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear la reserva y sus filas de pasajeros en una transacción
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        company_id: Uuid,
        trip_details: JsonValue,
        contact_name: Option<String>,
        contact_phone: Option<String>,
        amount: Decimal,
        advance: Decimal,
        payment_method: Option<String>,
        passengers: &[PassengerName],
    ) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                company_id, trip_details, contact_name, contact_phone,
                amount, advance, payment_method
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(trip_details)
        .bind(contact_name)
        .bind(contact_phone)
        .bind(amount)
        .bind(advance)
        .bind(payment_method)
        .fetch_one(&mut *tx)
        .await?;

        for passenger in passengers {
            sqlx::query(
                "INSERT INTO passengers (reservation_id, first_name, last_name) VALUES ($1, $2, $3)",
            )
            .bind(reservation.id)
            .bind(&passenger.first_name)
            .bind(&passenger.last_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(reservation)
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Reservas vivas de un viaje, en orden de creación
    pub async fn list_active_for_trip(
        &self,
        record_id: i64,
        company_id: Uuid,
    ) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE (trip_details->>'recordId')::bigint = $1
            AND company_id = $2
            AND status NOT IN ('canceled', 'canceledAndRefund')
            ORDER BY created_at
            "#,
        )
        .bind(record_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        company_id: Uuid,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $3
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Marcar un abordaje: incrementa el contador y estampa quién y cuándo
    pub async fn register_check(
        &self,
        id: Uuid,
        company_id: Uuid,
        checked_by: Option<String>,
    ) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET checked = TRUE,
                check_count = check_count + 1,
                checked_by = COALESCE($3, checked_by),
                checked_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(checked_by)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    pub async fn passengers_for(
        &self,
        reservation_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<Passenger>>, AppError> {
        if reservation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, Passenger>(
            "SELECT * FROM passengers WHERE reservation_id = ANY($1) ORDER BY id",
        )
        .bind(reservation_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_reservation: HashMap<Uuid, Vec<Passenger>> = HashMap::new();
        for row in rows {
            by_reservation.entry(row.reservation_id).or_default().push(row);
        }

        Ok(by_reservation)
    }
}
