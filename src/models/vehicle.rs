//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle que mapea exactamente
//! a la tabla vehicles del schema PostgreSQL. La capacidad del vehículo
//! acota los asientos disponibles de cada segmento del viaje asignado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}
