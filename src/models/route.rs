//! Modelo de Route
//!
//! Este módulo contiene el struct Route y la generación de pares
//! origen→destino para las pantallas de precios. Una ruta con `n` puntos
//! (origen + paradas intermedias + destino) genera `n*(n-1)/2`
//! combinaciones ordenadas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Route - mapea exactamente a la tabla routes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub company_id: Uuid,
    pub origin: String,
    pub destination: String,
    /// Paradas intermedias en orden de recorrido, almacenadas como jsonb
    pub stops: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Route {
    /// Puntos de la ruta en orden de recorrido: origen, paradas, destino
    pub fn points(&self) -> Vec<String> {
        let mut points = Vec::with_capacity(self.stops.0.len() + 2);
        points.push(self.origin.clone());
        points.extend(self.stops.0.iter().cloned());
        points.push(self.destination.clone());
        points
    }

    /// Todas las combinaciones ordenadas origen→destino entre los puntos
    /// de la ruta, para tarificación por tramo
    pub fn segment_pairs(&self) -> Vec<(String, String)> {
        let points = self.points();
        let mut pairs = Vec::new();
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                pairs.push((points[i].clone(), points[j].clone()));
            }
        }
        pairs
    }
}
