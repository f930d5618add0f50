//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod company;
pub mod reservation;
pub mod route;
pub mod trip;
pub mod user;
pub mod vehicle;
