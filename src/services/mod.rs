//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el motor
//! de expansión de búsqueda, la propagación de disponibilidad de asientos
//! y la agregación de reservas para abordaje.

pub mod availability;
pub mod boarding;
pub mod trip_search;
