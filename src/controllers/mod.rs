//! Controllers de la API
//!
//! Orquestan repositorios y servicios por recurso; los handlers HTTP
//! delegan aquí.

pub mod reservation_controller;
pub mod route_controller;
pub mod trip_controller;
pub mod vehicle_controller;
