//! Routers por recurso

pub mod reservation_routes;
pub mod route_routes;
pub mod trip_routes;
pub mod vehicle_routes;
