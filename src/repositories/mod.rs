//! Repositorios de acceso a datos
//!
//! Un repositorio por tabla, sobre el pool de PostgreSQL.

pub mod company_repository;
pub mod reservation_repository;
pub mod route_repository;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;
