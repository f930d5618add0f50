use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::{CreateTripRequest, TripSearchFilters, UpdateVisibilityRequest};
use crate::models::trip::{Trip, TripVisibility};
use crate::repositories::company_repository::CompanyRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::trip_search::{search_trips, SearchLookups, TripView};
use crate::utils::errors::{AppError, AppResult};

pub struct TripController {
    trips: TripRepository,
    routes: RouteRepository,
    companies: CompanyRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
}

impl TripController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            trips: TripRepository::new(pool.clone()),
            routes: RouteRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Mapas id→registro de la búsqueda, construidos una sola vez por request
    async fn build_lookups(&self) -> AppResult<SearchLookups> {
        let routes = self.routes.list_all().await?;
        let companies = self.companies.list_all().await?;
        let vehicles = self.vehicles.list_all().await?;
        let users = self.users.list_all().await?;
        Ok(SearchLookups::build(routes, companies, vehicles, users))
    }

    pub async fn search(&self, filters: TripSearchFilters) -> AppResult<Vec<TripView>> {
        let trips = self.trips.list(filters.company_id).await?;
        let lookups = self.build_lookups().await?;
        Ok(search_trips(&trips, &lookups, &filters))
    }

    /// Listado de back-office: una fila por salida física, con borradores
    pub async fn list_for_company(&self, company_id: Uuid) -> AppResult<Vec<TripView>> {
        let filters = TripSearchFilters {
            company_id: Some(company_id),
            include_all_visibilities: true,
            optimized_response: true,
            ..Default::default()
        };
        self.search(filters).await
    }

    pub async fn get(&self, id: i64, company_id: Uuid) -> AppResult<Trip> {
        self.trips
            .find_by_id(id)
            .await?
            .filter(|trip| trip.company_id == company_id)
            .ok_or_else(|| AppError::NotFound("Viaje no encontrado".to_string()))
    }

    pub async fn create(&self, company_id: Uuid, request: CreateTripRequest) -> AppResult<Trip> {
        request.validate()?;

        let mut segments = request.segments;

        if segments.iter().any(|s| s.available_seats < 0) {
            return Err(AppError::BadRequest(
                "los asientos disponibles no pueden ser negativos".to_string(),
            ));
        }

        let main_count = segments.iter().filter(|s| s.is_main_trip).count();
        if main_count > 1 {
            return Err(AppError::BadRequest(
                "solo un segmento puede ser el tramo principal".to_string(),
            ));
        }
        if main_count == 0 {
            // por convención el primer segmento es el tramo principal
            segments[0].is_main_trip = true;
        }

        if self
            .routes
            .find_for_company(request.route_id, company_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Ruta no encontrada".to_string()));
        }

        if let Some(vehicle_id) = request.vehicle_id {
            let vehicle = self
                .vehicles
                .find_for_company(vehicle_id, company_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

            if segments.iter().any(|s| s.available_seats > vehicle.capacity) {
                return Err(AppError::BadRequest(
                    "los asientos de un segmento superan la capacidad del vehículo".to_string(),
                ));
            }
        }

        let visibility = request.visibility.unwrap_or(TripVisibility::Published);
        self.trips
            .create(
                company_id,
                request.route_id,
                request.vehicle_id,
                request.driver_id,
                visibility,
                segments,
            )
            .await
    }

    pub async fn update_visibility(
        &self,
        id: i64,
        company_id: Uuid,
        request: UpdateVisibilityRequest,
    ) -> AppResult<Trip> {
        self.trips
            .update_visibility(id, company_id, request.visibility)
            .await?
            .ok_or_else(|| AppError::NotFound("Viaje no encontrado".to_string()))
    }

    pub async fn delete(&self, id: i64, company_id: Uuid) -> AppResult<()> {
        if !self.trips.delete(id, company_id).await? {
            return Err(AppError::NotFound("Viaje no encontrado".to_string()));
        }
        Ok(())
    }
}
