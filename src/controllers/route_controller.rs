use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::route_dto::{CreateRouteRequest, RouteResponse, SegmentPair, SegmentPairsResponse};
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::utils::errors::{AppError, AppResult};

pub struct RouteController {
    routes: RouteRepository,
    trips: TripRepository,
}

impl RouteController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            routes: RouteRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateRouteRequest,
    ) -> AppResult<RouteResponse> {
        request.validate()?;

        let route = self
            .routes
            .create(company_id, request.origin, request.destination, request.stops)
            .await?;

        Ok(route.into())
    }

    pub async fn list(&self, company_id: Uuid) -> AppResult<Vec<RouteResponse>> {
        let routes = self.routes.list_by_company(company_id).await?;
        Ok(routes.into_iter().map(RouteResponse::from).collect())
    }

    pub async fn get(&self, id: Uuid, company_id: Uuid) -> AppResult<RouteResponse> {
        let route = self
            .routes
            .find_for_company(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ruta no encontrada".to_string()))?;

        Ok(route.into())
    }

    /// Combinaciones origen→destino tarificables de la ruta
    pub async fn segment_pairs(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> AppResult<SegmentPairsResponse> {
        let route = self
            .routes
            .find_for_company(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ruta no encontrada".to_string()))?;

        let pairs = route
            .segment_pairs()
            .into_iter()
            .map(|(origin, destination)| SegmentPair {
                origin,
                destination,
            })
            .collect();

        Ok(SegmentPairsResponse {
            route_id: route.id,
            pairs,
        })
    }

    /// Una ruta solo se elimina si ningún viaje la referencia
    pub async fn delete(&self, id: Uuid, company_id: Uuid) -> AppResult<()> {
        if self
            .routes
            .find_for_company(id, company_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Ruta no encontrada".to_string()));
        }

        if self.trips.route_is_referenced(id).await? {
            return Err(AppError::Conflict(
                "La ruta tiene viajes publicados y no puede eliminarse".to_string(),
            ));
        }

        self.routes.delete(id, company_id).await?;
        Ok(())
    }
}
