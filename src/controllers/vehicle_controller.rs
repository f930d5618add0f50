use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, VehicleResponse};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateVehicleRequest,
    ) -> AppResult<VehicleResponse> {
        request.validate()?;

        if self
            .repository
            .license_plate_exists(&request.license_plate, company_id)
            .await?
        {
            return Err(AppError::Conflict(
                "La matrícula ya está registrada para esta empresa".to_string(),
            ));
        }

        let vehicle = self
            .repository
            .create(
                company_id,
                request.license_plate,
                request.brand,
                request.model,
                request.capacity,
            )
            .await?;

        Ok(vehicle.into())
    }

    pub async fn list(&self, company_id: Uuid) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.list_by_company(company_id).await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }
}
