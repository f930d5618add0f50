use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        license_plate: String,
        brand: Option<String>,
        model: Option<String>,
        capacity: i32,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (company_id, license_plate, brand, model, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(license_plate)
        .bind(brand)
        .bind(model)
        .bind(capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_for_company(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Todos los vehículos, para construir el mapa id→vehículo de la búsqueda
    pub async fn list_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    pub async fn license_plate_exists(
        &self,
        license_plate: &str,
        company_id: Uuid,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1 AND company_id = $2)",
        )
        .bind(license_plate)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
