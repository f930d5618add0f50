use crate::models::company::Company;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    /// Todas las empresas, como respaldo del mapa de identidad pública
    pub async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies")
            .fetch_all(&self.pool)
            .await?;

        Ok(companies)
    }
}
