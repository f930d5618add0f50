use crate::models::route::Route;
use crate::utils::errors::AppError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        origin: String,
        destination: String,
        stops: Vec<String>,
    ) -> Result<Route, AppError> {
        let route = sqlx::query_as::<_, Route>(
            r#"
            INSERT INTO routes (company_id, origin, destination, stops)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(origin)
        .bind(destination)
        .bind(Json(stops))
        .fetch_one(&self.pool)
        .await?;

        Ok(route)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        let route = sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(route)
    }

    pub async fn find_for_company(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Route>, AppError> {
        let route = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Route>, AppError> {
        let routes = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    /// Todas las rutas, para construir el mapa id→ruta de la búsqueda
    pub async fn list_all(&self) -> Result<Vec<Route>, AppError> {
        let routes = sqlx::query_as::<_, Route>("SELECT * FROM routes")
            .fetch_all(&self.pool)
            .await?;

        Ok(routes)
    }

    pub async fn delete(&self, id: Uuid, company_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
