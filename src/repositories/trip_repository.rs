use crate::models::trip::{compose_business_id, serialize_segments, Segment, Trip, TripVisibility};
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Publicar un viaje con sus segmentos.
    ///
    /// El identificador de negocio de cada segmento se sella con el id real
    /// de la fila una vez conocido, dentro de la misma transacción.
    pub async fn create(
        &self,
        company_id: Uuid,
        route_id: Uuid,
        vehicle_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        visibility: TripVisibility,
        mut segments: Vec<Segment>,
    ) -> Result<Trip, AppError> {
        let mut tx = self.pool.begin().await?;

        let (trip_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO trips (route_id, company_id, vehicle_id, driver_id, visibility, trip_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(route_id)
        .bind(company_id)
        .bind(vehicle_id)
        .bind(driver_id)
        .bind(visibility)
        .bind(serialize_segments(&segments))
        .fetch_one(&mut *tx)
        .await?;

        for (index, segment) in segments.iter_mut().enumerate() {
            segment.trip_id = compose_business_id(trip_id, index);
        }

        let trip = sqlx::query_as::<_, Trip>(
            "UPDATE trips SET trip_data = $1 WHERE id = $2 RETURNING *",
        )
        .bind(serialize_segments(&segments))
        .bind(trip_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(trip)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    /// Viajes candidatos para la búsqueda; el filtrado fino por segmento
    /// lo hace el motor de expansión en memoria
    pub async fn list(&self, company_id: Option<Uuid>) -> Result<Vec<Trip>, AppError> {
        let trips = match company_id {
            Some(company_id) => {
                sqlx::query_as::<_, Trip>(
                    "SELECT * FROM trips WHERE company_id = $1 ORDER BY id",
                )
                .bind(company_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Trip>("SELECT * FROM trips ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(trips)
    }

    pub async fn update_visibility(
        &self,
        id: i64,
        company_id: Uuid,
        visibility: TripVisibility,
    ) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET visibility = $3
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trip)
    }

    pub async fn delete(&self, id: i64, company_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn route_is_referenced(&self, route_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM trips WHERE route_id = $1)")
                .bind(route_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }
}
