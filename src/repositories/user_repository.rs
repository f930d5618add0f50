use crate::models::user::User;
use crate::utils::errors::AppError;
use sqlx::PgPool;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Todos los usuarios; de aquí salen los mapas de choferes y la
    /// identidad pública de cada empresa (registro del dueño)
    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
