use crate::error::app_error::AppError;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::pool::PoolConnection;

/// A single pooled connection owned by one request. Dropping the repository
/// hands the connection back to the pool, whichever way the handler exits.
pub struct PostgresRepository {
    pub conn: PoolConnection<Postgres>,
}

impl PostgresRepository {
    pub async fn connect(pool: &PgPool) -> Result<Self, AppError> {
        let conn = pool.acquire().await.map_err(AppError::connection)?;
        Ok(Self { conn })
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
